//! JSON树模型库
//!
//! 将JSON文档（或等价的嵌套键值结构）解析为可寻址、可就地编辑的类型化树，
//! 并能随时从（可能已编辑的）树还原出等价的嵌套值。
//! 渲染与事件处理属于外部绑定层：核心只暴露寻址/查询/编辑API，
//! 以及 Reset / DataChanged 两类通知。

pub mod model;
pub mod utils;

// 重新导出主要类型
pub use model::builder::{build_tree, parse_json, parse_json_bytes};
pub use model::error::{IndexOutOfRange, LoadError, ParseError};
pub use model::node::{NodeId, NodeKey, NodeKind, TreeArena, TreeNode};
pub use model::tree_model::{
    JsonTreeModel, ModelEvent, NodeRef, COLUMN_COUNT, COL_KEY, COL_TYPE, COL_VALUE,
};
