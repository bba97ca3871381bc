//! JsonTreeModel：树的可寻址、可编辑门面
//!
//! 以 (行, 列, 节点) 三元组寻址，供绑定层做层级展示与就地编辑；
//! 核心只发出 Reset / DataChanged 两类通知，渲染协议由绑定层自理。

use std::path::Path;

use serde_json::Value;

use crate::model::builder::{build_tree, parse_json, parse_json_bytes};
use crate::model::error::LoadError;
use crate::model::node::{NodeId, NodeKey, NodeKind, TreeArena};
use crate::utils::fs::{read_json_file, write_json_file};

/// 列编号：键 / 值 / 类型
pub const COL_KEY: usize = 0;
pub const COL_VALUE: usize = 1;
pub const COL_TYPE: usize = 2;
pub const COLUMN_COUNT: usize = 3;

const HEADERS: [&str; COLUMN_COUNT] = ["key", "value", "type"];

/// 不透明节点引用：(行, 列, 节点) 三元组外加代戳
///
/// 代戳使 load 之前发出的引用在重置后自动失效，
/// 不会串到新树里复用了同一槽位的节点上。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRef {
    row: usize,
    column: usize,
    node: Option<NodeId>,
    generation: u64,
}

impl NodeRef {
    /// 无效哨兵；作为父引用传入时代表根（参照Qt的无效索引约定）
    pub const INVALID: NodeRef = NodeRef {
        row: 0,
        column: 0,
        node: None,
        generation: 0,
    };

    pub fn is_valid(&self) -> bool {
        self.node.is_some()
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn column(&self) -> usize {
        self.column
    }
}

/// 发给绑定层的通知：整树重置或单格变更
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelEvent {
    Reset,
    DataChanged { node: NodeRef, column: usize },
}

type Observer = Box<dyn FnMut(&ModelEvent)>;

/// JSON树模型：独占持有节点仓，提供加载/查询/编辑/导出
pub struct JsonTreeModel {
    arena: TreeArena,
    generation: u64,
    observers: Vec<Observer>,
}

impl Default for JsonTreeModel {
    /// 空模型：根为一个 null 叶子，可先绑定后加载
    fn default() -> Self {
        Self {
            arena: TreeArena::with_root(NodeKind::Null, Some(Value::Null)),
            generation: 1,
            observers: Vec::new(),
        }
    }
}

impl JsonTreeModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// 订阅模型通知（绑定层在此接回调）
    pub fn subscribe(&mut self, f: impl FnMut(&ModelEvent) + 'static) {
        self.observers.push(Box::new(f));
    }

    fn emit(&mut self, event: ModelEvent) {
        for obs in &mut self.observers {
            obs(&event);
        }
    }

    // === 加载 ===

    /// 用已解析的 Value 整树替换当前内容（重置而非合并）
    pub fn load_value(&mut self, value: Value) {
        self.arena = build_tree(&value);
        self.generation += 1;
        tracing::info!(nodes = self.arena.len(), "模型已重置");
        self.emit(ModelEvent::Reset);
    }

    /// 解析JSON字节流并加载
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<(), LoadError> {
        let value = parse_json_bytes(bytes)?;
        self.load_value(value);
        Ok(())
    }

    /// 读取文件并加载其JSON内容
    pub fn load_path(&mut self, path: &Path) -> Result<(), LoadError> {
        let value = read_json_file(path)?;
        self.load_value(value);
        Ok(())
    }

    /// 加载字符串：先按JSON文本解析，失败后按文件路径重试
    ///
    /// 两次尝试都失败时返回 Unresolvable，同时携带两个原因。
    /// 任何失败都不触碰当前树，之前的内容保持可见。
    pub fn load(&mut self, source: &str) -> Result<(), LoadError> {
        let parse_err = match parse_json(source) {
            Ok(value) => {
                self.load_value(value);
                return Ok(());
            }
            Err(e) => e,
        };
        tracing::debug!(error = %parse_err, "文本解析失败，按文件路径重试");
        match std::fs::read(Path::new(source)) {
            Ok(bytes) => {
                let value = parse_json_bytes(&bytes)?;
                self.load_value(value);
                Ok(())
            }
            Err(io) => Err(LoadError::Unresolvable {
                parse: parse_err,
                io,
            }),
        }
    }

    /// 将当前树导出并保存到文件（格式化输出）
    pub fn save_path(&self, path: &Path) -> Result<(), LoadError> {
        write_json_file(path, &self.as_plain_value())?;
        tracing::info!("JSON文件已保存到: {}", path.display());
        Ok(())
    }

    // === 寻址与查询 ===

    /// 引用解析：过期代戳一律视为无效
    fn resolve(&self, r: NodeRef) -> Option<NodeId> {
        if r.generation == self.generation {
            r.node
        } else {
            None
        }
    }

    /// 无效引用（含过期引用）落到根
    fn node_or_root(&self, parent: NodeRef) -> NodeId {
        self.resolve(parent).unwrap_or_else(|| self.arena.root())
    }

    fn make_ref(&self, row: usize, column: usize, node: NodeId) -> NodeRef {
        NodeRef {
            row,
            column,
            node: Some(node),
            generation: self.generation,
        }
    }

    /// 父引用下的行数；带非零列的有效引用按约定返回 0
    pub fn row_count(&self, parent: NodeRef) -> usize {
        if parent.is_valid() && parent.column != 0 {
            return 0;
        }
        self.arena.child_count(self.node_or_root(parent))
    }

    /// 恒为 3 列（key / value / type）
    pub fn column_count(&self) -> usize {
        COLUMN_COUNT
    }

    /// 表头名；越界返回 None
    pub fn header(&self, section: usize) -> Option<&'static str> {
        HEADERS.get(section).copied()
    }

    /// 取 (row, column) 处的子节点引用；越界返回无效哨兵
    pub fn index(&self, row: usize, column: usize, parent: NodeRef) -> NodeRef {
        if column >= COLUMN_COUNT {
            return NodeRef::INVALID;
        }
        let parent_id = self.node_or_root(parent);
        match self.arena.child(parent_id, row) {
            Ok(child) => self.make_ref(row, column, child),
            Err(_) => NodeRef::INVALID,
        }
    }

    /// 父引用；根的直接子节点返回无效哨兵
    pub fn parent_of(&self, r: NodeRef) -> NodeRef {
        let Some(id) = self.resolve(r) else {
            return NodeRef::INVALID;
        };
        let Some(parent) = self.arena.node(id).parent() else {
            return NodeRef::INVALID;
        };
        if parent == self.arena.root() {
            return NodeRef::INVALID;
        }
        self.make_ref(self.arena.row(parent), 0, parent)
    }

    /// 单元格数据：列0键、列1标量值（容器为None）、列2类型标签
    pub fn data(&self, r: NodeRef, column: usize) -> Option<Value> {
        let id = self.resolve(r)?;
        let node = self.arena.node(id);
        match column {
            COL_KEY => Some(Value::String(node.key.to_string())),
            COL_VALUE => node.value.clone(),
            COL_TYPE => Some(Value::String(node.kind.label().to_string())),
            _ => None,
        }
    }

    /// 单元格的展示文本（长字符串截断，容器给轻量预览）
    pub fn display_text(&self, r: NodeRef, column: usize) -> String {
        let Some(id) = self.resolve(r) else {
            return String::new();
        };
        match column {
            COL_KEY => self.arena.node(id).key.to_string(),
            COL_VALUE => self.value_preview(id),
            COL_TYPE => self.arena.node(id).kind.label().to_string(),
            _ => String::new(),
        }
    }

    fn value_preview(&self, id: NodeId) -> String {
        let node = self.arena.node(id);
        match node.kind {
            NodeKind::Object => format!("{{..}} ({} keys)", self.arena.child_count(id)),
            NodeKind::Array => format!("[..] ({} items)", self.arena.child_count(id)),
            _ => match node.value.as_ref() {
                Some(Value::String(s)) => {
                    let s = s.trim();
                    if s.chars().count() > 32 {
                        let truncated: String = s.chars().take(32).collect();
                        format!("\"{}...\"", truncated)
                    } else {
                        format!("\"{}\"", s)
                    }
                }
                Some(other) => other.to_string(),
                None => String::new(),
            },
        }
    }

    // === 编辑 ===

    /// 编辑能力查询：仅叶子的键/值两列可编辑
    ///
    /// 数组子节点与根的键由结构派生，键列同样不可编辑。
    pub fn is_editable(&self, r: NodeRef, column: usize) -> bool {
        let Some(id) = self.resolve(r) else {
            return false;
        };
        let node = self.arena.node(id);
        if !node.is_leaf() {
            return false;
        }
        match column {
            COL_KEY => matches!(node.key, NodeKey::Name(_)),
            COL_VALUE => true,
            _ => false,
        }
    }

    /// 写单元格；被拒绝一律返回 false，绝不panic
    ///
    /// 列0改键：仅限对象字段，且不得与兄弟键重复。
    /// 列1改值：仅接受标量（编辑不改结构），并按新值的具体类型
    /// 重派生类型标签（标量间的"就地改型"语义）。
    /// 列2只读。成功时发出 DataChanged 通知。
    pub fn set_data(&mut self, r: NodeRef, column: usize, new_value: Value) -> bool {
        let Some(id) = self.resolve(r) else {
            return false;
        };
        if !self.is_editable(r, column) {
            return false;
        }
        match column {
            COL_KEY => {
                let Value::String(name) = new_value else {
                    return false;
                };
                if self.sibling_key_exists(id, &name) {
                    tracing::warn!(key = %name, "键名与兄弟节点重复，编辑被拒绝");
                    return false;
                }
                self.arena.node_mut(id).key = NodeKey::Name(name);
            }
            COL_VALUE => {
                if NodeKind::of(&new_value).is_container() {
                    return false;
                }
                let node = self.arena.node_mut(id);
                node.kind = NodeKind::of(&new_value);
                node.value = Some(new_value);
            }
            _ => return false,
        }
        tracing::debug!(row = r.row, column, "单元格已更新");
        self.emit(ModelEvent::DataChanged { node: r, column });
        true
    }

    fn sibling_key_exists(&self, id: NodeId, name: &str) -> bool {
        let Some(parent) = self.arena.node(id).parent() else {
            return false;
        };
        self.arena.node(parent).children().iter().any(|&c| {
            c != id && matches!(&self.arena.node(c).key, NodeKey::Name(n) if n == name)
        })
    }

    // === 导出 ===

    /// 从（可能已编辑的）树重建嵌套 Value；build_tree 的逆运算
    pub fn as_plain_value(&self) -> Value {
        self.export(self.arena.root())
    }

    fn export(&self, id: NodeId) -> Value {
        let node = self.arena.node(id);
        match node.kind {
            NodeKind::Object => {
                let mut map = serde_json::Map::with_capacity(node.children().len());
                for &c in node.children() {
                    map.insert(self.arena.node(c).key.to_string(), self.export(c));
                }
                Value::Object(map)
            }
            NodeKind::Array => {
                Value::Array(node.children().iter().map(|&c| self.export(c)).collect())
            }
            _ => node.value.clone().unwrap_or(Value::Null),
        }
    }
}
