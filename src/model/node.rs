//! 树节点与节点仓（arena）：结构不变式与行寻址
//!
//! 父→子为拥有边（仓内顺序存储），子→父只是非拥有的索引回链，
//! 仅用于 row/parent 查询，不参与生命周期管理。

use serde::Serialize;
use serde_json::Value;

use crate::model::error::IndexOutOfRange;

/// JSON 节点类型（与 UI 展示解耦）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    Object,
    Array,
    String,
    Number,
    Bool,
    Null,
}

impl NodeKind {
    /// 从 Value 的具体类型推导节点类型
    pub fn of(v: &Value) -> Self {
        match v {
            Value::Object(_) => NodeKind::Object,
            Value::Array(_) => NodeKind::Array,
            Value::String(_) => NodeKind::String,
            Value::Number(_) => NodeKind::Number,
            Value::Bool(_) => NodeKind::Bool,
            Value::Null => NodeKind::Null,
        }
    }

    /// 小写类型标签（type列的取值）
    pub fn label(self) -> &'static str {
        match self {
            NodeKind::Object => "object",
            NodeKind::Array => "array",
            NodeKind::String => "string",
            NodeKind::Number => "number",
            NodeKind::Bool => "boolean",
            NodeKind::Null => "null",
        }
    }

    pub fn is_container(self) -> bool {
        matches!(self, NodeKind::Object | NodeKind::Array)
    }
}

/// 节点在父级中的键：根哨兵、对象字段名或数组索引
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKey {
    Root,
    Name(String),
    Index(usize),
}

impl std::fmt::Display for NodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKey::Root => f.write_str("root"),
            NodeKey::Name(s) => f.write_str(s),
            NodeKey::Index(i) => write!(f, "{}", i),
        }
    }
}

/// 节点仓内的节点编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// 单个树节点：键、类型标签、标量负载、子节点与父回链
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub key: NodeKey,
    pub kind: NodeKind,
    /// 叶子的标量负载；容器节点为 None
    pub value: Option<Value>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl TreeNode {
    fn new(key: NodeKey, kind: NodeKind, value: Option<Value>, parent: Option<NodeId>) -> Self {
        Self {
            key,
            kind,
            value,
            children: Vec::new(),
            parent,
        }
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_leaf(&self) -> bool {
        !self.kind.is_container()
    }
}

/// 以 Vec 为后备存储的树节点仓：唯一的根 + 全部节点
#[derive(Debug, Clone)]
pub struct TreeArena {
    nodes: Vec<TreeNode>,
    root: NodeId,
}

impl TreeArena {
    /// 创建只含根节点的节点仓；根键固定为 "root"
    pub fn with_root(kind: NodeKind, value: Option<Value>) -> Self {
        let root = TreeNode::new(NodeKey::Root, kind, value, None);
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// 节点总数（含根）
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.0]
    }

    /// 在父节点末尾追加新子节点（构建期唯一的结构操作）
    pub fn append_child(
        &mut self,
        parent: NodeId,
        key: NodeKey,
        kind: NodeKind,
        value: Option<Value>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(TreeNode::new(key, kind, value, Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.nodes[id.0].children.len()
    }

    /// 取第 i 个子节点；越界返回 IndexOutOfRange
    pub fn child(&self, id: NodeId, i: usize) -> Result<NodeId, IndexOutOfRange> {
        let children = &self.nodes[id.0].children;
        children.get(i).copied().ok_or(IndexOutOfRange {
            index: i,
            len: children.len(),
        })
    }

    /// 节点在父级 children 中的位置；无父节点时取哨兵 0
    pub fn row(&self, id: NodeId) -> usize {
        match self.nodes[id.0].parent {
            // 不变式保证节点必在父级children中出现一次；防御性回退到哨兵0
            Some(p) => self.nodes[p.0]
                .children
                .iter()
                .position(|&c| c == id)
                .unwrap_or(0),
            None => 0,
        }
    }

    /// 为数组节点的子级重派生连续的索引键
    ///
    /// 数组子键由顺序决定而非独立存储；任何结构变动（扩展API的
    /// 插入/删除）之后必须调用本方法恢复不变式。
    pub fn reindex_children(&mut self, id: NodeId) {
        if self.nodes[id.0].kind != NodeKind::Array {
            return;
        }
        let children = self.nodes[id.0].children.clone();
        for (i, c) in children.into_iter().enumerate() {
            self.nodes[c.0].key = NodeKey::Index(i);
        }
    }
}
