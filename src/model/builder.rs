//! 从 serde_json::Value 递归构建整棵树

use serde_json::Value;

use crate::model::error::ParseError;
use crate::model::node::{NodeId, NodeKey, NodeKind, TreeArena};

/// 解析JSON文本；语法错误携带行列定位
pub fn parse_json(text: &str) -> Result<Value, ParseError> {
    serde_json::from_str(text).map_err(ParseError::from)
}

/// 解析JSON字节流（UTF-8编码错误同样按解析错误上报）
pub fn parse_json_bytes(bytes: &[u8]) -> Result<Value, ParseError> {
    serde_json::from_slice(bytes).map_err(ParseError::from)
}

/// 从已解析的 Value 构建整棵树；根键固定为 "root"
///
/// 对象字段按映射迭代顺序（即插入顺序）、数组元素按下标顺序成为行序。
/// 纯函数：相同输入产出结构相同的树，对已解析的值不会失败。
pub fn build_tree(value: &Value) -> TreeArena {
    let mut arena = TreeArena::with_root(NodeKind::of(value), scalar_payload(value));
    let root = arena.root();
    build_children(&mut arena, root, value);
    arena
}

/// 容器节点无标量负载；叶子保留其标量克隆
fn scalar_payload(v: &Value) -> Option<Value> {
    if NodeKind::of(v).is_container() {
        None
    } else {
        Some(v.clone())
    }
}

fn build_children(arena: &mut TreeArena, parent: NodeId, value: &Value) {
    match value {
        Value::Object(map) => {
            for (k, child) in map {
                let id = arena.append_child(
                    parent,
                    NodeKey::Name(k.clone()),
                    NodeKind::of(child),
                    scalar_payload(child),
                );
                build_children(arena, id, child);
            }
        }
        Value::Array(arr) => {
            for (i, child) in arr.iter().enumerate() {
                let id = arena.append_child(
                    parent,
                    NodeKey::Index(i),
                    NodeKind::of(child),
                    scalar_payload(child),
                );
                build_children(arena, id, child);
            }
        }
        _ => {}
    }
}
