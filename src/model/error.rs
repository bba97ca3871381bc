//! 错误分类：解析失败、加载失败与越界寻址

use thiserror::Error;

/// JSON文本语法错误（携带行列定位，便于编辑器跳转）
#[derive(Error, Debug)]
#[error("JSON解析失败 (行{line} 列{column}): {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl From<serde_json::Error> for ParseError {
    fn from(e: serde_json::Error) -> Self {
        Self {
            line: e.line(),
            column: e.column(),
            message: e.to_string(),
        }
    }
}

/// 加载失败：输入既不是合法JSON，也不是可读的文件路径
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("JSON解析失败: {0}")]
    Parse(#[from] ParseError),
    #[error("IO失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("无法解析输入 (文本解析失败: {parse}; 文件读取失败: {io})")]
    Unresolvable {
        parse: ParseError,
        #[source]
        io: std::io::Error,
    },
}

/// 子节点索引越界：i 超出 [0, child_count())
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("子节点索引越界: index={index}, len={len}")]
pub struct IndexOutOfRange {
    pub index: usize,
    pub len: usize,
}
