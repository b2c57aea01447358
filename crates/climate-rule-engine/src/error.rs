//! 规则引擎错误类型
//!
//! 规则评估本身不会失败；这里的错误只来自规则加载、编译和事实构造。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("规则解析失败: {0}")]
    ParseError(String),

    #[error("规则编译失败: {0}")]
    CompileError(String),

    #[error("无效的事实数据: {0}")]
    InvalidFact(String),

    #[error("读取规则文件失败 '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON 序列化错误: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RuleError>;
