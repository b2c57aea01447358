//! 规则操作符定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 条件操作符
///
/// 操作符集合是封闭的。规则集来自外部数据（JSON），因此保留一个
/// `Unrecognized` 变体承载无法识别的操作符文本，求值时恒为 false。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    // 通用比较
    Eq,
    Neq,

    // 有序比较（数值或字符串）
    Gt,
    Gte,
    Lt,
    Lte,

    // 集合成员检查
    In,
    NotIn,

    /// 无法识别的操作符，保留原始文本用于诊断
    Unrecognized(String),
}

impl Operator {
    /// 解析操作符，同时接受符号写法（`>=`）和名称写法（`gte`），按原文精确匹配
    pub fn parse(s: &str) -> Self {
        match s {
            "==" | "eq" => Self::Eq,
            "!=" | "neq" => Self::Neq,
            ">" | "gt" => Self::Gt,
            ">=" | "gte" => Self::Gte,
            "<" | "lt" => Self::Lt,
            "<=" | "lte" => Self::Lte,
            "in" => Self::In,
            "not_in" => Self::NotIn,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// 符号形式，序列化时使用
    pub fn symbol(&self) -> &str {
        match self {
            Self::Eq => "==",
            Self::Neq => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::Unrecognized(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }

    /// 是否为有序比较操作符
    pub fn is_ordering(&self) -> bool {
        matches!(self, Self::Gt | Self::Gte | Self::Lt | Self::Lte)
    }

    /// 是否为集合成员操作符
    pub fn is_membership(&self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }
}

impl From<String> for Operator {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<&str> for Operator {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.symbol().to_string()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
