//! 规则引擎领域模型

use crate::operators::Operator;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// 无规则命中时的原因文本
pub const NO_RULES_MATCHED: &str = "No rules matched";

/// 空调运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AcMode {
    Off,
    Cool,
    Eco,
    Sleep,
}

impl fmt::Display for AcMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Off => "OFF",
            Self::Cool => "COOL",
            Self::Eco => "ECO",
            Self::Sleep => "SLEEP",
        };
        write!(f, "{}", s)
    }
}

/// 风速档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FanSpeed {
    Low,
    Medium,
    High,
}

impl fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        };
        write!(f, "{}", s)
    }
}

/// 推荐的空调动作
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(alias = "ac_mode")]
    pub mode: AcMode,
    pub fan_speed: FanSpeed,
    /// 目标温度，`None` 表示不设定（例如关机）
    #[serde(default)]
    pub setpoint: Option<f64>,
    pub reason: String,
}

impl Action {
    pub fn new(
        mode: AcMode,
        fan_speed: FanSpeed,
        setpoint: Option<f64>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            mode,
            fan_speed,
            setpoint,
            reason: reason.into(),
        }
    }

    /// 兜底动作：关机、低风速、无设定温度
    pub fn fallback() -> Self {
        Self::new(AcMode::Off, FanSpeed::Low, None, NO_RULES_MATCHED)
    }

    pub fn is_fallback(&self) -> bool {
        *self == Self::fallback()
    }
}

impl Default for Action {
    fn default() -> Self {
        Self::fallback()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "AC Mode: {}", self.mode)?;
        writeln!(f, "Fan Speed: {}", self.fan_speed)?;
        match self.setpoint {
            Some(t) => writeln!(f, "Setpoint Temperature: {}", t)?,
            None => writeln!(f, "Setpoint Temperature: none")?,
        }
        write!(f, "Reason: {}", self.reason)
    }
}

/// 条件节点
///
/// 反序列化同时接受紧凑三元组 `["temperature", ">=", 24]` 和对象写法，
/// 序列化统一输出对象写法。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ConditionRepr")]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    pub value: Value,
}

impl Condition {
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<Operator>,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.operator, self.value)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ConditionRepr {
    Triple(String, Operator, Value),
    Object {
        field: String,
        operator: Operator,
        value: Value,
    },
}

impl From<ConditionRepr> for Condition {
    fn from(repr: ConditionRepr) -> Self {
        match repr {
            ConditionRepr::Triple(field, operator, value)
            | ConditionRepr::Object {
                field,
                operator,
                value,
            } => Self {
                field,
                operator,
                value,
            },
        }
    }
}

/// 规则定义
///
/// 条件之间是隐式 AND；条件列表为空时规则无条件命中。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    pub action: Action,
}

impl Rule {
    pub fn new(
        name: impl Into<String>,
        priority: i64,
        conditions: Vec<Condition>,
        action: Action,
    ) -> Self {
        Self {
            name: name.into(),
            priority,
            conditions,
            action,
        }
    }
}
