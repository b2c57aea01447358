//! 事实数据
//!
//! `Facts` 是规则引擎的输入：字段名到 JSON 标量的映射，每次评估由调用方提供。
//! `HomeFacts` 是面向采集端的强类型版本，带取值范围校验。

use crate::error::{Result, RuleError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use validator::Validate;

/// 评估上下文 - 提供给规则引擎的事实映射
///
/// 允许缺失字段和未知字段；类型不符的值在条件比较时一律视为不满足。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Facts {
    data: Map<String, Value>,
}

impl Facts {
    pub fn new() -> Self {
        Self::default()
    }

    /// 链式设置字段
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(field.into(), value.into());
    }

    /// 获取字段值
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.data.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 获取底层数据
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// 从 JSON 对象创建
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// 从 JSON 值创建，顶层必须是对象
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(data) => Ok(Self { data }),
            other => Err(RuleError::ParseError(format!(
                "事实数据必须是 JSON 对象，实际为 {}",
                type_name(&other)
            ))),
        }
    }
}

impl From<Map<String, Value>> for Facts {
    fn from(data: Map<String, Value>) -> Self {
        Self { data }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Facts {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// 是否有人在家
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Occupancy {
    Occupied,
    Empty,
}

impl Occupancy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Occupied => "OCCUPIED",
            Self::Empty => "EMPTY",
        }
    }
}

impl fmt::Display for Occupancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 时段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "MORNING",
            Self::Afternoon => "AFTERNOON",
            Self::Evening => "EVENING",
            Self::Night => "NIGHT",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 家居环境事实（强类型）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct HomeFacts {
    /// 室内温度（°C）
    #[validate(range(min = 10.0, max = 50.0, message = "温度必须在 10-50 °C 之间"))]
    pub temperature: f64,
    /// 相对湿度（%）
    #[validate(range(min = 0.0, max = 100.0, message = "湿度必须在 0-100% 之间"))]
    pub humidity: f64,
    pub occupancy: Occupancy,
    pub time_of_day: TimeOfDay,
    pub windows_open: bool,
}

impl Default for HomeFacts {
    fn default() -> Self {
        Self {
            temperature: 22.0,
            humidity: 46.0,
            occupancy: Occupancy::Occupied,
            time_of_day: TimeOfDay::Night,
            windows_open: false,
        }
    }
}

impl HomeFacts {
    /// 转换为规则引擎使用的事实映射（不做校验）
    pub fn into_facts(self) -> Facts {
        Facts::new()
            .with("temperature", self.temperature)
            .with("humidity", self.humidity)
            .with("occupancy", self.occupancy.as_str())
            .with("time_of_day", self.time_of_day.as_str())
            .with("windows_open", self.windows_open)
    }

    /// 校验取值范围后转换
    pub fn validated_facts(self) -> Result<Facts> {
        if !self.temperature.is_finite() || !self.humidity.is_finite() {
            return Err(RuleError::InvalidFact(
                "温度和湿度必须是有限数值".to_string(),
            ));
        }

        self.validate()
            .map_err(|e| RuleError::InvalidFact(e.to_string()))?;

        Ok(self.into_facts())
    }
}

impl From<HomeFacts> for Facts {
    fn from(facts: HomeFacts) -> Self {
        facts.into_facts()
    }
}
