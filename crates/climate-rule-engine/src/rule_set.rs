//! 规则集
//!
//! 有序、只读的规则集合。启动时构建一次，之后作为参数传给引擎，评估过程不会修改它。
//! 规则顺序有意义：同优先级冲突时按出现顺序取第一条。

use crate::compiler::RuleCompiler;
use crate::error::Result;
use crate::models::{AcMode, Action, Condition, FanSpeed, Rule};
use crate::operators::Operator;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// 规则集
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// 从 JSON 加载（宽松模式编译，诊断信息只记录告警）
    pub fn from_json(json: &str) -> Result<Self> {
        RuleCompiler::new().compile_from_json(json)
    }

    /// 从文件加载（宽松模式编译）
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        RuleCompiler::new().compile_from_path(path)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn into_rules(self) -> Vec<Rule> {
        self.rules
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Rule> {
        self.rules.get(index)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 规则集中引用到的所有字段
    pub fn required_fields(&self) -> BTreeSet<String> {
        self.rules
            .iter()
            .flat_map(|r| r.conditions.iter())
            .map(|c| c.field.clone())
            .collect()
    }

    /// 内置的默认空调规则集
    pub fn default_rules() -> Self {
        Self::new(vec![
            Rule::new(
                "Windows open → turn AC off",
                100,
                vec![Condition::new("windows_open", Operator::Eq, true)],
                Action::new(AcMode::Off, FanSpeed::Low, None, "Windows are open"),
            ),
            Rule::new(
                "No one home → eco mode",
                90,
                vec![
                    Condition::new("occupancy", Operator::Eq, "EMPTY"),
                    Condition::new("temperature", Operator::Gte, 24),
                ],
                Action::new(AcMode::Eco, FanSpeed::Low, Some(27.0), "Home empty; save energy"),
            ),
            Rule::new(
                "Hot & humid (occupied) → cool strong",
                80,
                vec![
                    Condition::new("occupancy", Operator::Eq, "OCCUPIED"),
                    Condition::new("temperature", Operator::Gte, 30),
                    Condition::new("humidity", Operator::Gte, 70),
                ],
                Action::new(AcMode::Cool, FanSpeed::High, Some(23.0), "Hot and humid"),
            ),
            Rule::new(
                "Hot (occupied) → cool",
                70,
                vec![
                    Condition::new("occupancy", Operator::Eq, "OCCUPIED"),
                    Condition::new("temperature", Operator::Gte, 28),
                ],
                Action::new(AcMode::Cool, FanSpeed::Medium, Some(24.0), "Temperature high"),
            ),
            Rule::new(
                "Slightly warm (occupied) → gentle cool",
                60,
                vec![
                    Condition::new("occupancy", Operator::Eq, "OCCUPIED"),
                    Condition::new("temperature", Operator::Gte, 26),
                    Condition::new("temperature", Operator::Lt, 28),
                ],
                Action::new(AcMode::Cool, FanSpeed::Low, Some(25.0), "Slightly warm"),
            ),
            Rule::new(
                "Night (occupied) → sleep mode",
                75,
                vec![
                    Condition::new("occupancy", Operator::Eq, "OCCUPIED"),
                    Condition::new("time_of_day", Operator::Eq, "NIGHT"),
                    Condition::new("temperature", Operator::Gte, 26),
                ],
                Action::new(AcMode::Sleep, FanSpeed::Low, Some(26.0), "Night comfort"),
            ),
            Rule::new(
                "Too cold → turn off",
                85,
                vec![Condition::new("temperature", Operator::Lte, 22)],
                Action::new(AcMode::Off, FanSpeed::Low, None, "Already cold"),
            ),
        ])
    }
}

impl From<Vec<Rule>> for RuleSet {
    fn from(rules: Vec<Rule>) -> Self {
        Self::new(rules)
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
