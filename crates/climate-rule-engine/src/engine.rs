//! 规则引擎
//!
//! 找出所有条件都满足的规则（命中规则），按优先级取最高的一条并返回其动作。
//! 同优先级时取规则集中最先出现的那条；没有命中时返回兜底动作。
//! 评估是事实和规则集的纯函数，不修改任何共享状态，可以并发调用。

use crate::evaluator::ConditionEvaluator;
use crate::facts::Facts;
use crate::models::{Action, Rule};
use crate::rule_set::RuleSet;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// 评估事实，返回唯一的推荐动作
pub fn evaluate(facts: &Facts, rules: &RuleSet) -> Action {
    select_rule(facts, rules)
        .map(|(_, rule)| rule.action.clone())
        .unwrap_or_else(Action::fallback)
}

/// 选出胜出的规则及其在规则集中的位置
pub fn select_rule<'a>(facts: &Facts, rules: &'a RuleSet) -> Option<(usize, &'a Rule)> {
    let mut best: Option<(usize, &Rule)> = None;

    for (index, rule) in rules.iter().enumerate() {
        if !rule_fires(facts, rule) {
            continue;
        }

        // 只有严格更高的优先级才替换，保证同优先级时先出现的规则胜出
        match best {
            Some((_, current)) if rule.priority <= current.priority => {}
            _ => best = Some((index, rule)),
        }
    }

    best
}

/// 规则的所有条件都满足时命中（AND，短路求值）；空条件列表恒命中
pub fn rule_fires(facts: &Facts, rule: &Rule) -> bool {
    rule.conditions
        .iter()
        .all(|cond| ConditionEvaluator::check(facts, cond))
}

/// 命中的规则
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiredRule {
    pub index: usize,
    pub name: String,
    pub priority: i64,
}

/// 带诊断信息的评估结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub action: Action,
    /// 所有命中的规则，按规则集顺序
    pub fired: Vec<FiredRule>,
    /// 胜出规则在规则集中的位置，未命中时为 None
    pub winner: Option<usize>,
    /// 条件级评估追踪（仅在启用追踪时记录）
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub evaluation_trace: Vec<String>,
}

impl Evaluation {
    pub fn matched(&self) -> bool {
        self.winner.is_some()
    }
}

/// 规则引擎
///
/// 持有只读的规则集，可在线程间共享（`Clone` 只复制 `Arc`）。
#[derive(Debug, Clone)]
pub struct RuleEngine {
    rules: Arc<RuleSet>,
    /// 是否记录详细评估追踪
    trace_enabled: bool,
}

impl RuleEngine {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules: Arc::new(rules),
            trace_enabled: false,
        }
    }

    /// 启用评估追踪
    pub fn with_trace(mut self) -> Self {
        self.trace_enabled = true;
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// 评估事实，返回推荐动作
    pub fn evaluate(&self, facts: &Facts) -> Action {
        match select_rule(facts, &self.rules) {
            Some((index, rule)) => {
                debug!(
                    rule_index = index,
                    rule_name = %rule.name,
                    priority = rule.priority,
                    "规则命中"
                );
                rule.action.clone()
            }
            None => {
                debug!("没有规则命中，返回兜底动作");
                Action::fallback()
            }
        }
    }

    /// 评估事实并返回命中规则列表和追踪信息
    pub fn explain(&self, facts: &Facts) -> Evaluation {
        let mut fired = Vec::new();
        let mut trace = Vec::new();

        for (index, rule) in self.rules.iter().enumerate() {
            if self.evaluate_rule(facts, index, rule, &mut trace) {
                fired.push(FiredRule {
                    index,
                    name: rule.name.clone(),
                    priority: rule.priority,
                });
            }
        }

        let winner = fired
            .iter()
            .fold(None::<&FiredRule>, |best, candidate| match best {
                Some(current) if candidate.priority <= current.priority => Some(current),
                _ => Some(candidate),
            })
            .map(|f| f.index);

        let action = winner
            .and_then(|i| self.rules.get(i))
            .map(|rule| rule.action.clone())
            .unwrap_or_else(Action::fallback);

        debug!(
            fired = fired.len(),
            winner = ?winner,
            mode = %action.mode,
            "规则评估完成"
        );

        Evaluation {
            action,
            fired,
            winner,
            evaluation_trace: trace,
        }
    }

    /// 逐条件评估单条规则，遇到不满足的条件立即短路
    fn evaluate_rule(
        &self,
        facts: &Facts,
        index: usize,
        rule: &Rule,
        trace: &mut Vec<String>,
    ) -> bool {
        for (i, cond) in rule.conditions.iter().enumerate() {
            let matched = ConditionEvaluator::check(facts, cond);

            if self.trace_enabled {
                trace.push(format!(
                    "rules[{}].conditions[{}]: {} => {}",
                    index,
                    i,
                    cond,
                    if matched { "MATCHED" } else { "NOT_MATCHED" }
                ));
            }

            if !matched {
                if self.trace_enabled {
                    trace.push(format!(
                        "rules[{}]: AND 短路 - 条件 {} 不满足 ({})",
                        index, i, rule.name
                    ));
                }
                return false;
            }
        }

        if self.trace_enabled {
            trace.push(format!("rules[{}]: 规则命中 ({})", index, rule.name));
        }
        true
    }
}

impl From<RuleSet> for RuleEngine {
    fn from(rules: RuleSet) -> Self {
        Self::new(rules)
    }
}
