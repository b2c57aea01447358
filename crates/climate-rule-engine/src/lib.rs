//! 空调规则引擎
//!
//! 基于事实的前向推理决策引擎：
//! - 单条件评估（字段缺失、类型不匹配一律为 false）
//! - 按优先级解决规则冲突，同优先级取先出现的规则
//! - JSON 规则集加载与结构诊断
//! - 强类型家居事实与取值范围校验

pub mod compiler;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod facts;
pub mod models;
pub mod operators;
pub mod rule_set;

pub use compiler::{DiagnosticKind, RuleCompiler, RuleDiagnostic};
pub use engine::{evaluate, rule_fires, select_rule, Evaluation, FiredRule, RuleEngine};
pub use error::{Result, RuleError};
pub use evaluator::ConditionEvaluator;
pub use facts::{Facts, HomeFacts, Occupancy, TimeOfDay};
pub use models::{AcMode, Action, Condition, FanSpeed, Rule, NO_RULES_MATCHED};
pub use operators::Operator;
pub use rule_set::RuleSet;
