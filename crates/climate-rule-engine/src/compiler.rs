//! 规则编译器
//!
//! 将 JSON 规则解析为 `RuleSet` 并做结构检查。检查结果以诊断信息的形式给出：
//! 宽松模式只记录告警（有问题的条件在运行时按 false 处理），严格模式遇到诊断即失败。

use crate::error::{Result, RuleError};
use crate::facts::type_name;
use crate::models::{Condition, Rule};
use crate::operators::Operator;
use crate::rule_set::RuleSet;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

/// 诊断类型
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticKind {
    EmptyName,
    DuplicateName,
    EmptyField,
    UnrecognizedOperator(String),
    /// in / not_in 的字面量不是数组
    MembershipNeedsArray { actual: &'static str },
    /// 有序比较的字面量既不是数值也不是字符串
    OrderingNeedsScalar { actual: &'static str },
}

/// 规则诊断信息
#[derive(Debug, Clone, PartialEq)]
pub struct RuleDiagnostic {
    /// 位置，如 `rules[2].conditions[1]`
    pub path: String,
    pub rule_name: String,
    pub kind: DiagnosticKind,
}

impl fmt::Display for RuleDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::EmptyName => write!(f, "{}: 规则名称为空", self.path),
            DiagnosticKind::DuplicateName => {
                write!(f, "{}: 规则名称重复 '{}'", self.path, self.rule_name)
            }
            DiagnosticKind::EmptyField => write!(f, "{}: 条件字段为空", self.path),
            DiagnosticKind::UnrecognizedOperator(op) => {
                write!(f, "{}: 无法识别的操作符 '{}'", self.path, op)
            }
            DiagnosticKind::MembershipNeedsArray { actual } => {
                write!(f, "{}: 成员操作符需要数组字面量，实际为 {}", self.path, actual)
            }
            DiagnosticKind::OrderingNeedsScalar { actual } => write!(
                f,
                "{}: 有序比较需要数值或字符串字面量，实际为 {}",
                self.path, actual
            ),
        }
    }
}

/// 规则编译器
#[derive(Debug, Clone, Default)]
pub struct RuleCompiler {
    strict: bool,
}

impl RuleCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// 严格模式：任何诊断都视为编译失败
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// 从 JSON 字符串编译规则集
    ///
    /// 接受规则数组，或 `{ "rules": [...] }` 形式的对象。
    pub fn compile_from_json(&self, json: &str) -> Result<RuleSet> {
        let document: Value = serde_json::from_str(json)?;

        let rules_value = match document {
            Value::Array(_) => document,
            Value::Object(mut map) => map.remove("rules").ok_or_else(|| {
                RuleError::ParseError("规则文档缺少 'rules' 字段".to_string())
            })?,
            other => {
                return Err(RuleError::ParseError(format!(
                    "规则文档必须是数组或对象，实际为 {}",
                    type_name(&other)
                )));
            }
        };

        let rules: Vec<Rule> = serde_json::from_value(rules_value)?;
        self.compile(rules)
    }

    /// 从文件编译规则集
    pub fn compile_from_path(&self, path: impl AsRef<Path>) -> Result<RuleSet> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| RuleError::Io {
            path: path.display().to_string(),
            source,
        })?;

        info!(path = %path.display(), "加载规则文件");
        self.compile_from_json(&json)
    }

    /// 编译规则
    pub fn compile(&self, rules: Vec<Rule>) -> Result<RuleSet> {
        let diagnostics = Self::diagnose(&rules);

        if self.strict {
            if let Some(first) = diagnostics.first() {
                return Err(RuleError::CompileError(first.to_string()));
            }
        }

        for diagnostic in &diagnostics {
            warn!(
                path = %diagnostic.path,
                rule_name = %diagnostic.rule_name,
                "规则诊断: {}",
                diagnostic
            );
        }

        info!(
            rules = rules.len(),
            diagnostics = diagnostics.len(),
            strict = self.strict,
            "规则集编译完成"
        );

        Ok(RuleSet::new(rules))
    }

    /// 检查规则结构，返回所有诊断信息（按规则顺序）
    pub fn diagnose(rules: &[Rule]) -> Vec<RuleDiagnostic> {
        let mut diagnostics = Vec::new();
        let mut seen_names = HashSet::new();

        for (i, rule) in rules.iter().enumerate() {
            let rule_path = format!("rules[{}]", i);

            if rule.name.trim().is_empty() {
                diagnostics.push(RuleDiagnostic {
                    path: rule_path.clone(),
                    rule_name: rule.name.clone(),
                    kind: DiagnosticKind::EmptyName,
                });
            } else if !seen_names.insert(rule.name.as_str()) {
                diagnostics.push(RuleDiagnostic {
                    path: rule_path.clone(),
                    rule_name: rule.name.clone(),
                    kind: DiagnosticKind::DuplicateName,
                });
            }

            for (j, cond) in rule.conditions.iter().enumerate() {
                if let Some(kind) = Self::check_condition(cond) {
                    diagnostics.push(RuleDiagnostic {
                        path: format!("{}.conditions[{}]", rule_path, j),
                        rule_name: rule.name.clone(),
                        kind,
                    });
                }
            }
        }

        diagnostics
    }

    fn check_condition(cond: &Condition) -> Option<DiagnosticKind> {
        if cond.field.trim().is_empty() {
            return Some(DiagnosticKind::EmptyField);
        }

        match &cond.operator {
            Operator::Unrecognized(op) => Some(DiagnosticKind::UnrecognizedOperator(op.clone())),
            op if op.is_membership() && !cond.value.is_array() => {
                Some(DiagnosticKind::MembershipNeedsArray {
                    actual: type_name(&cond.value),
                })
            }
            op if op.is_ordering() && !(cond.value.is_number() || cond.value.is_string()) => {
                Some(DiagnosticKind::OrderingNeedsScalar {
                    actual: type_name(&cond.value),
                })
            }
            _ => None,
        }
    }
}
