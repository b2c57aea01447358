//! 条件评估器
//!
//! 单个条件的求值是全函数：字段缺失、操作符无法识别、类型不匹配都返回 false，
//! 不向调用方抛出错误。比较按类型显式进行，只有两侧类型可比时才比较。

use crate::facts::Facts;
use crate::models::Condition;
use crate::operators::Operator;
use serde_json::{Number, Value};
use std::cmp::Ordering;

/// 条件评估器
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// 用事实映射评估一个条件
    pub fn check(facts: &Facts, condition: &Condition) -> bool {
        Self::evaluate(
            facts.get(&condition.field),
            &condition.operator,
            &condition.value,
        )
    }

    /// 评估条件
    ///
    /// # Arguments
    /// * `field_value` - 从事实中获取的字段值，`None` 表示字段缺失
    /// * `operator` - 操作符
    /// * `expected_value` - 规则中定义的字面量
    pub fn evaluate(field_value: Option<&Value>, operator: &Operator, expected_value: &Value) -> bool {
        // 字段不存在时所有操作符都返回 false，包括 != 和 not_in
        let Some(field_value) = field_value else {
            return false;
        };

        match operator {
            Operator::Eq => Self::eq(field_value, expected_value),
            Operator::Neq => !Self::eq(field_value, expected_value),
            Operator::Gt => Self::ordered(field_value, expected_value, Ordering::is_gt),
            Operator::Gte => Self::ordered(field_value, expected_value, Ordering::is_ge),
            Operator::Lt => Self::ordered(field_value, expected_value, Ordering::is_lt),
            Operator::Lte => Self::ordered(field_value, expected_value, Ordering::is_le),
            Operator::In => Self::in_list(field_value, expected_value).unwrap_or(false),
            Operator::NotIn => Self::in_list(field_value, expected_value)
                .map(|found| !found)
                .unwrap_or(false),
            Operator::Unrecognized(_) => false,
        }
    }

    /// 相等比较
    ///
    /// 两侧都是数值时按数值比较（27 == 27.0），其余类型按结构比较，不做跨类型转换。
    fn eq(field: &Value, expected: &Value) -> bool {
        if let (Value::Number(a), Value::Number(b)) = (field, expected) {
            return Self::compare_numbers(a, b) == Some(Ordering::Equal);
        }

        field == expected
    }

    fn ordered(field: &Value, expected: &Value, accept: fn(Ordering) -> bool) -> bool {
        Self::compare(field, expected).is_some_and(accept)
    }

    /// 有序比较，类型不可比时返回 None
    fn compare(field: &Value, expected: &Value) -> Option<Ordering> {
        match (field, expected) {
            (Value::Number(a), Value::Number(b)) => Self::compare_numbers(a, b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// 精确数值比较：整数之间按 i128 比较，整数与浮点之间不经过有损转换
    fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
        match (Self::as_integer(a), Self::as_integer(b)) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            (Some(x), None) => Self::compare_int_float(x, b.as_f64()?),
            (None, Some(y)) => Self::compare_int_float(y, a.as_f64()?).map(Ordering::reverse),
            (None, None) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        }
    }

    fn as_integer(n: &Number) -> Option<i128> {
        n.as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from))
    }

    fn compare_int_float(int: i128, float: f64) -> Option<Ordering> {
        const BOUND: f64 = 18_446_744_073_709_551_616.0; // 2^64

        if float.is_nan() {
            return None;
        }
        // JSON 整数的绝对值小于 2^64
        if float >= BOUND {
            return Some(Ordering::Less);
        }
        if float <= -BOUND {
            return Some(Ordering::Greater);
        }

        // |trunc| < 2^64，转换为 i128 是精确的
        let whole = float.trunc();
        match int.cmp(&(whole as i128)) {
            Ordering::Equal => whole.partial_cmp(&float),
            other => Some(other),
        }
    }

    /// 列表包含检查，字面量不是数组时返回 None
    fn in_list(field: &Value, expected: &Value) -> Option<bool> {
        let items = expected.as_array()?;
        Some(items.iter().any(|item| Self::eq(field, item)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_eq_numbers() {
        assert!(ConditionEvaluator::evaluate(
            Some(&json!(100)),
            &Operator::Eq,
            &json!(100)
        ));

        assert!(ConditionEvaluator::evaluate(
            Some(&json!(100.0)),
            &Operator::Eq,
            &json!(100)
        ));

        assert!(!ConditionEvaluator::evaluate(
            Some(&json!(100.5)),
            &Operator::Eq,
            &json!(100)
        ));
    }

    #[test]
    fn test_eq_strings_and_bools() {
        assert!(ConditionEvaluator::evaluate(
            Some(&json!("NIGHT")),
            &Operator::Eq,
            &json!("NIGHT")
        ));
        assert!(!ConditionEvaluator::evaluate(
            Some(&json!("NIGHT")),
            &Operator::Eq,
            &json!("night")
        ));
        assert!(ConditionEvaluator::evaluate(
            Some(&json!(true)),
            &Operator::Eq,
            &json!(true)
        ));
    }

    #[test]
    fn test_eq_has_no_cross_type_coercion() {
        assert!(!ConditionEvaluator::evaluate(
            Some(&json!("25")),
            &Operator::Eq,
            &json!(25)
        ));
        assert!(!ConditionEvaluator::evaluate(
            Some(&json!(1)),
            &Operator::Eq,
            &json!(true)
        ));
        assert!(ConditionEvaluator::evaluate(
            Some(&json!("25")),
            &Operator::Neq,
            &json!(25)
        ));
    }

    #[test]
    fn test_numeric_comparisons() {
        assert!(ConditionEvaluator::evaluate(Some(&json!(100)), &Operator::Gt, &json!(50)));
        assert!(ConditionEvaluator::evaluate(Some(&json!(100)), &Operator::Gte, &json!(100)));
        assert!(ConditionEvaluator::evaluate(Some(&json!(50)), &Operator::Lt, &json!(100)));
        assert!(ConditionEvaluator::evaluate(Some(&json!(100)), &Operator::Lte, &json!(100)));
        assert!(ConditionEvaluator::evaluate(Some(&json!(27.5)), &Operator::Lt, &json!(28)));
        assert!(!ConditionEvaluator::evaluate(Some(&json!(28.0)), &Operator::Lt, &json!(28)));
    }

    #[test]
    fn test_large_integers_compare_exactly() {
        let big = i64::MAX;
        assert!(ConditionEvaluator::evaluate(
            Some(&json!(big)),
            &Operator::Gt,
            &json!(big - 1)
        ));
    }

    #[test]
    fn test_string_ordering() {
        assert!(ConditionEvaluator::evaluate(
            Some(&json!("NIGHT")),
            &Operator::Gt,
            &json!("AFTERNOON")
        ));
        assert!(!ConditionEvaluator::evaluate(
            Some(&json!("EMPTY")),
            &Operator::Gte,
            &json!("OCCUPIED")
        ));
    }

    #[test]
    fn test_ordering_type_mismatch_is_false() {
        for op in [Operator::Gt, Operator::Gte, Operator::Lt, Operator::Lte] {
            assert!(!ConditionEvaluator::evaluate(Some(&json!("hot")), &op, &json!(30)));
            assert!(!ConditionEvaluator::evaluate(Some(&json!(true)), &op, &json!(0)));
            assert!(!ConditionEvaluator::evaluate(Some(&json!(null)), &op, &json!(0)));
            assert!(!ConditionEvaluator::evaluate(Some(&json!([30])), &op, &json!(30)));
        }
    }

    #[test]
    fn test_in_list() {
        assert!(ConditionEvaluator::evaluate(
            Some(&json!("EVENING")),
            &Operator::In,
            &json!(["EVENING", "NIGHT"])
        ));

        assert!(!ConditionEvaluator::evaluate(
            Some(&json!("MORNING")),
            &Operator::In,
            &json!(["EVENING", "NIGHT"])
        ));

        assert!(ConditionEvaluator::evaluate(
            Some(&json!(26.0)),
            &Operator::In,
            &json!([25, 26, 27])
        ));
    }

    #[test]
    fn test_not_in_list() {
        assert!(ConditionEvaluator::evaluate(
            Some(&json!("MORNING")),
            &Operator::NotIn,
            &json!(["EVENING", "NIGHT"])
        ));
        assert!(!ConditionEvaluator::evaluate(
            Some(&json!("NIGHT")),
            &Operator::NotIn,
            &json!(["EVENING", "NIGHT"])
        ));
    }

    #[test]
    fn test_membership_with_non_array_literal_is_false() {
        assert!(!ConditionEvaluator::evaluate(
            Some(&json!("NIGHT")),
            &Operator::In,
            &json!("NIGHT")
        ));
        assert!(!ConditionEvaluator::evaluate(
            Some(&json!("NIGHT")),
            &Operator::NotIn,
            &json!(42)
        ));
    }

    #[test]
    fn test_missing_field() {
        for op in [
            Operator::Eq,
            Operator::Neq,
            Operator::Gt,
            Operator::Gte,
            Operator::Lt,
            Operator::Lte,
            Operator::In,
            Operator::NotIn,
        ] {
            assert!(!ConditionEvaluator::evaluate(None, &op, &json!(["x"])));
        }
    }

    #[test]
    fn test_unrecognized_operator() {
        let op = Operator::parse("between");
        assert!(!ConditionEvaluator::evaluate(
            Some(&json!(25)),
            &op,
            &json!([20, 30])
        ));
    }

    #[test]
    fn test_large_numbers_compare_exactly() {
        // i64::MAX 与 2^63（只能以 u64 表示）
        assert!(ConditionEvaluator::evaluate(
            Some(&json!(i64::MAX)),
            &Operator::Lt,
            &json!(9_223_372_036_854_775_808u64)
        ));
        // 2^53 + 1 在 f64 中不可表示，不能与 2^53 相等
        assert!(!ConditionEvaluator::evaluate(
            Some(&json!(9_007_199_254_740_993i64)),
            &Operator::Eq,
            &json!(9_007_199_254_740_992.0)
        ));
        assert!(ConditionEvaluator::evaluate(
            Some(&json!(9_007_199_254_740_993i64)),
            &Operator::Gt,
            &json!(9_007_199_254_740_992.0)
        ));
        assert!(ConditionEvaluator::evaluate(
            Some(&json!(1e30)),
            &Operator::Gt,
            &json!(u64::MAX)
        ));
    }

    #[test]
    fn test_mixed_int_float_ordering() {
        assert!(ConditionEvaluator::evaluate(Some(&json!(-2)), &Operator::Gt, &json!(-2.5)));
        assert!(ConditionEvaluator::evaluate(Some(&json!(2)), &Operator::Lt, &json!(2.5)));
        assert!(ConditionEvaluator::evaluate(Some(&json!(26.5)), &Operator::Gt, &json!(26)));
        assert!(ConditionEvaluator::evaluate(Some(&json!(-0.5)), &Operator::Lt, &json!(0)));
        assert!(ConditionEvaluator::evaluate(Some(&json!(27.0)), &Operator::Eq, &json!(27)));
    }

    #[test]
    fn test_check_against_facts() {
        let facts = Facts::new().with("temperature", 29).with("occupancy", "OCCUPIED");

        assert!(ConditionEvaluator::check(
            &facts,
            &Condition::new("temperature", Operator::Gte, 28)
        ));
        assert!(!ConditionEvaluator::check(
            &facts,
            &Condition::new("humidity", Operator::Gte, 70)
        ));
        assert!(!ConditionEvaluator::check(
            &facts,
            &Condition::new("occupancy", Operator::Neq, "OCCUPIED")
        ));
    }
}
