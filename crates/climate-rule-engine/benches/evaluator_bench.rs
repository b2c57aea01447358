//! 规则评估性能基准测试
//!
//! 覆盖单条件评估、in 操作符随列表长度的扩展性，以及完整规则集评估。

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rule_engine::{
    evaluate, AcMode, Action, Condition, ConditionEvaluator, FanSpeed, Facts, Operator, Rule,
    RuleEngine, RuleSet,
};
use serde_json::{json, Value};
use std::hint::black_box;

fn home_facts(temperature: f64, occupancy: &str, time_of_day: &str) -> Facts {
    Facts::new()
        .with("temperature", temperature)
        .with("humidity", 60)
        .with("occupancy", occupancy)
        .with("time_of_day", time_of_day)
        .with("windows_open", false)
}

/// 单条件操作基准
fn bench_condition_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("condition_operations");

    let number = json!(27.5);
    let threshold = json!(26);
    let text = json!("OCCUPIED");

    group.bench_function("eq_string", |b| {
        b.iter(|| {
            ConditionEvaluator::evaluate(
                black_box(Some(&text)),
                black_box(&Operator::Eq),
                black_box(&text),
            )
        })
    });

    group.bench_function("gte_number", |b| {
        b.iter(|| {
            ConditionEvaluator::evaluate(
                black_box(Some(&number)),
                black_box(&Operator::Gte),
                black_box(&threshold),
            )
        })
    });

    group.bench_function("type_mismatch", |b| {
        b.iter(|| {
            ConditionEvaluator::evaluate(
                black_box(Some(&text)),
                black_box(&Operator::Gte),
                black_box(&threshold),
            )
        })
    });

    group.bench_function("missing_field", |b| {
        b.iter(|| {
            ConditionEvaluator::evaluate(
                black_box(None),
                black_box(&Operator::Eq),
                black_box(&text),
            )
        })
    });

    group.finish();
}

/// in 操作符随列表长度的扩展性
fn bench_in_operator_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("in_operator_scaling");

    for size in [4usize, 32, 256].iter() {
        let list: Vec<Value> = (0..*size).map(|i| json!(format!("ZONE_{}", i))).collect();
        let expected = Value::Array(list);
        let field = json!(format!("ZONE_{}", size - 1));

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                ConditionEvaluator::evaluate(
                    black_box(Some(&field)),
                    black_box(&Operator::In),
                    black_box(&expected),
                )
            })
        });
    }

    group.finish();
}

/// 默认规则集完整评估
fn bench_default_rule_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("default_rule_set");

    let rules = RuleSet::default_rules();
    let engine = RuleEngine::new(rules.clone());

    let scenarios = [
        ("hot_humid", home_facts(31.0, "OCCUPIED", "AFTERNOON")),
        ("night", home_facts(27.0, "OCCUPIED", "NIGHT")),
        ("no_match", home_facts(23.0, "OCCUPIED", "MORNING")),
    ];

    for (name, facts) in scenarios.iter() {
        group.bench_with_input(BenchmarkId::new("evaluate", name), facts, |b, facts| {
            b.iter(|| evaluate(black_box(facts), black_box(&rules)))
        });

        group.bench_with_input(BenchmarkId::new("explain", name), facts, |b, facts| {
            b.iter(|| engine.explain(black_box(facts)))
        });
    }

    group.finish();
}

/// 规则数量扩展性（全部同优先级，考察冲突解决开销）
fn bench_rule_count_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("rule_count_scaling");
    let facts = home_facts(30.0, "OCCUPIED", "EVENING");

    for count in [8usize, 64, 512].iter() {
        let rules: RuleSet = (0..*count)
            .map(|i| {
                Rule::new(
                    format!("rule-{}", i),
                    5,
                    vec![
                        Condition::new("occupancy", Operator::Eq, "OCCUPIED"),
                        Condition::new("temperature", Operator::Gte, (i % 40) as i64),
                    ],
                    Action::new(AcMode::Cool, FanSpeed::Medium, Some(24.0), "bench"),
                )
            })
            .collect::<Vec<_>>()
            .into();

        group.bench_with_input(BenchmarkId::from_parameter(count), &rules, |b, rules| {
            b.iter(|| evaluate(black_box(&facts), black_box(rules)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_condition_operations,
    bench_in_operator_scaling,
    bench_default_rule_set,
    bench_rule_count_scaling,
);

criterion_main!(benches);
