//! 空调规则引擎命令行入口
//!
//! 从文件或 stdin 读取事实 JSON，评估后把推荐动作输出到 stdout，日志输出到 stderr。

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use climate_shared::config::{AppConfig, RulesConfig};
use climate_shared::observability::{self, metrics};
use rule_engine::{Evaluation, Facts, RuleCompiler, RuleEngine, RuleSet};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

const SERVICE_NAME: &str = "climate-rule-engine";

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

/// Evaluate home climate facts against the AC rule set.
#[derive(Debug, Parser)]
#[command(name = "rule-engine", version, about = "Recommend AC settings from home climate facts")]
struct Cli {
    /// Rule set JSON file (overrides the configured path)
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Facts JSON file; reads stdin when omitted
    #[arg(long)]
    facts: Option<PathBuf>,

    /// Include fired rules and the condition trace in the output
    #[arg(long)]
    explain: bool,

    /// Refuse rule sets that have structural diagnostics
    #[arg(long)]
    strict: bool,

    /// Output format
    #[arg(long, default_value = "json", value_enum)]
    output: OutputFormat,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 配置加载失败时使用默认配置，命令行仍可工作
    let config = AppConfig::load(SERVICE_NAME).unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });

    let obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    observability::init(&obs_config)?;

    let rules = load_rules(cli.rules.as_deref(), cli.strict, &config.rules)?;
    metrics::set_rules_loaded(rules.len());

    let facts = read_facts(cli.facts.as_deref())?;
    warn_missing_fields(&rules, &facts);

    let engine = RuleEngine::new(rules);
    let engine = if cli.explain { engine.with_trace() } else { engine };

    let start = Instant::now();
    let evaluation = engine.explain(&facts);
    metrics::record_rule_evaluation(evaluation.matched(), start.elapsed().as_secs_f64());

    info!(
        matched = evaluation.matched(),
        fired = evaluation.fired.len(),
        mode = %evaluation.action.mode,
        "Evaluation complete"
    );

    let rendered = render(&evaluation, cli.output, cli.explain)?;
    println!("{}", rendered);
    Ok(())
}

/// 规则来源
#[derive(Debug, Clone, PartialEq, Eq)]
enum RuleSource {
    File(PathBuf),
    BuiltIn,
}

/// 命令行路径优先，其次是配置路径，都没有时使用内置规则
fn rule_source(cli_rules: Option<&Path>, config: &RulesConfig) -> RuleSource {
    cli_rules
        .map(Path::to_path_buf)
        .or_else(|| config.path.as_ref().map(PathBuf::from))
        .map_or(RuleSource::BuiltIn, RuleSource::File)
}

/// 加载规则集，命令行或配置任一开启 strict 即按严格模式编译
fn load_rules(cli_rules: Option<&Path>, cli_strict: bool, config: &RulesConfig) -> Result<RuleSet> {
    let strict = cli_strict || config.strict;
    let compiler = RuleCompiler::new().with_strict(strict);

    let rules = match rule_source(cli_rules, config) {
        RuleSource::File(path) => compiler
            .compile_from_path(&path)
            .with_context(|| format!("Failed to load rules from {}", path.display()))?,
        RuleSource::BuiltIn => {
            info!("No rule file configured, using built-in rules");
            compiler.compile(RuleSet::default_rules().into_rules())?
        }
    };

    info!(rules = rules.len(), strict, "Rule set ready");
    Ok(rules)
}

/// 渲染评估结果；explain 时附带命中规则和条件追踪
fn render(evaluation: &Evaluation, format: OutputFormat, explain: bool) -> Result<String> {
    let rendered = match format {
        OutputFormat::Json if explain => serde_json::to_string_pretty(evaluation)?,
        OutputFormat::Json => serde_json::to_string_pretty(&evaluation.action)?,
        OutputFormat::Text => {
            let mut text = evaluation.action.to_string();
            if explain {
                for fired in &evaluation.fired {
                    text.push_str(&format!(
                        "\nFired: [{}] {} (priority {})",
                        fired.index, fired.name, fired.priority
                    ));
                }
                for line in &evaluation.evaluation_trace {
                    text.push_str(&format!("\nTrace: {}", line));
                }
            }
            text
        }
    };

    Ok(rendered)
}

fn read_facts(path: Option<&Path>) -> Result<Facts> {
    let json = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read facts from {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read facts from stdin")?;
            buf
        }
    };

    Facts::from_json(&json).context("Invalid facts JSON")
}

/// 事实中缺少规则引用的字段时给出告警（评估仍会进行，相关条件按 false 处理）
fn warn_missing_fields(rules: &RuleSet, facts: &Facts) {
    let missing: Vec<String> = rules
        .required_fields()
        .into_iter()
        .filter(|field| !facts.contains(field))
        .collect();

    if !missing.is_empty() {
        warn!(?missing, "Facts are missing fields referenced by rules");
    }
}
