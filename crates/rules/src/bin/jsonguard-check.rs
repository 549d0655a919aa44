//! jsonguard-check: validate JSON documents against a directory of rule sets.
//!
//! Prints one line per document:
//! - `PASS <file>`
//! - `FAIL <file>: [<rule set>] <message>` (one line per violating rule set with `--all`)
//!
//! Exits with status 1 when any document is rejected.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use jsonguard_core::JsonView;
use jsonguard_rules::store::LoadStatus;
use jsonguard_rules::{ComponentRegistry, FileRuleSetStore, RuleSetCodec, RuleSetEngine, RuleSetStore};

// ── CLI ─────────────────────────────────────────────────────────────

/// Check JSON documents against stored rule sets.
#[derive(Parser, Debug)]
#[command(name = "jsonguard-check", version, about)]
struct Cli {
    /// Directory of rule-set files (YAML or JSON).
    #[arg(long, env = "RULESET_DIR", default_value = "data/rulesets")]
    rules_dir: PathBuf,

    /// Report every violating rule set instead of only the first.
    #[arg(long)]
    all: bool,

    /// Documents to check; `-` reads one document from stdin.
    #[arg(required = true)]
    files: Vec<String>,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let codec = RuleSetCodec::new(Arc::new(ComponentRegistry::builtin()));
    let (store, results) = FileRuleSetStore::open(&cli.rules_dir, codec)
        .with_context(|| format!("failed to load rule sets from {}", cli.rules_dir.display()))?;
    let failed = results
        .iter()
        .filter(|r| matches!(r.status, LoadStatus::Failed { .. }))
        .count();
    if failed > 0 {
        warn!(failed, "some rule set files could not be loaded");
    }

    let engine = RuleSetEngine::builtin();
    for rule_set in store.get_all()? {
        engine.add_rule_set(rule_set);
    }
    info!(count = engine.rule_sets().len(), dir = %cli.rules_dir.display(), "rule sets loaded");

    let mut rejected = false;
    for file in &cli.files {
        let doc = read_document(file)?;
        let violations = if cli.all {
            engine.violations(&doc).collect::<Result<Vec<_>, _>>()?
        } else {
            engine.evaluate(&doc)?.violation().cloned().into_iter().collect()
        };

        if violations.is_empty() {
            println!("PASS {}", file);
        } else {
            rejected = true;
            for violation in violations {
                println!("FAIL {}: [{}] {}", file, violation.rule_set.name, violation.message);
            }
        }
    }

    Ok(if rejected { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

fn read_document(file: &str) -> anyhow::Result<JsonView> {
    let text = if file == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file))?
    };
    JsonView::parse(&text).with_context(|| format!("{} is not valid JSON", file))
}
