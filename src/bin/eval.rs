//! Evaluation CLI: ask every case through the server path and report accuracy.

use clap::Parser;
use factqa::{
    eval::{accuracy, category_accuracy, load_cases},
    Config, QaServer,
};
use std::path::PathBuf;

/// Evaluation framework: run question cases and report accuracy.
#[derive(Parser, Debug)]
#[command(name = "eval")]
struct Args {
    /// Path to eval cases JSON (default: eval_cases.json).
    #[arg(long, default_value = "eval_cases.json")]
    cases: PathBuf,

    /// Minimum accuracy (0.0-1.0) for a zero exit code.
    #[arg(long, default_value_t = 0.9)]
    threshold: f32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = Config::load()?;
    let server = QaServer::from_config(&config);

    let cases = load_cases(&args.cases)?;
    if cases.is_empty() {
        anyhow::bail!("No cases in {}", args.cases.display());
    }

    println!("Running evaluation on {} cases\n", cases.len());

    let mut outcomes = Vec::with_capacity(cases.len());
    for case in &cases {
        let index = case.index.as_deref().unwrap_or(&config.factqa.default_index);
        let reply = match server.answer(&case.question, index).await {
            Ok(text) => text,
            Err(e) => e.user_message().to_string(),
        };
        let passed = case.is_correct(&reply);
        outcomes.push(passed);

        println!("  [{}] {}", if passed { "PASS" } else { "FAIL" }, case.question);
        if !passed {
            println!("        expected: {:?}", case.expected);
            println!("        got:      {:?}", reply);
        }
    }

    let overall = accuracy(&outcomes);
    let by_category = category_accuracy(cases.iter().map(|c| c.category()).zip(outcomes.iter().copied()));

    println!("\n=== Evaluation Results ===");
    for (category, score) in &by_category {
        println!("{:<20} {:>3}/{:<3} {:.2}%", category, score.passed, score.total, score.accuracy() * 100.0);
    }
    println!("Accuracy: {:.2}%", overall * 100.0);

    if overall >= args.threshold {
        println!("\nAccuracy passes (>= {:.0}%).", args.threshold * 100.0);
        std::process::exit(0);
    } else {
        println!("\nAccuracy below threshold (>= {:.0}%).", args.threshold * 100.0);
        std::process::exit(1);
    }
}
