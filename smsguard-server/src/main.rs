use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use smsguard_core::{evaluate, train, CsvColumns, Dataset, Engine, SpamClassifier};
use smsguard_server::cli::{ClassifyArgs, Cli, Command, EvalArgs, ServeArgs, TrainArgs};
use smsguard_server::{serve, AppState};
use smsguard_types::{ClassifyError, Verdict};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    match Cli::parse().command {
        Command::Train(args) => run_train(&args),
        Command::Classify(args) => run_classify(&args),
        Command::Eval(args) => run_eval(&args),
        Command::Serve(args) => run_serve(args).await,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_dataset(path: &std::path::Path) -> Result<Dataset> {
    Dataset::from_csv_path(path, &CsvColumns::default())
        .with_context(|| format!("failed to read dataset {}", path.display()))
}

fn run_train(args: &TrainArgs) -> Result<()> {
    let dataset = load_dataset(&args.data)?;
    let (train_set, holdout) = dataset.split(args.holdout);
    info!(train = train_set.len(), holdout = holdout.len(), "split dataset");

    let bundle = train(&train_set, &args.train_config()).context("training failed")?;
    println!("{}", bundle.stats());
    bundle
        .save(&args.out)
        .with_context(|| format!("failed to write {}", args.out.display()))?;
    println!("saved {}", args.out.display());

    if !holdout.is_empty() {
        let classifier = SpamClassifier::from_bundle(bundle);
        let evaluation = evaluate(&classifier, &holdout).context("evaluation failed")?;
        println!("\nholdout ({} samples):\n{}", holdout.len(), evaluation);
    }
    Ok(())
}

fn run_classify(args: &ClassifyArgs) -> Result<()> {
    let engine = Engine::open(args.strategy, args.model.as_deref()).context("failed to load model")?;
    for text in &args.text {
        match engine.classify(text) {
            Ok(Verdict::Statistical(r)) => {
                println!("{}\t{:.1}%\t{}", r.label, r.confidence * 100.0, text)
            }
            Ok(Verdict::Keyword(k)) => {
                println!("{}\t[{}]\t{}", k.label, k.matched.join(", "), text)
            }
            Err(ClassifyError::EmptyInput) => println!("-\t-\t{}", text),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn run_eval(args: &EvalArgs) -> Result<()> {
    let classifier = SpamClassifier::load(&args.model)
        .with_context(|| format!("failed to load {}", args.model.display()))?;
    let dataset = load_dataset(&args.data)?;
    let evaluation = evaluate(&classifier, &dataset)?;
    println!("{}", evaluation);
    Ok(())
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let state = AppState::from_config(args.into_config()).context("failed to start engine")?;
    serve(Arc::new(state)).await.context("server error")
}
