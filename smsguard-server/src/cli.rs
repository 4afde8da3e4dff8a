//! Command line interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use smsguard_core::model::DEFAULT_ALPHA;
use smsguard_core::TrainConfig;
use smsguard_types::{AnalyzerConfig, NonLetterMode, Reduction, Strategy, VectorizerConfig, Weighting};

use crate::config::{ServerConfig, DEFAULT_HOST, DEFAULT_PORT};

/// SMS spam classifier: train a model, classify messages, serve them over HTTP.
#[derive(Debug, Parser)]
#[command(name = "smsguard", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Train a model bundle from a labelled CSV file.
    Train(TrainArgs),
    /// Classify messages given on the command line.
    Classify(ClassifyArgs),
    /// Score a model bundle against a labelled CSV file.
    Eval(EvalArgs),
    /// Run the HTTP endpoint.
    Serve(ServeArgs),
}

#[derive(Debug, Args)]
pub struct TrainArgs {
    /// CSV with a label column (v1/label) and a text column (v2/text/message).
    #[arg(long)]
    pub data: PathBuf,

    /// Where to write the bundle.
    #[arg(long, default_value = "model.bin")]
    pub out: PathBuf,

    /// Word reduction: none, noun or verb.
    #[arg(long, default_value_t = Reduction::Verb)]
    pub reduction: Reduction,

    /// Non-letter handling: replace or remove.
    #[arg(long, default_value_t = NonLetterMode::Replace)]
    pub non_letters: NonLetterMode,

    /// Feature weighting: tfidf or count.
    #[arg(long, default_value_t = Weighting::TfIdf)]
    pub weighting: Weighting,

    /// Additive smoothing.
    #[arg(long, default_value_t = DEFAULT_ALPHA)]
    pub alpha: f64,

    /// Drop terms seen in fewer documents.
    #[arg(long, default_value_t = 1)]
    pub min_df: u32,

    /// Keep only this many most frequent terms.
    #[arg(long)]
    pub max_features: Option<u32>,

    /// Hold out every n-th sample for evaluation; values below 2 train on everything.
    #[arg(long, default_value_t = 5)]
    pub holdout: usize,
}

impl TrainArgs {
    pub fn train_config(&self) -> TrainConfig {
        TrainConfig {
            analyzer: AnalyzerConfig {
                non_letters: self.non_letters,
                reduction: self.reduction,
                extra_stopwords: Vec::new(),
            },
            vectorizer: VectorizerConfig {
                weighting: self.weighting,
                min_df: self.min_df,
                max_features: self.max_features,
            },
            alpha: self.alpha,
        }
    }
}

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// Model bundle; required by the statistical strategy.
    #[arg(long, env = "SMSGUARD_MODEL")]
    pub model: Option<PathBuf>,

    #[arg(long, env = "SMSGUARD_STRATEGY", default_value_t = Strategy::Statistical)]
    pub strategy: Strategy,

    /// Messages to classify; quote each one.
    #[arg(required = true)]
    pub text: Vec<String>,
}

#[derive(Debug, Args)]
pub struct EvalArgs {
    #[arg(long, env = "SMSGUARD_MODEL")]
    pub model: PathBuf,

    #[arg(long)]
    pub data: PathBuf,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long, env = "SMSGUARD_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    #[arg(long, env = "SMSGUARD_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Model bundle to load at startup.
    #[arg(long, env = "SMSGUARD_MODEL")]
    pub model: Option<PathBuf>,

    #[arg(long, env = "SMSGUARD_STRATEGY", default_value_t = Strategy::Statistical)]
    pub strategy: Strategy,
}

impl ServeArgs {
    pub fn into_config(self) -> ServerConfig {
        ServerConfig {
            host: self.host,
            port: self.port,
            model_path: self.model,
            strategy: self.strategy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_train_defaults() {
        let cli = Cli::try_parse_from(["smsguard", "train", "--data", "spam.csv"]).unwrap();
        let Command::Train(args) = cli.command else {
            panic!("expected train");
        };
        assert_eq!(args.out, PathBuf::from("model.bin"));
        assert_eq!(args.holdout, 5);
        assert_eq!(args.train_config(), TrainConfig::default());
    }

    #[test]
    fn parses_train_options() {
        let cli = Cli::try_parse_from([
            "smsguard",
            "train",
            "--data",
            "spam.csv",
            "--reduction",
            "noun",
            "--non-letters",
            "remove",
            "--weighting",
            "count",
            "--min-df",
            "2",
            "--max-features",
            "3000",
        ])
        .unwrap();
        let Command::Train(args) = cli.command else {
            panic!("expected train");
        };
        let config = args.train_config();
        assert_eq!(config.analyzer, AnalyzerConfig::web_form());
        assert_eq!(config.vectorizer.weighting, Weighting::Count);
        assert_eq!(config.vectorizer.min_df, 2);
        assert_eq!(config.vectorizer.max_features, Some(3000));
    }

    #[test]
    fn rejects_unknown_reduction() {
        assert!(Cli::try_parse_from(["smsguard", "train", "--data", "a.csv", "--reduction", "stem"]).is_err());
    }

    #[test]
    fn classify_takes_several_messages() {
        let cli = Cli::try_parse_from([
            "smsguard",
            "classify",
            "--strategy",
            "keyword",
            "free cash prize",
            "see you at lunch",
        ])
        .unwrap();
        let Command::Classify(args) = cli.command else {
            panic!("expected classify");
        };
        assert_eq!(args.strategy, Strategy::Keyword);
        assert_eq!(args.text, ["free cash prize", "see you at lunch"]);
        assert!(Cli::try_parse_from(["smsguard", "classify"]).is_err());
    }

    #[test]
    fn serve_config() {
        let cli = Cli::try_parse_from(["smsguard", "serve", "--port", "8080", "--model", "m.bin"]).unwrap();
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        let config = args.into_config();
        assert_eq!(config.port, 8080);
        assert_eq!(config.model_path, Some(PathBuf::from("m.bin")));
        assert_eq!(config.strategy, Strategy::Statistical);
    }
}
