//! Application state shared across handlers.

use smsguard_core::Engine;
use smsguard_types::BundleError;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::history::History;

/// Everything a request needs. Built once at startup and shared behind an
/// `Arc`; only the history is mutated afterwards.
#[derive(Debug)]
pub struct AppState {
    /// Classification strategy with its model, if any.
    pub engine: Engine,
    /// Recent classifications.
    pub history: History,
    /// Startup configuration.
    pub config: ServerConfig,
}

impl AppState {
    /// State around an already-built engine.
    pub fn new(engine: Engine, config: ServerConfig) -> Self {
        Self {
            engine,
            history: History::default(),
            config,
        }
    }

    /// Builds the engine the configuration asks for, loading the model
    /// bundle when one is configured.
    pub fn from_config(config: ServerConfig) -> Result<Self, BundleError> {
        let engine = Engine::open(config.strategy, config.model_path.as_deref())?;
        if engine.is_ready() {
            info!(strategy = %engine.strategy(), "engine ready");
        } else {
            warn!(
                strategy = %engine.strategy(),
                "no model bundle configured; /classify will answer 503 until one is loaded"
            );
        }
        Ok(Self::new(engine, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smsguard_types::Strategy;

    #[test]
    fn keyword_strategy_needs_no_model() {
        let config = ServerConfig {
            strategy: Strategy::Keyword,
            ..ServerConfig::default()
        };
        let state = AppState::from_config(config).unwrap();
        assert!(state.engine.is_ready());
        assert!(state.history.is_empty());
    }

    #[test]
    fn statistical_without_model_is_not_ready() {
        let state = AppState::from_config(ServerConfig::default()).unwrap();
        assert_eq!(state.engine.strategy(), Strategy::Statistical);
        assert!(!state.engine.is_ready());
    }

    #[test]
    fn missing_model_file_fails_startup() {
        let config = ServerConfig {
            model_path: Some(std::env::temp_dir().join("smsguard-missing-model.bin")),
            ..ServerConfig::default()
        };
        assert!(matches!(AppState::from_config(config), Err(BundleError::Io(_))));
    }
}
