//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into the screening service.
//! Request handlers never read environment variables; front ends parse raw values with the
//! `*_from_env_value` helpers below and build a [`CoreConfig`].

use crate::scoring::ScoringStrategy;
use crate::{ScreeningError, ScreeningResult};
use std::path::{Path, PathBuf};
use sti_types::Probability;

/// Core configuration resolved at startup.
#[derive(Clone, Debug, PartialEq)]
pub struct CoreConfig {
    strategy: ScoringStrategy,
    min_confidence: Option<Probability>,
    model_path: Option<PathBuf>,
    require_model: bool,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`ScreeningError::Value`] if `min_confidence` is outside `[0, 1]`, or
    /// [`ScreeningError::InvalidInput`] if `require_model` is set without a `model_path`.
    pub fn new(
        strategy: ScoringStrategy,
        min_confidence: Option<f32>,
        model_path: Option<PathBuf>,
        require_model: bool,
    ) -> ScreeningResult<Self> {
        let min_confidence = min_confidence.map(Probability::new).transpose()?;

        if require_model && model_path.is_none() {
            return Err(ScreeningError::InvalidInput(
                "a model path is required when the model is mandatory".into(),
            ));
        }

        Ok(Self {
            strategy,
            min_confidence,
            model_path,
            require_model,
        })
    }

    /// Symptom-only configuration with the default strategy.
    pub fn symptoms_only(strategy: ScoringStrategy) -> Self {
        Self {
            strategy,
            min_confidence: None,
            model_path: None,
            require_model: false,
        }
    }

    pub fn strategy(&self) -> ScoringStrategy {
        self.strategy
    }

    pub fn min_confidence(&self) -> Option<Probability> {
        self.min_confidence
    }

    pub fn model_path(&self) -> Option<&Path> {
        self.model_path.as_deref()
    }

    pub fn require_model(&self) -> bool {
        self.require_model
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the scoring strategy from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default strategy.
pub fn strategy_from_env_value(value: Option<String>) -> ScreeningResult<ScoringStrategy> {
    let parsed = non_blank(value)
        .map(|v| v.parse::<ScoringStrategy>())
        .transpose()?;
    Ok(parsed.unwrap_or_default())
}

/// Parse an optional minimum confidence. Empty values mean "no threshold".
pub fn min_confidence_from_env_value(value: Option<String>) -> ScreeningResult<Option<f32>> {
    non_blank(value)
        .map(|v| {
            v.parse::<f32>().map_err(|_| {
                ScreeningError::InvalidInput(format!("invalid minimum confidence: {}", v))
            })
        })
        .transpose()
}

/// Parse a boolean flag. Accepts `true/false`, `1/0`, `yes/no`; empty values give `default`.
pub fn flag_from_env_value(value: Option<String>, default: bool) -> ScreeningResult<bool> {
    match non_blank(value).map(|v| v.to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ScreeningError::InvalidInput(format!(
                "invalid boolean flag: {}",
                v
            ))),
        },
    }
}

/// Resolve the model path. Empty values fall back to `default`.
pub fn model_path_from_env_value(value: Option<String>, default: &str) -> PathBuf {
    non_blank(value)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}
