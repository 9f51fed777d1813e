//! # STI Screening Core
//!
//! Decision logic for the symptom- and image-based STI screening tool.
//!
//! This crate contains the pure screening operations:
//! - The fixed symptom checklist ([`symptoms`])
//! - Exact-rule and additive symptom scoring ([`scoring`])
//! - The image classifier adapter and bundled model ([`classifier`], [`model`])
//! - Fusion of image and symptom signals with prevention/advice lookup ([`fusion`], [`guidance`])
//! - The consent-gated screening flow ([`service`])
//!
//! **No API concerns**: HTTP servers, CLI parsing and wire formats belong in `api-rest`,
//! `api-shared` and `sti-cli`.
//!
//! Every result is a suggestion, not a clinical diagnosis; reports always carry
//! [`DISCLAIMER`].

pub mod classifier;
pub mod condition;
pub mod config;
pub mod constants;
pub mod error;
pub mod fusion;
pub mod guidance;
pub mod model;
pub mod scoring;
pub mod service;
pub mod symptoms;

pub use classifier::{Classification, ImageClassifier, ImageUpload, PreparedImage};
pub use condition::{Condition, ImageLabel};
pub use config::CoreConfig;
pub use constants::{
    APP_TITLE, CONSENT_REQUIRED_MESSAGE, CONSENT_STATEMENT, DEFAULT_MODEL_PATH, DISCLAIMER,
};
pub use error::{ScreeningError, ScreeningResult};
pub use fusion::{DiagnosisSource, FinalDiagnosis, FusionPolicy};
pub use guidance::DiagnosisResult;
pub use model::LinearModel;
pub use scoring::{ScoringStrategy, SymptomAssessment};
pub use service::{ScreeningOutcome, ScreeningReport, ScreeningRequest, ScreeningService};
pub use symptoms::{Symptom, SymptomVector};
pub use sti_types::Probability;
