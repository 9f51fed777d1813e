//! Wire types for the screening API.
//!
//! Core types stay free of transport concerns; these structs carry OpenAPI schemas and plain
//! strings, and the conversions below are the only place the two meet.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use sti_core::{
    Classification, FinalDiagnosis, ImageUpload, ScreeningError, ScreeningOutcome,
    ScreeningReport, ScreeningRequest, ScoringStrategy, Symptom, SymptomVector, APP_TITLE,
    CONSENT_STATEMENT, DISCLAIMER,
};
use utoipa::ToSchema;

/// Errors raised while turning a wire request into a core request.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("image data is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
    #[error(transparent)]
    Screening(#[from] ScreeningError),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
    pub image_analysis_available: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SymptomQuestion {
    pub key: String,
    pub question: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChecklistRes {
    pub title: String,
    pub consent_statement: String,
    pub disclaimer: String,
    pub symptoms: Vec<SymptomQuestion>,
}

impl ChecklistRes {
    pub fn current() -> Self {
        Self {
            title: APP_TITLE.into(),
            consent_statement: CONSENT_STATEMENT.into(),
            disclaimer: DISCLAIMER.into(),
            symptoms: Symptom::ALL
                .into_iter()
                .map(|symptom| SymptomQuestion {
                    key: symptom.key().into(),
                    question: symptom.question().into(),
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ImagePayload {
    /// Original filename; the extension must be jpg, jpeg or png.
    pub filename: String,
    /// File content, standard base64 with padding.
    pub data_base64: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiagnoseReq {
    pub consent: bool,
    /// Symptom answers by key; missing keys count as `false`.
    #[serde(default)]
    pub symptoms: BTreeMap<String, bool>,
    #[serde(default)]
    pub image: Option<ImagePayload>,
    /// `exact` or `additive`; the server default applies when absent.
    #[serde(default)]
    pub strategy: Option<String>,
}

impl DiagnoseReq {
    /// Validates and decodes the request.
    ///
    /// Without consent nothing else in the body is read, so the request always yields the
    /// consent reminder.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] for unknown symptom keys, an unknown strategy, invalid base64,
    /// or an unsupported image format.
    pub fn into_request(self) -> Result<ScreeningRequest, RequestError> {
        if !self.consent {
            return Ok(ScreeningRequest::default());
        }

        let symptoms = SymptomVector::from_flags(self.symptoms)?;
        let strategy = self
            .strategy
            .map(|s| s.parse::<ScoringStrategy>())
            .transpose()?;
        let image = self
            .image
            .map(|payload| -> Result<ImageUpload, RequestError> {
                let bytes = STANDARD.decode(payload.data_base64.trim())?;
                Ok(ImageUpload::new(payload.filename, bytes)?)
            })
            .transpose()?;

        Ok(ScreeningRequest {
            consent: self.consent,
            symptoms,
            image,
            strategy,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ImageFindingRes {
    pub label: String,
    pub confidence: f32,
    pub scores: Vec<f32>,
}

impl From<Classification> for ImageFindingRes {
    fn from(c: Classification) -> Self {
        Self {
            label: c.label.to_string(),
            confidence: c.confidence,
            scores: c.scores,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiagnosisRes {
    /// `image`, `symptoms` or `indeterminate`.
    pub source: String,
    pub condition: String,
    pub diagnosis: String,
    pub prevention: String,
    pub advice: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<FinalDiagnosis> for DiagnosisRes {
    fn from(d: FinalDiagnosis) -> Self {
        Self {
            source: d.source.as_str().into(),
            condition: d.result.condition.as_str().into(),
            diagnosis: d.result.diagnosis.into(),
            prevention: d.result.prevention.into(),
            advice: d.result.advice.into(),
            message: d.message.map(Into::into),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReportRes {
    pub assessment_id: String,
    /// RFC 3339 timestamp.
    pub assessed_at: String,
    pub strategy: String,
    pub symptoms: BTreeMap<String, bool>,
    /// Condition suggested by the symptoms alone.
    pub symptom_condition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptom_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageFindingRes>,
    #[serde(default)]
    pub warnings: Vec<String>,
    pub diagnosis: DiagnosisRes,
    pub disclaimer: String,
}

impl From<ScreeningReport> for ReportRes {
    fn from(r: ScreeningReport) -> Self {
        Self {
            assessment_id: r.assessment_id.to_string(),
            assessed_at: r.assessed_at.to_rfc3339(),
            strategy: r.symptom_assessment.strategy.to_string(),
            symptoms: r
                .symptoms
                .as_flags()
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
            symptom_condition: r.symptom_assessment.condition.as_str().into(),
            symptom_score: r.symptom_assessment.score,
            image: r.image.map(Into::into),
            warnings: r.warnings.into_iter().map(Into::into).collect(),
            diagnosis: r.diagnosis.into(),
            disclaimer: r.disclaimer.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiagnoseRes {
    /// `consent_required` or `completed`.
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<ReportRes>,
}

impl From<ScreeningOutcome> for DiagnoseRes {
    fn from(outcome: ScreeningOutcome) -> Self {
        match outcome {
            ScreeningOutcome::ConsentRequired { message } => Self {
                status: "consent_required".into(),
                message: Some(message.into()),
                report: None,
            },
            ScreeningOutcome::Completed { report } => Self {
                status: "completed".into(),
                message: None,
                report: Some(report.into()),
            },
        }
    }
}
