//! Combining the image and symptom signals into one displayed result.
//!
//! The policy is a strict priority cascade with early exit, not a weighted merge:
//!
//! 1. an actionable image label wins,
//! 2. otherwise a certain symptom label wins,
//! 3. otherwise the result is indeterminate and the user is referred to a professional.
//!
//! An image label is actionable when it is not `Normal` and, if a minimum confidence is
//! configured, its confidence reaches that minimum. With no minimum configured the classifier's
//! confidence is never consulted.

use crate::classifier::Classification;
use crate::condition::Condition;
use crate::constants::INDETERMINATE_MESSAGE;
use crate::guidance::DiagnosisResult;
use crate::scoring::SymptomAssessment;
use sti_types::Probability;

/// Which signal produced the final result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosisSource {
    Image,
    Symptoms,
    Indeterminate,
}

impl DiagnosisSource {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosisSource::Image => "image",
            DiagnosisSource::Symptoms => "symptoms",
            DiagnosisSource::Indeterminate => "indeterminate",
        }
    }
}

/// The result shown to the user.
#[derive(Clone, Debug, PartialEq)]
pub struct FinalDiagnosis {
    pub source: DiagnosisSource,
    pub result: DiagnosisResult,
    pub message: Option<&'static str>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FusionPolicy {
    min_confidence: Option<Probability>,
}

impl FusionPolicy {
    /// Image labels are trusted regardless of confidence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Image labels below `min_confidence` are treated as `Normal`.
    pub fn with_min_confidence(min_confidence: Probability) -> Self {
        Self {
            min_confidence: Some(min_confidence),
        }
    }

    pub fn min_confidence(&self) -> Option<Probability> {
        self.min_confidence
    }

    /// The condition an image classification contributes, if any.
    pub fn image_condition(&self, image: &Classification) -> Option<Condition> {
        if let Some(min) = self.min_confidence {
            if image.confidence < min.value() {
                tracing::debug!(
                    label = %image.label,
                    confidence = image.confidence,
                    min = min.value(),
                    "image label below confidence threshold"
                );
                return None;
            }
        }
        image.label.condition()
    }

    pub fn fuse(
        &self,
        image: Option<&Classification>,
        symptoms: &SymptomAssessment,
    ) -> FinalDiagnosis {
        if let Some(condition) = image.and_then(|image| self.image_condition(image)) {
            return FinalDiagnosis {
                source: DiagnosisSource::Image,
                result: DiagnosisResult::for_condition(condition),
                message: None,
            };
        }

        if !symptoms.condition.is_uncertain() {
            return FinalDiagnosis {
                source: DiagnosisSource::Symptoms,
                result: symptoms.result(),
                message: None,
            };
        }

        FinalDiagnosis {
            source: DiagnosisSource::Indeterminate,
            result: DiagnosisResult::for_condition(Condition::Uncertain),
            message: Some(INDETERMINATE_MESSAGE),
        }
    }
}
