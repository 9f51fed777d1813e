//! The screening flow.
//!
//! [`ScreeningService::screen`] is the single entry point used by every front end:
//!
//! 1. consent gate: without consent nothing else runs,
//! 2. symptom scoring with the configured (or per-request) strategy,
//! 3. optional image classification, falling back to symptoms with a warning on failure,
//! 4. fusion into the displayed result, with the disclaimer attached.
//!
//! The service holds no per-request state and can be cloned freely into handlers.

use crate::classifier::{Classification, ImageClassifier, ImageUpload};
use crate::config::CoreConfig;
use crate::constants::{
    CONSENT_REQUIRED_MESSAGE, DISCLAIMER, IMAGE_ANALYSIS_UNAVAILABLE_WARNING,
    IMAGE_UNREADABLE_WARNING,
};
use crate::fusion::{FinalDiagnosis, FusionPolicy};
use crate::model::{global_model, LinearModel};
use crate::scoring::{ScoringStrategy, SymptomAssessment};
use crate::symptoms::SymptomVector;
use crate::ScreeningResult;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Everything collected from the user for one screening.
#[derive(Clone, Debug, Default)]
pub struct ScreeningRequest {
    pub consent: bool,
    pub symptoms: SymptomVector,
    pub image: Option<ImageUpload>,
    /// Overrides the configured strategy for this request only.
    pub strategy: Option<ScoringStrategy>,
}

#[derive(Clone, Debug)]
pub enum ScreeningOutcome {
    ConsentRequired { message: &'static str },
    Completed { report: ScreeningReport },
}

impl ScreeningOutcome {
    pub fn report(&self) -> Option<&ScreeningReport> {
        match self {
            ScreeningOutcome::Completed { report } => Some(report),
            ScreeningOutcome::ConsentRequired { .. } => None,
        }
    }
}

/// The full result of one screening. Built per request and never stored.
#[derive(Clone, Debug)]
pub struct ScreeningReport {
    pub assessment_id: Uuid,
    pub assessed_at: DateTime<Utc>,
    pub symptoms: SymptomVector,
    pub symptom_assessment: SymptomAssessment,
    pub image: Option<Classification>,
    pub warnings: Vec<&'static str>,
    pub diagnosis: FinalDiagnosis,
    pub disclaimer: &'static str,
}

#[derive(Clone)]
pub struct ScreeningService {
    cfg: Arc<CoreConfig>,
    fusion: FusionPolicy,
    classifier: Option<Arc<dyn ImageClassifier>>,
}

impl std::fmt::Debug for ScreeningService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreeningService")
            .field("cfg", &self.cfg)
            .field("fusion", &self.fusion)
            .field("image_analysis", &self.classifier.is_some())
            .finish()
    }
}

impl ScreeningService {
    /// Symptom-only service; image uploads produce a warning and are ignored.
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        let fusion = match cfg.min_confidence() {
            Some(min) => FusionPolicy::with_min_confidence(min),
            None => FusionPolicy::new(),
        };
        Self {
            cfg,
            fusion,
            classifier: None,
        }
    }

    pub fn with_classifier(cfg: Arc<CoreConfig>, classifier: Arc<dyn ImageClassifier>) -> Self {
        Self {
            classifier: Some(classifier),
            ..Self::new(cfg)
        }
    }

    /// Builds the service from startup configuration, loading the process-wide model.
    ///
    /// A model that fails to load is fatal only when the configuration marks it as required;
    /// otherwise the failure is logged and the service runs in symptom-only mode.
    ///
    /// # Errors
    ///
    /// Returns [`ScreeningError::ModelLoad`](crate::ScreeningError::ModelLoad) when the model is
    /// required and cannot be loaded.
    pub fn from_config(cfg: Arc<CoreConfig>) -> ScreeningResult<Self> {
        let Some(path) = cfg.model_path() else {
            tracing::warn!("no classifier model configured; image analysis disabled");
            return Ok(Self::new(cfg));
        };

        let loaded = global_model(path);
        Self::from_model_result(cfg, loaded)
    }

    /// Applies the configured model policy to the outcome of a model load.
    ///
    /// # Errors
    ///
    /// Returns the load error when the configuration marks the model as required.
    pub fn from_model_result(
        cfg: Arc<CoreConfig>,
        loaded: ScreeningResult<Arc<LinearModel>>,
    ) -> ScreeningResult<Self> {
        match loaded {
            Ok(model) => Ok(Self::with_classifier(cfg, model)),
            Err(e) if cfg.require_model() => Err(e),
            Err(e) => {
                tracing::error!("image analysis disabled: {}", e);
                Ok(Self::new(cfg))
            }
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    pub fn image_analysis_available(&self) -> bool {
        self.classifier.is_some()
    }

    /// Runs one screening.
    ///
    /// This never fails: image problems degrade to symptom-only screening and are reported in
    /// [`ScreeningReport::warnings`].
    pub fn screen(&self, request: ScreeningRequest) -> ScreeningOutcome {
        if !request.consent {
            tracing::debug!("screening declined: consent not given");
            return ScreeningOutcome::ConsentRequired {
                message: CONSENT_REQUIRED_MESSAGE,
            };
        }

        let strategy = request.strategy.unwrap_or(self.cfg.strategy());
        let symptom_assessment = strategy.assess(&request.symptoms);

        let mut warnings = Vec::new();
        let image = request
            .image
            .as_ref()
            .and_then(|upload| self.classify(upload, &mut warnings));

        let diagnosis = self.fusion.fuse(image.as_ref(), &symptom_assessment);

        let report = ScreeningReport {
            assessment_id: Uuid::new_v4(),
            assessed_at: Utc::now(),
            symptoms: request.symptoms,
            symptom_assessment,
            image,
            warnings,
            diagnosis,
            disclaimer: DISCLAIMER,
        };

        tracing::info!(
            assessment_id = %report.assessment_id,
            strategy = %strategy,
            source = ?report.diagnosis.source,
            condition = ?report.diagnosis.result.condition,
            "screening completed"
        );

        ScreeningOutcome::Completed { report }
    }

    fn classify(
        &self,
        upload: &ImageUpload,
        warnings: &mut Vec<&'static str>,
    ) -> Option<Classification> {
        let Some(classifier) = &self.classifier else {
            warnings.push(IMAGE_ANALYSIS_UNAVAILABLE_WARNING);
            return None;
        };

        match classifier.classify(upload) {
            Ok(classification) => Some(classification),
            Err(e) => {
                if e.is_image_fallback() {
                    tracing::warn!(filename = upload.filename(), "unreadable image: {}", e);
                } else {
                    tracing::error!(filename = upload.filename(), "classifier error: {}", e);
                }
                warnings.push(IMAGE_UNREADABLE_WARNING);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::tests::encoded;
    use crate::classifier::PreparedImage;
    use crate::condition::Condition;
    use crate::constants::INDETERMINATE_MESSAGE;
    use crate::fusion::DiagnosisSource;
    use crate::symptoms::Symptom;
    use crate::ScreeningError;
    use image::ImageFormat;

    /// Always returns the same scores, in `ImageLabel::ALL` order.
    struct StubClassifier(Vec<f32>);

    impl ImageClassifier for StubClassifier {
        fn input_size(&self) -> u32 {
            4
        }

        fn predict(&self, batch: &[PreparedImage]) -> ScreeningResult<Vec<Vec<f32>>> {
            Ok(batch.iter().map(|_| self.0.clone()).collect())
        }
    }

    fn service(strategy: ScoringStrategy, scores: Option<Vec<f32>>) -> ScreeningService {
        let cfg = Arc::new(CoreConfig::symptoms_only(strategy));
        match scores {
            Some(scores) => {
                ScreeningService::with_classifier(cfg, Arc::new(StubClassifier(scores)))
            }
            None => ScreeningService::new(cfg),
        }
    }

    fn png_upload() -> ImageUpload {
        ImageUpload::new("photo.png", encoded(ImageFormat::Png, [200, 30, 30])).unwrap()
    }

    fn request(symptoms: &[Symptom], image: Option<ImageUpload>) -> ScreeningRequest {
        ScreeningRequest {
            consent: true,
            symptoms: SymptomVector::from_present(symptoms.iter().copied()),
            image,
            strategy: None,
        }
    }

    #[test]
    fn test_consent_gate_blocks_screening() {
        let svc = service(ScoringStrategy::ExactRule, None);
        let outcome = svc.screen(ScreeningRequest {
            consent: false,
            symptoms: SymptomVector::from_present([Symptom::Rash, Symptom::Fever]),
            ..Default::default()
        });
        assert!(matches!(
            outcome,
            ScreeningOutcome::ConsentRequired { message } if message == CONSENT_REQUIRED_MESSAGE
        ));
        assert!(outcome.report().is_none());
    }

    #[test]
    fn test_symptom_only_screening() {
        let svc = service(ScoringStrategy::ExactRule, None);
        let outcome = svc.screen(request(&[Symptom::PainfulUrination, Symptom::Discharge], None));
        let report = outcome.report().expect("completed");
        assert_eq!(report.diagnosis.source, DiagnosisSource::Symptoms);
        assert_eq!(report.diagnosis.result.condition, Condition::Gonorrhea);
        assert_eq!(report.disclaimer, DISCLAIMER);
        assert!(report.warnings.is_empty());
        assert!(report.image.is_none());
    }

    #[test]
    fn test_image_overrides_symptoms() {
        let svc = service(ScoringStrategy::Additive, Some(vec![0.1, 0.1, 0.7, 0.1]));
        let outcome = svc.screen(request(
            &[Symptom::GenitalSores, Symptom::Pain, Symptom::Itching],
            Some(png_upload()),
        ));
        let report = outcome.report().unwrap();
        assert_eq!(report.symptom_assessment.condition, Condition::Herpes);
        assert_eq!(report.diagnosis.source, DiagnosisSource::Image);
        assert_eq!(report.diagnosis.result.condition, Condition::Syphilis);
    }

    #[test]
    fn test_normal_image_and_no_symptoms_is_indeterminate() {
        let svc = service(ScoringStrategy::ExactRule, Some(vec![0.0, 0.0, 0.0, 1.0]));
        let outcome = svc.screen(request(&[], Some(png_upload())));
        let report = outcome.report().unwrap();
        assert_eq!(report.diagnosis.source, DiagnosisSource::Indeterminate);
        assert_eq!(report.diagnosis.message, Some(INDETERMINATE_MESSAGE));
    }

    #[test]
    fn test_corrupt_image_falls_back_with_warning() {
        let svc = service(ScoringStrategy::ExactRule, Some(vec![1.0, 0.0, 0.0, 0.0]));
        let corrupt = ImageUpload::new("photo.jpg", b"garbage bytes".to_vec()).unwrap();
        let outcome = svc.screen(request(
            &[Symptom::Rash, Symptom::Fever, Symptom::SwollenGlands],
            Some(corrupt),
        ));
        let report = outcome.report().unwrap();
        assert_eq!(report.warnings, vec![IMAGE_UNREADABLE_WARNING]);
        assert!(report.image.is_none());
        assert_eq!(report.diagnosis.result.condition, Condition::Syphilis);
    }

    #[test]
    fn test_missing_model_warns_and_uses_symptoms() {
        let svc = service(ScoringStrategy::ExactRule, None);
        let outcome = svc.screen(request(&[Symptom::Pain], Some(png_upload())));
        let report = outcome.report().unwrap();
        assert_eq!(report.warnings, vec![IMAGE_ANALYSIS_UNAVAILABLE_WARNING]);
        assert_eq!(report.diagnosis.source, DiagnosisSource::Indeterminate);
    }

    #[test]
    fn test_request_strategy_overrides_config() {
        let svc = service(ScoringStrategy::ExactRule, None);
        let mut req = request(&[Symptom::Rash], None);
        assert_eq!(
            svc.screen(req.clone()).report().unwrap().diagnosis.source,
            DiagnosisSource::Indeterminate
        );

        req.strategy = Some(ScoringStrategy::Additive);
        let outcome = svc.screen(req);
        let report = outcome.report().unwrap();
        assert_eq!(report.symptom_assessment.strategy, ScoringStrategy::Additive);
        assert_eq!(report.symptom_assessment.score, Some(2));
        assert_eq!(report.diagnosis.result.condition, Condition::Syphilis);
    }

    #[test]
    fn test_min_confidence_from_config_is_applied() {
        let cfg = Arc::new(
            CoreConfig::new(ScoringStrategy::ExactRule, Some(0.8), None, false).unwrap(),
        );
        let svc = ScreeningService::with_classifier(
            cfg,
            Arc::new(StubClassifier(vec![0.5, 0.2, 0.2, 0.1])),
        );
        let outcome = svc.screen(request(
            &[Symptom::PainfulUrination, Symptom::Discharge],
            Some(png_upload()),
        ));
        let report = outcome.report().unwrap();
        assert_eq!(report.image.as_ref().unwrap().label, crate::ImageLabel::Herpes);
        assert_eq!(report.diagnosis.source, DiagnosisSource::Symptoms);
        assert_eq!(report.diagnosis.result.condition, Condition::Gonorrhea);
    }

    #[test]
    fn test_each_report_gets_a_fresh_id() {
        let svc = service(ScoringStrategy::ExactRule, None);
        let a = svc.screen(request(&[], None));
        let b = svc.screen(request(&[], None));
        assert_ne!(
            a.report().unwrap().assessment_id,
            b.report().unwrap().assessment_id
        );
    }

    #[test]
    fn test_report_carries_assessment_details() {
        let svc = service(ScoringStrategy::Additive, None);
        let outcome = svc.screen(request(
            &[Symptom::GenitalSores, Symptom::Pain, Symptom::Itching],
            None,
        ));
        let report = outcome.report().unwrap();
        assert_eq!(report.diagnosis.source, DiagnosisSource::Symptoms);
        assert_eq!(report.diagnosis.result.diagnosis, "Herpes Simplex Virus (HSV)");
        assert_eq!(report.symptom_assessment.score, Some(4));
        assert!(report.symptoms.is_present(Symptom::Itching));
        assert!(report.warnings.is_empty());
    }

    fn missing_model() -> ScreeningResult<Arc<LinearModel>> {
        Err(ScreeningError::ModelLoad {
            path: "/nonexistent/model.json".into(),
            reason: "No such file or directory".into(),
        })
    }

    fn config_with_model(require_model: bool) -> Arc<CoreConfig> {
        Arc::new(
            CoreConfig::new(
                ScoringStrategy::ExactRule,
                None,
                Some("/nonexistent/model.json".into()),
                require_model,
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_missing_model_degrades_to_symptoms_only() {
        let svc = ScreeningService::from_model_result(config_with_model(false), missing_model())
            .expect("optional model should not be fatal");
        assert!(!svc.image_analysis_available());

        let outcome = svc.screen(request(&[Symptom::Rash], Some(png_upload())));
        let report = outcome.report().unwrap();
        assert_eq!(report.warnings, vec![IMAGE_ANALYSIS_UNAVAILABLE_WARNING]);
    }

    #[test]
    fn test_missing_required_model_is_fatal() {
        let err = ScreeningService::from_model_result(config_with_model(true), missing_model())
            .expect_err("required model should be fatal");
        assert!(matches!(err, ScreeningError::ModelLoad { .. }));
    }

    #[test]
    fn test_loaded_model_enables_image_analysis() {
        let model = LinearModel::new(1, vec![vec![0.0; 3]; 4], vec![0.0; 4]).unwrap();
        let svc =
            ScreeningService::from_model_result(config_with_model(true), Ok(Arc::new(model)))
                .unwrap();
        assert!(svc.image_analysis_available());
    }

    #[test]
    fn test_from_config_without_model_path_is_symptoms_only() {
        let cfg = Arc::new(CoreConfig::symptoms_only(ScoringStrategy::ExactRule));
        let svc = ScreeningService::from_config(cfg).unwrap();
        assert!(!svc.image_analysis_available());
    }
}
