use crate::dto::HealthRes;

/// Simple health service shared by every front end.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    pub fn new() -> Self {
        Self
    }

    /// Reports the service as alive and whether image analysis is being served.
    ///
    /// A process without a loaded classifier is still healthy: it serves symptom-only
    /// screening.
    pub fn check_health(image_analysis_available: bool) -> HealthRes {
        HealthRes {
            ok: true,
            message: "STI screening is alive".into(),
            image_analysis_available,
        }
    }
}
