use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ScreeningError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unknown symptom: {0}")]
    UnknownSymptom(String),
    #[error("unknown scoring strategy: {0}")]
    UnknownStrategy(String),
    #[error("unknown image label: {0}")]
    UnknownImageLabel(String),

    #[error("unsupported image format: {0}")]
    UnsupportedImageFormat(String),
    #[error("failed to decode image: {0}")]
    Decode(String),
    #[error("failed to classify image: {0}")]
    Classification(String),

    #[error("failed to load model from {path}: {reason}", path = path.display())]
    ModelLoad { path: PathBuf, reason: String },

    #[error(transparent)]
    Value(#[from] sti_types::ValueError),
}

impl ScreeningError {
    /// Whether the error originates from an image the caller supplied and can be handled by
    /// falling back to symptom-only screening.
    pub fn is_image_fallback(&self) -> bool {
        matches!(
            self,
            ScreeningError::Decode(_) | ScreeningError::Classification(_)
        )
    }
}

pub type ScreeningResult<T> = std::result::Result<T, ScreeningError>;
