//! Image classifier adapter.
//!
//! The screening core treats the classifier as an opaque function from a preprocessed image to a
//! probability vector over [`ImageLabel::ALL`]. This module owns everything on the core's side
//! of that boundary:
//!
//! - upload validation ([`ImageUpload`]): accepted extensions and magic-byte sniffing,
//! - preprocessing ([`PreparedImage`]): decode, square resize, RGB, channels scaled to `[0, 1]`,
//! - label selection ([`Classification::from_scores`]): argmax, first index wins on ties.
//!
//! Decoding failures surface as [`ScreeningError::Decode`] so callers can fall back to symptom
//! screening instead of failing the request.

use crate::condition::ImageLabel;
use crate::constants::{ACCEPTED_IMAGE_EXTENSIONS, ACCEPTED_IMAGE_MEDIA_TYPES};
use crate::{ScreeningError, ScreeningResult};
use image::imageops::FilterType;
use std::path::Path;
use sti_types::NonEmptyText;

/// An image received from a front end, checked for an accepted format.
#[derive(Clone, Debug)]
pub struct ImageUpload {
    filename: NonEmptyText,
    bytes: Vec<u8>,
    media_type: Option<&'static str>,
}

impl ImageUpload {
    /// Validates an uploaded image.
    ///
    /// The filename must carry a `jpg`, `jpeg` or `png` extension. If the content's magic bytes
    /// identify a type, that type must be JPEG or PNG. Content that cannot be identified is
    /// accepted here and left for the decoder to reject.
    ///
    /// # Errors
    ///
    /// - [`ScreeningError::Value`] if the filename is blank.
    /// - [`ScreeningError::UnsupportedImageFormat`] if the extension or detected type is not
    ///   accepted.
    pub fn new(filename: impl AsRef<str>, bytes: Vec<u8>) -> ScreeningResult<Self> {
        let filename = NonEmptyText::new(filename)?;

        let extension = Path::new(filename.as_str())
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !ACCEPTED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ScreeningError::UnsupportedImageFormat(format!(
                "{} (accepted: {})",
                filename,
                ACCEPTED_IMAGE_EXTENSIONS.join(", ")
            )));
        }

        let media_type = infer::get(&bytes).map(|kind| kind.mime_type());
        if let Some(mime) = media_type {
            if !ACCEPTED_IMAGE_MEDIA_TYPES.contains(&mime) {
                return Err(ScreeningError::UnsupportedImageFormat(format!(
                    "{} has content type {}",
                    filename, mime
                )));
            }
        }

        Ok(Self {
            filename,
            bytes,
            media_type,
        })
    }

    pub fn filename(&self) -> &str {
        self.filename.as_str()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Media type detected from the content, if any.
    pub fn media_type(&self) -> Option<&'static str> {
        self.media_type
    }
}

/// A decoded image resized to `side x side`, RGB, channels in `[0, 1]`, row-major HWC order.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedImage {
    side: u32,
    pixels: Vec<f32>,
}

impl PreparedImage {
    pub fn from_upload(upload: &ImageUpload, side: u32) -> ScreeningResult<Self> {
        Self::from_bytes(upload.bytes(), side)
    }

    pub fn from_bytes(bytes: &[u8], side: u32) -> ScreeningResult<Self> {
        if side == 0 {
            return Err(ScreeningError::InvalidInput(
                "image size must be greater than zero".into(),
            ));
        }

        let decoded =
            image::load_from_memory(bytes).map_err(|e| ScreeningError::Decode(e.to_string()))?;
        let rgb = decoded
            .resize_exact(side, side, FilterType::Triangle)
            .to_rgb8();
        let pixels = rgb
            .as_raw()
            .iter()
            .map(|channel| f32::from(*channel) / 255.0)
            .collect();

        Ok(Self { side, pixels })
    }

    pub fn side(&self) -> u32 {
        self.side
    }

    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }
}

/// Output of one classification call.
#[derive(Clone, Debug, PartialEq)]
pub struct Classification {
    pub label: ImageLabel,
    /// Score of the selected label.
    pub confidence: f32,
    /// Raw scores in [`ImageLabel::ALL`] order.
    pub scores: Vec<f32>,
}

impl Classification {
    /// Selects the label with the highest score.
    ///
    /// # Errors
    ///
    /// Returns [`ScreeningError::Classification`] if the vector does not have one finite score
    /// per label.
    pub fn from_scores(scores: Vec<f32>) -> ScreeningResult<Self> {
        if scores.len() != ImageLabel::ALL.len() {
            return Err(ScreeningError::Classification(format!(
                "expected {} scores, got {}",
                ImageLabel::ALL.len(),
                scores.len()
            )));
        }
        if scores.iter().any(|score| !score.is_finite()) {
            return Err(ScreeningError::Classification(
                "classifier returned a non-finite score".into(),
            ));
        }

        let mut best = 0;
        for (index, score) in scores.iter().enumerate().skip(1) {
            if *score > scores[best] {
                best = index;
            }
        }

        Ok(Self {
            label: ImageLabel::ALL[best],
            confidence: scores[best],
            scores,
        })
    }
}

/// A model that scores prepared images.
///
/// Implementations must be immutable once constructed; one instance is shared read-only by every
/// request in the process.
pub trait ImageClassifier: Send + Sync {
    /// Square resolution the model expects.
    fn input_size(&self) -> u32;

    /// Scores a batch of images, returning one score vector per image in
    /// [`ImageLabel::ALL`] order.
    fn predict(&self, batch: &[PreparedImage]) -> ScreeningResult<Vec<Vec<f32>>>;

    /// Preprocesses and classifies a single upload as a one-item batch.
    fn classify(&self, upload: &ImageUpload) -> ScreeningResult<Classification> {
        let prepared = PreparedImage::from_upload(upload, self.input_size())?;
        let scores = self
            .predict(std::slice::from_ref(&prepared))?
            .into_iter()
            .next()
            .ok_or_else(|| {
                ScreeningError::Classification("classifier returned an empty batch".into())
            })?;
        Classification::from_scores(scores)
    }
}
