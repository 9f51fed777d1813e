//! The bundled image classifier and its process-wide instance.
//!
//! `LinearModel` is a single-layer softmax classifier over the flattened preprocessed image.
//! Weights are exported to JSON:
//!
//! ```json
//! {
//!   "input_size": 64,
//!   "labels": ["Herpes", "Gonorrhea", "Syphilis", "Normal"],
//!   "weights": [[0.01, ...], ...],
//!   "bias": [0.0, 0.0, 0.0, 0.0]
//! }
//! ```
//!
//! `labels` may list the classes in any order; rows of `weights` and entries of `bias` follow
//! that order and are rearranged into [`ImageLabel::ALL`] order on load. Each weight row has
//! `input_size * input_size * 3` entries.
//!
//! The model is loaded at most once per process through [`global_model`] and is never mutated
//! or reloaded afterwards.

use crate::classifier::{ImageClassifier, PreparedImage};
use crate::condition::ImageLabel;
use crate::constants::MAX_IMAGE_SIZE;
use crate::{ScreeningError, ScreeningResult};
use std::path::Path;
use std::sync::{Arc, OnceLock};

static GLOBAL_MODEL: OnceLock<Arc<LinearModel>> = OnceLock::new();

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct StoredModel {
    input_size: u32,
    labels: Vec<String>,
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
}

#[derive(Debug)]
pub struct LinearModel {
    input_size: u32,
    /// One row per label, in `ImageLabel::ALL` order.
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
}

impl LinearModel {
    /// Loads and validates a weights file.
    ///
    /// # Errors
    ///
    /// Returns [`ScreeningError::ModelLoad`] if the file cannot be read or parsed, or if its
    /// labels or tensor shapes do not match the classifier contract.
    pub fn load(path: &Path) -> ScreeningResult<Self> {
        let load_error = |reason: String| ScreeningError::ModelLoad {
            path: path.to_path_buf(),
            reason,
        };

        let contents = std::fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
        let stored: StoredModel =
            serde_json::from_str(&contents).map_err(|e| load_error(e.to_string()))?;
        let model = Self::from_stored(stored).map_err(|e| load_error(e.to_string()))?;

        tracing::info!(
            path = %path.display(),
            input_size = model.input_size,
            "loaded image classifier"
        );
        Ok(model)
    }

    /// Builds a model from weights already in [`ImageLabel::ALL`] order.
    pub fn new(input_size: u32, weights: Vec<Vec<f32>>, bias: Vec<f32>) -> ScreeningResult<Self> {
        let labels = ImageLabel::ALL.iter().map(|l| l.to_string()).collect();
        Self::from_stored(StoredModel {
            input_size,
            labels,
            weights,
            bias,
        })
    }

    fn from_stored(stored: StoredModel) -> ScreeningResult<Self> {
        if stored.input_size == 0 || stored.input_size > MAX_IMAGE_SIZE {
            return Err(ScreeningError::InvalidInput(format!(
                "input_size must be between 1 and {}",
                MAX_IMAGE_SIZE
            )));
        }

        let classes = ImageLabel::ALL.len();
        if stored.labels.len() != classes
            || stored.weights.len() != classes
            || stored.bias.len() != classes
        {
            return Err(ScreeningError::InvalidInput(format!(
                "expected {} labels, weight rows and biases",
                classes
            )));
        }

        let features = Self::feature_len(stored.input_size);
        if let Some(row) = stored.weights.iter().position(|row| row.len() != features) {
            return Err(ScreeningError::InvalidInput(format!(
                "weight row {} must have {} entries",
                row, features
            )));
        }
        if stored
            .weights
            .iter()
            .flatten()
            .chain(stored.bias.iter())
            .any(|value| !value.is_finite())
        {
            return Err(ScreeningError::InvalidInput(
                "weights and biases must be finite".into(),
            ));
        }

        let parsed = stored
            .labels
            .iter()
            .map(|label| label.parse::<ImageLabel>())
            .collect::<ScreeningResult<Vec<_>>>()?;

        let mut weights = Vec::with_capacity(classes);
        let mut bias = Vec::with_capacity(classes);
        for label in ImageLabel::ALL {
            let source = parsed
                .iter()
                .position(|parsed| *parsed == label)
                .ok_or_else(|| {
                    ScreeningError::InvalidInput(format!("labels must include {}", label))
                })?;
            weights.push(stored.weights[source].clone());
            bias.push(stored.bias[source]);
        }

        Ok(Self {
            input_size: stored.input_size,
            weights,
            bias,
        })
    }

    fn feature_len(input_size: u32) -> usize {
        let side = input_size as usize;
        side * side * 3
    }

    fn logits(&self, features: &[f32]) -> Vec<f32> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(row, bias)| {
                row.iter()
                    .zip(features)
                    .map(|(w, x)| w * x)
                    .sum::<f32>()
                    + bias
            })
            .collect()
    }
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let total: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

impl ImageClassifier for LinearModel {
    fn input_size(&self) -> u32 {
        self.input_size
    }

    fn predict(&self, batch: &[PreparedImage]) -> ScreeningResult<Vec<Vec<f32>>> {
        let expected = Self::feature_len(self.input_size);
        batch
            .iter()
            .map(|image| {
                if image.pixels().len() != expected {
                    return Err(ScreeningError::Classification(format!(
                        "expected {} input features, got {}",
                        expected,
                        image.pixels().len()
                    )));
                }
                Ok(softmax(&self.logits(image.pixels())))
            })
            .collect()
    }
}

/// Returns the process-wide model, loading it from `path` on first use.
///
/// Concurrent first calls may each read the file, but only one instance is ever published and
/// every caller receives that instance. A failed load publishes nothing, so a later call may
/// retry.
pub fn global_model(path: &Path) -> ScreeningResult<Arc<LinearModel>> {
    if let Some(model) = GLOBAL_MODEL.get() {
        return Ok(Arc::clone(model));
    }

    let loaded = Arc::new(LinearModel::load(path)?);
    Ok(Arc::clone(GLOBAL_MODEL.get_or_init(|| loaded)))
}

/// The process-wide model, if it has been loaded.
pub fn loaded_model() -> Option<Arc<LinearModel>> {
    GLOBAL_MODEL.get().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::tests::encoded;
    use crate::classifier::ImageUpload;
    use image::ImageFormat;
    use std::io::Write;

    /// A 1x1 model whose red channel drives Syphilis and whose blue channel drives Normal.
    fn tiny_model_json(labels: &[&str]) -> String {
        serde_json::json!({
            "input_size": 1,
            "labels": labels,
            "weights": [
                [0.0, 0.0, 0.0],
                [0.0, 0.0, 0.0],
                [5.0, 0.0, 0.0],
                [0.0, 0.0, 5.0]
            ],
            "bias": [0.0, 0.0, 0.0, 0.0]
        })
        .to_string()
    }

    fn write_model(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(contents.as_bytes()).expect("write model");
        file
    }

    #[test]
    fn test_load_and_classify() {
        let file = write_model(&tiny_model_json(&["Herpes", "Gonorrhea", "Syphilis", "Normal"]));
        let model = LinearModel::load(file.path()).unwrap();
        assert_eq!(model.input_size(), 1);

        let red = ImageUpload::new("red.png", encoded(ImageFormat::Png, [255, 0, 0])).unwrap();
        let c = model.classify(&red).unwrap();
        assert_eq!(c.label, ImageLabel::Syphilis);
        assert!((c.scores.iter().sum::<f32>() - 1.0).abs() < 1e-5);

        let blue = ImageUpload::new("blue.png", encoded(ImageFormat::Png, [0, 0, 255])).unwrap();
        assert_eq!(model.classify(&blue).unwrap().label, ImageLabel::Normal);
    }

    #[test]
    fn test_labels_are_reordered_on_load() {
        // Rows are listed as Syphilis-first; the red-driven row is labelled Herpes here.
        let file = write_model(&tiny_model_json(&["Syphilis", "Gonorrhea", "Herpes", "Normal"]));
        let model = LinearModel::load(file.path()).unwrap();
        let red = ImageUpload::new("red.png", encoded(ImageFormat::Png, [255, 0, 0])).unwrap();
        assert_eq!(model.classify(&red).unwrap().label, ImageLabel::Herpes);
    }

    #[test]
    fn test_missing_file_is_model_load_error() {
        let err = LinearModel::load(Path::new("/nonexistent/sti_classifier.json"))
            .expect_err("should fail");
        assert!(matches!(err, ScreeningError::ModelLoad { .. }));
        assert!(err.to_string().contains("/nonexistent/sti_classifier.json"));
    }

    #[test]
    fn test_wrong_shape_is_model_load_error() {
        let bad = serde_json::json!({
            "input_size": 2,
            "labels": ["Herpes", "Gonorrhea", "Syphilis", "Normal"],
            "weights": [[0.0], [0.0], [0.0], [0.0]],
            "bias": [0.0, 0.0, 0.0, 0.0]
        })
        .to_string();
        let file = write_model(&bad);
        let err = LinearModel::load(file.path()).expect_err("should reject shape");
        assert!(matches!(err, ScreeningError::ModelLoad { reason, .. } if reason.contains("weight row 0")));
    }

    #[test]
    fn test_duplicate_labels_are_rejected() {
        let file = write_model(&tiny_model_json(&["Herpes", "Herpes", "Syphilis", "Normal"]));
        let err = LinearModel::load(file.path()).expect_err("should reject duplicates");
        assert!(matches!(err, ScreeningError::ModelLoad { reason, .. } if reason.contains("Gonorrhea")));
    }

    #[test]
    fn test_predict_rejects_wrong_feature_count() {
        let model = LinearModel::new(1, vec![vec![0.0; 3]; 4], vec![0.0; 4]).unwrap();
        let bytes = encoded(ImageFormat::Png, [0, 0, 0]);
        let prepared = PreparedImage::from_bytes(&bytes, 2).unwrap();
        assert!(matches!(
            model.predict(&[prepared]),
            Err(ScreeningError::Classification(_))
        ));
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let p = softmax(&[1.0, 2.0, 3.0, 4.0]);
        assert!((p.iter().sum::<f32>() - 1.0).abs() < 1e-6);
        assert!(p[3] > p[2]);
    }

    #[test]
    fn test_global_model_is_loaded_once() {
        let file = write_model(&tiny_model_json(&["Herpes", "Gonorrhea", "Syphilis", "Normal"]));
        let first = global_model(file.path()).unwrap();
        let second = global_model(Path::new("/nonexistent/ignored.json")).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(loaded_model().is_some());
    }
}
