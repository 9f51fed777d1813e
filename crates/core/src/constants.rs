//! Constants used throughout the STI screening core.
//!
//! User-visible wording lives here so that every front end renders identical text.

/// Page title shown by front ends.
pub const APP_TITLE: &str = "STI Diagnosis Chatbot";

/// Disclaimer attached to every screening output.
pub const DISCLAIMER: &str = "This tool offers basic guidance for Sexually Transmitted Infections (STIs) based on your symptoms and optional image upload. Not a substitute for professional medical advice.";

/// Statement the user must agree to before any screening logic runs.
pub const CONSENT_STATEMENT: &str =
    "I understand this is not medical advice and agree to proceed.";

/// Prompt returned in place of a diagnosis when consent has not been given.
pub const CONSENT_REQUIRED_MESSAGE: &str = "You must agree to the terms above to use this tool.";

/// Message shown when neither the image nor the symptoms point to a condition.
pub const INDETERMINATE_MESSAGE: &str = "We cannot determine a likely condition confidently. Please seek care from a healthcare professional.";

/// Warning recorded when an uploaded image cannot be decoded or classified.
pub const IMAGE_UNREADABLE_WARNING: &str =
    "The uploaded image could not be analysed; the result is based on your symptoms only.";

/// Warning recorded when an image is uploaded but no classifier model is loaded.
pub const IMAGE_ANALYSIS_UNAVAILABLE_WARNING: &str =
    "Image analysis is currently unavailable; the result is based on your symptoms only.";

/// Minimum additive score for a condition to be reported instead of Uncertain.
pub const MIN_ADDITIVE_SCORE: u32 = 2;

/// Upper bound on the square input resolution a model may declare.
pub const MAX_IMAGE_SIZE: u32 = 1024;

/// Default location of the classifier weights file.
pub const DEFAULT_MODEL_PATH: &str = "models/sti_classifier.json";

/// File extensions accepted for image uploads (compared case-insensitively).
pub const ACCEPTED_IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Media types accepted for image uploads.
pub const ACCEPTED_IMAGE_MEDIA_TYPES: [&str; 2] = ["image/jpeg", "image/png"];
