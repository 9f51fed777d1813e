//! Diagnosis labels.
//!
//! Symptom scoring and image classification historically used different label spellings
//! ("HSV" vs "Herpes", "Uncertain" vs "Normal"). Both are mapped onto two closed enums here:
//! [`Condition`] is what the screening reports, [`ImageLabel`] is the classifier's class set.

use crate::{ScreeningError, ScreeningResult};
use std::fmt;
use std::str::FromStr;

/// The canonical screening outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Herpes,
    Gonorrhea,
    Syphilis,
    Uncertain,
}

impl Condition {
    /// Conditions that can be scored, in tie-break priority order.
    pub const SCORED: [Condition; 3] = [Condition::Herpes, Condition::Gonorrhea, Condition::Syphilis];

    /// Name shown to the user.
    pub fn display_name(self) -> &'static str {
        match self {
            Condition::Herpes => "Herpes Simplex Virus (HSV)",
            Condition::Gonorrhea => "Gonorrhea",
            Condition::Syphilis => "Syphilis",
            Condition::Uncertain => "Uncertain",
        }
    }

    /// Stable machine-readable key, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Condition::Herpes => "herpes",
            Condition::Gonorrhea => "gonorrhea",
            Condition::Syphilis => "syphilis",
            Condition::Uncertain => "uncertain",
        }
    }

    pub fn is_uncertain(self) -> bool {
        self == Condition::Uncertain
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Output class of the image classifier.
///
/// The declaration order is the classifier's class index order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageLabel {
    Herpes,
    Gonorrhea,
    Syphilis,
    Normal,
}

impl ImageLabel {
    pub const ALL: [ImageLabel; 4] = [
        ImageLabel::Herpes,
        ImageLabel::Gonorrhea,
        ImageLabel::Syphilis,
        ImageLabel::Normal,
    ];

    /// The condition an image label points to, or `None` for [`ImageLabel::Normal`].
    pub fn condition(self) -> Option<Condition> {
        match self {
            ImageLabel::Herpes => Some(Condition::Herpes),
            ImageLabel::Gonorrhea => Some(Condition::Gonorrhea),
            ImageLabel::Syphilis => Some(Condition::Syphilis),
            ImageLabel::Normal => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ImageLabel::Herpes => "Herpes",
            ImageLabel::Gonorrhea => "Gonorrhea",
            ImageLabel::Syphilis => "Syphilis",
            ImageLabel::Normal => "Normal",
        }
    }
}

impl fmt::Display for ImageLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageLabel {
    type Err = ScreeningError;

    /// Accepts the label spellings used by exported models, case-insensitively.
    fn from_str(s: &str) -> ScreeningResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "herpes" | "hsv" => Ok(ImageLabel::Herpes),
            "gonorrhea" => Ok(ImageLabel::Gonorrhea),
            "syphilis" => Ok(ImageLabel::Syphilis),
            "normal" | "no_condition" => Ok(ImageLabel::Normal),
            _ => Err(ScreeningError::UnknownImageLabel(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_label_has_no_condition() {
        assert_eq!(ImageLabel::Normal.condition(), None);
        assert_eq!(ImageLabel::Syphilis.condition(), Some(Condition::Syphilis));
    }

    #[test]
    fn test_image_label_parses_legacy_spellings() {
        assert_eq!("HSV".parse::<ImageLabel>().unwrap(), ImageLabel::Herpes);
        assert_eq!(" normal ".parse::<ImageLabel>().unwrap(), ImageLabel::Normal);
        assert!(matches!(
            "chlamydia".parse::<ImageLabel>(),
            Err(ScreeningError::UnknownImageLabel(_))
        ));
    }

    #[test]
    fn test_herpes_display_name_keeps_hsv_wording() {
        assert_eq!(Condition::Herpes.to_string(), "Herpes Simplex Virus (HSV)");
    }

    #[test]
    fn test_condition_key_matches_serde_name() {
        for condition in [
            Condition::Herpes,
            Condition::Gonorrhea,
            Condition::Syphilis,
            Condition::Uncertain,
        ] {
            assert_eq!(
                serde_json::to_value(condition).unwrap(),
                serde_json::Value::from(condition.as_str())
            );
        }
    }
}
