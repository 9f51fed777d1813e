//! Validated primitive values shared across the STI screening crates.
//!
//! Values are checked once at construction so downstream code can rely on them without
//! re-validating.

/// Errors that can occur when constructing a validated value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueError {
    /// The input text was empty or contained only whitespace
    #[error("text cannot be empty")]
    EmptyText,
    #[error("probability must be between 0 and 1, got {0}")]
    ProbabilityOutOfRange(f32),
}

/// A trimmed string with at least one non-whitespace character.
///
/// Used for upload filenames, which appear in logs and error messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Trims `input`, rejecting it if nothing is left.
    pub fn new(input: impl AsRef<str>) -> Result<Self, ValueError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ValueError::EmptyText);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A finite value in `[0, 1]`, such as a classifier confidence threshold.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Probability(f32);

impl Probability {
    /// # Errors
    ///
    /// Returns [`ValueError::ProbabilityOutOfRange`] for NaN, infinities and values outside
    /// `[0, 1]`.
    pub fn new(value: f32) -> Result<Self, ValueError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(ValueError::ProbabilityOutOfRange(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl std::fmt::Display for Probability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for Probability {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_f32(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Probability {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = f32::deserialize(deserializer)?;
        Probability::new(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_trimmed() {
        let text = NonEmptyText::new("  lesion.png  ").expect("non-empty");
        assert_eq!(text.as_str(), "lesion.png");
        assert_eq!(text.to_string(), "lesion.png");
    }

    #[test]
    fn test_text_rejects_whitespace_only() {
        assert_eq!(NonEmptyText::new("   "), Err(ValueError::EmptyText));
        assert_eq!(NonEmptyText::new(""), Err(ValueError::EmptyText));
    }

    #[test]
    fn test_probability_bounds() {
        assert_eq!(Probability::new(0.0).unwrap().value(), 0.0);
        assert_eq!(Probability::new(1.0).unwrap().value(), 1.0);
        assert_eq!(
            Probability::new(1.5),
            Err(ValueError::ProbabilityOutOfRange(1.5))
        );
        assert!(Probability::new(-0.1).is_err());
        assert!(Probability::new(f32::NAN).is_err());
    }

    #[test]
    fn test_probability_serde_validates() {
        let p: Probability = serde_json::from_str("0.25").expect("valid");
        assert_eq!(p.value(), 0.25);
        assert_eq!(serde_json::to_string(&p).expect("serialise"), "0.25");

        let err = serde_json::from_str::<Probability>("2.0").expect_err("out of range");
        assert!(err.to_string().contains("between 0 and 1"));
    }
}
