//! The symptom checklist.
//!
//! A [`SymptomVector`] is the full set of boolean answers for one screening request. Every
//! symptom in [`Symptom::ALL`] is always present; a symptom the caller did not mention is
//! recorded as absent. Vectors are built once per request and never mutated afterwards.

use crate::{ScreeningError, ScreeningResult};
use std::fmt;
use std::str::FromStr;

const SYMPTOM_COUNT: usize = 8;

/// One item of the fixed symptom checklist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symptom {
    GenitalSores,
    Pain,
    Itching,
    PainfulUrination,
    Discharge,
    Rash,
    Fever,
    SwollenGlands,
}

impl Symptom {
    /// Every symptom, in checklist order.
    pub const ALL: [Symptom; SYMPTOM_COUNT] = [
        Symptom::GenitalSores,
        Symptom::Pain,
        Symptom::Itching,
        Symptom::PainfulUrination,
        Symptom::Discharge,
        Symptom::Rash,
        Symptom::Fever,
        Symptom::SwollenGlands,
    ];

    /// The wire key for this symptom (snake_case).
    pub fn key(self) -> &'static str {
        match self {
            Symptom::GenitalSores => "genital_sores",
            Symptom::Pain => "pain",
            Symptom::Itching => "itching",
            Symptom::PainfulUrination => "painful_urination",
            Symptom::Discharge => "discharge",
            Symptom::Rash => "rash",
            Symptom::Fever => "fever",
            Symptom::SwollenGlands => "swollen_glands",
        }
    }

    /// The checklist question presented to the user.
    pub fn question(self) -> &'static str {
        match self {
            Symptom::GenitalSores => "Do you have genital sores?",
            Symptom::Pain => "Are you experiencing pain in the genital area?",
            Symptom::Itching => "Is there itching in the genital area?",
            Symptom::PainfulUrination => "Do you feel pain during urination?",
            Symptom::Discharge => "Do you notice any unusual discharge?",
            Symptom::Rash => "Do you have a rash?",
            Symptom::Fever => "Are you experiencing fever?",
            Symptom::SwollenGlands => "Do you have swollen glands?",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Symptom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Symptom {
    type Err = ScreeningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        Symptom::ALL
            .into_iter()
            .find(|symptom| symptom.key() == key)
            .ok_or_else(|| ScreeningError::UnknownSymptom(key.to_string()))
    }
}

/// The answers to the symptom checklist for a single request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SymptomVector {
    flags: [bool; SYMPTOM_COUNT],
}

impl SymptomVector {
    /// A vector with every symptom absent.
    pub fn none() -> Self {
        Self::default()
    }

    /// Builds a vector where exactly the given symptoms are present.
    pub fn from_present(symptoms: impl IntoIterator<Item = Symptom>) -> Self {
        let mut flags = [false; SYMPTOM_COUNT];
        for symptom in symptoms {
            flags[symptom.index()] = true;
        }
        Self { flags }
    }

    /// Builds a vector from `(key, value)` pairs as received from a front end.
    ///
    /// Keys that are not mentioned are treated as `false`.
    ///
    /// # Errors
    ///
    /// Returns [`ScreeningError::UnknownSymptom`] if any key is not part of the checklist.
    pub fn from_flags<K: AsRef<str>>(
        flags: impl IntoIterator<Item = (K, bool)>,
    ) -> ScreeningResult<Self> {
        let mut present = Vec::new();
        for (key, value) in flags {
            let symptom: Symptom = key.as_ref().parse()?;
            if value {
                present.push(symptom);
            }
        }
        Ok(Self::from_present(present))
    }

    pub fn is_present(&self, symptom: Symptom) -> bool {
        self.flags[symptom.index()]
    }

    /// Present symptoms in checklist order.
    pub fn present(&self) -> impl Iterator<Item = Symptom> + '_ {
        Symptom::ALL
            .into_iter()
            .filter(move |symptom| self.is_present(*symptom))
    }

    /// True when every listed symptom is present.
    pub fn all_present(&self, symptoms: &[Symptom]) -> bool {
        symptoms.iter().all(|symptom| self.is_present(*symptom))
    }

    /// Every checklist key paired with its answer, in checklist order.
    pub fn as_flags(&self) -> Vec<(&'static str, bool)> {
        Symptom::ALL
            .into_iter()
            .map(|symptom| (symptom.key(), self.is_present(symptom)))
            .collect()
    }
}

impl serde::Serialize for SymptomVector {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(SYMPTOM_COUNT))?;
        for (key, value) in self.as_flags() {
            map.serialize_entry(key, &value)?;
        }
        map.end()
    }
}

impl<'de> serde::Deserialize<'de> for SymptomVector {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = std::collections::BTreeMap::<String, bool>::deserialize(deserializer)?;
        SymptomVector::from_flags(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symptom_keys_round_trip_through_from_str() {
        for symptom in Symptom::ALL {
            assert_eq!(symptom.key().parse::<Symptom>().unwrap(), symptom);
        }
    }

    #[test]
    fn test_unknown_symptom_is_rejected() {
        let err = "headache".parse::<Symptom>().expect_err("should reject");
        assert!(matches!(err, ScreeningError::UnknownSymptom(key) if key == "headache"));
    }

    #[test]
    fn test_missing_keys_default_to_absent() {
        let vector = SymptomVector::from_flags([("rash", true), ("fever", false)]).unwrap();
        assert!(vector.is_present(Symptom::Rash));
        for symptom in Symptom::ALL.into_iter().filter(|s| *s != Symptom::Rash) {
            assert!(!vector.is_present(symptom), "{symptom} should be absent");
        }
    }

    #[test]
    fn test_from_flags_rejects_unknown_key() {
        let err = SymptomVector::from_flags([("pain", true), ("cough", true)])
            .expect_err("should reject unknown key");
        assert!(matches!(err, ScreeningError::UnknownSymptom(key) if key == "cough"));
    }

    #[test]
    fn test_serialises_every_key() {
        let vector = SymptomVector::from_present([Symptom::Discharge]);
        let json = serde_json::to_value(vector).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 8);
        assert_eq!(object["discharge"], true);
        assert_eq!(object["swollen_glands"], false);
    }

    #[test]
    fn test_deserialises_partial_object() {
        let vector: SymptomVector =
            serde_json::from_str(r#"{"painful_urination": true, "discharge": true}"#).unwrap();
        assert_eq!(
            vector.present().collect::<Vec<_>>(),
            vec![Symptom::PainfulUrination, Symptom::Discharge]
        );
    }

    #[test]
    fn test_every_question_ends_with_question_mark() {
        assert!(Symptom::ALL.iter().all(|s| s.question().ends_with('?')));
    }
}
