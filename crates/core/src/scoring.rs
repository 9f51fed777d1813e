//! Symptom scoring strategies.
//!
//! Two interchangeable policies map a [`SymptomVector`] to a [`Condition`]:
//!
//! - [`ScoringStrategy::ExactRule`]: ordered rules, first full match wins.
//! - [`ScoringStrategy::Additive`]: weighted points per condition; the best score wins if it
//!   reaches [`MIN_ADDITIVE_SCORE`](crate::constants::MIN_ADDITIVE_SCORE).
//!
//! Both are pure and total: the same vector always produces the same assessment and no
//! vector is rejected.

use crate::condition::Condition;
use crate::constants::MIN_ADDITIVE_SCORE;
use crate::guidance::DiagnosisResult;
use crate::symptoms::{Symptom, SymptomVector};
use crate::{ScreeningError, ScreeningResult};
use std::fmt;
use std::str::FromStr;

/// Rules for the exact-match strategy, in evaluation order.
const EXACT_RULES: [(&[Symptom], Condition); 3] = [
    (
        &[Symptom::GenitalSores, Symptom::Pain, Symptom::Itching],
        Condition::Herpes,
    ),
    (
        &[Symptom::PainfulUrination, Symptom::Discharge],
        Condition::Gonorrhea,
    ),
    (
        &[Symptom::Rash, Symptom::Fever, Symptom::SwollenGlands],
        Condition::Syphilis,
    ),
];

/// Points each symptom contributes to each scored condition.
fn weights(symptom: Symptom) -> &'static [(Condition, u32)] {
    match symptom {
        Symptom::GenitalSores => &[(Condition::Herpes, 2)],
        Symptom::Pain => &[(Condition::Herpes, 1), (Condition::Gonorrhea, 1)],
        Symptom::Itching => &[(Condition::Herpes, 1)],
        Symptom::PainfulUrination => &[(Condition::Gonorrhea, 2)],
        Symptom::Discharge => &[(Condition::Gonorrhea, 2)],
        Symptom::Rash => &[(Condition::Syphilis, 2)],
        Symptom::Fever => &[(Condition::Syphilis, 1)],
        Symptom::SwollenGlands => &[(Condition::Syphilis, 1)],
    }
}

/// Named symptom scoring policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStrategy {
    #[default]
    #[serde(rename = "exact")]
    ExactRule,
    Additive,
}

impl ScoringStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            ScoringStrategy::ExactRule => "exact",
            ScoringStrategy::Additive => "additive",
        }
    }

    /// Scores the vector under this strategy.
    pub fn assess(self, symptoms: &SymptomVector) -> SymptomAssessment {
        match self {
            ScoringStrategy::ExactRule => exact_rule_match(symptoms),
            ScoringStrategy::Additive => additive_score(symptoms),
        }
    }
}

impl fmt::Display for ScoringStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoringStrategy {
    type Err = ScreeningError;

    fn from_str(s: &str) -> ScreeningResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" | "exact_rule" | "rules" => Ok(ScoringStrategy::ExactRule),
            "additive" | "scored" => Ok(ScoringStrategy::Additive),
            other => Err(ScreeningError::UnknownStrategy(other.to_string())),
        }
    }
}

/// The symptom-based half of a screening.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymptomAssessment {
    pub strategy: ScoringStrategy,
    pub condition: Condition,
    /// Winning score for the additive strategy; absent for exact rule matching.
    pub score: Option<u32>,
}

impl SymptomAssessment {
    pub fn result(&self) -> DiagnosisResult {
        DiagnosisResult::for_condition(self.condition)
    }
}

/// Accumulated points per scored condition for one additive pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScoreTable {
    scores: [u32; 3],
}

impl ScoreTable {
    pub fn from_symptoms(symptoms: &SymptomVector) -> Self {
        let mut table = Self::default();
        for symptom in symptoms.present() {
            for &(condition, points) in weights(symptom) {
                if let Some(slot) = table.position(condition) {
                    table.scores[slot] += points;
                }
            }
        }
        table
    }

    pub fn get(&self, condition: Condition) -> u32 {
        self.position(condition)
            .map(|slot| self.scores[slot])
            .unwrap_or(0)
    }

    /// The highest-scoring condition. Ties go to the earlier entry of [`Condition::SCORED`].
    pub fn leader(&self) -> (Condition, u32) {
        let mut best = (Condition::SCORED[0], self.scores[0]);
        for (condition, score) in Condition::SCORED.iter().zip(self.scores).skip(1) {
            if score > best.1 {
                best = (*condition, score);
            }
        }
        best
    }

    fn position(&self, condition: Condition) -> Option<usize> {
        Condition::SCORED.iter().position(|c| *c == condition)
    }
}

/// Strategy A: first rule whose symptoms are all present wins.
pub fn exact_rule_match(symptoms: &SymptomVector) -> SymptomAssessment {
    let condition = EXACT_RULES
        .iter()
        .find(|(required, _)| symptoms.all_present(required))
        .map(|(_, condition)| *condition)
        .unwrap_or(Condition::Uncertain);

    SymptomAssessment {
        strategy: ScoringStrategy::ExactRule,
        condition,
        score: None,
    }
}

/// Strategy B: weighted points, reported only when the leader reaches the minimum score.
pub fn additive_score(symptoms: &SymptomVector) -> SymptomAssessment {
    let (leader, score) = ScoreTable::from_symptoms(symptoms).leader();
    let condition = if score < MIN_ADDITIVE_SCORE {
        Condition::Uncertain
    } else {
        leader
    };

    SymptomAssessment {
        strategy: ScoringStrategy::Additive,
        condition,
        score: Some(score),
    }
}
