//! Prevention and advice text for each condition.

use crate::condition::Condition;

/// A diagnosis label together with its user-facing guidance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagnosisResult {
    pub condition: Condition,
    pub diagnosis: &'static str,
    pub prevention: &'static str,
    pub advice: &'static str,
}

impl DiagnosisResult {
    pub fn for_condition(condition: Condition) -> Self {
        Self {
            condition,
            diagnosis: condition.display_name(),
            prevention: prevention(condition),
            advice: advice(condition),
        }
    }
}

pub fn prevention(condition: Condition) -> &'static str {
    match condition {
        Condition::Herpes => "Use protection during sex; avoid contact during outbreaks.",
        Condition::Gonorrhea => "Practice safe sex; get regular STI screenings.",
        Condition::Syphilis => "Avoid risky sexual behavior; use condoms.",
        Condition::Uncertain => "Practice safe sex; get regular health check-ups.",
    }
}

pub fn advice(condition: Condition) -> &'static str {
    match condition {
        Condition::Herpes => {
            "Consult a dermatologist or healthcare provider for antiviral treatment."
        }
        Condition::Gonorrhea => "See a doctor immediately for antibiotic treatment.",
        Condition::Syphilis => "Early treatment with penicillin is essential.",
        Condition::Uncertain => "Consult a healthcare professional for a proper diagnosis.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guidance_text_is_verbatim() {
        let hsv = DiagnosisResult::for_condition(Condition::Herpes);
        assert_eq!(hsv.diagnosis, "Herpes Simplex Virus (HSV)");
        assert_eq!(
            hsv.prevention,
            "Use protection during sex; avoid contact during outbreaks."
        );
        assert_eq!(
            hsv.advice,
            "Consult a dermatologist or healthcare provider for antiviral treatment."
        );

        let uncertain = DiagnosisResult::for_condition(Condition::Uncertain);
        assert_eq!(uncertain.diagnosis, "Uncertain");
        assert_eq!(
            uncertain.prevention,
            "Practice safe sex; get regular health check-ups."
        );
        assert_eq!(
            uncertain.advice,
            "Consult a healthcare professional for a proper diagnosis."
        );
    }

    #[test]
    fn test_every_condition_has_guidance() {
        for condition in [
            Condition::Herpes,
            Condition::Gonorrhea,
            Condition::Syphilis,
            Condition::Uncertain,
        ] {
            let result = DiagnosisResult::for_condition(condition);
            assert!(!result.prevention.is_empty());
            assert!(!result.advice.is_empty());
        }
    }
}
