use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Known fraud case together with its embedding.
///
/// Cases are created once when the corpus is seeded and never mutated
/// afterwards; ranking only ever borrows them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub id: Uuid,
    pub text: String,
    pub label: String,
    pub embedding: CaseEmbedding,
}

impl Case {
    pub fn new(
        text: impl Into<String>,
        label: impl Into<String>,
        embedding: CaseEmbedding,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            label: sanitize_label(label),
            embedding,
        }
    }

    pub fn as_summary(&self) -> CaseSummary {
        CaseSummary {
            id: self.id,
            text: self.text.clone(),
            label: self.label.clone(),
            dims: self.embedding.dims(),
        }
    }
}

/// Lightweight projection used for corpus listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseSummary {
    pub id: Uuid,
    pub text: String,
    pub label: String,
    pub dims: usize,
}

/// Seed entry: raw case text and its fraud category.
///
/// The field names follow the payload layout of the sample corpus
/// (`{"case": ..., "label": ...}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseSeed {
    #[serde(rename = "case")]
    pub text: String,
    pub label: String,
}

impl CaseSeed {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }
}

/// Vector representation of a case, tagged with the model that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseEmbedding {
    pub model: String,
    pub vector: Vec<f32>,
}

impl CaseEmbedding {
    pub fn new(model: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            model: model.into(),
            vector,
        }
    }

    pub fn dims(&self) -> usize {
        self.vector.len()
    }
}

/// A ranked candidate. Borrows the case from the snapshot it was ranked from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match<'a> {
    pub case: &'a Case,
    pub score: f32,
}

/// The three sample cases used to seed an empty corpus.
pub fn sample_cases() -> Vec<CaseSeed> {
    vec![
        CaseSeed::new(
            "Your bank account is blocked. Click this link to verify your identity.",
            "Phishing",
        ),
        CaseSeed::new(
            "Congratulations! You won 10,00,000 INR. Fill your card details to claim.",
            "Lottery Scam",
        ),
        CaseSeed::new(
            "Your Netflix subscription expired. Pay ₹499 immediately to avoid account suspension.",
            "Subscription Scam",
        ),
    ]
}

fn sanitize_label(input: impl Into<String>) -> String {
    input
        .into()
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_gets_fresh_id() {
        let a = Case::new("a", "Phishing", CaseEmbedding::new("m", vec![1.0]));
        let b = Case::new("a", "Phishing", CaseEmbedding::new("m", vec![1.0]));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_label_is_single_line() {
        let case = Case::new("x", "  Lottery Scam \nextra", CaseEmbedding::new("m", vec![]));
        assert_eq!(case.label, "Lottery Scam");
    }

    #[test]
    fn test_seed_uses_case_key() {
        let seeds: Vec<CaseSeed> =
            serde_json::from_str(r#"[{"case": "Pay now", "label": "Phishing"}]"#).unwrap();
        assert_eq!(seeds, vec![CaseSeed::new("Pay now", "Phishing")]);
    }

    #[test]
    fn test_sample_corpus() {
        let labels: Vec<String> = sample_cases().into_iter().map(|s| s.label).collect();
        assert_eq!(labels, ["Phishing", "Lottery Scam", "Subscription Scam"]);
    }
}
