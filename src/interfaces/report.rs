//! Plain-text rendering of analysis results for terminals.

use std::fmt::Write;

use crate::application::{AnalysisResponse, CaseListResponse};

pub const NO_MATCHES: &str = "No similar cases found in the database.";

/// Renders every match the way the detector presents them: a numbered block
/// per match, with high-risk scores called out as warnings.
pub fn render_analysis(response: &AnalysisResponse) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Results:");

    if response.matches.is_empty() {
        let _ = writeln!(out, "{NO_MATCHES}");
        return out;
    }

    for m in &response.matches {
        let _ = writeln!(out, "Match {}:", m.rank);
        let _ = writeln!(out, "- Similar Case: {}", m.case);
        let _ = writeln!(out, "- Category: {}", m.label);
        let _ = writeln!(out, "- Similarity Score: {}", m.risk);
        if m.risk.bucket.is_warning() {
            let _ = writeln!(
                out,
                "! Warning: this message closely matches a known {} case",
                m.label
            );
        }
        let _ = writeln!(out, "---");
    }

    out
}

pub fn render_footer(model: &str, store: &str) -> String {
    format!("Model: {model} • Case store: {store}")
}

pub fn render_cases(cases: &CaseListResponse) -> String {
    let mut out = String::new();
    for (idx, case) in cases.items.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. [{}] {} ({}, {} dims)",
            idx + 1,
            case.label,
            case.text,
            case.id,
            case.dims
        );
    }
    if cases.items.is_empty() {
        let _ = writeln!(out, "Corpus is empty.");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::MatchDto;
    use crate::domain::{classify, CaseSummary};
    use chrono::Utc;
    use uuid::Uuid;

    fn response(scores: &[(&str, f32)]) -> AnalysisResponse {
        AnalysisResponse {
            message: "msg".into(),
            model: "m".into(),
            matches: scores
                .iter()
                .enumerate()
                .map(|(idx, (label, score))| MatchDto {
                    rank: idx + 1,
                    case_id: Uuid::new_v4(),
                    case: format!("{label} text"),
                    label: label.to_string(),
                    score: *score,
                    risk: classify(*score),
                })
                .collect(),
            analyzed_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_results() {
        let text = render_analysis(&response(&[]));
        assert!(text.contains(NO_MATCHES));
        assert!(!text.contains("Match 1"));
    }

    #[test]
    fn test_match_blocks() {
        let text = render_analysis(&response(&[("Phishing", 0.5), ("Lottery Scam", 0.1)]));
        assert!(text.contains("Match 1:\n- Similar Case: Phishing text\n- Category: Phishing"));
        assert!(text.contains("- Similarity Score: 50.00% (Medium Risk)"));
        assert!(text.contains("Match 2:"));
        assert!(text.contains("10.00% (Low Risk)"));
        assert!(!text.contains("Warning"));
    }

    #[test]
    fn test_high_risk_is_flagged() {
        let text = render_analysis(&response(&[("Phishing", 0.9)]));
        assert!(text.contains("HIGH RISK"));
        assert!(text.contains("Warning: this message closely matches a known Phishing case"));
    }

    #[test]
    fn test_render_cases() {
        let list = CaseListResponse {
            items: vec![CaseSummary {
                id: Uuid::nil(),
                text: "Pay now".into(),
                label: "Phishing".into(),
                dims: 384,
            }],
        };
        let text = render_cases(&list);
        assert!(text.starts_with("1. [Phishing] Pay now"));
        assert!(render_cases(&CaseListResponse { items: vec![] }).contains("empty"));
    }

    #[test]
    fn test_footer() {
        assert_eq!(render_footer("mini", "memory"), "Model: mini • Case store: memory");
    }
}
