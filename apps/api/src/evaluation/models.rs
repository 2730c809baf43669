use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::proposal::ProposalRow;
use crate::models::rfp::RfpRow;

/// Weight of the commercial score in the overall score.
pub const COMMERCIAL_WEIGHT: f64 = 0.7;
/// Weight of the technical score in the overall score.
pub const TECHNICAL_WEIGHT: f64 = 0.3;

/// overall = 0.7 × commercial + 0.3 × technical
pub fn weighted_overall(commercial: f64, technical: f64) -> f64 {
    COMMERCIAL_WEIGHT * commercial + TECHNICAL_WEIGHT * technical
}

/// Snapshot of the RFP fields the evaluator reads.
#[derive(Debug, Clone)]
pub struct RequestForScoring {
    pub title: String,
    pub description: String,
    pub budget: f64,
    pub scope_of_work: String,
}

impl From<&RfpRow> for RequestForScoring {
    fn from(rfp: &RfpRow) -> Self {
        Self {
            title: rfp.title.clone(),
            description: rfp.description.clone(),
            budget: rfp.budget,
            scope_of_work: rfp.scope_of_work.clone(),
        }
    }
}

/// Snapshot of a proposal. Only document presence is visible, never content.
#[derive(Debug, Clone)]
pub struct ProposalForScoring {
    pub rfp_id: Uuid,
    pub vendor_company: String,
    pub has_technical_document: bool,
    pub has_commercial_document: bool,
}

impl From<&ProposalRow> for ProposalForScoring {
    fn from(proposal: &ProposalRow) -> Self {
        Self {
            rfp_id: proposal.rfp_id,
            vendor_company: proposal.vendor_company.clone(),
            has_technical_document: proposal.technical_document.is_some(),
            has_commercial_document: proposal.commercial_document.is_some(),
        }
    }
}

/// Recommendation label. Open-ended: labels outside the known four are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Recommendation {
    HighlyRecommended,
    Recommended,
    NotRecommended,
    RequiresManualReview,
    Other(String),
}

impl Recommendation {
    pub fn as_str(&self) -> &str {
        match self {
            Recommendation::HighlyRecommended => "Highly Recommended",
            Recommendation::Recommended => "Recommended",
            Recommendation::NotRecommended => "Not Recommended",
            Recommendation::RequiresManualReview => "Requires Manual Review",
            Recommendation::Other(label) => label,
        }
    }
}

impl From<String> for Recommendation {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Highly Recommended" => Recommendation::HighlyRecommended,
            "Recommended" => Recommendation::Recommended,
            "Not Recommended" => Recommendation::NotRecommended,
            "Requires Manual Review" => Recommendation::RequiresManualReview,
            _ => Recommendation::Other(label),
        }
    }
}

impl From<Recommendation> for String {
    fn from(recommendation: Recommendation) -> Self {
        match recommendation {
            Recommendation::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

/// Structured assessment of a proposal. Immutable once produced; the caller persists it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    #[serde(deserialize_with = "lenient_score")]
    pub commercial_score: f64,
    #[serde(deserialize_with = "lenient_score")]
    pub technical_score: f64,
    #[serde(deserialize_with = "lenient_score")]
    pub overall_score: f64,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendation: Recommendation,
    pub detailed_analysis: String,
}

impl EvaluationResult {
    /// Checks that every score is a finite number within 0–100.
    pub fn validate(&self) -> Result<(), String> {
        for (name, score) in [
            ("commercial_score", self.commercial_score),
            ("technical_score", self.technical_score),
            ("overall_score", self.overall_score),
        ] {
            if !score.is_finite() || !(0.0..=100.0).contains(&score) {
                return Err(format!("{name} out of range: {score}"));
            }
        }
        Ok(())
    }
}

/// Accepts `85`, `85.5` or `"85"`. Models are not consistent about quoting numbers.
fn lenient_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| D::Error::custom("score is not representable as f64")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| D::Error::custom(format!("score {s:?} is not numeric: {e}"))),
        other => Err(D::Error::custom(format!("expected a numeric score, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_overall_is_70_30() {
        assert!((weighted_overall(85.0, 78.0) - 82.9).abs() < 1e-9);
        assert!((weighted_overall(100.0, 0.0) - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_known_recommendations_round_trip_labels() {
        for label in [
            "Highly Recommended",
            "Recommended",
            "Not Recommended",
            "Requires Manual Review",
        ] {
            let rec = Recommendation::from(label.to_string());
            assert!(!matches!(rec, Recommendation::Other(_)), "{label} parsed as Other");
            assert_eq!(rec.as_str(), label);
        }
    }

    #[test]
    fn test_unknown_recommendation_is_preserved() {
        let rec: Recommendation = serde_json::from_str(r#""Conditionally Recommended""#).unwrap();
        assert_eq!(rec, Recommendation::Other("Conditionally Recommended".to_string()));
        assert_eq!(
            serde_json::to_string(&rec).unwrap(),
            r#""Conditionally Recommended""#
        );
    }

    #[test]
    fn test_scores_accept_integers_and_numeric_strings() {
        let json = r#"{
            "commercial_score": 85,
            "technical_score": "78.5",
            "overall_score": 82.4,
            "strengths": ["a"],
            "weaknesses": [],
            "recommendation": "Recommended",
            "detailed_analysis": "ok"
        }"#;
        let result: EvaluationResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.commercial_score, 85.0);
        assert_eq!(result.technical_score, 78.5);
        assert_eq!(result.recommendation, Recommendation::Recommended);
    }

    #[test]
    fn test_missing_field_fails_to_parse() {
        let json = r#"{"commercial_score": 85, "technical_score": 78}"#;
        assert!(serde_json::from_str::<EvaluationResult>(json).is_err());
    }

    #[test]
    fn test_non_numeric_score_fails_to_parse() {
        let json = r#"{
            "commercial_score": "high",
            "technical_score": 78,
            "overall_score": 82,
            "strengths": [], "weaknesses": [],
            "recommendation": "Recommended",
            "detailed_analysis": ""
        }"#;
        assert!(serde_json::from_str::<EvaluationResult>(json).is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_scores() {
        let result = EvaluationResult {
            commercial_score: 120.0,
            technical_score: 50.0,
            overall_score: 99.0,
            strengths: vec![],
            weaknesses: vec![],
            recommendation: Recommendation::Recommended,
            detailed_analysis: String::new(),
        };
        let err = result.validate().unwrap_err();
        assert!(err.contains("commercial_score"));
    }
}
