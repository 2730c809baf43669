//! Proposal Evaluator: scores a proposal against its RFP via the text-generation collaborator.
//!
//! Flow: build prompt → one `generate()` call → extract first `{...}` → parse + validate.
//!
//! The evaluator never fails once built. Unreadable model output yields the
//! "unparseable" fallback; a failed call yields the "unreachable" fallback.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::evaluation::extract::first_json_object;
use crate::evaluation::models::{
    weighted_overall, EvaluationResult, ProposalForScoring, Recommendation, RequestForScoring,
};
use crate::evaluation::prompts::{
    fill_template, BUDGET_CURRENCY, EVALUATION_PROMPT_TEMPLATE, EVALUATION_SYSTEM,
};
use crate::llm_client::{ConfigurationError, LlmClient, LlmError, TextGenerator};

// ────────────────────────────────────────────────────────────────────────────
// Fallback policy constants
// ────────────────────────────────────────────────────────────────────────────

/// Model answered, but its output could not be understood.
pub const FALLBACK_UNPARSEABLE_COMMERCIAL: f64 = 75.0;
pub const FALLBACK_UNPARSEABLE_TECHNICAL: f64 = 70.0;
pub const FALLBACK_UNPARSEABLE_OVERALL: f64 = 73.5;
pub const FALLBACK_UNPARSEABLE_STRENGTHS: [&str; 3] =
    ["Competitive pricing", "Good technical approach", "Timely submission"];
pub const FALLBACK_UNPARSEABLE_WEAKNESSES: [&str; 3] =
    ["Limited experience", "Basic proposal format", "Missing some details"];
pub const FALLBACK_UNPARSEABLE_ANALYSIS: &str = "AI evaluation completed with standard scoring.";

/// The model could not be reached at all.
pub const FALLBACK_UNREACHABLE_COMMERCIAL: f64 = 70.0;
pub const FALLBACK_UNREACHABLE_TECHNICAL: f64 = 65.0;
pub const FALLBACK_UNREACHABLE_OVERALL: f64 = 68.5;
pub const FALLBACK_UNREACHABLE_STRENGTHS: [&str; 3] =
    ["Proposal submitted", "Meets basic requirements", "Vendor participation"];
pub const FALLBACK_UNREACHABLE_WEAKNESSES: [&str; 3] =
    ["Evaluation error", "Limited assessment", "Manual review needed"];

const EXPECTED_LIST_LEN: usize = 3;

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Fallback used when the call succeeded but the reply held no usable JSON.
pub fn unparseable_fallback() -> EvaluationResult {
    EvaluationResult {
        commercial_score: FALLBACK_UNPARSEABLE_COMMERCIAL,
        technical_score: FALLBACK_UNPARSEABLE_TECHNICAL,
        overall_score: FALLBACK_UNPARSEABLE_OVERALL,
        strengths: to_strings(&FALLBACK_UNPARSEABLE_STRENGTHS),
        weaknesses: to_strings(&FALLBACK_UNPARSEABLE_WEAKNESSES),
        recommendation: Recommendation::Recommended,
        detailed_analysis: FALLBACK_UNPARSEABLE_ANALYSIS.to_string(),
    }
}

/// Fallback used when the call itself failed. The analysis names the failure.
pub fn unreachable_fallback(error: &LlmError) -> EvaluationResult {
    EvaluationResult {
        commercial_score: FALLBACK_UNREACHABLE_COMMERCIAL,
        technical_score: FALLBACK_UNREACHABLE_TECHNICAL,
        overall_score: FALLBACK_UNREACHABLE_OVERALL,
        strengths: to_strings(&FALLBACK_UNREACHABLE_STRENGTHS),
        weaknesses: to_strings(&FALLBACK_UNREACHABLE_WEAKNESSES),
        recommendation: Recommendation::RequiresManualReview,
        detailed_analysis: format!(
            "AI evaluation encountered an error: {error}. Manual review recommended."
        ),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Evaluator
// ────────────────────────────────────────────────────────────────────────────

/// Stateless proposal evaluator. Cheap to clone; concurrent calls share nothing
/// but the generator handle.
#[derive(Clone)]
pub struct Evaluator {
    generator: Arc<dyn TextGenerator>,
}

impl Evaluator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Builds an evaluator backed by the chat-completions client.
    /// A missing credential is reported here, before any network attempt.
    pub fn from_credential(
        api_key: Option<String>,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, ConfigurationError> {
        let client = LlmClient::new(api_key, base_url, timeout)?;
        Ok(Self::new(Arc::new(client)))
    }

    /// Evaluates `proposal` against `request`. Makes exactly one model call.
    pub async fn evaluate(
        &self,
        proposal: &ProposalForScoring,
        request: &RequestForScoring,
    ) -> EvaluationResult {
        let prompt = build_prompt(proposal, request);

        let raw = match self.generator.generate(&prompt, EVALUATION_SYSTEM).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    rfp_id = %proposal.rfp_id,
                    "AI evaluation call failed, using manual-review fallback: {e}"
                );
                return unreachable_fallback(&e);
            }
        };

        match parse_evaluation(&raw) {
            Ok(result) => {
                info!(
                    rfp_id = %proposal.rfp_id,
                    overall_score = result.overall_score,
                    "AI evaluation completed: {}",
                    result.recommendation.as_str()
                );
                result
            }
            Err(reason) => {
                warn!(
                    rfp_id = %proposal.rfp_id,
                    "AI evaluation output unusable, using standard fallback: {reason}"
                );
                unparseable_fallback()
            }
        }
    }
}

/// Renders the evaluation prompt. Values are interpolated verbatim.
pub fn build_prompt(proposal: &ProposalForScoring, request: &RequestForScoring) -> String {
    let budget = request.budget.to_string();
    fill_template(
        EVALUATION_PROMPT_TEMPLATE,
        &[
            ("title", request.title.as_str()),
            ("budget", budget.as_str()),
            ("currency", BUDGET_CURRENCY),
            ("description", request.description.as_str()),
            ("scope_of_work", request.scope_of_work.as_str()),
            ("vendor_company", proposal.vendor_company.as_str()),
            (
                "commercial_document",
                presence(proposal.has_commercial_document),
            ),
            (
                "technical_document",
                presence(proposal.has_technical_document),
            ),
        ],
    )
}

fn presence(present: bool) -> &'static str {
    if present {
        "Available"
    } else {
        "Missing"
    }
}

/// Extracts, parses and validates an `EvaluationResult` from raw model output.
fn parse_evaluation(raw: &str) -> Result<EvaluationResult, String> {
    let json = first_json_object(raw).ok_or_else(|| "no JSON object in response".to_string())?;
    let result: EvaluationResult =
        serde_json::from_str(json).map_err(|e| format!("invalid evaluation JSON: {e}"))?;
    result.validate()?;

    let weighted = weighted_overall(result.commercial_score, result.technical_score);
    if (weighted - result.overall_score).abs() > 1.0 {
        tracing::debug!(
            "Model overall_score {} differs from 70/30 weighting ({weighted:.1}); keeping model value",
            result.overall_score
        );
    }
    if result.strengths.len() != EXPECTED_LIST_LEN || result.weaknesses.len() != EXPECTED_LIST_LEN
    {
        tracing::debug!(
            "Model returned {} strengths and {} weaknesses (expected {EXPECTED_LIST_LEN} each)",
            result.strengths.len(),
            result.weaknesses.len()
        );
    }

    Ok(result)
}
