// Proposal evaluation: prompt construction, one model call, JSON extraction, fallbacks.
// All model calls go through llm_client::TextGenerator, never a provider SDK.

pub mod evaluator;
pub mod extract;
pub mod models;
pub mod prompts;
