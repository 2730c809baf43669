use sqlx::PgPool;

use crate::config::Config;
use crate::evaluation::evaluator::Evaluator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// `None` when no LLM credential is configured; evaluation is then refused.
    pub evaluator: Option<Evaluator>,
}
