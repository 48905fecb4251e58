use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::matching::MatchScorer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    #[allow(dead_code)]
    pub config: Config,
    /// Scorer used by every view that displays a match score. Default: WeightedMatchScorer.
    pub match_scorer: Arc<dyn MatchScorer>,
}
