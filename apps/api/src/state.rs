use std::sync::Arc;

use crate::config::Config;
use crate::screening::registry::SessionRegistry;
use crate::screening::weights::WeightStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    /// Same store the registry hands to every session.
    pub weights: Arc<WeightStore>,
    /// Read by `/health` to report the scoring endpoint.
    pub config: Config,
}
