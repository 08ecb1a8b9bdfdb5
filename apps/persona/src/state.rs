use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::chat::ChatEngine;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything behind it is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ChatEngine>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(engine: ChatEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            started_at: Utc::now(),
        }
    }
}
