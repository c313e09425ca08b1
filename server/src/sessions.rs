use std::sync::Arc;

use uuid::Uuid;

use crate::hub::Hub;
use crate::state::AppState;

/// Session joined by `/ws` when no id is given.
pub const DEFAULT_SESSION: &str = "default";

pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn normalize_session_id(value: &str) -> Option<String> {
    let parsed = Uuid::parse_str(value).ok()?;
    Some(parsed.to_string())
}

/// Hubs are never evicted: a session's history lives as long as the process.
pub async fn get_or_create_session(state: &AppState, session_id: &str) -> Arc<Hub> {
    if let Some(hub) = state.sessions.read().await.get(session_id).cloned() {
        return hub;
    }
    let mut sessions = state.sessions.write().await;
    sessions
        .entry(session_id.to_string())
        .or_insert_with(|| {
            tracing::info!(session = %session_id, "creating session");
            Arc::new(Hub::new())
        })
        .clone()
}
