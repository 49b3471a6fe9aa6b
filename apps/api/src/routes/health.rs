use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, the LLM backend in use (`null` when no key is configured),
/// and the number of live sessions.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let llm = state.llm.as_ref().map(|client| {
        json!({
            "provider": client.provider(),
            "model": client.model(),
        })
    });

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "tailor",
        "llm": llm,
        "sessions": state.sessions.len().await,
    }))
}
