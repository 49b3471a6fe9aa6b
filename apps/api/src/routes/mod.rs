pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::ingest::{self, MAX_UPLOAD_BYTES};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Sessions
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id/:kind/:format",
            get(handlers::handle_download),
        )
        // Generation
        .route(
            "/api/v1/resumes/generate",
            post(handlers::handle_generate_resume),
        )
        .route(
            "/api/v1/cover-letters/generate",
            post(handlers::handle_generate_cover_letter),
        )
        // Rendering and ingest
        .route("/api/v1/render/docx", post(handlers::handle_render_docx))
        .route(
            "/api/v1/ingest/pdf",
            post(ingest::handle_ingest_pdf).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .with_state(state)
}
