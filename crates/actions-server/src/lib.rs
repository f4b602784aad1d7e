pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: state::AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Events (SSE)
        .route("/api/events", get(routes::events::sse_events))
        // Actions
        .route(
            "/api/actions",
            get(routes::actions::list_actions)
                .post(routes::actions::add_action)
                .put(routes::actions::upsert_action)
                .delete(routes::actions::delete_action),
        )
        .route("/api/view", get(routes::actions::get_view))
        // Drafts
        .route("/api/drafts", post(routes::drafts::open_draft))
        .route(
            "/api/drafts/{id}",
            get(routes::drafts::get_draft)
                .put(routes::drafts::update_draft)
                .delete(routes::drafts::discard_draft),
        )
        .route(
            "/api/drafts/{id}/commit",
            post(routes::drafts::commit_draft),
        )
        .route(
            "/api/drafts/{id}/preview",
            get(routes::drafts::preview_draft),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the settings server for the project at `root`.
pub async fn serve(root: PathBuf, port: u16, open_browser: bool) -> anyhow::Result<()> {
    let addr = format!("127.0.0.1:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(root, listener, open_browser).await
}

/// Start the settings server on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so the
/// caller can read the actual port before starting (useful when `port = 0` and
/// the OS picks a free port).
pub async fn serve_on(
    root: PathBuf,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app_state = state::AppState::load(root)?;
    let presenter = app_state.presenter.clone();
    let app = build_router(app_state);

    tracing::info!("custom actions server listening on http://localhost:{actual_port}");

    if open_browser {
        let url = format!("http://localhost:{actual_port}/api/view");
        let _ = open::that(&url);
    }

    axum::serve(listener, app).await?;
    presenter.shutdown();
    Ok(())
}
