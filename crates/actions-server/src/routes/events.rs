use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use std::convert::Infallible;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt as _;

use crate::state::AppState;

/// GET /api/events: SSE stream that emits `update` with the ordered snapshot
/// whenever the presenter's list changes.
pub async fn sse_events(State(app): State<AppState>) -> impl axum::response::IntoResponse {
    let rx = app.presenter.subscribe();
    let stream = WatchStream::new(rx).map(|state| {
        let data = serde_json::to_string(&state).unwrap_or_default();
        Ok::<Event, Infallible>(Event::default().event("update").data(data))
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}
