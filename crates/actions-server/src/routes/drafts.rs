use actions_core::view::{self, View};
use actions_core::{presenter::ordered, Action, DraftState, SharedDraft};
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt as _;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OpenBody {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct DraftResponse {
    pub id: Uuid,
    pub state: DraftState,
    pub dirty: bool,
    pub draft: Action,
    pub view: View,
}

async fn lookup(app: &AppState, id: Uuid) -> Result<SharedDraft, AppError> {
    app.draft(id)
        .await
        .ok_or_else(|| AppError::not_found(format!("draft '{id}' not found")))
}

async fn respond(id: Uuid, draft: &SharedDraft) -> DraftResponse {
    let draft = draft.lock().await;
    DraftResponse {
        id,
        state: draft.state(),
        dirty: draft.is_dirty(),
        draft: draft.draft(),
        view: view::render_editor(&draft),
    }
}

/// POST /api/drafts: open an edit session for a committed action
pub async fn open_draft(
    State(app): State<AppState>,
    Json(body): Json<OpenBody>,
) -> Result<Json<DraftResponse>, AppError> {
    app.presenter.load().await?;
    let controller = app.presenter.open_draft(&body.url)?;
    let (id, draft) = app.drafts.open(controller).await;
    tracing::debug!(%id, url = %body.url, "draft session opened");
    Ok(Json(respond(id, &draft).await))
}

/// GET /api/drafts/{id}: editor view of a draft
pub async fn get_draft(
    State(app): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DraftResponse>, AppError> {
    let draft = lookup(&app, id).await?;
    Ok(Json(respond(id, &draft).await))
}

/// PUT /api/drafts/{id}: replace the draft with the posted value
pub async fn update_draft(
    State(app): State<AppState>,
    Path(id): Path<Uuid>,
    Json(next): Json<Action>,
) -> Result<Json<DraftResponse>, AppError> {
    let draft = lookup(&app, id).await?;
    draft.lock().await.update(next)?;
    Ok(Json(respond(id, &draft).await))
}

#[derive(Debug, Serialize)]
pub struct CommitResponse {
    pub action: Action,
    pub actions: Vec<Action>,
}

/// POST /api/drafts/{id}/commit: save intent. A failed commit keeps the
/// session open so the edit is not lost.
pub async fn commit_draft(
    State(app): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CommitResponse>, AppError> {
    let draft = lookup(&app, id).await?;
    let commit = {
        let mut guard = draft.lock().await;
        app.presenter.on_save_intent(&mut guard).await?
    };
    app.drafts.remove(id).await;
    Ok(Json(CommitResponse {
        action: commit.action,
        actions: ordered(commit.actions),
    }))
}

/// DELETE /api/drafts/{id}: discard the draft
pub async fn discard_draft(
    State(app): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let draft = app
        .drafts
        .remove(id)
        .await
        .ok_or_else(|| AppError::not_found(format!("draft '{id}' not found")))?;
    draft.lock().await.discard()?;
    Ok(Json(serde_json::json!({ "discarded": true })))
}

/// GET /api/drafts/{id}/preview: SSE stream of the rendered draft preview,
/// one `preview` event per update.
pub async fn preview_draft(
    State(app): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, AppError> {
    let draft = lookup(&app, id).await?;
    let rx = draft.lock().await.subscribe();
    let stream = WatchStream::new(rx).map(|action| {
        let item = view::render_item(&action);
        let data = serde_json::to_string(&item).unwrap_or_default();
        Ok::<Event, Infallible>(Event::default().event("preview").data(data))
    });
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
