use actions_core::presenter::ordered;
use actions_core::view::View;
use actions_core::{Action, DraftController, FormFields};
use axum::{extract::State, Json};
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::AppError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct FormField {
    pub name: String,
    pub value: String,
}

/// Form input for the add intent: either the submitted inputs in document
/// order, or a plain object when order does not matter.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AddBody {
    Inputs(Vec<FormField>),
    Object(BTreeMap<String, String>),
}

impl AddBody {
    pub fn into_fields(self) -> FormFields {
        match self {
            AddBody::Inputs(inputs) => inputs.into_iter().map(|f| (f.name, f.value)).collect(),
            AddBody::Object(map) => map.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// List / view
// ---------------------------------------------------------------------------

/// GET /api/actions: committed actions in presentation order
pub async fn list_actions(State(app): State<AppState>) -> Result<Json<Vec<Action>>, AppError> {
    app.presenter.load().await?;
    Ok(Json(app.presenter.snapshot().actions))
}

/// GET /api/view: rendered list with its intents
pub async fn get_view(State(app): State<AppState>) -> Json<View> {
    // A failed reload is shown as a notice inside the view itself.
    let _ = app.presenter.load().await;
    Json(app.presenter.view())
}

// ---------------------------------------------------------------------------
// Intents
// ---------------------------------------------------------------------------

/// POST /api/actions: add intent
pub async fn add_action(
    State(app): State<AppState>,
    Json(body): Json<AddBody>,
) -> Result<Json<Vec<Action>>, AppError> {
    let actions = app.presenter.on_add_intent(body.into_fields()).await?;
    Ok(Json(ordered(actions)))
}

/// PUT /api/actions: save intent for a complete action, as a one-shot draft
pub async fn upsert_action(
    State(app): State<AppState>,
    Json(action): Json<Action>,
) -> Result<Json<Vec<Action>>, AppError> {
    let mut draft = DraftController::new(app.presenter.store().clone(), action);
    let commit = app.presenter.on_save_intent(&mut draft).await?;
    Ok(Json(ordered(commit.actions)))
}

/// DELETE /api/actions: delete intent (body: the action to remove)
pub async fn delete_action(
    State(app): State<AppState>,
    Json(action): Json<Action>,
) -> Result<Json<Vec<Action>>, AppError> {
    let actions = app.presenter.on_delete_intent(&action).await?;
    Ok(Json(ordered(actions)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
