use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use standup_core::{FilterParams, NewUpdate, Update, UpdateFields, UpdateFilter, UpdatePatch};
use uuid::Uuid;

use crate::error::AppError;
use crate::AppState;

/// An update as returned to clients, with its text split into line items
#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    #[serde(flatten)]
    pub update: Update,
    pub items: Vec<String>,
}

impl From<Update> for UpdateResponse {
    fn from(update: Update) -> Self {
        let items = update.items().into_iter().map(str::to_string).collect();
        Self { update, items }
    }
}

/// Ids are opaque to clients, so a malformed one simply matches nothing
fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::update_not_found())
}

/// List updates, optionally filtered by date, date range or employee
async fn list_updates(
    State(state): State<AppState>,
    params: Result<Query<FilterParams>, QueryRejection>,
) -> Result<Json<Vec<UpdateResponse>>, AppError> {
    let Query(params) = params?;
    let filter = UpdateFilter::try_from(params)?;
    let updates = state.store.list(&filter).await?;
    Ok(Json(updates.into_iter().map(Into::into).collect()))
}

/// Create a new update
async fn create_update(
    State(state): State<AppState>,
    payload: Result<Json<UpdateFields>, JsonRejection>,
) -> Result<(StatusCode, Json<UpdateResponse>), AppError> {
    let Json(fields) = payload?;
    let new = NewUpdate::try_from(fields)?;
    let update = state.store.create(new).await?;
    tracing::debug!(id = %update.id, employee = %update.employee_name, "update created");
    Ok((StatusCode::CREATED, Json(update.into())))
}

/// Get an update by ID
async fn get_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UpdateResponse>, AppError> {
    let id = parse_id(&id)?;
    let update = state
        .store
        .get(id)
        .await?
        .ok_or_else(AppError::update_not_found)?;
    Ok(Json(update.into()))
}

/// Partially update an update
async fn modify_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateFields>, JsonRejection>,
) -> Result<Json<UpdateResponse>, AppError> {
    let id = parse_id(&id)?;
    let Json(fields) = payload?;
    let patch = UpdatePatch::try_from(fields)?;
    let update = state
        .store
        .patch(id, &patch)
        .await?
        .ok_or_else(AppError::update_not_found)?;
    Ok(Json(update.into()))
}

/// Delete an update
async fn delete_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_id(&id)?;
    if !state.store.delete(id).await? {
        return Err(AppError::update_not_found());
    }
    tracing::debug!(%id, "update deleted");
    Ok(Json(json!({ "message": "Update deleted successfully" })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/updates", get(list_updates).post(create_update))
        .route(
            "/api/updates/{id}",
            get(get_update).put(modify_update).delete(delete_update),
        )
}
