use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::database::Artist;
use crate::http_server::{error::ApiError, state::AppState};

/// Create and update share one body shape; every field is written on
/// update, so an omitted optional field nulls the column.
#[derive(Debug, Deserialize)]
pub struct ArtistPayload {
    pub name: String,
    pub genre: Option<String>,
    pub website: Option<String>,
}

pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Artist>>, ApiError> {
    Ok(Json(state.db.list_artists().await?))
}

pub async fn get_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Artist>, ApiError> {
    state
        .db
        .get_artist(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("artist"))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ArtistPayload>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let id = state
        .db
        .create_artist(
            &payload.name,
            payload.genre.as_deref(),
            payload.website.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<ArtistPayload>,
) -> Result<StatusCode, ApiError> {
    let affected = state
        .db
        .update_artist(
            id,
            &payload.name,
            payload.genre.as_deref(),
            payload.website.as_deref(),
        )
        .await?;

    if affected == 0 {
        return Err(ApiError::NotFound("artist"));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let affected = state.db.delete_artist(id).await?;

    if affected == 0 {
        return Err(ApiError::NotFound("artist"));
    }
    Ok(StatusCode::NO_CONTENT)
}
