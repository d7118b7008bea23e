use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};

use crate::error::AppResult;
use crate::http_server::{
    extract::ApiJson,
    schema::{MediaResponse, MessageResponse, RenameMediaRequest},
    state::AppState,
};

pub async fn rename_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<RenameMediaRequest>,
) -> AppResult<Json<MediaResponse>> {
    let name = request.validate()?;
    let media = state.media().rename(id, &name).await?;
    Ok(Json(media.into()))
}

pub async fn delete_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<Json<MessageResponse>> {
    state.media().delete(id).await?;
    Ok(Json(MessageResponse::new("Media deleted")))
}
