use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::error::AppResult;
use crate::http_server::{
    extract::{ApiJson, UploadForm},
    schema::{
        CreatePracticeLogRequest, MessageResponse, PracticeLogResponse, UpdatePracticeLogRequest,
    },
    state::AppState,
};

pub async fn list_practice_logs(
    State(state): State<Arc<AppState>>,
    Path(song_id): Path<i64>,
) -> AppResult<Json<Vec<PracticeLogResponse>>> {
    let logs = state.practice_logs().list_for_song(song_id).await?;
    Ok(Json(logs.into_iter().map(PracticeLogResponse::from).collect()))
}

pub async fn create_practice_log(
    State(state): State<Arc<AppState>>,
    Path(song_id): Path<i64>,
    ApiJson(request): ApiJson<CreatePracticeLogRequest>,
) -> AppResult<(StatusCode, Json<PracticeLogResponse>)> {
    let log = state
        .practice_logs()
        .create(song_id, request.validate()?)
        .await?;
    Ok((StatusCode::CREATED, Json(log.into())))
}

pub async fn get_practice_log(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<Json<PracticeLogResponse>> {
    let log = state.practice_logs().get(id).await?;
    Ok(Json(log.into()))
}

pub async fn update_practice_log(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<UpdatePracticeLogRequest>,
) -> AppResult<Json<PracticeLogResponse>> {
    let logs = state.practice_logs();
    logs.get(id).await?;
    let log = logs.update(id, request.validate()?).await?;
    Ok(Json(log.into()))
}

pub async fn delete_practice_log(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<Json<MessageResponse>> {
    state.practice_logs().delete(id).await?;
    Ok(Json(MessageResponse::new("Practice log deleted")))
}

pub async fn upload_recording(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    form: UploadForm,
) -> AppResult<Json<PracticeLogResponse>> {
    let log = state.practice_logs().attach_recording(id, form.file).await?;
    Ok(Json(log.into()))
}
