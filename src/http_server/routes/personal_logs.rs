use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::error::AppResult;
use crate::http_server::{
    extract::UploadForm,
    schema::{MessageResponse, PersonalLogResponse},
    state::AppState,
};

pub async fn list_personal_logs(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<i64>,
) -> AppResult<Json<Vec<PersonalLogResponse>>> {
    let logs = state.personal_logs().list_for_member(member_id).await?;
    Ok(Json(logs.into_iter().map(PersonalLogResponse::from).collect()))
}

pub async fn create_personal_log(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<i64>,
    form: UploadForm,
) -> AppResult<(StatusCode, Json<PersonalLogResponse>)> {
    let title = form.field("title");
    let log = state
        .personal_logs()
        .create(member_id, title, form.file)
        .await?;
    Ok((StatusCode::CREATED, Json(log.into())))
}

pub async fn delete_personal_log(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<Json<MessageResponse>> {
    state.personal_logs().delete(id).await?;
    Ok(Json(MessageResponse::new("Personal log deleted")))
}
