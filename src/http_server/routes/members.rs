use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::error::AppResult;
use crate::http_server::{
    extract::ApiJson,
    schema::{CreateMemberRequest, MemberResponse, MessageResponse, UpdateMemberRequest},
    state::AppState,
};

pub async fn list_members(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<MemberResponse>>> {
    let members = state.members().list().await?;
    Ok(Json(members.into_iter().map(MemberResponse::from).collect()))
}

pub async fn create_member(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<CreateMemberRequest>,
) -> AppResult<(StatusCode, Json<MemberResponse>)> {
    let (name, instrument) = request.validate()?;
    let member = state.members().create(name, instrument).await?;
    Ok((StatusCode::CREATED, Json(member.into())))
}

pub async fn get_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<Json<MemberResponse>> {
    let member = state.members().get(id).await?;
    Ok(Json(member.into()))
}

pub async fn update_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<UpdateMemberRequest>,
) -> AppResult<Json<MemberResponse>> {
    let members = state.members();
    members.get(id).await?;
    let member = members.update(id, request.validate()?).await?;
    Ok(Json(member.into()))
}

pub async fn delete_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<Json<MessageResponse>> {
    state.members().delete(id).await?;
    Ok(Json(MessageResponse::new("Member deleted")))
}
