use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};

use crate::error::AppResult;
use crate::http_server::{
    extract::ApiJson,
    schema::{
        CreateSuggestionRequest, MessageResponse, SuggestionResponse, VoteRequest,
        delete_password,
    },
    state::AppState,
};

pub async fn list_suggestions(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<SuggestionResponse>>> {
    let suggestions = state.suggestions().list().await?;
    Ok(Json(
        suggestions
            .into_iter()
            .map(SuggestionResponse::from)
            .collect(),
    ))
}

pub async fn create_suggestion(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<CreateSuggestionRequest>,
) -> AppResult<(StatusCode, Json<SuggestionResponse>)> {
    let suggestion = state
        .suggestions()
        .create(
            request.title.as_deref(),
            request.artist.as_deref(),
            request.link.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(suggestion.into())))
}

pub async fn vote_suggestion(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<VoteRequest>,
) -> AppResult<Json<SuggestionResponse>> {
    let suggestions = state.suggestions();
    let suggestion = suggestions.vote(id, request.validate()?).await?;
    Ok(Json(suggestion.into()))
}

/// Takes the raw body: a missing or malformed body is just a wrong password.
pub async fn delete_suggestion(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    body: Bytes,
) -> AppResult<Json<MessageResponse>> {
    let password = delete_password(&body);
    state
        .suggestions()
        .delete(
            id,
            password.as_deref(),
            state.config.suggestion_delete_password(),
        )
        .await?;
    Ok(Json(MessageResponse::new("Suggestion deleted")))
}
