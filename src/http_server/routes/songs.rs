use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::error::AppResult;
use crate::http_server::{
    extract::{ApiJson, UploadForm},
    schema::{
        CreateSongRequest, MediaResponse, MessageResponse, SongQuery, SongResponse,
        UpdateSongRequest,
    },
    state::AppState,
};

pub async fn list_songs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SongQuery>,
) -> AppResult<Json<Vec<SongResponse>>> {
    let songs = state.songs().list(&query.into()).await?;
    Ok(Json(songs.into_iter().map(SongResponse::from).collect()))
}

pub async fn get_song(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<Json<SongResponse>> {
    let song = state.songs().get(id).await?;
    let media = state.media().list_for_song(id).await?;
    Ok(Json(SongResponse::from(song).with_media(media)))
}

pub async fn create_song(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<CreateSongRequest>,
) -> AppResult<(StatusCode, Json<SongResponse>)> {
    let song = state.songs().create(request.validate()?).await?;
    Ok((StatusCode::CREATED, Json(song.into())))
}

pub async fn update_song(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<UpdateSongRequest>,
) -> AppResult<Json<SongResponse>> {
    let songs = state.songs();
    // A missing song wins over an invalid body
    songs.get(id).await?;
    let song = songs.update(id, request.validate()?).await?;
    Ok(Json(song.into()))
}

pub async fn delete_song(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<Json<MessageResponse>> {
    state.songs().delete(id).await?;
    Ok(Json(MessageResponse::new("Song deleted")))
}

pub async fn upload_sheet_music(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    form: UploadForm,
) -> AppResult<Json<SongResponse>> {
    let song = state.media().upload_sheet_music(id, form.file).await?;
    Ok(Json(song.into()))
}

pub async fn list_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<MediaResponse>>> {
    let media = state.media().list_for_song(id).await?;
    Ok(Json(media.into_iter().map(MediaResponse::from).collect()))
}

pub async fn add_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    form: UploadForm,
) -> AppResult<(StatusCode, Json<MediaResponse>)> {
    let media = state.media().add_to_song(id, form.file).await?;
    Ok((StatusCode::CREATED, Json(media.into())))
}
