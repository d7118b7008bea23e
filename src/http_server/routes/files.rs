use axum_extra::{TypedHeader, headers::Range};
use std::sync::Arc;

use tokio::fs::File;

use axum_range::{KnownSize, Ranged};

use crate::error::{AppError, AppResult};
use crate::http_server::state::AppState;
use crate::uploads::{self, UploadDir};
use axum::{
    extract::{Path, State},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};

const FILE_NOT_FOUND: &str = "File not found";

pub async fn upload_file(
    State(app_state): State<Arc<AppState>>,
    Path(filename): Path<String>,
    range: Option<TypedHeader<Range>>,
) -> AppResult<Response> {
    serve(&app_state, UploadDir::Root, &filename, range).await
}

pub async fn personal_log_file(
    State(app_state): State<Arc<AppState>>,
    Path(filename): Path<String>,
    range: Option<TypedHeader<Range>>,
) -> AppResult<Response> {
    serve(&app_state, UploadDir::PersonalLogs, &filename, range).await
}

/// Stream a stored file, honoring a `Range` header.
async fn serve(
    app_state: &AppState,
    dir: UploadDir,
    filename: &str,
    range: Option<TypedHeader<Range>>,
) -> AppResult<Response> {
    if !uploads::is_safe_name(filename) {
        log::warn!("Rejected download of unsafe name: {:?}", filename);
        return Err(AppError::not_found(FILE_NOT_FOUND));
    }

    let path = app_state.uploads.path_for(dir, filename);
    let is_file = tokio::fs::metadata(&path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(AppError::not_found(FILE_NOT_FOUND));
    }

    let file = File::open(&path).await?;
    let body = KnownSize::file(file).await?;

    let range = range.map(|TypedHeader(range)| range);
    let mut response = Ranged::new(range, body).into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(uploads::content_type(filename)),
    );
    Ok(response)
}
