use std::collections::HashMap;

use axum::{
    Json,
    body::Bytes,
    extract::{FromRequest, Multipart, Request, multipart::MultipartError},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::error::AppError;
use crate::uploads::UploadedFile;

const BODY_REQUIRED: &str = "Request body is required";

/// JSON body whose problems are reported as `400 {"error": ...}`.
///
/// A missing body, `null` and `{}` all count as no body at all.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

impl<T> ApiJson<T>
where
    T: DeserializeOwned,
{
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AppError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(AppError::validation(BODY_REQUIRED));
        }

        let value: Value = serde_json::from_slice(bytes)
            .map_err(|_| AppError::validation("Request body must be valid JSON"))?;
        let is_empty = match &value {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            _ => false,
        };
        if is_empty {
            return Err(AppError::validation(BODY_REQUIRED));
        }

        serde_json::from_value(value)
            .map(ApiJson)
            .map_err(|e| AppError::validation(format!("Invalid request body: {e}")))
    }
}

impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        Self::from_bytes(&bytes).map_err(IntoResponse::into_response)
    }
}

/// A `multipart/form-data` upload: the `file` part plus any text fields.
///
/// Presence of the file is left to the service, so that a missing parent
/// record is reported before a missing file.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    pub fn field(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }
}

/// Keeps the status axum picked (413 for oversized bodies) with our error body.
fn multipart_error(e: MultipartError) -> Response {
    let message = e.body_text();
    log::warn!("Failed to read multipart body: {}", message);
    (e.status(), Json(json!({ "error": message }))).into_response()
}

impl<S> FromRequest<S> for UploadForm
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = match Multipart::from_request(req, state).await {
            Ok(multipart) => multipart,
            // Not a multipart request, so there is no file part
            Err(_) => return Ok(Self::default()),
        };

        let mut form = Self::default();
        loop {
            let field = match multipart.next_field().await {
                Ok(Some(field)) => field,
                Ok(None) => break,
                Err(e) => return Err(multipart_error(e)),
            };

            let name = field.name().unwrap_or_default().to_string();
            let filename = field.file_name().map(str::to_string);
            let bytes = field.bytes().await.map_err(multipart_error)?;

            match (name.as_str(), filename) {
                ("file", Some(filename)) => {
                    form.file = Some(UploadedFile {
                        filename,
                        bytes: bytes.to_vec(),
                    });
                }
                (_, None) => {
                    form.fields
                        .insert(name, String::from_utf8_lossy(&bytes).into_owned());
                }
                _ => {}
            }
        }

        Ok(form)
    }
}
