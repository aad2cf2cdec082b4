use crate::error::{AppError, Result};
use crate::model::{CreateBody, CreateResponse};
use crate::state::AppState;
use axum::extract::multipart::MultipartError;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use keyhole_core::{Extension, Kind};
use keyhole_router::{BlobUpload, CreateRequest};

/// Clients send this for any part they cannot type; it says nothing about the file.
const UNTYPED_PART: &str = "application/octet-stream";

/// `POST /create`: a JSON `{kind, payload}` body, or a multipart form for uploads.
pub async fn create_handler(State(state): State<AppState>, request: Request) -> Result<Response> {
    let create = if is_multipart(&request) {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|err| AppError::MalformedBody(err.body_text()))?;
        read_form(multipart).await?.into_request()
    } else {
        let body = Bytes::from_request(request, &state)
            .await
            .map_err(|err| AppError::MalformedBody(err.body_text()))?;
        let body: CreateBody = serde_json::from_slice(&body)
            .map_err(|err| AppError::MalformedBody(err.to_string()))?;
        CreateRequest::text(body.kind, body.payload)
    };

    let created = state.publisher().create(create).await?;
    let response = CreateResponse {
        id: created.id.to_string(),
        url: state.public_url(&created.url),
    };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| {
            value
                .trim_start()
                .to_ascii_lowercase()
                .starts_with("multipart/form-data")
        })
}

struct FilePart {
    body: Bytes,
    file_name: Option<String>,
    content_type: Option<String>,
}

#[derive(Default)]
struct CreateForm {
    kind: Option<String>,
    payload: Option<String>,
    file: Option<FilePart>,
    ext: Option<String>,
    content_type: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> Result<CreateForm> {
    let mut form = CreateForm::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        match name.as_str() {
            "kind" => form.kind = Some(field.text().await.map_err(malformed)?),
            "payload" => form.payload = Some(field.text().await.map_err(malformed)?),
            "ext" => form.ext = Some(field.text().await.map_err(malformed)?),
            "content_type" => form.content_type = Some(field.text().await.map_err(malformed)?),
            "file" => {
                let file_name = field.file_name().map(str::to_owned);
                let content_type = field.content_type().map(str::to_owned);
                let body = field.bytes().await.map_err(malformed)?;
                form.file = Some(FilePart {
                    body,
                    file_name,
                    content_type,
                });
            }
            _ => {}
        }
    }

    Ok(form)
}

fn malformed(err: MultipartError) -> AppError {
    AppError::MalformedBody(err.body_text())
}

impl CreateForm {
    fn into_request(self) -> CreateRequest {
        let kind = self.kind.unwrap_or_default();
        let ext = self.ext.filter(|ext| !ext.is_empty());
        let content_type = self.content_type.filter(|ct| !ct.is_empty());

        if let Some(file) = self.file {
            let upload = BlobUpload {
                body: Some(file.body),
                ext: ext.or_else(|| file.file_name.as_deref().and_then(extension_of)),
                content_type: content_type
                    .or_else(|| file.content_type.filter(|ct| ct != UNTYPED_PART)),
            };
            return CreateRequest::blob(kind, upload);
        }

        match self.payload {
            Some(payload) => CreateRequest::text(kind, payload),
            None if kind.parse::<Kind>().is_ok_and(Kind::is_blob) => {
                CreateRequest::blob(kind, BlobUpload::default())
            }
            None => CreateRequest::text(kind, String::new()),
        }
    }
}

/// The extension of an uploaded file name, if it is one we could store.
fn extension_of(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    Extension::parse(ext).ok().map(|ext| ext.bare().to_string())
}
