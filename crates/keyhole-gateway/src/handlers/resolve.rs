use crate::error::{AppError, Result};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use keyhole_core::Kind;
use keyhole_resolver::{ResolveError, ResponseDescriptor};
use keyhole_router::content_type::DEFAULT_CONTENT_TYPE;
use tracing::error;

const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

pub async fn resolve_link(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    resolve(&state, Kind::Link, &id, &headers).await
}

pub async fn resolve_text(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    resolve(&state, Kind::Text, &id, &headers).await
}

pub async fn resolve_image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    resolve(&state, Kind::Image, &filename, &headers).await
}

pub async fn resolve_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    resolve(&state, Kind::File, &filename, &headers).await
}

async fn resolve(state: &AppState, kind: Kind, target: &str, headers: &HeaderMap) -> Result<Response> {
    let descriptor = state.resolver().resolve(kind, target).await?;
    render(kind, target, descriptor, headers)
}

fn render(
    kind: Kind,
    target: &str,
    descriptor: ResponseDescriptor,
    headers: &HeaderMap,
) -> Result<Response> {
    let etag = descriptor.etag_header();

    match descriptor {
        ResponseDescriptor::Redirect { location } => {
            let location = header_value(kind, target, &location)?;
            Ok((StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]).into_response())
        }
        ResponseDescriptor::Text { body } => Ok((
            [(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_CONTENT_TYPE))],
            body,
        )
            .into_response()),
        ResponseDescriptor::Binary {
            body, content_type, ..
        } => {
            let etag = header_value(kind, target, etag.as_deref().unwrap_or_default())?;
            if if_none_match(headers, &etag) {
                return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
            }

            let content_type = HeaderValue::from_str(&content_type)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
            Ok((
                [
                    (header::CONTENT_TYPE, content_type),
                    (header::ETAG, etag),
                    (
                        header::X_CONTENT_TYPE_OPTIONS,
                        HeaderValue::from_static("nosniff"),
                    ),
                ],
                body,
            )
                .into_response())
        }
    }
}

/// A stored value that cannot be sent as a header means the entry is damaged.
fn header_value(kind: Kind, target: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            error!(kind = %kind, id = target, operation = "resolve", "stored value is not a valid header");
            AppError::Resolve(ResolveError::Inconsistent {
                kind,
                id: target.to_string(),
            })
        })
}

/// Weak comparison against every tag listed in `If-None-Match`.
fn if_none_match(headers: &HeaderMap, etag: &HeaderValue) -> bool {
    let Ok(etag) = etag.to_str() else {
        return false;
    };

    headers
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .any(|candidate| candidate == "*" || candidate.trim_start_matches("W/") == etag)
}
