//! Mapping engine results onto HTTP responses.

use axum::{
    Json,
    body::Body,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thumbra_core::ObjectMetadata;
use thumbra_engine::{Resolution, format_http_date};
use thumbra_error::{ThumbraError, ThumbraErrorKind};

/// Cache lifetime for real objects and 304s.
pub const LONG_CACHE: &str = "public, max-age=31536000";

/// Cache lifetime for the placeholder, short so a later upload shows up.
pub const FALLBACK_CACHE: &str = "public, max-age=3600";

/// Body text for every 500.
pub const GENERIC_ERROR: &str = "An error occurred, please try again later.";

/// An engine [`Resolution`] ready to send.
#[derive(Debug)]
pub struct ResolvedResponse(pub Resolution);

impl From<Resolution> for ResolvedResponse {
    fn from(resolution: Resolution) -> Self {
        Self(resolution)
    }
}

impl IntoResponse for ResolvedResponse {
    fn into_response(self) -> Response {
        match self.0 {
            Resolution::Found(payload) => {
                let mut headers = validator_headers(&payload.metadata);
                insert(&mut headers, header::CONTENT_TYPE, &payload.metadata.content_type);
                headers.insert(header::CONTENT_LENGTH, HeaderValue::from(payload.body.len()));
                headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(LONG_CACHE));
                if let Some(disposition) = &payload.metadata.content_disposition {
                    insert(&mut headers, header::CONTENT_DISPOSITION, disposition);
                }
                (StatusCode::OK, headers, Body::from(payload.body)).into_response()
            }
            Resolution::NotModified(metadata) => {
                let mut headers = validator_headers(&metadata);
                headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(LONG_CACHE));
                (StatusCode::NOT_MODIFIED, headers).into_response()
            }
            Resolution::Fallback(placeholder) => {
                let mut headers = HeaderMap::new();
                insert(&mut headers, header::CONTENT_TYPE, placeholder.content_type());
                headers.insert(
                    header::CONTENT_LENGTH,
                    HeaderValue::from(placeholder.body().len()),
                );
                headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(FALLBACK_CACHE));
                (
                    StatusCode::NOT_FOUND,
                    headers,
                    Body::from(placeholder.body().clone()),
                )
                    .into_response()
            }
        }
    }
}

/// A failed request: 400 for malformed locators, 500 for everything else.
#[derive(Debug)]
pub struct ApiError(pub ThumbraError);

impl<T> From<T> for ApiError
where
    T: Into<ThumbraError>,
{
    fn from(err: T) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0.kind() {
            ThumbraErrorKind::Validation(e) => {
                tracing::debug!(error = %e, "Rejected malformed request");
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": e.kind().to_string() })),
                )
                    .into_response()
            }
            _ => {
                tracing::error!(error = %self.0, "Request failed");
                internal_error()
            }
        }
    }
}

/// The generic 500, with nothing internal in the body.
pub fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": GENERIC_ERROR })),
    )
        .into_response()
}

fn validator_headers(metadata: &ObjectMetadata) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Some(e_tag) = &metadata.e_tag {
        insert(&mut headers, header::ETAG, e_tag);
    }
    if let Some(last_modified) = metadata.last_modified {
        insert(
            &mut headers,
            header::LAST_MODIFIED,
            &format_http_date(last_modified),
        );
    }
    headers
}

/// Insert a store-supplied value, skipping any that are not valid header text.
fn insert(headers: &mut HeaderMap, name: header::HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(_) => tracing::warn!(header = %name, value, "Dropping invalid header value"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chrono::{TimeZone, Utc};
    use thumbra_core::ObjectPayload;
    use thumbra_engine::Placeholder;
    use thumbra_error::{StorageError, StorageErrorKind, ValidationError, ValidationErrorKind};

    fn metadata() -> ObjectMetadata {
        ObjectMetadata {
            content_type: "image/jpeg".into(),
            length: 4,
            e_tag: Some("\"abc\"".into()),
            last_modified: Some(Utc.with_ymd_and_hms(2025, 10, 21, 23, 31, 1).unwrap()),
            content_disposition: Some("inline; filename=\"foo.jpg\"".into()),
        }
    }

    #[test]
    fn test_found_carries_every_header() {
        let payload = ObjectPayload::new(metadata(), Bytes::from_static(b"\xff\xd8\xff\xd9"));
        let response = ResolvedResponse(Resolution::Found(payload)).into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "image/jpeg");
        assert_eq!(headers[header::CONTENT_LENGTH], "4");
        assert_eq!(headers[header::CACHE_CONTROL], LONG_CACHE);
        assert_eq!(headers[header::ETAG], "\"abc\"");
        assert_eq!(headers[header::LAST_MODIFIED], "Tue, 21 Oct 2025 23:31:01 GMT");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "inline; filename=\"foo.jpg\""
        );
    }

    #[test]
    fn test_not_modified_keeps_validators_only() {
        let response = ResolvedResponse(Resolution::NotModified(metadata())).into_response();

        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        let headers = response.headers();
        assert_eq!(headers[header::ETAG], "\"abc\"");
        assert_eq!(headers[header::CACHE_CONTROL], LONG_CACHE);
        assert!(!headers.contains_key(header::CONTENT_DISPOSITION));
    }

    #[test]
    fn test_fallback_is_short_lived_404() {
        let placeholder = Placeholder::builtin().unwrap();
        let response = ResolvedResponse(Resolution::Fallback(placeholder.clone())).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "image/png");
        assert_eq!(headers[header::CACHE_CONTROL], FALLBACK_CACHE);
        assert_eq!(
            headers[header::CONTENT_LENGTH],
            placeholder.body().len().to_string().as_str()
        );
        assert!(!headers.contains_key(header::ETAG));
    }

    #[test]
    fn test_error_statuses() {
        let bad = ApiError::from(ValidationError::new(ValidationErrorKind::EmptyWiki));
        assert_eq!(bad.into_response().status(), StatusCode::BAD_REQUEST);

        let broken = ApiError::from(StorageError::new(StorageErrorKind::Transport(
            "connection reset by 10.0.0.7".into(),
        )));
        assert_eq!(
            broken.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
