//! Response header middleware.

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request, Response},
    middleware::Next,
};

/// Header identifying the serving backend.
pub const BACKEND_HEADER: HeaderName = HeaderName::from_static("x-backend");

/// Value sent in [`BACKEND_HEADER`].
pub const BACKEND_NAME: &str = "Thumbra";

/// Stamp `X-Backend: Thumbra` on every response, errors included.
///
/// Use with `axum::middleware::from_fn`.
pub async fn backend_header_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(BACKEND_HEADER, HeaderValue::from_static(BACKEND_NAME));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        http::StatusCode,
        middleware,
        routing::get,
    };
    use tower::ServiceExt;

    async fn ok_handler() -> &'static str {
        "OK"
    }

    async fn failing_handler() -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn create_test_router() -> Router {
        Router::new()
            .route("/ok", get(ok_handler))
            .route("/fail", get(failing_handler))
            .layer(middleware::from_fn(backend_header_middleware))
    }

    #[tokio::test]
    async fn test_header_on_success_and_failure() {
        for (uri, status) in [
            ("/ok", StatusCode::OK),
            ("/fail", StatusCode::INTERNAL_SERVER_ERROR),
        ] {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let response = create_test_router().oneshot(request).await.unwrap();
            assert_eq!(response.status(), status);
            assert_eq!(response.headers().get(BACKEND_HEADER).unwrap(), BACKEND_NAME);
        }
    }
}
