use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    middleware::Next,
    response::Response,
};

/// Rejects body-carrying requests that are not `application/json`.
///
/// Only applies to `POST`/`PUT`/`PATCH` with a declared non-empty body, so
/// body-less posts (mark-read) and plain `GET`s pass through untouched.
///
/// # Errors
///
/// Returns `StatusCode::UNSUPPORTED_MEDIA_TYPE` when a body is declared with
/// a missing or non-JSON content-type.
pub async fn require_json_body(request: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    let has_body_method =
        matches!(*request.method(), Method::POST | Method::PUT | Method::PATCH);

    let declares_body = request
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|len| len != "0") ||
        request.headers().contains_key("transfer-encoding");

    if has_body_method && declares_body {
        let content_type = request
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if !content_type.starts_with("application/json") {
            tracing::warn!(content_type, "non-JSON body rejected");
            return Err(StatusCode::UNSUPPORTED_MEDIA_TYPE);
        }
    }

    Ok(next.run(request).await)
}
