use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Instrument;

use crate::correlation::CorrelationKey;

/// Header carrying the request identifier, honored inbound and echoed back.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Axum middleware that assigns a [`CorrelationKey`] to every request.
///
/// A non-empty client-supplied `x-request-id` is kept so the caller can
/// correlate its own logs; otherwise a fresh key is generated. The key is
/// stored as a request extension for the downstream hooks, echoed in the
/// response header, and attached to the tracing span so every log line for
/// the request carries it.
pub async fn tag_request(mut request: Request, next: Next) -> Response {
    let key = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(CorrelationKey::from_client)
        .unwrap_or_default();

    request.extensions_mut().insert(key.clone());

    let span = tracing::debug_span!("request", key = %key);
    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(key.as_str()) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }
    response
}
