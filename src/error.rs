use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use serde_json::json;
use snafu::Snafu;

/// Errors originating in the relay layer.
///
/// The correlation core itself never fails a request: a missing credential
/// at dispatch time is a diagnostic event, not an error. The only failure
/// surfaced to the host is a wiring bug where the auth extractor runs on a
/// route that was never tagged with a correlation key.
#[derive(Debug, Snafu)]
pub enum RelayError {
    #[snafu(display("request reached authentication without a correlation key extension"))]
    MissingCorrelation,
}

impl RelayError {
    fn status(&self) -> StatusCode {
        match self {
            Self::MissingCorrelation => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "message": self.to_string(),
                "type": "relay_error",
            }
        });
        (self.status(), Json(body)).into_response()
    }
}
