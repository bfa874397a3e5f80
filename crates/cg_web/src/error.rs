use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cg_core::Error;
use serde_json::json;

/// JSON body extractor whose rejections use the API error shape.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Every handler error ends up here and leaves as `{success:false, error}`.
#[derive(Debug)]
pub struct ApiError(pub Error);

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        status_for(&self.0)
    }
}

pub fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::InvalidInput(_) | Error::Serialization(_) => StatusCode::BAD_REQUEST,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::Superseded => StatusCode::CONFLICT,
        Error::EmptyContext | Error::EmptyGeneration => StatusCode::UNPROCESSABLE_ENTITY,
        Error::SearchUnavailable { .. }
        | Error::Search(_)
        | Error::ProviderHttp { .. }
        | Error::MalformedResponse(_)
        | Error::Http(_) => StatusCode::BAD_GATEWAY,
        Error::ProviderConfig(_) => StatusCode::SERVICE_UNAVAILABLE,
        Error::Io(_)
        | Error::SaveFailure(_)
        | Error::PublishFailure { .. }
        | Error::External(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(Error::InvalidInput(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self.0, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self.0, "request rejected");
        }

        let mut body = json!({ "success": false, "error": self.0.to_string() });
        if let Error::PublishFailure { stdout, stderr, .. } = &self.0 {
            body["stdout"] = json!(stdout);
            body["stderr"] = json!(stderr);
        }
        (status, Json(body)).into_response()
    }
}
