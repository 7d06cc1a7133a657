use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{
        FromRequest,
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::application::errors::ServiceError;
use crate::presentation::http::response::ResponseMessage;

/// HTTP face of [`ServiceError`].
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    is_success: bool,
    status_code: u16,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    validation_errors: Option<&'a BTreeMap<String, String>>,
    status: &'static str,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ServiceError::BadRequest(_) | ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(ServiceError::bad_request(msg))
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rej: JsonRejection) -> Self {
        Self::bad_request(rej.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rej: PathRejection) -> Self {
        Self::bad_request(rej.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rej: QueryRejection) -> Self {
        Self::bad_request(rej.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rej: MultipartRejection) -> Self {
        Self::bad_request(rej.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::bad_request(err.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ServiceError::Internal(err) = &self.0 {
            tracing::error!(error = ?err, "unhandled_service_error");
        }
        let message = self.0.to_string();
        let validation_errors = match &self.0 {
            ServiceError::Validation(fields) => Some(fields),
            _ => None,
        };
        let logged = match validation_errors {
            Some(fields) => format!(
                "validation failed: {}",
                fields.values().cloned().collect::<Vec<_>>().join(", ")
            ),
            None => message.clone(),
        };
        let body = ErrorBody {
            is_success: false,
            status_code: status.as_u16(),
            message: &message,
            validation_errors,
            status: status.canonical_reason().unwrap_or("Error"),
        };
        let mut resp = (status, Json(body)).into_response();
        resp.extensions_mut().insert(ResponseMessage(logged));
        resp
    }
}

/// `Json` whose rejections render through [`ApiError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn not_found_uses_reason_phrase() {
        let (status, v) = render(ServiceError::not_found("car not found").into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(v["isSuccess"], false);
        assert_eq!(v["statusCode"], 404);
        assert_eq!(v["message"], "car not found");
        assert_eq!(v["status"], "Not Found");
        assert!(v.get("validationErrors").is_none());
    }

    #[tokio::test]
    async fn validation_lists_fields() {
        let mut fields = BTreeMap::new();
        fields.insert("email".to_string(), "email must be an email".to_string());
        let (status, v) = render(ServiceError::Validation(fields).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(v["message"], "Validation failed");
        assert_eq!(v["validationErrors"]["email"], "email must be an email");
    }

    #[tokio::test]
    async fn internal_error_hides_details() {
        let (status, v) = render(anyhow::anyhow!("pool timed out").into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(v["message"], "Something went wrong. Please try again later.");
    }
}
