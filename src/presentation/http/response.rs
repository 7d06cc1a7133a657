use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
    is_success: bool,
    status_code: u16,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<T>,
}

/// Message attached to a response for the request log.
#[derive(Debug, Clone)]
pub struct ResponseMessage(pub String);

/// Success body shared by every endpoint:
/// `{isSuccess, statusCode, status: "success", message?, result?}`.
#[derive(Debug)]
pub struct Success<T = ()> {
    status: StatusCode,
    message: Option<String>,
    result: Option<T>,
}

impl<T: Serialize> Success<T> {
    pub fn ok(result: T) -> Self {
        Self {
            status: StatusCode::OK,
            message: None,
            result: Some(result),
        }
    }

    pub fn created(result: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(result)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Success<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            message: Some(message.into()),
            result: None,
        }
    }
}

impl<T: Serialize> IntoResponse for Success<T> {
    fn into_response(self) -> Response {
        let logged = self.message.clone().map(ResponseMessage);
        let body = Envelope {
            is_success: true,
            status_code: self.status.as_u16(),
            status: "success",
            message: self.message,
            result: self.result,
        };
        let mut resp = (self.status, Json(body)).into_response();
        if let Some(m) = logged {
            resp.extensions_mut().insert(m);
        }
        resp
    }
}
