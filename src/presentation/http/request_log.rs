use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::Response,
};
use serde_json::{Map, Value};

use crate::application::ports::request_log_repository::RequestLogEntry;
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::response::ResponseMessage;

const REDACTED_HEADERS: [&str; 4] = ["cookie", "authorization", "set-cookie", "proxy-authorization"];

fn redacted_headers(headers: &HeaderMap) -> Value {
    let mut out = Map::new();
    for (name, value) in headers {
        let value = if REDACTED_HEADERS.contains(&name.as_str()) {
            "[redacted]".to_string()
        } else {
            String::from_utf8_lossy(value.as_bytes()).into_owned()
        };
        out.insert(name.as_str().to_string(), Value::String(value));
    }
    Value::Object(out)
}

/// First hop of `X-Forwarded-For`, else the peer address.
fn client_ip(req: &Request) -> Option<String> {
    req.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ci| ci.0.ip().to_string())
        })
}

/// Persists a row for every 200 and every error response.
pub async fn log_requests(State(ctx): State<AppContext>, req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let headers = redacted_headers(req.headers());
    let ip = client_ip(&req);
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let resp = next.run(req).await;
    let status = resp.status();

    if matches!(
        status,
        StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED
    ) {
        tracing::warn!(%method, %path, status = status.as_u16(), "request_rejected");
    }

    if status == StatusCode::OK || status.is_client_error() || status.is_server_error() {
        let message = resp
            .extensions()
            .get::<ResponseMessage>()
            .map(|m| m.0.clone())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_string());
        let entry = RequestLogEntry {
            level: if status.is_server_error() { "error" } else { "info" }.to_string(),
            message,
            method,
            path,
            headers,
            status_code: i32::from(status.as_u16()),
            ip,
            user_agent,
        };
        if let Err(err) = ctx.request_log_repo().insert(&entry).await {
            tracing::warn!(error = ?err, "request_log_write_failed");
        }
    }
    resp
}
