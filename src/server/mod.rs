//! HTTP 接口
//!
//! - `POST /api/commands`：body `{ "text": string }`，调用方身份由 [`Authenticator`] 给出
//! - `GET /health`

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::core::{CommandError, CommandPipeline, TEXT_REQUIRED};

/// 调用方身份识别
pub trait Authenticator: Send + Sync {
    /// 返回用户 id；无法识别时返回 None
    fn authenticate(&self, headers: &HeaderMap) -> Option<String>;
}

/// 读取上游鉴权网关注入的用户头
pub struct HeaderAuthenticator {
    header: String,
}

impl HeaderAuthenticator {
    pub const DEFAULT_HEADER: &'static str = "x-user-id";

    pub fn new(header: impl Into<String>) -> Self {
        Self { header: header.into() }
    }
}

impl Default for HeaderAuthenticator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_HEADER)
    }
}

impl Authenticator for HeaderAuthenticator {
    fn authenticate(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get(self.header.as_str())?
            .to_str()
            .ok()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<CommandPipeline>,
    pub auth: Arc<dyn Authenticator>,
}

impl AppState {
    pub fn new(pipeline: Arc<CommandPipeline>) -> Self {
        Self {
            pipeline,
            auth: Arc::new(HeaderAuthenticator::default()),
        }
    }

    pub fn with_authenticator(mut self, auth: Arc<dyn Authenticator>) -> Self {
        self.auth = auth;
        self
    }
}

#[derive(Debug, Deserialize)]
struct CommandRequest {
    #[serde(default)]
    text: Option<String>,
}

fn error_body(status: StatusCode, msg: &str) -> Response {
    (status, Json(json!({ "msg": msg }))).into_response()
}

async fn api_commands(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: Result<Json<CommandRequest>, JsonRejection>,
) -> Response {
    let Some(user_id) = state.auth.authenticate(&headers) else {
        return error_body(StatusCode::UNAUTHORIZED, "Not authorized");
    };
    // 非 JSON 或 text 类型不对，与缺少 text 同样处理
    let text = match req {
        Ok(Json(req)) => req.text,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejected command body");
            None
        }
    };
    let Some(text) = text else {
        return error_body(StatusCode::BAD_REQUEST, TEXT_REQUIRED);
    };

    match state.pipeline.process(&user_id, &text).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(CommandError::InvalidInput(msg)) => error_body(StatusCode::BAD_REQUEST, &msg),
        Err(e) => {
            tracing::error!(error = %e, "command processing failed");
            error_body(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/commands", post(api_commands))
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
}
