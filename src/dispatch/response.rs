//! 分发结果

use serde::Serialize;

/// 未能处理时的通用回复
pub const FALLBACK_MESSAGE: &str = "I'm not sure how to handle that request.";

/// 领域动作出错时的通用回复
pub const FAILURE_MESSAGE: &str = "I had trouble processing that request.";

/// 处理一条指令后对外可见的结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchResponse {
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl DispatchResponse {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data<T: Serialize + ?Sized>(message: impl Into<String>, data: &T) -> Self {
        Self {
            message: message.into(),
            data: serde_json::to_value(data).ok(),
        }
    }

    pub fn failure() -> Self {
        Self::message(FAILURE_MESSAGE)
    }
}
