//! 意图分发：把解析后的指令变成领域动作与回复

pub mod dispatcher;
pub mod response;

pub use dispatcher::IntentDispatcher;
pub use response::{DispatchResponse, FAILURE_MESSAGE, FALLBACK_MESSAGE};
