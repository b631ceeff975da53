//! 核心编排层：错误分类、指令阶段、处理管线、优雅关闭

pub mod error;
pub mod pipeline;
pub mod shutdown;
pub mod state;

pub use error::CommandError;
pub use pipeline::{CommandOutcome, CommandPipeline, NlpResult, TEXT_REQUIRED, TEXT_TOO_LONG};
pub use shutdown::{ShutdownManager, ShutdownReason};
pub use state::{CommandPhase, ResolvedCommand};
