//! 指令处理错误分类
//!
//! 只有 InvalidInput 会以可区分的错误形式返回给调用方；其余错误在管线内部被吸收：
//! ClassifierFailure 降级为通用回复，AugmentationUnavailable 使用兜底值，
//! DispatchActionFailure 转为通用失败消息（原始错误只进日志）。
//! Configuration 只在启动组装时出现。

use thiserror::Error;

use crate::augment::Capability;
use crate::domain::StoreError;

/// 指令管线中可能出现的错误
#[derive(Error, Debug)]
pub enum CommandError {
    /// 空指令或格式不合法，分类前即被拒绝
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 本地分类器无法给出任何意图
    #[error("Classifier failure: {0}")]
    ClassifierFailure(String),

    /// 远端增强能力不可达 / 出错 / 超时（始终在本地以兜底值恢复）
    #[error("Augmentation unavailable ({capability}): {reason}")]
    AugmentationUnavailable {
        capability: Capability,
        reason: String,
    },

    /// 启动时按配置组装失败
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// 领域动作执行失败（如存储失败）
    #[error("Dispatch action failed: {0}")]
    DispatchActionFailure(String),
}

impl From<StoreError> for CommandError {
    fn from(e: StoreError) -> Self {
        CommandError::DispatchActionFailure(e.to_string())
    }
}
