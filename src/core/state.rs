//! 单条指令的阶段与中间结果
//!
//! 阶段：Received → Classified →（可选 Enriched）→ Dispatched → Responded，单次通过，无重试，
//! 不跨指令保存任何状态。

use serde::Serialize;

use crate::augment::AugmentationOutcome;
use crate::nlp::{merge, ClassificationResult, Entity, Intent};

/// 指令处理阶段（日志用）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CommandPhase {
    Received,
    Classified,
    Enriched,
    Dispatched,
    Responded,
}

/// 分类 + 增强 + 实体合并之后、交给分发器的指令
#[derive(Debug, Clone)]
pub struct ResolvedCommand {
    pub classification: ClassificationResult,
    pub augmentation: Option<AugmentationOutcome>,
    /// 合并后的实体（本地在前）
    pub entities: Vec<Entity>,
}

impl ResolvedCommand {
    pub fn resolve(classification: ClassificationResult, augmentation: Option<AugmentationOutcome>) -> Self {
        let remote = augmentation
            .as_ref()
            .map(|a| a.entities.as_slice())
            .unwrap_or_default();
        let entities = merge(&classification.entities, remote);
        Self {
            classification,
            augmentation,
            entities,
        }
    }

    pub fn intent(&self) -> Intent {
        self.classification.intent
    }
}
