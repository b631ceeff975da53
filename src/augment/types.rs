//! 增强服务的数据类型

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::nlp::Entity;

/// 远端能力名（日志与错误中使用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Entities,
    Sentiment,
    Completion,
    Suggestions,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Entities => "entities",
            Capability::Sentiment => "sentiment",
            Capability::Completion => "completion",
            Capability::Suggestions => "suggestions",
        };
        f.write_str(name)
    }
}

/// 情绪分析结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: String,
    pub score: f32,
}

impl Sentiment {
    /// 兜底值：{NEUTRAL, 0.5}
    pub fn neutral() -> Self {
        Self {
            label: "NEUTRAL".to_string(),
            score: 0.5,
        }
    }
}

/// 建议任务摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSuggestion {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// 一次指令的增强结果
///
/// 未请求的能力字段为 None；请求了但失败的能力携带兜底值，记入 `degraded` 并使 `available = false`。
#[derive(Debug, Clone, Default, Serialize)]
pub struct AugmentationOutcome {
    pub available: bool,
    /// 使用了兜底值的能力
    #[serde(skip)]
    pub degraded: Vec<Capability>,
    pub entities: Vec<Entity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<TaskSuggestion>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<String>,
}

impl AugmentationOutcome {
    pub fn is_degraded(&self, capability: Capability) -> bool {
        self.degraded.contains(&capability)
    }

    /// 远端真实给出的情绪（兜底值不算）
    pub fn live_sentiment(&self) -> Option<&Sentiment> {
        self.sentiment
            .as_ref()
            .filter(|_| !self.is_degraded(Capability::Sentiment))
    }

    /// 远端真实给出的任务建议（兜底值不算）
    pub fn live_suggestions(&self) -> Option<&[TaskSuggestion]> {
        self.suggestions
            .as_deref()
            .filter(|_| !self.is_degraded(Capability::Suggestions))
    }
}
