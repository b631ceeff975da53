//! 增强服务能力抽象
//!
//! 远端服务建模为一组相互独立的能力（实体抽取 / 情绪分析 / 补全预测 / 任务建议）加存活探测，
//! 每个能力单独一个 trait，可分别替换或模拟（例如情绪分析宕机而实体抽取可用）。

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use super::types::{Sentiment, TaskSuggestion};
use crate::nlp::Entity;

/// 单次能力调用失败的原因
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AugmentError {
    #[error("Request timed out")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("Decode error: {0}")]
    Decode(String),

    /// 客户端无法按配置创建
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),
}

#[async_trait]
pub trait EntityAnalyzer: Send + Sync {
    async fn extract_entities(&self, text: &str) -> Result<Vec<Entity>, AugmentError>;
}

#[async_trait]
pub trait SentimentAnalyzer: Send + Sync {
    async fn analyze_sentiment(&self, text: &str) -> Result<Sentiment, AugmentError>;
}

#[async_trait]
pub trait CompletionPredictor: Send + Sync {
    async fn predict_completion(&self, text: &str) -> Result<String, AugmentError>;
}

#[async_trait]
pub trait TaskSuggester: Send + Sync {
    async fn suggest_tasks(
        &self,
        user_id: &str,
        context: &serde_json::Value,
    ) -> Result<Vec<TaskSuggestion>, AugmentError>;
}

#[async_trait]
pub trait LivenessProbe: Send + Sync {
    async fn is_available(&self) -> bool;
}

/// 能力集合：每项可独立替换
#[derive(Clone)]
pub struct Capabilities {
    pub entities: Arc<dyn EntityAnalyzer>,
    pub sentiment: Arc<dyn SentimentAnalyzer>,
    pub completion: Arc<dyn CompletionPredictor>,
    pub suggestions: Arc<dyn TaskSuggester>,
    pub probe: Arc<dyn LivenessProbe>,
}

impl Capabilities {
    /// 同一个后端提供全部能力（如 HTTP 客户端）
    pub fn uniform<B>(backend: Arc<B>) -> Self
    where
        B: EntityAnalyzer
            + SentimentAnalyzer
            + CompletionPredictor
            + TaskSuggester
            + LivenessProbe
            + 'static,
    {
        Self {
            entities: backend.clone(),
            sentiment: backend.clone(),
            completion: backend.clone(),
            suggestions: backend.clone(),
            probe: backend,
        }
    }

    pub fn with_sentiment(mut self, sentiment: Arc<dyn SentimentAnalyzer>) -> Self {
        self.sentiment = sentiment;
        self
    }

    pub fn with_suggestions(mut self, suggestions: Arc<dyn TaskSuggester>) -> Self {
        self.suggestions = suggestions;
        self
    }
}
