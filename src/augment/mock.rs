//! Mock 增强后端（用于测试与本地运行，无需远端服务）
//!
//! 每个能力可单独设为成功或失败，可注入延迟，并统计调用次数。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::traits::{
    AugmentError, CompletionPredictor, EntityAnalyzer, LivenessProbe, SentimentAnalyzer,
    TaskSuggester,
};
use super::types::{Sentiment, TaskSuggestion};
use crate::nlp::Entity;

#[derive(Debug, Default)]
pub struct MockAugmentation {
    pub available: bool,
    /// None 表示该能力调用失败
    pub entities: Option<Vec<Entity>>,
    pub sentiment: Option<Sentiment>,
    pub completion: Option<String>,
    pub suggestions: Option<Vec<TaskSuggestion>>,
    /// 每次能力调用前的等待（模拟慢服务）
    pub delay: Option<Duration>,
    probe_calls: AtomicUsize,
    capability_calls: AtomicUsize,
}

impl MockAugmentation {
    /// 存活且各能力返回空结果
    pub fn online() -> Self {
        Self {
            available: true,
            entities: Some(Vec::new()),
            sentiment: Some(Sentiment {
                label: "POSITIVE".to_string(),
                score: 0.9,
            }),
            completion: Some(String::new()),
            suggestions: Some(Vec::new()),
            ..Default::default()
        }
    }

    /// 探测失败、所有能力报错
    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn with_entities(mut self, entities: Vec<Entity>) -> Self {
        self.entities = Some(entities);
        self
    }

    pub fn with_sentiment(mut self, sentiment: Option<Sentiment>) -> Self {
        self.sentiment = sentiment;
        self
    }

    pub fn with_completion(mut self, completion: &str) -> Self {
        self.completion = Some(completion.to_string());
        self
    }

    pub fn with_suggestions(mut self, suggestions: Vec<TaskSuggestion>) -> Self {
        self.suggestions = Some(suggestions);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn probe_calls(&self) -> usize {
        self.probe_calls.load(Ordering::SeqCst)
    }

    pub fn capability_calls(&self) -> usize {
        self.capability_calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) {
        self.capability_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn scripted<T: Clone>(value: &Option<T>) -> Result<T, AugmentError> {
        value
            .clone()
            .ok_or_else(|| AugmentError::Transport("mock capability offline".to_string()))
    }
}

#[async_trait]
impl EntityAnalyzer for MockAugmentation {
    async fn extract_entities(&self, _text: &str) -> Result<Vec<Entity>, AugmentError> {
        self.enter().await;
        Self::scripted(&self.entities)
    }
}

#[async_trait]
impl SentimentAnalyzer for MockAugmentation {
    async fn analyze_sentiment(&self, _text: &str) -> Result<Sentiment, AugmentError> {
        self.enter().await;
        Self::scripted(&self.sentiment)
    }
}

#[async_trait]
impl CompletionPredictor for MockAugmentation {
    async fn predict_completion(&self, text: &str) -> Result<String, AugmentError> {
        self.enter().await;
        Self::scripted(&self.completion).map(|c| format!("{text}{c}"))
    }
}

#[async_trait]
impl TaskSuggester for MockAugmentation {
    async fn suggest_tasks(
        &self,
        _user_id: &str,
        _context: &serde_json::Value,
    ) -> Result<Vec<TaskSuggestion>, AugmentError> {
        self.enter().await;
        Self::scripted(&self.suggestions)
    }
}

#[async_trait]
impl LivenessProbe for MockAugmentation {
    async fn is_available(&self) -> bool {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        self.available
    }
}
