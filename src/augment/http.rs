//! 增强服务 HTTP 客户端
//!
//! 接口：
//! - `POST /api/extract-entities {text}` → `{entities: [{text, label, start_char, end_char}]}`
//! - `POST /api/sentiment-analysis {text}` → `{sentiment: {label, score}}`
//! - `POST /api/predict-completion {text}` → `{completion}`
//! - `POST /api/suggest-tasks {user_id, context}` → `{suggestions: [...]}`
//! - `GET /` 返回 2xx 视为存活

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::traits::{
    AugmentError, CompletionPredictor, EntityAnalyzer, LivenessProbe, SentimentAnalyzer,
    TaskSuggester,
};
use super::types::{Sentiment, TaskSuggestion};
use crate::nlp::{Entity, Span};

pub struct HttpAugmentClient {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct TextRequest<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct SuggestRequest<'a> {
    user_id: &'a str,
    context: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RemoteEntity {
    text: String,
    label: String,
    #[serde(default, alias = "start")]
    start_char: Option<usize>,
    #[serde(default, alias = "end")]
    end_char: Option<usize>,
}

#[derive(Deserialize)]
struct EntitiesResponse {
    #[serde(default)]
    entities: Vec<RemoteEntity>,
}

#[derive(Deserialize)]
struct SentimentResponse {
    sentiment: Sentiment,
}

#[derive(Deserialize)]
struct CompletionResponse {
    completion: String,
}

#[derive(Deserialize)]
struct SuggestionsResponse {
    #[serde(default)]
    suggestions: Vec<TaskSuggestion>,
}

/// 远端标签（spaCy 风格）映射为实体类型
fn map_label(label: &str) -> String {
    match label {
        "DATE" => "date".to_string(),
        "TIME" => "time".to_string(),
        "PERSON" => "person".to_string(),
        "ORG" => "organization".to_string(),
        "GPE" => "location".to_string(),
        "PRIORITY" => "priority".to_string(),
        "CATEGORY" => "category".to_string(),
        "DURATION" => "duration".to_string(),
        other => other.to_lowercase(),
    }
}

impl RemoteEntity {
    fn into_entity(self) -> Entity {
        let span = match (self.start_char, self.end_char) {
            (Some(start), Some(end)) if start <= end => Some(Span::new(start, end)),
            _ => None,
        };
        Entity::remote(map_label(&self.label), self.text, span)
    }
}

fn transport_error(e: reqwest::Error) -> AugmentError {
    if e.is_timeout() {
        AugmentError::Timeout
    } else {
        AugmentError::Transport(e.to_string())
    }
}

impl HttpAugmentClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AugmentError> {
        let base_url = base_url.trim_end_matches('/');
        reqwest::Url::parse(base_url)
            .map_err(|e| AugmentError::InvalidConfig(format!("base url {base_url:?}: {e}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("aide/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AugmentError::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, AugmentError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        if !resp.status().is_success() {
            return Err(AugmentError::Status(resp.status().as_u16()));
        }
        resp.json::<R>()
            .await
            .map_err(|e| AugmentError::Decode(e.to_string()))
    }
}

#[async_trait]
impl EntityAnalyzer for HttpAugmentClient {
    async fn extract_entities(&self, text: &str) -> Result<Vec<Entity>, AugmentError> {
        let resp: EntitiesResponse = self.post("/api/extract-entities", &TextRequest { text }).await?;
        Ok(resp.entities.into_iter().map(RemoteEntity::into_entity).collect())
    }
}

#[async_trait]
impl SentimentAnalyzer for HttpAugmentClient {
    async fn analyze_sentiment(&self, text: &str) -> Result<Sentiment, AugmentError> {
        let resp: SentimentResponse = self.post("/api/sentiment-analysis", &TextRequest { text }).await?;
        Ok(resp.sentiment)
    }
}

#[async_trait]
impl CompletionPredictor for HttpAugmentClient {
    async fn predict_completion(&self, text: &str) -> Result<String, AugmentError> {
        let resp: CompletionResponse = self.post("/api/predict-completion", &TextRequest { text }).await?;
        Ok(resp.completion)
    }
}

#[async_trait]
impl TaskSuggester for HttpAugmentClient {
    async fn suggest_tasks(
        &self,
        user_id: &str,
        context: &serde_json::Value,
    ) -> Result<Vec<TaskSuggestion>, AugmentError> {
        let resp: SuggestionsResponse = self
            .post("/api/suggest-tasks", &SuggestRequest { user_id, context })
            .await?;
        Ok(resp.suggestions)
    }
}

#[async_trait]
impl LivenessProbe for HttpAugmentClient {
    async fn is_available(&self) -> bool {
        match self.client.get(format!("{}/", self.base_url)).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::warn!(base_url = %self.base_url, error = %e, "augmentation service is not available");
                false
            }
        }
    }
}
