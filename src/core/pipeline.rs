//! 指令管线：校验 → 本地分类 →（可选）远端增强 → 实体合并 → 意图分发
//!
//! 每条指令独立处理、单次通过。只有输入校验失败会以错误返回，其余失败都在内部降级。

use std::sync::Arc;

use serde::Serialize;
use tracing::Instrument;

use super::error::CommandError;
use super::state::{CommandPhase, ResolvedCommand};
use crate::augment::{AugmentationClient, Sentiment, TaskSuggestion};
use crate::config::AppConfig;
use crate::dispatch::{DispatchResponse, IntentDispatcher};
use crate::domain::DomainStores;
use crate::nlp::{ClassificationResult, Entity, Intent, IntentClassifier, PatternClassifier, DEFAULT_MIN_SCORE};

pub const TEXT_REQUIRED: &str = "Command text is required";
pub const TEXT_TOO_LONG: &str = "Command text is too long";

/// 默认输入长度上限（字符数）
pub const DEFAULT_MAX_INPUT_CHARS: usize = 1000;

/// 对外可见的分类结果视图：实体为合并后的集合，增强字段缺失时省略
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NlpResult {
    pub intent: Intent,
    pub score: f32,
    pub entities: Vec<Entity>,
    pub answer: Option<String>,
    pub utterance: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<TaskSuggestion>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<String>,
}

impl From<ResolvedCommand> for NlpResult {
    fn from(command: ResolvedCommand) -> Self {
        let ResolvedCommand {
            classification,
            augmentation,
            entities,
        } = command;
        let (sentiment, suggestions, completion) = match augmentation {
            Some(a) => (a.sentiment, a.suggestions, a.completion),
            None => (None, None, None),
        };
        Self {
            intent: classification.intent,
            score: classification.score,
            entities,
            answer: classification.answer,
            utterance: classification.utterance,
            sentiment,
            suggestions,
            completion,
        }
    }
}

/// 一条指令的完整处理结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutcome {
    pub success: bool,
    pub nlp_result: NlpResult,
    pub response: DispatchResponse,
}

pub struct CommandPipeline {
    classifier: Arc<dyn IntentClassifier>,
    augment: Arc<AugmentationClient>,
    dispatcher: Arc<IntentDispatcher>,
    max_input_chars: usize,
}

impl CommandPipeline {
    pub fn new(
        classifier: Arc<dyn IntentClassifier>,
        augment: Arc<AugmentationClient>,
        dispatcher: IntentDispatcher,
    ) -> Self {
        Self {
            classifier,
            augment,
            dispatcher: Arc::new(dispatcher),
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        }
    }

    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self
    }

    /// 按配置组装：默认阈值复用进程级共享模型，否则单独训练一份
    pub fn from_config(cfg: &AppConfig, stores: DomainStores) -> Result<Self, CommandError> {
        let min_score = cfg.classifier.min_score;
        let classifier: Arc<dyn IntentClassifier> = if (min_score - DEFAULT_MIN_SCORE).abs() < f32::EPSILON {
            PatternClassifier::shared()
        } else {
            let trained = PatternClassifier::train(min_score)
                .map_err(|e| CommandError::ClassifierFailure(format!("failed to compile corpus: {e}")))?;
            Arc::new(trained)
        };
        let augment = AugmentationClient::from_config(&cfg.augment)
            .map_err(|e| CommandError::Configuration(format!("[augment] {e}")))?;
        let augment = Arc::new(augment);
        let dispatcher = IntentDispatcher::new(stores, cfg.tasks.default_due_hours);
        Ok(Self::new(classifier, augment, dispatcher).with_max_input_chars(cfg.classifier.max_input_chars))
    }

    /// 启动时提前完成可用性探测，返回增强服务是否可用
    pub async fn warm_up(&self) -> bool {
        let available = self.augment.is_enabled().await;
        tracing::info!(augmentation = available, "command pipeline ready");
        available
    }

    pub async fn process(&self, user_id: &str, text: &str) -> Result<CommandOutcome, CommandError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CommandError::InvalidInput(TEXT_REQUIRED.to_string()));
        }
        if text.chars().count() > self.max_input_chars {
            return Err(CommandError::InvalidInput(TEXT_TOO_LONG.to_string()));
        }

        let span = tracing::info_span!("command", user_id = %user_id, intent = tracing::field::Empty);
        self.run(user_id, text).instrument(span).await
    }

    async fn run(&self, user_id: &str, text: &str) -> Result<CommandOutcome, CommandError> {
        tracing::debug!(phase = ?CommandPhase::Received, chars = text.chars().count());

        let classification = match self.classifier.classify(text) {
            Ok(result) => result,
            Err(e @ CommandError::InvalidInput(_)) => return Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "classification failed, treating as unknown");
                ClassificationResult::unknown(text)
            }
        };
        tracing::Span::current().record("intent", classification.intent.label());
        tracing::debug!(phase = ?CommandPhase::Classified, score = classification.score);

        let augmentation = self.augment.enrich(user_id, &classification).await;
        if let Some(outcome) = &augmentation {
            tracing::debug!(phase = ?CommandPhase::Enriched, available = outcome.available);
        }

        let command = ResolvedCommand::resolve(classification, augmentation);
        let response = self.spawn_dispatch(user_id, &command).await;
        tracing::debug!(phase = ?CommandPhase::Dispatched, has_data = response.data.is_some());

        let outcome = CommandOutcome {
            success: true,
            nlp_result: command.into(),
            response,
        };
        tracing::debug!(phase = ?CommandPhase::Responded);
        Ok(outcome)
    }

    /// 分发在独立任务中执行：调用方放弃等待后，已开始的领域动作仍会完成
    async fn spawn_dispatch(&self, user_id: &str, command: &ResolvedCommand) -> DispatchResponse {
        let dispatcher = Arc::clone(&self.dispatcher);
        let owner = user_id.to_string();
        let command = command.clone();
        let handle = tokio::spawn(
            async move { dispatcher.dispatch(&owner, &command).await }.instrument(tracing::Span::current()),
        );
        match handle.await {
            Ok(response) => response,
            Err(e) => {
                let err = CommandError::DispatchActionFailure(e.to_string());
                tracing::error!(error = %err, "dispatch task aborted");
                DispatchResponse::failure()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::augment::{Capabilities, MockAugmentation};
    use crate::dispatch::FALLBACK_MESSAGE;
    use crate::domain::{Habit, HabitStore, MemoryStore, StoreError, Task, TaskStore};
    use crate::nlp::{Origin, Span};

    fn pipeline_with(mock: MockAugmentation) -> (CommandPipeline, Arc<MemoryStore>) {
        let (stores, memory) = DomainStores::in_memory();
        let augment = AugmentationClient::new(Capabilities::uniform(Arc::new(mock)), Duration::from_millis(200));
        let pipeline = CommandPipeline::new(
            PatternClassifier::shared(),
            Arc::new(augment),
            IntentDispatcher::new(stores, 24),
        );
        (pipeline, memory)
    }

    fn local_pipeline() -> (CommandPipeline, Arc<MemoryStore>) {
        let (stores, memory) = DomainStores::in_memory();
        let augment = AugmentationClient::new(
            Capabilities::uniform(Arc::new(MockAugmentation::online())),
            Duration::from_millis(200),
        )
        .with_enabled(false);
        let pipeline = CommandPipeline::new(
            PatternClassifier::shared(),
            Arc::new(augment),
            IntentDispatcher::new(stores, 24),
        );
        (pipeline, memory)
    }

    #[tokio::test]
    async fn test_rejects_empty_and_oversized_text() {
        let (pipeline, _) = local_pipeline();
        let pipeline = pipeline.with_max_input_chars(10);

        let err = pipeline.process("u1", "   ").await.unwrap_err();
        assert!(matches!(err, CommandError::InvalidInput(ref m) if m == TEXT_REQUIRED));

        let err = pipeline.process("u1", "add task something long").await.unwrap_err();
        assert!(matches!(err, CommandError::InvalidInput(ref m) if m == TEXT_TOO_LONG));
    }

    #[tokio::test]
    async fn test_unreachable_backend_matches_local_path() {
        let inputs = [
            "remind me to call mom",
            "asdkjhasd",
            "analyze my mood",
            "suggest some tasks",
            "email bob about lunch",
        ];
        for input in inputs {
            let (local, _) = local_pipeline();
            let (offline, _) = pipeline_with(MockAugmentation::unreachable());

            let mut expected = serde_json::to_value(local.process("u1", input).await.unwrap()).unwrap();
            let mut actual = serde_json::to_value(offline.process("u1", input).await.unwrap()).unwrap();
            // 新建任务的 id 与时间戳每次不同
            for value in [&mut expected, &mut actual] {
                value["response"]["data"] = serde_json::Value::Null;
            }
            assert_eq!(expected, actual, "input: {input}");

            let nlp = &actual["nlpResult"];
            assert!(nlp.get("sentiment").is_none());
            assert!(nlp.get("suggestions").is_none());
            assert!(nlp.get("completion").is_none());
        }
    }

    #[tokio::test]
    async fn test_failed_capability_answers_like_local_path() {
        let mut suggestions_down = MockAugmentation::online();
        suggestions_down.suggestions = None;
        let cases = [
            ("analyze my mood", MockAugmentation::online().with_sentiment(None)),
            ("suggest some tasks", suggestions_down),
        ];
        for (input, mock) in cases {
            let (local, _) = local_pipeline();
            let (degraded, _) = pipeline_with(mock);
            let expected = local.process("u1", input).await.unwrap();
            let actual = degraded.process("u1", input).await.unwrap();
            assert_eq!(actual.response, expected.response, "input: {input}");
        }
    }

    /// 写库前先等待一段时间
    struct SlowTasks {
        inner: Arc<MemoryStore>,
    }

    #[async_trait]
    impl TaskStore for SlowTasks {
        async fn create(&self, task: Task) -> Result<Task, StoreError> {
            tokio::time::sleep(Duration::from_millis(150)).await;
            TaskStore::create(self.inner.as_ref(), task).await
        }

        async fn list_by_owner(
            &self,
            user_id: &str,
            due_between: Option<(DateTime<Utc>, DateTime<Utc>)>,
        ) -> Result<Vec<Task>, StoreError> {
            TaskStore::list_by_owner(self.inner.as_ref(), user_id, due_between).await
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
            self.inner.find_by_id(id).await
        }
    }

    #[tokio::test]
    async fn test_dispatch_completes_after_caller_stops_waiting() {
        let memory = Arc::new(MemoryStore::default());
        let stores = DomainStores::new(Arc::new(SlowTasks { inner: memory.clone() }), memory.clone(), memory.clone());
        let augment = AugmentationClient::new(
            Capabilities::uniform(Arc::new(MockAugmentation::unreachable())),
            Duration::from_millis(200),
        )
        .with_enabled(false);
        let pipeline = CommandPipeline::new(PatternClassifier::shared(), Arc::new(augment), IntentDispatcher::new(stores, 24));

        let gave_up = tokio::time::timeout(Duration::from_millis(30), pipeline.process("u1", "remind me to call mom")).await;
        assert!(gave_up.is_err());
        assert_eq!(memory.task_count().await, 0);

        tokio::time::sleep(Duration::from_millis(400)).await;
        let tasks = TaskStore::list_by_owner(memory.as_ref(), "u1", None).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "call mom");
    }

    #[tokio::test]
    async fn test_remote_entities_are_merged_after_local() {
        let mock = MockAugmentation::online().with_entities(vec![
            Entity::remote("person", "mom", Some(Span { start: 18, end: 21 })),
            Entity::remote("date", "tomorrow", Some(Span { start: 22, end: 30 })),
        ]);
        let (pipeline, memory) = pipeline_with(mock);
        let outcome = pipeline.process("u1", "remind me to call mom tomorrow").await.unwrap();

        let entities = &outcome.nlp_result.entities;
        assert_eq!(entities[0].kind, "task");
        assert_eq!(entities[0].origin, Origin::Local);
        // task 槽位是 13..30，两个远端实体都与之重叠
        assert_eq!(entities.len(), 1);
        assert_eq!(outcome.response.message, "I've created a task: \"call mom tomorrow\"");
        assert_eq!(memory.task_count().await, 1);
    }

    #[tokio::test]
    async fn test_disjoint_remote_entity_is_kept() {
        let mock = MockAugmentation::online().with_entities(vec![Entity::remote(
            "organization",
            "acme",
            Some(Span { start: 100, end: 104 }),
        )]);
        let (pipeline, _) = pipeline_with(mock);
        let outcome = pipeline.process("u1", "list my tasks").await.unwrap();
        let entities = &outcome.nlp_result.entities;
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].origin, Origin::Remote);
    }

    #[tokio::test]
    async fn test_sentiment_flows_into_response() {
        let (pipeline, _) = pipeline_with(MockAugmentation::online());
        let outcome = pipeline.process("u1", "analyze my mood").await.unwrap();
        assert_eq!(outcome.nlp_result.intent, Intent::SentimentAnalyze);
        assert_eq!(outcome.response.message, "Your message sounds positive (confidence 0.90)");

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["nlpResult"]["sentiment"]["label"], "POSITIVE");
        assert!(json["nlpResult"].get("completion").is_none());
    }

    #[tokio::test]
    async fn test_unknown_input_gets_completion_and_fallback() {
        let mock = MockAugmentation::online().with_completion("!");
        let (pipeline, memory) = pipeline_with(mock);
        let outcome = pipeline.process("u1", "asdkjhasd").await.unwrap();
        assert_eq!(outcome.nlp_result.intent, Intent::Unknown);
        assert_eq!(outcome.nlp_result.completion.as_deref(), Some("asdkjhasd!"));
        assert_eq!(outcome.response.message, FALLBACK_MESSAGE);
        assert_eq!(memory.task_count().await, 0);
        assert_eq!(memory.habit_count().await, 0);
        assert_eq!(memory.progress_count().await, 0);
    }

    #[tokio::test]
    async fn test_habit_log_twice_same_day() {
        let (pipeline, memory) = local_pipeline();
        HabitStore::create(memory.as_ref(), Habit::new("u1", "Running")).await.unwrap();

        let first = pipeline.process("u1", "i did running today").await.unwrap();
        assert_eq!(first.response.data.unwrap()["value"], 1.0);
        let second = pipeline.process("u1", "i did running today").await.unwrap();
        assert_eq!(second.response.data.unwrap()["value"], 2.0);
        assert_eq!(memory.progress_count().await, 1);
    }

    #[tokio::test]
    async fn test_untrained_classifier_degrades_to_unknown() {
        let (stores, memory) = DomainStores::in_memory();
        let augment = AugmentationClient::new(
            Capabilities::uniform(Arc::new(MockAugmentation::unreachable())),
            Duration::from_millis(200),
        )
        .with_enabled(false);
        let pipeline = CommandPipeline::new(
            Arc::new(PatternClassifier::new(DEFAULT_MIN_SCORE)),
            Arc::new(augment),
            IntentDispatcher::new(stores, 24),
        );
        let outcome = pipeline.process("u1", "add task x").await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.nlp_result.intent, Intent::Unknown);
        assert_eq!(outcome.response.message, FALLBACK_MESSAGE);
        assert_eq!(memory.task_count().await, 0);
    }

    #[tokio::test]
    async fn test_warm_up_reports_probe_result() {
        let (online, _) = pipeline_with(MockAugmentation::online());
        assert!(online.warm_up().await);
        let (offline, _) = pipeline_with(MockAugmentation::unreachable());
        assert!(!offline.warm_up().await);
    }

    #[test]
    fn test_from_config_rejects_malformed_augment_url() {
        let mut cfg = AppConfig::default();
        let (stores, _) = DomainStores::in_memory();
        assert!(CommandPipeline::from_config(&cfg, stores.clone()).is_ok());

        cfg.augment.base_url = "not a url".to_string();
        let err = CommandPipeline::from_config(&cfg, stores).err().unwrap();
        assert!(matches!(err, CommandError::Configuration(_)));
    }
}
