//! 增强客户端：超时、兜底与一次性存活探测
//!
//! 每次能力调用都加超时；超时、网络错误、非成功状态或解码失败一律换成兜底值：
//! 实体 → 空；情绪 → {NEUTRAL, 0.5}；补全 → 原文；建议 → 空。
//! 存活探测每个客户端生命周期只做一次（并发首次使用也只探测一次），失败后本进程不再尝试增强。

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::OptionFuture;
use tokio::sync::OnceCell;
use tokio::time::timeout;

use super::http::HttpAugmentClient;
use super::traits::{AugmentError, Capabilities};
use super::types::{AugmentationOutcome, Capability, Sentiment, TaskSuggestion};
use crate::config::AugmentSection;
use crate::core::CommandError;
use crate::nlp::{ClassificationResult, Entity, Intent, Origin};

/// 单次能力调用的结果：值，以及是否使用了兜底值
#[derive(Debug, Clone)]
pub struct Settled<T> {
    pub value: T,
    pub degraded: bool,
}

/// 某条指令需要调用哪些能力
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichmentPlan {
    pub entities: bool,
    pub sentiment: bool,
    pub suggestions: bool,
    pub completion: bool,
}

impl EnrichmentPlan {
    pub fn for_intent(intent: Intent) -> Self {
        Self {
            entities: true,
            sentiment: intent == Intent::SentimentAnalyze,
            suggestions: intent == Intent::TaskSuggest,
            completion: intent.is_unknown(),
        }
    }
}

pub struct AugmentationClient {
    caps: Capabilities,
    enabled: bool,
    call_timeout: Duration,
    probe_timeout: Duration,
    probe: OnceCell<bool>,
}

impl AugmentationClient {
    pub fn new(caps: Capabilities, call_timeout: Duration) -> Self {
        Self {
            caps,
            enabled: true,
            call_timeout,
            probe_timeout: call_timeout,
            probe: OnceCell::new(),
        }
    }

    /// 按 [augment] 配置创建基于 HTTP 的客户端
    pub fn from_config(cfg: &AugmentSection) -> Result<Self, AugmentError> {
        let call_timeout = Duration::from_millis(cfg.timeout_ms);
        let http = Arc::new(HttpAugmentClient::new(&cfg.base_url, call_timeout)?);
        Ok(Self::new(Capabilities::uniform(http), call_timeout)
            .with_enabled(cfg.enabled)
            .with_probe_timeout(Duration::from_millis(cfg.probe_timeout_ms)))
    }

    /// 关闭时从不探测，也不调用任何能力
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_probe_timeout(mut self, probe_timeout: Duration) -> Self {
        self.probe_timeout = probe_timeout;
        self
    }

    /// 本进程是否进行增强；首次调用时探测，结果之后只读
    pub async fn is_enabled(&self) -> bool {
        if !self.enabled {
            return false;
        }
        *self
            .probe
            .get_or_init(|| async {
                let alive = timeout(self.probe_timeout, self.caps.probe.is_available())
                    .await
                    .unwrap_or(false);
                if alive {
                    tracing::info!("augmentation service reachable, enrichment enabled");
                } else {
                    tracing::warn!("augmentation service unreachable, enrichment skipped until restart");
                }
                alive
            })
            .await
    }

    /// 探测结果（尚未探测时为 None）
    pub fn probed(&self) -> Option<bool> {
        self.probe.get().copied()
    }

    async fn guarded<T, F>(&self, capability: Capability, call: F, fallback: impl FnOnce() -> T) -> Settled<T>
    where
        F: Future<Output = Result<T, AugmentError>>,
    {
        let start = Instant::now();
        let result = match timeout(self.call_timeout, call).await {
            Ok(inner) => inner,
            Err(_) => Err(AugmentError::Timeout),
        };
        let audit = serde_json::json!({
            "event": "augment_audit",
            "capability": capability,
            "ok": result.is_ok(),
            "duration_ms": start.elapsed().as_millis() as u64,
        });
        tracing::debug!(audit = %audit.to_string(), "augment");

        match result {
            Ok(value) => Settled { value, degraded: false },
            Err(e) => {
                let err = CommandError::AugmentationUnavailable {
                    capability,
                    reason: e.to_string(),
                };
                tracing::warn!(error = %err, "using fallback value");
                Settled {
                    value: fallback(),
                    degraded: true,
                }
            }
        }
    }

    pub async fn extract_entities(&self, text: &str) -> Settled<Vec<Entity>> {
        let mut settled = self
            .guarded(Capability::Entities, self.caps.entities.extract_entities(text), Vec::new)
            .await;
        for entity in &mut settled.value {
            entity.origin = Origin::Remote;
        }
        settled
    }

    pub async fn analyze_sentiment(&self, text: &str) -> Settled<Sentiment> {
        self.guarded(Capability::Sentiment, self.caps.sentiment.analyze_sentiment(text), Sentiment::neutral)
            .await
    }

    pub async fn predict_completion(&self, text: &str) -> Settled<String> {
        self.guarded(Capability::Completion, self.caps.completion.predict_completion(text), || {
            text.to_string()
        })
        .await
    }

    pub async fn suggest_tasks(&self, user_id: &str, context: &serde_json::Value) -> Settled<Vec<TaskSuggestion>> {
        self.guarded(
            Capability::Suggestions,
            self.caps.suggestions.suggest_tasks(user_id, context),
            Vec::new,
        )
        .await
    }

    /// 对一次分类结果做增强；未启用时返回 None（纯本地路径）
    ///
    /// 计划内的能力并发调用，全部结束后才汇总结果。
    pub async fn enrich(&self, user_id: &str, classification: &ClassificationResult) -> Option<AugmentationOutcome> {
        if !self.is_enabled().await {
            return None;
        }
        let plan = EnrichmentPlan::for_intent(classification.intent);
        let text = classification.utterance.as_str();
        let context = serde_json::json!({
            "utterance": text,
            "intent": classification.intent.label(),
        });

        let (entities, sentiment, suggestions, completion) = tokio::join!(
            OptionFuture::from(plan.entities.then(|| self.extract_entities(text))),
            OptionFuture::from(plan.sentiment.then(|| self.analyze_sentiment(text))),
            OptionFuture::from(plan.suggestions.then(|| self.suggest_tasks(user_id, &context))),
            OptionFuture::from(plan.completion.then(|| self.predict_completion(text))),
        );

        let degraded: Vec<Capability> = [
            (Capability::Entities, entities.as_ref().map(|s| s.degraded)),
            (Capability::Sentiment, sentiment.as_ref().map(|s| s.degraded)),
            (Capability::Suggestions, suggestions.as_ref().map(|s| s.degraded)),
            (Capability::Completion, completion.as_ref().map(|s| s.degraded)),
        ]
        .into_iter()
        .filter_map(|(capability, degraded)| degraded.unwrap_or(false).then_some(capability))
        .collect();

        Some(AugmentationOutcome {
            available: degraded.is_empty(),
            degraded,
            entities: entities.map(|s| s.value).unwrap_or_default(),
            sentiment: sentiment.map(|s| s.value),
            suggestions: suggestions.map(|s| s.value),
            completion: completion.map(|s| s.value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::augment::MockAugmentation;
    use crate::nlp::{IntentClassifier, PatternClassifier, Span};

    fn client_for(mock: Arc<MockAugmentation>) -> AugmentationClient {
        AugmentationClient::new(Capabilities::uniform(mock), Duration::from_millis(100))
    }

    fn classify(text: &str) -> ClassificationResult {
        PatternClassifier::shared().classify(text).unwrap()
    }

    #[tokio::test]
    async fn test_unreachable_probe_skips_enrichment() {
        let mock = Arc::new(MockAugmentation::unreachable());
        let client = client_for(mock.clone());
        assert!(client.enrich("u1", &classify("show my calendar")).await.is_none());
        assert!(client.enrich("u1", &classify("show my habits")).await.is_none());
        assert_eq!(mock.probe_calls(), 1);
        assert_eq!(mock.capability_calls(), 0);
        assert_eq!(client.probed(), Some(false));
    }

    #[tokio::test]
    async fn test_disabled_client_never_probes() {
        let mock = Arc::new(MockAugmentation::online());
        let client = client_for(mock.clone()).with_enabled(false);
        assert!(!client.is_enabled().await);
        assert_eq!(mock.probe_calls(), 0);
        assert_eq!(client.probed(), None);
    }

    #[tokio::test]
    async fn test_probe_runs_once_under_concurrent_first_use() {
        let mock = Arc::new(MockAugmentation::online());
        let client = Arc::new(client_for(mock.clone()));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let client = client.clone();
                tokio::spawn(async move { client.is_enabled().await })
            })
            .collect();
        for h in handles {
            assert!(h.await.unwrap());
        }
        assert_eq!(mock.probe_calls(), 1);
    }

    #[tokio::test]
    async fn test_plan_only_calls_requested_capabilities() {
        let mock = Arc::new(MockAugmentation::online());
        let client = client_for(mock);
        let outcome = client.enrich("u1", &classify("show my calendar")).await.unwrap();
        assert!(outcome.available);
        assert!(outcome.sentiment.is_none());
        assert!(outcome.suggestions.is_none());
        assert!(outcome.completion.is_none());

        let outcome = client.enrich("u1", &classify("how do i sound")).await.unwrap();
        assert_eq!(outcome.sentiment.unwrap().label, "POSITIVE");
    }

    #[tokio::test]
    async fn test_partial_availability_sentiment_down() {
        let remote = vec![Entity::remote("date", "today", Some(Span::new(0, 5)))];
        let entities_up = Arc::new(MockAugmentation::online().with_entities(remote.clone()));
        let sentiment_down = Arc::new(MockAugmentation::online().with_sentiment(None));
        let caps = Capabilities::uniform(entities_up).with_sentiment(sentiment_down);
        let client = AugmentationClient::new(caps, Duration::from_millis(100));

        let outcome = client.enrich("u1", &classify("analyze my mood")).await.unwrap();
        assert!(!outcome.available);
        assert_eq!(outcome.sentiment, Some(Sentiment::neutral()));
        assert_eq!(outcome.degraded, vec![Capability::Sentiment]);
        assert!(outcome.live_sentiment().is_none());
        assert_eq!(outcome.entities, remote);
    }

    #[tokio::test]
    async fn test_timeout_falls_back_without_affecting_siblings() {
        let fast = Arc::new(MockAugmentation::online().with_entities(vec![Entity::remote("person", "Ann", None)]));
        let slow = Arc::new(
            MockAugmentation::online()
                .with_suggestions(vec![TaskSuggestion {
                    text: "Pay bills".to_string(),
                    category: None,
                    reason: None,
                }])
                .with_delay(Duration::from_millis(500)),
        );
        let caps = Capabilities::uniform(fast).with_suggestions(slow);
        let client = AugmentationClient::new(caps, Duration::from_millis(50));

        let outcome = client.enrich("u1", &classify("suggest some tasks")).await.unwrap();
        assert!(!outcome.available);
        assert_eq!(outcome.suggestions, Some(Vec::new()));
        assert!(outcome.is_degraded(Capability::Suggestions));
        assert!(!outcome.is_degraded(Capability::Entities));
        assert_eq!(outcome.entities.len(), 1);
    }

    #[tokio::test]
    async fn test_completion_fallback_is_input_text() {
        let mut mock = MockAugmentation::online();
        mock.completion = None;
        let client = client_for(Arc::new(mock));
        let settled = client.predict_completion("remind me").await;
        assert!(settled.degraded);
        assert_eq!(settled.value, "remind me");
    }

    #[tokio::test]
    async fn test_unknown_intent_requests_completion() {
        let mock = Arc::new(MockAugmentation::online().with_completion(" to stretch"));
        let client = client_for(mock);
        let outcome = client.enrich("u1", &classify("qwzx blorp")).await.unwrap();
        assert_eq!(outcome.completion.as_deref(), Some("qwzx blorp to stretch"));
    }

    #[tokio::test]
    async fn test_remote_entities_are_stamped_remote() {
        let mock = Arc::new(MockAugmentation::online().with_entities(vec![Entity::local("date", "today", None)]));
        let client = client_for(mock);
        let settled = client.extract_entities("today").await;
        assert_eq!(settled.value[0].origin, Origin::Remote);
    }
}
