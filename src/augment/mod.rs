//! 增强层：远端分析服务的能力抽象与实现（HTTP / Mock），以及带兜底的客户端

pub mod client;
pub mod http;
pub mod mock;
pub mod traits;
pub mod types;

pub use client::{AugmentationClient, EnrichmentPlan, Settled};
pub use http::HttpAugmentClient;
pub use mock::MockAugmentation;
pub use traits::{
    AugmentError, Capabilities, CompletionPredictor, EntityAnalyzer, LivenessProbe,
    SentimentAnalyzer, TaskSuggester,
};
pub use types::{AugmentationOutcome, Capability, Sentiment, TaskSuggestion};
