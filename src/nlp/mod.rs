//! 本地 NLP：意图词表、实体、模板分类器、兜底抽取与实体合并

pub mod classifier;
mod corpus;
pub mod entity;
pub mod extractor;
pub mod intent;
pub mod reconcile;

pub use classifier::{ClassificationResult, IntentClassifier, PatternClassifier, DEFAULT_MIN_SCORE};
pub use entity::{find_value, Entity, Origin, Span};
pub use extractor::SlotExtractor;
pub use intent::Intent;
pub use reconcile::merge;
