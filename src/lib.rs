//! Aide - 个人效率助手的指令意图解析服务
//!
//! 模块划分：
//! - **nlp**: 本地意图分类、槽位抽取、实体合并
//! - **augment**: 远端增强服务（实体 / 情绪 / 补全 / 任务建议 / 探活）及兜底
//! - **dispatch**: 意图到领域动作的分发与回复生成
//! - **domain**: 任务 / 习惯 / 打卡的模型与存储接口
//! - **core**: 错误分类、指令管线、优雅关闭
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **server**: HTTP 接口（axum）

pub mod augment;
pub mod config;
pub mod core;
pub mod dispatch;
pub mod domain;
pub mod nlp;
pub mod observability;
#[cfg(feature = "server")]
pub mod server;

pub use crate::core::{CommandError, CommandOutcome, CommandPipeline};
