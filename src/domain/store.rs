//! 领域存储接口
//!
//! 指令管线只通过这些 trait 调用外部存储；实际持久化不在本 crate 范围内。

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::memory::MemoryStore;
use super::models::{Habit, HabitProgress, Task};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create(&self, task: Task) -> Result<Task, StoreError>;

    /// 按到期时间升序；`due_between` 为 [start, end) 过滤
    async fn list_by_owner(
        &self,
        user_id: &str,
        due_between: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<Task>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError>;
}

#[async_trait]
pub trait HabitStore: Send + Sync {
    async fn create(&self, habit: Habit) -> Result<Habit, StoreError>;

    /// 最新创建的在前
    async fn list_by_owner(&self, user_id: &str) -> Result<Vec<Habit>, StoreError>;

    /// 名称包含 `fragment`（忽略大小写），限定在该用户的习惯中
    async fn find_by_name(&self, user_id: &str, fragment: &str) -> Result<Option<Habit>, StoreError>;
}

#[async_trait]
pub trait HabitProgressStore: Send + Sync {
    async fn find_by_habit_and_date(
        &self,
        habit_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<HabitProgress>, StoreError>;

    /// 同一 (habit, date) 已存在时返回 Conflict
    async fn create(&self, progress: HabitProgress) -> Result<HabitProgress, StoreError>;

    async fn save(&self, progress: HabitProgress) -> Result<HabitProgress, StoreError>;

    /// 当天已有记录则 +1，否则新建 value = 1；查找与写入必须是一次原子操作
    async fn increment_or_create(&self, habit: &Habit, date: NaiveDate) -> Result<HabitProgress, StoreError>;
}

/// 分发器依赖的全部领域存储
#[derive(Clone)]
pub struct DomainStores {
    pub tasks: Arc<dyn TaskStore>,
    pub habits: Arc<dyn HabitStore>,
    pub progress: Arc<dyn HabitProgressStore>,
}

impl DomainStores {
    pub fn new(
        tasks: Arc<dyn TaskStore>,
        habits: Arc<dyn HabitStore>,
        progress: Arc<dyn HabitProgressStore>,
    ) -> Self {
        Self { tasks, habits, progress }
    }

    /// 三类存储共用一个内存实现
    pub fn in_memory() -> (Self, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        let stores = Self {
            tasks: store.clone(),
            habits: store.clone(),
            progress: store.clone(),
        };
        (stores, store)
    }
}
