//! 内存存储（aide 二进制默认使用，也供测试检查副作用）

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{Habit, HabitProgress, Task};
use super::store::{HabitProgressStore, HabitStore, StoreError, TaskStore};

#[derive(Default)]
pub struct MemoryStore {
    tasks: RwLock<Vec<Task>>,
    habits: RwLock<Vec<Habit>>,
    progress: RwLock<HashMap<(Uuid, NaiveDate), HabitProgress>>,
}

impl MemoryStore {
    pub async fn task_count(&self) -> usize {
        self.tasks.read().await.len()
    }

    pub async fn habit_count(&self) -> usize {
        self.habits.read().await.len()
    }

    pub async fn progress_count(&self) -> usize {
        self.progress.read().await.len()
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create(&self, task: Task) -> Result<Task, StoreError> {
        self.tasks.write().await.push(task.clone());
        Ok(task)
    }

    async fn list_by_owner(
        &self,
        user_id: &str,
        due_between: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<Task>, StoreError> {
        let tasks = self.tasks.read().await;
        let mut owned: Vec<Task> = tasks
            .iter()
            .filter(|t| t.user_id == user_id)
            .filter(|t| match (due_between, t.due_date) {
                (None, _) => true,
                (Some((start, end)), Some(due)) => due >= start && due < end,
                (Some(_), None) => false,
            })
            .cloned()
            .collect();
        // 无到期时间的排在最后
        owned.sort_by_key(|t| (t.due_date.is_none(), t.due_date));
        Ok(owned)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        Ok(self.tasks.read().await.iter().find(|t| t.id == id).cloned())
    }
}

#[async_trait]
impl HabitStore for MemoryStore {
    async fn create(&self, habit: Habit) -> Result<Habit, StoreError> {
        self.habits.write().await.push(habit.clone());
        Ok(habit)
    }

    async fn list_by_owner(&self, user_id: &str) -> Result<Vec<Habit>, StoreError> {
        let habits = self.habits.read().await;
        let mut owned: Vec<Habit> = habits
            .iter()
            .rev()
            .filter(|h| h.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn find_by_name(&self, user_id: &str, fragment: &str) -> Result<Option<Habit>, StoreError> {
        let needle = fragment.to_lowercase();
        let habits = self.habits.read().await;
        Ok(habits
            .iter()
            .find(|h| h.user_id == user_id && h.name.to_lowercase().contains(&needle))
            .cloned())
    }
}

#[async_trait]
impl HabitProgressStore for MemoryStore {
    async fn find_by_habit_and_date(
        &self,
        habit_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<HabitProgress>, StoreError> {
        Ok(self.progress.read().await.get(&(habit_id, date)).cloned())
    }

    async fn create(&self, progress: HabitProgress) -> Result<HabitProgress, StoreError> {
        let mut records = self.progress.write().await;
        let key = (progress.habit_id, progress.date);
        if records.contains_key(&key) {
            return Err(StoreError::Conflict(format!(
                "progress for habit {} on {} already exists",
                progress.habit_id, progress.date
            )));
        }
        records.insert(key, progress.clone());
        Ok(progress)
    }

    async fn save(&self, progress: HabitProgress) -> Result<HabitProgress, StoreError> {
        let mut records = self.progress.write().await;
        let key = (progress.habit_id, progress.date);
        match records.get_mut(&key) {
            Some(existing) => {
                *existing = progress.clone();
                Ok(progress)
            }
            None => Err(StoreError::NotFound(format!("progress {}", progress.id))),
        }
    }

    async fn increment_or_create(&self, habit: &Habit, date: NaiveDate) -> Result<HabitProgress, StoreError> {
        let mut records = self.progress.write().await;
        let record = records
            .entry((habit.id, date))
            .and_modify(|existing| existing.increment(habit))
            .or_insert_with(|| HabitProgress::first(habit, date));
        Ok(record.clone())
    }
}
