//! 领域模型：任务、习惯、习惯打卡记录

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(user_id: &str, title: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            description: String::new(),
            priority: Priority::default(),
            status: TaskStatus::default(),
            due_date: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_due(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub cadence: Cadence,
    pub target: u32,
    pub unit: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Habit {
    /// 默认：每日、目标 1 次
    pub fn new(user_id: &str, name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            description: String::new(),
            cadence: Cadence::default(),
            target: 1,
            unit: "times".to_string(),
            active: true,
            created_at: Utc::now(),
        }
    }
}

/// 某习惯在某一天的进度；(habit_id, date) 唯一
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitProgress {
    pub id: Uuid,
    pub habit_id: Uuid,
    pub user_id: String,
    pub date: NaiveDate,
    pub value: f64,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HabitProgress {
    /// 当天第一次打卡，value = 1
    pub fn first(habit: &Habit, date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            habit_id: habit.id,
            user_id: habit.user_id.clone(),
            date,
            value: 1.0,
            completed: 1.0 >= f64::from(habit.target),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn increment(&mut self, habit: &Habit) {
        self.value += 1.0;
        self.completed = self.value >= f64::from(habit.target);
        self.updated_at = Utc::now();
    }
}
