//! 意图词表
//!
//! 封闭词表：分类器只会产出下列标签之一，或哨兵 `None`（无法识别）。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 识别出的意图（封闭集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    #[serde(rename = "task.create")]
    TaskCreate,
    #[serde(rename = "task.list")]
    TaskList,
    #[serde(rename = "task.list.today")]
    TaskListToday,
    #[serde(rename = "task.complete")]
    TaskComplete,
    #[serde(rename = "habit.create")]
    HabitCreate,
    #[serde(rename = "habit.list")]
    HabitList,
    #[serde(rename = "habit.log")]
    HabitLog,
    #[serde(rename = "focus.start")]
    FocusStart,
    #[serde(rename = "focus.stop")]
    FocusStop,
    #[serde(rename = "email.send")]
    EmailSend,
    #[serde(rename = "email.check")]
    EmailCheck,
    #[serde(rename = "calendar.schedule")]
    CalendarSchedule,
    #[serde(rename = "calendar.view")]
    CalendarView,
    #[serde(rename = "calendar.view.today")]
    CalendarViewToday,
    #[serde(rename = "calendar.view.tomorrow")]
    CalendarViewTomorrow,
    #[serde(rename = "sentiment.analyze")]
    SentimentAnalyze,
    #[serde(rename = "task.suggest")]
    TaskSuggest,
    /// 无法识别
    #[serde(rename = "None")]
    Unknown,
}

impl Intent {
    /// 词表内全部意图（不含 Unknown）
    pub const ALL: [Intent; 17] = [
        Intent::TaskCreate,
        Intent::TaskList,
        Intent::TaskListToday,
        Intent::TaskComplete,
        Intent::HabitCreate,
        Intent::HabitList,
        Intent::HabitLog,
        Intent::FocusStart,
        Intent::FocusStop,
        Intent::EmailSend,
        Intent::EmailCheck,
        Intent::CalendarSchedule,
        Intent::CalendarView,
        Intent::CalendarViewToday,
        Intent::CalendarViewTomorrow,
        Intent::SentimentAnalyze,
        Intent::TaskSuggest,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Intent::TaskCreate => "task.create",
            Intent::TaskList => "task.list",
            Intent::TaskListToday => "task.list.today",
            Intent::TaskComplete => "task.complete",
            Intent::HabitCreate => "habit.create",
            Intent::HabitList => "habit.list",
            Intent::HabitLog => "habit.log",
            Intent::FocusStart => "focus.start",
            Intent::FocusStop => "focus.stop",
            Intent::EmailSend => "email.send",
            Intent::EmailCheck => "email.check",
            Intent::CalendarSchedule => "calendar.schedule",
            Intent::CalendarView => "calendar.view",
            Intent::CalendarViewToday => "calendar.view.today",
            Intent::CalendarViewTomorrow => "calendar.view.tomorrow",
            Intent::SentimentAnalyze => "sentiment.analyze",
            Intent::TaskSuggest => "task.suggest",
            Intent::Unknown => "None",
        }
    }

    /// `*.create` 意图需要绑定的内容槽位（兜底抽取器据此恢复）
    pub fn content_slot(&self) -> Option<&'static str> {
        match self {
            Intent::TaskCreate => Some("task"),
            Intent::HabitCreate => Some("habit"),
            _ => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Intent::Unknown)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "None" {
            return Ok(Intent::Unknown);
        }
        Intent::ALL
            .iter()
            .copied()
            .find(|i| i.label() == s)
            .ok_or_else(|| format!("Unknown intent label: {s}"))
    }
}
