//! 意图分发器
//!
//! 把合并实体后的指令映射到领域动作并生成回复。默认回复是分类器渲染的答案，
//! 缺失时用通用回复；领域动作出错在此处截获，记录日志后返回通用失败消息，不向调用方传播。

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, Utc};

use super::response::{DispatchResponse, FALLBACK_MESSAGE};
use crate::core::{CommandError, ResolvedCommand};
use crate::domain::{DomainStores, Habit, Task};
use crate::nlp::{find_value, Intent};

pub struct IntentDispatcher {
    stores: DomainStores,
    default_due: Duration,
}

/// 本地日期零点对应的 UTC 时刻
fn local_midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_time(NaiveTime::MIN)
        .and_local_timezone(Local)
        .earliest()
        .map(|d| d.with_timezone(&Utc))
}

/// 当前本地日 [今天零点, 明天零点)
fn today_bounds() -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let today = Local::now().date_naive();
    Some((local_midnight(today)?, local_midnight(today.succ_opt()?)?))
}

impl IntentDispatcher {
    pub fn new(stores: DomainStores, default_due_hours: i64) -> Self {
        Self {
            stores,
            default_due: Duration::hours(default_due_hours),
        }
    }

    /// 执行分发；总能得到回复
    pub async fn dispatch(&self, user_id: &str, command: &ResolvedCommand) -> DispatchResponse {
        let intent = command.intent();
        match self.handle(user_id, command).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(%intent, error = %e, "error handling intent");
                DispatchResponse::failure()
            }
        }
    }

    async fn handle(&self, user_id: &str, command: &ResolvedCommand) -> Result<DispatchResponse, CommandError> {
        let entities = &command.entities;
        let fallback = || {
            DispatchResponse::message(
                command
                    .classification
                    .answer
                    .clone()
                    .unwrap_or_else(|| FALLBACK_MESSAGE.to_string()),
            )
        };

        let response = match command.intent() {
            Intent::TaskCreate => match find_value(entities, "task") {
                Some(title) => {
                    let task = Task::new(user_id, title).with_due(Utc::now() + self.default_due);
                    let task = self.stores.tasks.create(task).await?;
                    DispatchResponse::with_data(format!("I've created a task: \"{}\"", task.title), &task)
                }
                None => fallback(),
            },

            intent @ (Intent::TaskList | Intent::TaskListToday) => {
                let today_only = intent == Intent::TaskListToday;
                let range = if today_only {
                    Some(today_bounds().ok_or_else(|| {
                        CommandError::DispatchActionFailure("cannot resolve the current local day".to_string())
                    })?)
                } else {
                    None
                };
                let tasks = self.stores.tasks.list_by_owner(user_id, range).await?;
                let message = if today_only {
                    "Here are your tasks for today:"
                } else {
                    "Here are all your tasks:"
                };
                DispatchResponse::with_data(message, &tasks)
            }

            Intent::HabitCreate => match find_value(entities, "habit") {
                Some(name) => {
                    let habit = self.stores.habits.create(Habit::new(user_id, name)).await?;
                    DispatchResponse::with_data(format!("I've created a habit to track: \"{}\"", habit.name), &habit)
                }
                None => fallback(),
            },

            Intent::HabitList => {
                let habits = self.stores.habits.list_by_owner(user_id).await?;
                DispatchResponse::with_data("Here are your habits:", &habits)
            }

            Intent::HabitLog => match find_value(entities, "habit") {
                Some(name) => self.log_habit(user_id, name).await?,
                None => fallback(),
            },

            Intent::FocusStart => DispatchResponse::message("Focus mode activated. I'll help you stay on track!"),
            Intent::FocusStop => DispatchResponse::message("Focus mode ended. Great job staying focused!"),

            Intent::EmailSend => {
                let recipient = find_value(entities, "recipient").unwrap_or("your contact");
                let subject = find_value(entities, "subject").unwrap_or("your topic");
                DispatchResponse::message(format!("I'll prepare an email to {recipient} about {subject}"))
            }
            Intent::EmailCheck => DispatchResponse::message("I'll check your emails"),

            Intent::CalendarSchedule => {
                let target = match (find_value(entities, "event"), find_value(entities, "person")) {
                    (Some(event), _) => event.to_string(),
                    (None, Some(person)) => format!("a meeting with {person}"),
                    (None, None) => "your event".to_string(),
                };
                let date = find_value(entities, "date").unwrap_or("the specified date");
                DispatchResponse::message(format!("I'll schedule {target} on {date}"))
            }
            Intent::CalendarViewToday => DispatchResponse::message("Here are your events for today"),
            Intent::CalendarViewTomorrow => DispatchResponse::message("Here are your events for tomorrow"),
            Intent::CalendarView => DispatchResponse::message("Here's your calendar"),

            // 兜底值不当作真实分析结果
            Intent::SentimentAnalyze => match command.augmentation.as_ref().and_then(|a| a.live_sentiment()) {
                Some(sentiment) => DispatchResponse::with_data(
                    format!(
                        "Your message sounds {} (confidence {:.2})",
                        sentiment.label.to_lowercase(),
                        sentiment.score
                    ),
                    sentiment,
                ),
                None => fallback(),
            },

            Intent::TaskSuggest => match command.augmentation.as_ref().and_then(|a| a.live_suggestions()) {
                Some(suggestions) if !suggestions.is_empty() => {
                    DispatchResponse::with_data("Here are some tasks you might want to do:", suggestions)
                }
                _ => fallback(),
            },

            Intent::TaskComplete | Intent::Unknown => fallback(),
        };
        Ok(response)
    }

    async fn log_habit(&self, user_id: &str, name: &str) -> Result<DispatchResponse, CommandError> {
        let Some(habit) = self.stores.habits.find_by_name(user_id, name).await? else {
            return Ok(DispatchResponse::message(format!("I couldn't find a habit named \"{name}\"")));
        };

        let today = Local::now().date_naive();
        let progress = self.stores.progress.increment_or_create(&habit, today).await?;
        Ok(DispatchResponse::with_data(
            format!("I've logged your progress for \"{name}\""),
            &progress,
        ))
    }
}
