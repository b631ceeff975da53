//! 默认训练语料：模板（`%slot%` 为槽位）与各意图的回复模板（`{{slot}}` 占位）

use super::intent::Intent;

pub const DOCUMENTS: &[(&str, Intent)] = &[
    // 任务
    ("add task %task%", Intent::TaskCreate),
    ("create task %task%", Intent::TaskCreate),
    ("new task %task%", Intent::TaskCreate),
    ("remind me to %task%", Intent::TaskCreate),
    ("i need to %task%", Intent::TaskCreate),
    ("list my tasks", Intent::TaskList),
    ("show me my tasks", Intent::TaskList),
    ("what are my tasks", Intent::TaskList),
    ("show tasks for today", Intent::TaskListToday),
    ("what do i have to do today", Intent::TaskListToday),
    ("mark task %task% as done", Intent::TaskComplete),
    ("complete task %task%", Intent::TaskComplete),
    ("finish task %task%", Intent::TaskComplete),
    ("i finished %task%", Intent::TaskComplete),
    // 习惯
    ("track habit %habit%", Intent::HabitCreate),
    ("create habit %habit%", Intent::HabitCreate),
    ("new habit %habit%", Intent::HabitCreate),
    ("help me build habit of %habit%", Intent::HabitCreate),
    ("show my habits", Intent::HabitList),
    ("list my habits", Intent::HabitList),
    ("what habits am i tracking", Intent::HabitList),
    ("log %habit% for today", Intent::HabitLog),
    ("completed %habit% today", Intent::HabitLog),
    ("i did %habit% today", Intent::HabitLog),
    // 专注模式
    ("start focus mode", Intent::FocusStart),
    ("begin focus session", Intent::FocusStart),
    ("help me focus", Intent::FocusStart),
    ("start pomodoro", Intent::FocusStart),
    ("end focus mode", Intent::FocusStop),
    ("stop focus session", Intent::FocusStop),
    ("finish pomodoro", Intent::FocusStop),
    // 邮件
    ("send email to %recipient% about %subject%", Intent::EmailSend),
    ("email %recipient% about %subject%", Intent::EmailSend),
    ("compose email to %recipient%", Intent::EmailSend),
    ("check my emails", Intent::EmailCheck),
    ("any new emails", Intent::EmailCheck),
    ("show me my inbox", Intent::EmailCheck),
    // 日历
    ("schedule meeting with %person% on %date%", Intent::CalendarSchedule),
    ("add event %event% on %date%", Intent::CalendarSchedule),
    ("create appointment for %event% on %date%", Intent::CalendarSchedule),
    ("show my calendar", Intent::CalendarView),
    ("what meetings do i have today", Intent::CalendarViewToday),
    ("show my schedule for tomorrow", Intent::CalendarViewTomorrow),
    // 情绪与建议（依赖增强服务）
    ("how do i sound", Intent::SentimentAnalyze),
    ("analyze my mood", Intent::SentimentAnalyze),
    ("what is the sentiment of %text%", Intent::SentimentAnalyze),
    ("suggest some tasks", Intent::TaskSuggest),
    ("what should i do next", Intent::TaskSuggest),
    ("recommend tasks for me", Intent::TaskSuggest),
];

pub const ANSWERS: &[(Intent, &str)] = &[
    (Intent::TaskCreate, "I'll create a task for: {{task}}"),
    (Intent::TaskList, "Here are your tasks:"),
    (Intent::TaskListToday, "Here are your tasks for today:"),
    (Intent::TaskComplete, "I've marked \"{{task}}\" as complete!"),
    (Intent::HabitCreate, "I'll help you track your habit: {{habit}}"),
    (Intent::HabitList, "Here are the habits you're currently tracking:"),
    (Intent::HabitLog, "I've logged your progress for {{habit}}"),
    (Intent::FocusStart, "Starting focus mode. I'll help you stay on track!"),
    (Intent::FocusStop, "Focus mode ended. You did great!"),
    (Intent::EmailSend, "I'll prepare an email to {{recipient}} about {{subject}}"),
    (Intent::EmailCheck, "Checking your emails..."),
    (Intent::CalendarSchedule, "I'll schedule {{event}} on {{date}}"),
    (Intent::CalendarView, "Here's your calendar:"),
    (Intent::CalendarViewToday, "Here are your meetings for today:"),
    (Intent::CalendarViewTomorrow, "Here's your schedule for tomorrow:"),
    (Intent::SentimentAnalyze, "Let me take a look at how that sounds."),
    (Intent::TaskSuggest, "Here are a few ideas for what to do next."),
];
