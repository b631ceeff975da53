//! 本地意图分类器
//!
//! 训练时把每条模板（如 `remind me to %task%`）编译为大小写不敏感、首尾锚定的正则。
//! 分类分两级：
//! - **模板匹配**：整句命中模板，槽位绑定为带区间的实体；多条命中取字面词最多者。
//! - **词面匹配**：未整句命中时按模板字面词与输入词的重合度打分，不绑定槽位。
//!
//! `*.create` 意图缺少内容槽位时，交给 [`SlotExtractor`] 兜底恢复。
//! 分类是同步、确定性的；训练后的模型只读，可跨指令共享。

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::Serialize;

use super::corpus;
use super::entity::{Entity, Span};
use super::extractor::SlotExtractor;
use super::intent::Intent;
use crate::core::CommandError;

/// 词面匹配的最低置信度（低于此视为无法识别）
pub const DEFAULT_MIN_SCORE: f32 = 0.35;

const TEMPLATE_BASE_SCORE: f32 = 0.75;
const LEXICAL_WEIGHT: f32 = 0.7;

/// 一次分类的结果；产出后不再修改
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResult {
    pub intent: Intent,
    pub score: f32,
    pub entities: Vec<Entity>,
    /// 用已绑定槽位渲染后的回复模板；有占位符未绑定时为 None
    pub answer: Option<String>,
    pub utterance: String,
}

impl ClassificationResult {
    /// 分类器失败时的降级结果
    pub fn unknown(utterance: &str) -> Self {
        Self {
            intent: Intent::Unknown,
            score: 0.0,
            entities: Vec::new(),
            answer: None,
            utterance: utterance.to_string(),
        }
    }
}

/// 本地分类器接口
pub trait IntentClassifier: Send + Sync {
    fn classify(&self, utterance: &str) -> Result<ClassificationResult, CommandError>;
}

struct Template {
    intent: Intent,
    regex: Regex,
    literals: Vec<String>,
    slots: Vec<String>,
}

impl Template {
    fn compile(source: &str, intent: Intent) -> Result<Self, regex::Error> {
        let mut parts = Vec::new();
        let mut literals = Vec::new();
        let mut slots = Vec::new();
        for word in source.split_whitespace() {
            if let Some(name) = word.strip_prefix('%').and_then(|w| w.strip_suffix('%')) {
                parts.push(format!("(?P<{name}>.+?)"));
                slots.push(name.to_string());
            } else {
                parts.push(regex::escape(word));
                literals.extend(tokenize(word));
            }
        }
        let pattern = format!(r"(?i)^\s*{}[\s.!?]*$", parts.join(r"\s+"));
        Ok(Self {
            intent,
            regex: Regex::new(&pattern)?,
            literals,
            slots,
        })
    }

    fn bind(&self, text: &str) -> Option<Vec<Entity>> {
        let caps = self.regex.captures(text)?;
        let entities = self
            .slots
            .iter()
            .filter_map(|slot| {
                let m = caps.name(slot)?;
                Some(Entity::local(
                    slot.clone(),
                    m.as_str(),
                    Some(Span::from_byte_range(text, m.start(), m.end())),
                ))
            })
            .collect();
        Some(entities)
    }
}

/// 小写并按非字母数字切词
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// 基于模板语料训练的分类器
pub struct PatternClassifier {
    templates: Vec<Template>,
    answers: HashMap<Intent, String>,
    extractors: HashMap<Intent, SlotExtractor>,
    min_score: f32,
}

impl PatternClassifier {
    /// 空模型（未训练）；分类会返回 ClassifierFailure
    pub fn new(min_score: f32) -> Self {
        Self {
            templates: Vec::new(),
            answers: HashMap::new(),
            extractors: HashMap::new(),
            min_score,
        }
    }

    /// 用默认语料训练
    pub fn train(min_score: f32) -> Result<Self, regex::Error> {
        let mut classifier = Self::new(min_score);
        for (template, intent) in corpus::DOCUMENTS {
            classifier.add_document(template, *intent)?;
        }
        for (intent, answer) in corpus::ANSWERS {
            classifier.add_answer(*intent, answer);
        }
        Ok(classifier)
    }

    /// 进程级共享的默认模型：首次使用时训练一次，之后只读
    pub fn shared() -> Arc<PatternClassifier> {
        static DEFAULT_MODEL: OnceLock<Arc<PatternClassifier>> = OnceLock::new();
        DEFAULT_MODEL
            .get_or_init(|| {
                Arc::new(
                    PatternClassifier::train(DEFAULT_MIN_SCORE)
                        .expect("built-in corpus must compile"),
                )
            })
            .clone()
    }

    pub fn add_document(&mut self, template: &str, intent: Intent) -> Result<(), regex::Error> {
        if let Some(slot) = intent.content_slot() {
            if !self.extractors.contains_key(&intent) {
                self.extractors.insert(intent, SlotExtractor::new(slot)?);
            }
        }
        self.templates.push(Template::compile(template, intent)?);
        Ok(())
    }

    pub fn add_answer(&mut self, intent: Intent, answer: &str) {
        self.answers.insert(intent, answer.to_string());
    }

    fn match_template(&self, text: &str, token_count: usize) -> Option<(Intent, f32, Vec<Entity>)> {
        let mut best: Option<(&Template, Vec<Entity>)> = None;
        for template in &self.templates {
            let Some(entities) = template.bind(text) else { continue };
            let better = match &best {
                Some((current, _)) => template.literals.len() > current.literals.len(),
                None => true,
            };
            if better {
                best = Some((template, entities));
            }
        }
        best.map(|(template, entities)| {
            let coverage = template.literals.len() as f32 / token_count.max(1) as f32;
            let score = (TEMPLATE_BASE_SCORE + (1.0 - TEMPLATE_BASE_SCORE) * coverage).min(1.0);
            (template.intent, score, entities)
        })
    }

    fn match_lexical(&self, tokens: &[String]) -> Option<(Intent, f32)> {
        let input: HashSet<&str> = tokens.iter().map(String::as_str).collect();
        if input.is_empty() {
            return None;
        }
        let mut best: Option<(Intent, f32)> = None;
        for template in &self.templates {
            let literals: HashSet<&str> = template.literals.iter().map(String::as_str).collect();
            if literals.is_empty() {
                continue;
            }
            let shared = literals.intersection(&input).count() as f32;
            let similarity =
                0.5 * shared / literals.len() as f32 + 0.5 * shared / input.len() as f32;
            let score = LEXICAL_WEIGHT * similarity;
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((template.intent, score));
            }
        }
        best
    }

    fn render_answer(&self, intent: Intent, entities: &[Entity]) -> Option<String> {
        let mut answer = self.answers.get(&intent)?.clone();
        for entity in entities {
            answer = answer.replace(&format!("{{{{{}}}}}", entity.kind), &entity.value);
        }
        if answer.contains("{{") {
            return None;
        }
        Some(answer)
    }
}

impl IntentClassifier for PatternClassifier {
    fn classify(&self, utterance: &str) -> Result<ClassificationResult, CommandError> {
        let text = utterance.trim();
        if text.is_empty() {
            return Err(CommandError::InvalidInput("utterance is empty".to_string()));
        }
        if self.templates.is_empty() {
            return Err(CommandError::ClassifierFailure("model has no training documents".to_string()));
        }

        let tokens = tokenize(text);
        let (intent, score, mut entities) = match self.match_template(text, tokens.len()) {
            Some(hit) => hit,
            None => match self.match_lexical(&tokens) {
                Some((intent, score)) if score >= self.min_score => (intent, score, Vec::new()),
                best => {
                    let best_score = best.map_or(0.0, |(_, s)| s);
                    return Ok(ClassificationResult {
                        intent: Intent::Unknown,
                        score: 1.0 - best_score,
                        entities: Vec::new(),
                        answer: None,
                        utterance: text.to_string(),
                    });
                }
            },
        };

        if let (Some(slot), Some(extractor)) = (intent.content_slot(), self.extractors.get(&intent)) {
            if !entities.iter().any(|e| e.kind == slot) {
                if let Some(recovered) = extractor.extract(text) {
                    tracing::debug!(%intent, value = %recovered.value, "slot recovered by fallback extractor");
                    entities.push(recovered);
                }
            }
        }

        let answer = self.render_answer(intent, &entities);
        Ok(ClassificationResult {
            intent,
            score,
            entities,
            answer,
            utterance: text.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::entity::find_value;

    fn classifier() -> Arc<PatternClassifier> {
        PatternClassifier::shared()
    }

    #[test]
    fn test_remind_me_binds_task_slot() {
        let r = classifier().classify("remind me to call mom").unwrap();
        assert_eq!(r.intent, Intent::TaskCreate);
        assert_eq!(find_value(&r.entities, "task"), Some("call mom"));
        assert_eq!(r.entities[0].source_span, Some(Span::new(13, 21)));
        assert!(r.score > TEMPLATE_BASE_SCORE && r.score <= 1.0);
        assert_eq!(r.answer.as_deref(), Some("I'll create a task for: call mom"));
    }

    #[test]
    fn test_habit_log_template() {
        let r = classifier().classify("i did running today").unwrap();
        assert_eq!(r.intent, Intent::HabitLog);
        assert_eq!(find_value(&r.entities, "habit"), Some("running"));
    }

    #[test]
    fn test_slotless_template_scores_full() {
        let r = classifier().classify("Show my calendar").unwrap();
        assert_eq!(r.intent, Intent::CalendarView);
        assert_eq!(r.score, 1.0);
        assert_eq!(r.answer.as_deref(), Some("Here's your calendar:"));
    }

    #[test]
    fn test_email_binds_two_slots() {
        let r = classifier().classify("send email to bob about lunch").unwrap();
        assert_eq!(r.intent, Intent::EmailSend);
        assert_eq!(find_value(&r.entities, "recipient"), Some("bob"));
        assert_eq!(find_value(&r.entities, "subject"), Some("lunch"));
        assert_eq!(r.answer.as_deref(), Some("I'll prepare an email to bob about lunch"));
    }

    #[test]
    fn test_unbound_placeholder_leaves_answer_absent() {
        let r = classifier().classify("compose email to bob").unwrap();
        assert_eq!(r.intent, Intent::EmailSend);
        assert!(r.answer.is_none());
    }

    #[test]
    fn test_lexical_match_without_slots() {
        let r = classifier().classify("please list all my tasks").unwrap();
        assert_eq!(r.intent, Intent::TaskList);
        assert!(r.score < TEMPLATE_BASE_SCORE);
        assert!(r.entities.is_empty());
    }

    #[test]
    fn test_lexical_create_recovers_slot_with_extractor() {
        let r = classifier().classify("could you add a task water plants").unwrap();
        assert_eq!(r.intent, Intent::TaskCreate);
        assert_eq!(find_value(&r.entities, "task"), Some("water plants"));
    }

    #[test]
    fn test_gibberish_is_unknown() {
        let r = classifier().classify("asdkjhasd").unwrap();
        assert_eq!(r.intent, Intent::Unknown);
        assert!(r.entities.is_empty());
        assert!(r.answer.is_none());
    }

    #[test]
    fn test_empty_input_is_invalid() {
        let err = classifier().classify("   ").unwrap_err();
        assert!(matches!(err, CommandError::InvalidInput(_)));
    }

    #[test]
    fn test_untrained_model_fails() {
        let err = PatternClassifier::new(DEFAULT_MIN_SCORE).classify("hello").unwrap_err();
        assert!(matches!(err, CommandError::ClassifierFailure(_)));
    }

    #[test]
    fn test_intent_always_in_vocabulary() {
        let inputs = [
            "hello there",
            "start pomodoro",
            "what should i do next",
            "log reading for today",
            "zzz qqq",
            "schedule meeting with Ann on Friday",
            "1234",
        ];
        for input in inputs {
            let r = classifier().classify(input).unwrap();
            let label = r.intent.label();
            assert!(label.parse::<Intent>().is_ok(), "unexpected label {label}");
            assert!((0.0..=1.0).contains(&r.score));
        }
    }

    #[test]
    fn test_classification_is_deterministic() {
        let a = classifier().classify("add event standup on monday").unwrap();
        let b = classifier().classify("add event standup on monday").unwrap();
        assert_eq!(a.intent, b.intent);
        assert_eq!(a.entities, b.entities);
        assert_eq!(a.score, b.score);
    }
}
