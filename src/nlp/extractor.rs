//! 兜底槽位抽取
//!
//! 当训练模型未能为 `*.create` 意图绑定内容槽位时，按固定优先级尝试：
//! 1. `add|create|new <kind> X`
//! 2. `remind me to X`
//! 3. `i need to X`
//! 第一个命中的模式胜出。

use regex::Regex;

use super::entity::{Entity, Span};

pub struct SlotExtractor {
    kind: String,
    patterns: Vec<Regex>,
}

impl SlotExtractor {
    /// 为指定槽位类型（如 task / habit）构建抽取器
    pub fn new(kind: &str) -> Result<Self, regex::Error> {
        let sources = [
            format!(
                r"(?i)\b(?:add|create|new)\s+(?:a\s+)?(?:new\s+)?{}\s+(?P<content>.+?)[\s.!?]*$",
                regex::escape(kind)
            ),
            r"(?i)\bremind me to\s+(?P<content>.+?)[\s.!?]*$".to_string(),
            r"(?i)\bi need to\s+(?P<content>.+?)[\s.!?]*$".to_string(),
        ];
        let patterns = sources
            .iter()
            .map(|s| Regex::new(s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            kind: kind.to_string(),
            patterns,
        })
    }

    /// 恢复内容片段；全部模式都未命中时返回 None
    pub fn extract(&self, text: &str) -> Option<Entity> {
        self.patterns.iter().find_map(|re| {
            let m = re.captures(text)?.name("content")?;
            if m.as_str().trim().is_empty() {
                return None;
            }
            Some(Entity::local(
                self.kind.clone(),
                m.as_str(),
                Some(Span::from_byte_range(text, m.start(), m.end())),
            ))
        })
    }
}
