//! 实体与来源标记

use serde::{Deserialize, Serialize};

/// 实体来源：本地分类器或远端增强服务
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Local,
    Remote,
}

/// 字符区间（按字符计，end 不含）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// 区间相交（端点相接也算）：`other.start <= self.end && other.end >= self.start`
    pub fn overlaps(&self, other: &Span) -> bool {
        other.start <= self.end && other.end >= self.start
    }

    /// 由字节区间换算字符区间
    pub fn from_byte_range(text: &str, start: usize, end: usize) -> Self {
        let start_char = text[..start].chars().count();
        let len = text[start..end].chars().count();
        Self::new(start_char, start_char + len)
    }
}

/// 从指令中抽取的带类型文本片段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub kind: String,
    pub value: String,
    pub source_span: Option<Span>,
    pub origin: Origin,
}

impl Entity {
    pub fn local(kind: impl Into<String>, value: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
            source_span: span,
            origin: Origin::Local,
        }
    }

    pub fn remote(kind: impl Into<String>, value: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
            source_span: span,
            origin: Origin::Remote,
        }
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    /// 判重：同一语义类型，或双方区间都已知且相交
    pub fn overlaps(&self, other: &Entity) -> bool {
        if self.kind.eq_ignore_ascii_case(&other.kind) {
            return true;
        }
        match (&self.source_span, &other.source_span) {
            (Some(a), Some(b)) => a.overlaps(b),
            _ => false,
        }
    }
}

/// 按类型取第一个实体的值
pub fn find_value<'a>(entities: &'a [Entity], kind: &str) -> Option<&'a str> {
    entities
        .iter()
        .find(|e| e.kind.eq_ignore_ascii_case(kind))
        .map(|e| e.value.as_str())
}
