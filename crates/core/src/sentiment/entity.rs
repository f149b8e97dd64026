use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// 无可用信号时在线上输出的哨兵字符串。
pub const FALLBACK_WIRE: &str = "Unknown";

/// 模型标签与哨兵同名时的替代名称，避免两者在线上无法区分。
pub const SHADOWED_LABEL: &str = "ModelUnknown";

/// # Summary
/// 模型输出的情绪标签。
///
/// # Invariants
/// - 三个常见标签有独立变体，模型自定义的其它标签原样保存在 `Other` 中。
/// - 线上格式为首字母大写的标签名，与既有前端的比较方式一致。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    // 模型自定义标签
    Other(String),
}

impl SentimentLabel {
    /// # Summary
    /// 将模型原始标签名解析为枚举。
    ///
    /// # Logic
    /// 1. 忽略大小写与两端空白匹配 positive / negative / neutral。
    /// 2. 与回退哨兵同名 (忽略大小写) 的标签改名为 `SHADOWED_LABEL`。
    /// 3. 其余名称保留原文，归入 `Other`。
    pub fn parse(raw: &str) -> Self {
        let name = raw.trim();
        match name.to_lowercase().as_str() {
            "positive" => SentimentLabel::Positive,
            "negative" => SentimentLabel::Negative,
            "neutral" => SentimentLabel::Neutral,
            _ if name.eq_ignore_ascii_case(FALLBACK_WIRE) => {
                SentimentLabel::Other(SHADOWED_LABEL.to_string())
            }
            _ => SentimentLabel::Other(name.to_string()),
        }
    }

    /// 线上名称，永远不会等于 `FALLBACK_WIRE`。
    pub fn as_str(&self) -> &str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Other(name) if name.eq_ignore_ascii_case(FALLBACK_WIRE) => {
                SHADOWED_LABEL
            }
            SentimentLabel::Other(name) => name,
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for SentimentLabel {
    fn from(raw: String) -> Self {
        SentimentLabel::parse(&raw)
    }
}

impl From<SentimentLabel> for String {
    fn from(label: SentimentLabel) -> Self {
        label.as_str().to_string()
    }
}

/// # Summary
/// 单个分块的分类结果。
///
/// # Invariants
/// - `score` 恒在 `[0, 1]` 区间内。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkSentiment {
    // 预测标签
    pub label: SentimentLabel,
    // 置信度
    pub score: f64,
}

impl ChunkSentiment {
    /// 构造结果，将置信度钳制到 `[0, 1]`，NaN 视为 0。
    pub fn new(label: SentimentLabel, score: f64) -> Self {
        let score = if score.is_nan() {
            0.0
        } else {
            score.clamp(0.0, 1.0)
        };
        Self { label, score }
    }
}

/// # Summary
/// 文档经分词后切出的一个分块。
///
/// # Invariants
/// - `text` 用同一分词器重新编码后，token 数不超过模型最大输入长度。
/// - 同一文档的各分块按 `index` 递增，`tokens` 区间首尾相接、互不重叠。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    // 所属证券代码
    pub symbol: String,
    // 在文档内的序号，从 0 开始
    pub index: usize,
    // 在原始 token 序列中的区间
    pub tokens: Range<usize>,
    // 解码后的文本 (允许与原文存在空白/标点差异)
    pub text: String,
}

/// # Summary
/// 证券级情绪结论。
///
/// # Invariants
/// - `Fallback` 是独立的哨兵变体，不是任何模型标签。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SentimentOutcome {
    Label(SentimentLabel),
    // 没有可用的新闻信号
    Fallback,
}

impl SentimentOutcome {
    pub fn as_str(&self) -> &str {
        match self {
            SentimentOutcome::Label(label) => label.as_str(),
            SentimentOutcome::Fallback => FALLBACK_WIRE,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, SentimentOutcome::Fallback)
    }
}

impl fmt::Display for SentimentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for SentimentOutcome {
    fn from(raw: String) -> Self {
        if raw == FALLBACK_WIRE {
            SentimentOutcome::Fallback
        } else {
            SentimentOutcome::Label(SentimentLabel::parse(&raw))
        }
    }
}

impl From<SentimentOutcome> for String {
    fn from(outcome: SentimentOutcome) -> Self {
        outcome.as_str().to_string()
    }
}

/// # Summary
/// 单个证券的情绪结论。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolSentiment {
    pub symbol: String,
    pub outcome: SentimentOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_parse_is_case_insensitive() {
        assert_eq!(SentimentLabel::parse("NEGATIVE"), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::parse(" positive "), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::parse("neutral"), SentimentLabel::Neutral);
        assert_eq!(
            SentimentLabel::parse("mixed"),
            SentimentLabel::Other("mixed".to_string())
        );
    }

    #[test]
    fn test_outcome_wire_format() {
        let json = serde_json::to_string(&SentimentOutcome::Fallback).unwrap();
        assert_eq!(json, "\"Unknown\"");

        let json =
            serde_json::to_string(&SentimentOutcome::Label(SentimentLabel::Negative)).unwrap();
        assert_eq!(json, "\"Negative\"");

        let back: SentimentOutcome = serde_json::from_str("\"Unknown\"").unwrap();
        assert!(back.is_fallback());
    }

    #[test]
    fn test_model_label_named_unknown_stays_distinct_from_fallback() {
        let label = SentimentLabel::parse("unknown");
        assert_eq!(label, SentimentLabel::Other(SHADOWED_LABEL.to_string()));

        let outcome = SentimentOutcome::Label(label);
        let json = serde_json::to_string(&outcome).unwrap();
        assert_ne!(json, "\"Unknown\"");
        let back: SentimentOutcome = serde_json::from_str(&json).unwrap();
        assert!(!back.is_fallback());
        assert_eq!(back, outcome);

        // 直接构造的同名标签同样不会输出哨兵
        let raw = SentimentOutcome::Label(SentimentLabel::Other("Unknown".to_string()));
        assert_eq!(raw.as_str(), SHADOWED_LABEL);
    }

    #[test]
    fn test_chunk_sentiment_clamps_score() {
        assert_eq!(ChunkSentiment::new(SentimentLabel::Positive, 1.7).score, 1.0);
        assert_eq!(ChunkSentiment::new(SentimentLabel::Positive, -0.2).score, 0.0);
        assert_eq!(ChunkSentiment::new(SentimentLabel::Positive, f64::NAN).score, 0.0);
    }
}
