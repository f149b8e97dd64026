//! 基于 VADER 词典的情绪分类器。

use kizashi_core::sentiment::entity::{ChunkSentiment, SentimentLabel};
use kizashi_core::sentiment::error::InferenceError;
use kizashi_core::sentiment::port::SentimentClassifier;
use vader_sentiment::SentimentIntensityAnalyzer;

// VADER 的标准判定阈值
const POLARITY_THRESHOLD: f64 = 0.05;

/// # Summary
/// 词典模型分类器，输出 Positive / Negative / Neutral 三类标签。
///
/// # Invariants
/// - 词典在构造时载入，之后只读，可跨线程共享。
/// - 确定性：相同文本必得相同结果。
pub struct LexiconClassifier {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl LexiconClassifier {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentClassifier for LexiconClassifier {
    /// # Summary
    /// 对单个分块打分。
    ///
    /// # Logic
    /// 1. 空白文本视为非法输入。
    /// 2. compound >= 0.05 判为 Positive，<= -0.05 判为 Negative，否则 Neutral。
    /// 3. 极性标签的置信度取 |compound|，Neutral 取中性词占比。
    fn classify(&self, text: &str) -> Result<ChunkSentiment, InferenceError> {
        if text.trim().is_empty() {
            return Err(InferenceError::MalformedInput("empty chunk".into()));
        }

        let scores = self.analyzer.polarity_scores(text);
        let compound = scores.get("compound").copied().unwrap_or(0.0);

        let result = if compound >= POLARITY_THRESHOLD {
            ChunkSentiment::new(SentimentLabel::Positive, compound.abs())
        } else if compound <= -POLARITY_THRESHOLD {
            ChunkSentiment::new(SentimentLabel::Negative, compound.abs())
        } else {
            let neutral = scores.get("neu").copied().unwrap_or(1.0);
            ChunkSentiment::new(SentimentLabel::Neutral, neutral)
        };
        Ok(result)
    }
}
