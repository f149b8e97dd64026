//! # 测试替身
//!
//! 供各 crate 集成测试使用的确定性实现，仅在 `test-utils` feature 下编译。

use crate::news::entity::NewsDocument;
use crate::news::error::NewsError;
use crate::news::port::NewsProvider;
use crate::quote::entity::PriceRecord;
use crate::quote::error::QuoteError;
use crate::quote::port::QuoteProvider;
use crate::sentiment::entity::{ChunkSentiment, SentimentLabel};
use crate::sentiment::error::InferenceError;
use crate::sentiment::port::{SentimentClassifier, TextTokenizer};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// # Summary
/// 以空白切词的分词器，每个新单词分配一个递增 id。
///
/// # Invariants
/// - 同一单词永远得到同一 id，`decode` 以单个空格拼接。
pub struct WhitespaceTokenizer {
    // (单词 -> id, id -> 单词)
    vocab: Mutex<(HashMap<String, u32>, Vec<String>)>,
    max_input_length: usize,
}

impl WhitespaceTokenizer {
    pub fn new(max_input_length: usize) -> Self {
        Self {
            vocab: Mutex::new((HashMap::new(), Vec::new())),
            max_input_length,
        }
    }
}

impl TextTokenizer for WhitespaceTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>, InferenceError> {
        let mut guard = self
            .vocab
            .lock()
            .map_err(|e| InferenceError::Tokenizer(e.to_string()))?;
        let (index, words) = &mut *guard;
        let mut ids = Vec::new();
        for word in text.split_whitespace() {
            if let Some(id) = index.get(word) {
                ids.push(*id);
                continue;
            }
            let id = u32::try_from(words.len())
                .map_err(|e| InferenceError::Tokenizer(e.to_string()))?;
            index.insert(word.to_string(), id);
            words.push(word.to_string());
            ids.push(id);
        }
        Ok(ids)
    }

    fn decode(&self, ids: &[u32]) -> Result<String, InferenceError> {
        let guard = self
            .vocab
            .lock()
            .map_err(|e| InferenceError::Tokenizer(e.to_string()))?;
        let words = &guard.1;
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            let word = usize::try_from(*id)
                .ok()
                .and_then(|i| words.get(i))
                .ok_or_else(|| InferenceError::Tokenizer(format!("unknown token id {}", id)))?;
            out.push(word.as_str());
        }
        Ok(out.join(" "))
    }

    fn max_input_length(&self) -> usize {
        self.max_input_length
    }
}

/// # Summary
/// 关键字分类器：命中的第一个关键字决定标签，否则为 Neutral。
///
/// # Invariants
/// - 空白文本或包含失败标记的文本返回 `InferenceError`。
/// - 记录每次调用的输入，便于断言调用顺序。
pub struct KeywordClassifier {
    rules: Vec<(String, SentimentLabel)>,
    fail_marker: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordClassifier {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            fail_marker: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_rule(mut self, keyword: &str, label: SentimentLabel) -> Self {
        self.rules.push((keyword.to_lowercase(), label));
        self
    }

    pub fn failing_on(mut self, marker: &str) -> Self {
        self.fail_marker = Some(marker.to_string());
        self
    }

    /// 按调用顺序返回收到的全部输入。
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl SentimentClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Result<ChunkSentiment, InferenceError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(text.to_string());
        }
        if text.trim().is_empty() {
            return Err(InferenceError::MalformedInput("empty chunk".into()));
        }
        if let Some(marker) = &self.fail_marker
            && text.contains(marker.as_str())
        {
            return Err(InferenceError::ModelUnavailable("scripted failure".into()));
        }
        let lower = text.to_lowercase();
        let hit = self
            .rules
            .iter()
            .find(|(keyword, _)| lower.contains(keyword.as_str()));
        Ok(match hit {
            Some((_, label)) => ChunkSentiment::new(label.clone(), 0.9),
            None => ChunkSentiment::new(SentimentLabel::Neutral, 0.5),
        })
    }
}

/// # Summary
/// 预置报价表的报价提供者，未登记的证券返回 `Unavailable`。
#[derive(Default)]
pub struct StaticQuoteProvider {
    quotes: HashMap<String, PriceRecord>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl StaticQuoteProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quote(mut self, symbol: &str, name: &str, price: Decimal) -> Self {
        self.quotes.insert(
            symbol.to_string(),
            PriceRecord {
                symbol: symbol.to_string(),
                display_name: name.to_string(),
                price,
            },
        );
        self
    }

    /// 为指定证券的响应增加人为延迟。
    pub fn with_delay(mut self, symbol: &str, delay: Duration) -> Self {
        self.delays.insert(symbol.to_string(), delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteProvider for StaticQuoteProvider {
    async fn latest_quote(&self, symbol: &str) -> Result<PriceRecord, QuoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(symbol) {
            tokio::time::sleep(*delay).await;
        }
        self.quotes
            .get(symbol)
            .cloned()
            .ok_or_else(|| QuoteError::Unavailable(symbol.to_string()))
    }
}

/// # Summary
/// 预置文章表的新闻提供者，可指定某些证券抓取失败。
#[derive(Default)]
pub struct StaticNewsProvider {
    articles: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl StaticNewsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_articles(mut self, symbol: &str, texts: &[&str]) -> Self {
        self.articles.insert(
            symbol.to_string(),
            texts.iter().map(|t| t.to_string()).collect(),
        );
        self
    }

    pub fn failing(mut self, symbol: &str) -> Self {
        self.failing.insert(symbol.to_string());
        self
    }

    pub fn with_delay(mut self, symbol: &str, delay: Duration) -> Self {
        self.delays.insert(symbol.to_string(), delay);
        self
    }

    /// 被查询过的证券代码 (按调用顺序)。
    pub fn searched(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl NewsProvider for StaticNewsProvider {
    async fn search(&self, symbol: &str) -> Result<Vec<NewsDocument>, NewsError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(symbol.to_string());
        }
        if let Some(delay) = self.delays.get(symbol) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(symbol) {
            return Err(NewsError::Platform("rate limited".into()));
        }
        Ok(self
            .articles
            .get(symbol)
            .map(|texts| {
                texts
                    .iter()
                    .map(|t| NewsDocument {
                        symbol: symbol.to_string(),
                        text: t.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}
