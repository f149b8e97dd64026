use crate::chunker::Chunker;
use crate::classifier::LexiconClassifier;
use crate::reducer::{SentimentReducer, policy_for};
use crate::tokenizer::HfTokenizer;
use crate::transformer::TransformerClassifier;
use kizashi_core::config::{ClassifierKind, ModelConfig, StartupError};
use kizashi_core::news::entity::NewsDocument;
use kizashi_core::sentiment::entity::{ChunkSentiment, SymbolSentiment};
use kizashi_core::sentiment::error::InferenceError;
use kizashi_core::sentiment::port::{ReductionPolicy, SentimentClassifier, TextTokenizer};
use std::sync::Arc;
use tracing::info;

/// # Summary
/// 情绪引擎：分块 -> 分类 -> 归约 的组合体。
/// 进程启动时构造一次，之后以 `Arc` 共享给所有请求。
///
/// # Invariants
/// - 分块器与归约器只读；分类器自行负责推理会话的并发访问。
pub struct SentimentEngine {
    chunker: Chunker,
    classifier: Arc<dyn SentimentClassifier>,
    reducer: SentimentReducer,
}

impl SentimentEngine {
    /// # Summary
    /// 由已构造的组件组装引擎。
    ///
    /// # Arguments
    /// * `tokenizer` - 分词器适配器。
    /// * `classifier` - 分块分类器。
    /// * `policy` - 归约策略。
    pub fn new(
        tokenizer: Arc<dyn TextTokenizer>,
        classifier: Arc<dyn SentimentClassifier>,
        policy: Box<dyn ReductionPolicy>,
    ) -> Self {
        Self {
            chunker: Chunker::new(tokenizer),
            classifier,
            reducer: SentimentReducer::new(policy),
        }
    }

    /// # Summary
    /// 按模型配置加载默认引擎。
    ///
    /// # Logic
    /// 1. 从 `tokenizer_path` 加载 HuggingFace 分词器。
    /// 2. 按 `classifier` 构造分类器：默认加载 ONNX 金融情绪模型 (与分块器共用分词器)，
    ///    `lexicon` 时使用 VADER 词典。
    /// 3. 按配置选择归约策略。
    ///
    /// # Returns
    /// 成功返回引擎，任一组件加载失败返回 `StartupError`。
    pub fn load(config: &ModelConfig) -> Result<Self, StartupError> {
        let tokenizer = Arc::new(HfTokenizer::from_file(
            &config.tokenizer_path,
            config.max_input_length,
        )?);
        let classifier: Arc<dyn SentimentClassifier> = match config.classifier {
            ClassifierKind::Transformer => Arc::new(TransformerClassifier::load(
                config,
                Arc::clone(&tokenizer),
            )?),
            ClassifierKind::Lexicon => Arc::new(LexiconClassifier::new()),
        };
        let engine = Self::new(tokenizer, classifier, policy_for(config.policy));
        info!(
            "Sentiment engine ready (classifier {:?}, window {} tokens, policy '{}')",
            config.classifier,
            engine.chunker.max_input_length(),
            engine.reducer.policy_name()
        );
        Ok(engine)
    }

    /// # Summary
    /// 对单篇文档逐块分类。
    ///
    /// # Logic
    /// 1. 分块；整篇编码失败时返回单个错误。
    /// 2. 每个分块调用一次分类器，不重试。
    ///
    /// # Returns
    /// 按分块顺序排列的分类结果 (含失败项)。
    pub fn classify_document(
        &self,
        doc: &NewsDocument,
    ) -> Vec<Result<ChunkSentiment, InferenceError>> {
        match self.chunker.split(&doc.symbol, &doc.text) {
            Ok(chunks) => chunks
                .map(|chunk| chunk.and_then(|c| self.classifier.classify(&c.text)))
                .collect(),
            Err(e) => vec![Err(e)],
        }
    }

    /// # Summary
    /// 计算一个证券的情绪结论。
    ///
    /// # Logic
    /// 1. 按文档顺序依次分类，结果按文档/分块顺序拼接。
    /// 2. 交由归约器得出结论，失败分块被跳过。
    ///
    /// # Arguments
    /// * `symbol` - 证券代码。
    /// * `docs` - 该证券的新闻文档，可为空。
    ///
    /// # Returns
    /// 证券级结论，永不失败。
    pub fn analyze(&self, symbol: &str, docs: &[NewsDocument]) -> SymbolSentiment {
        let results = docs.iter().flat_map(|doc| self.classify_document(doc));
        self.reducer.reduce(symbol, results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducer::{FirstWins, MajorityVote};
    use kizashi_core::sentiment::entity::{SentimentLabel, SentimentOutcome};
    use kizashi_core::testing::{KeywordClassifier, WhitespaceTokenizer};

    fn doc(symbol: &str, text: &str) -> NewsDocument {
        NewsDocument {
            symbol: symbol.to_string(),
            text: text.to_string(),
        }
    }

    fn filler(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("w{}", i)).collect()
    }

    #[test]
    fn test_long_document_reduces_to_first_chunk_label() {
        // 2000 个 token：第一块含 "plunge"，后三块含 "surge"
        let mut words = filler(2000);
        words[10] = "plunge".to_string();
        words[600] = "surge".to_string();
        words[1100] = "surge".to_string();
        words[1700] = "surge".to_string();

        let classifier = Arc::new(
            KeywordClassifier::new()
                .with_rule("plunge", SentimentLabel::Negative)
                .with_rule("surge", SentimentLabel::Positive),
        );
        let engine = SentimentEngine::new(
            Arc::new(WhitespaceTokenizer::new(512)),
            classifier.clone(),
            Box::new(FirstWins),
        );

        let verdict = engine.analyze("AAPL", &[doc("AAPL", &words.join(" "))]);
        assert_eq!(
            verdict.outcome,
            SentimentOutcome::Label(SentimentLabel::Negative)
        );

        let calls = classifier.calls();
        assert_eq!(calls.len(), 4);
        let sizes: Vec<usize> = calls.iter().map(|c| c.split_whitespace().count()).collect();
        assert_eq!(sizes, vec![512, 512, 512, 464]);
    }

    #[test]
    fn test_policy_is_pluggable() {
        let classifier = Arc::new(
            KeywordClassifier::new()
                .with_rule("plunge", SentimentLabel::Negative)
                .with_rule("surge", SentimentLabel::Positive),
        );
        let engine = SentimentEngine::new(
            Arc::new(WhitespaceTokenizer::new(2)),
            classifier,
            Box::new(MajorityVote),
        );

        let verdict = engine.analyze("AAPL", &[doc("AAPL", "stocks plunge shares surge prices surge")]);
        assert_eq!(
            verdict.outcome,
            SentimentOutcome::Label(SentimentLabel::Positive)
        );
    }

    #[test]
    fn test_no_documents_or_empty_text_falls_back() {
        let engine = SentimentEngine::new(
            Arc::new(WhitespaceTokenizer::new(16)),
            Arc::new(KeywordClassifier::new()),
            Box::new(FirstWins),
        );
        assert!(engine.analyze("TSLA", &[]).outcome.is_fallback());
        assert!(engine.analyze("TSLA", &[doc("TSLA", "")]).outcome.is_fallback());
    }

    #[test]
    fn test_failed_chunk_does_not_abort_symbol() {
        let classifier = Arc::new(
            KeywordClassifier::new()
                .with_rule("beat", SentimentLabel::Positive)
                .failing_on("#corrupt"),
        );
        let engine = SentimentEngine::new(
            Arc::new(WhitespaceTokenizer::new(2)),
            classifier.clone(),
            Box::new(FirstWins),
        );

        let verdict = engine.analyze("MSFT", &[doc("MSFT", "#corrupt data earnings beat")]);
        assert_eq!(
            verdict.outcome,
            SentimentOutcome::Label(SentimentLabel::Positive)
        );
        assert_eq!(classifier.calls().len(), 2);
    }

    #[test]
    fn test_missing_tokenizer_fails_load() {
        let config = ModelConfig {
            tokenizer_path: "missing/tokenizer.json".to_string(),
            ..ModelConfig::default()
        };
        assert!(matches!(
            SentimentEngine::load(&config),
            Err(StartupError::Model(_))
        ));
    }

    const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/tokenizer.json");

    #[test]
    fn test_missing_model_fails_load() {
        let config = ModelConfig {
            tokenizer_path: FIXTURE.to_string(),
            labels_path: "missing/config.json".to_string(),
            model_path: "missing/model.onnx".to_string(),
            ..ModelConfig::default()
        };
        assert!(matches!(
            SentimentEngine::load(&config),
            Err(StartupError::Model(_))
        ));
    }

    #[test]
    fn test_lexicon_classifier_is_opt_in() {
        let config = ModelConfig {
            classifier: ClassifierKind::Lexicon,
            tokenizer_path: FIXTURE.to_string(),
            ..ModelConfig::default()
        };
        let engine = SentimentEngine::load(&config).unwrap();
        assert_eq!(engine.chunker.max_input_length(), 510);
        assert!(engine.analyze("AAPL", &[]).outcome.is_fallback());
    }
}
