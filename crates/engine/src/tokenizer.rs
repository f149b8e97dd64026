use kizashi_core::config::StartupError;
use kizashi_core::sentiment::error::InferenceError;
use kizashi_core::sentiment::port::TextTokenizer;
use std::path::Path;
use tokenizers::{PostProcessor, Tokenizer};
use tracing::info;

/// # Summary
/// HuggingFace `tokenizers` 的适配器。
///
/// # Invariants
/// - 加载时关闭截断与填充，编码得到完整 token 序列。
/// - `max_input_length` 已扣除模型后处理器追加的特殊 token 数。
pub struct HfTokenizer {
    inner: Tokenizer,
    // 模型上限 (含特殊 token)
    model_max_length: usize,
    // 分块窗口 (不含特殊 token)
    max_input_length: usize,
}

impl HfTokenizer {
    /// # Summary
    /// 从 `tokenizer.json` 加载分词器。
    ///
    /// # Logic
    /// 1. 读取并反序列化分词器定义。
    /// 2. 关闭截断与填充。
    /// 3. 计算单句输入时后处理器追加的特殊 token 数 (如 `<s>` `</s>`)，从模型上限中扣除。
    ///
    /// # Arguments
    /// * `path`: tokenizer.json 路径。
    /// * `model_max_length`: 模型的最大输入长度 (含特殊 token)。
    ///
    /// # Returns
    /// 成功返回适配器，失败返回 `StartupError::Model`。
    pub fn from_file(path: impl AsRef<Path>, model_max_length: usize) -> Result<Self, StartupError> {
        let path = path.as_ref();
        let mut inner = Tokenizer::from_file(path)
            .map_err(|e| StartupError::Model(format!("{}: {}", path.display(), e)))?;
        inner
            .with_truncation(None)
            .map_err(|e| StartupError::Model(e.to_string()))?;
        inner.with_padding(None);

        let special = inner
            .get_post_processor()
            .map(|p| p.added_tokens(false))
            .unwrap_or(0);
        let max_input_length = model_max_length
            .checked_sub(special)
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                StartupError::Model(format!(
                    "max_input_length {} leaves no room after {} special tokens",
                    model_max_length, special
                ))
            })?;

        info!(
            "Tokenizer loaded from {} (window {} tokens, {} reserved)",
            path.display(),
            max_input_length,
            special
        );
        Ok(Self {
            inner,
            model_max_length,
            max_input_length,
        })
    }

    pub fn model_max_length(&self) -> usize {
        self.model_max_length
    }

    /// # Summary
    /// 按模型输入格式编码：附加后处理器的特殊 token (如 `<s> ... </s>`)。
    ///
    /// # Returns
    /// 成功返回模型可直接消费的 token id，失败返回 `InferenceError::Tokenizer`。
    pub fn encode_for_model(&self, text: &str) -> Result<Vec<u32>, InferenceError> {
        self.inner
            .encode(text, true)
            .map(|enc| enc.get_ids().to_vec())
            .map_err(|e| InferenceError::Tokenizer(e.to_string()))
    }
}

impl TextTokenizer for HfTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>, InferenceError> {
        self.inner
            .encode(text, false)
            .map(|enc| enc.get_ids().to_vec())
            .map_err(|e| InferenceError::Tokenizer(e.to_string()))
    }

    fn decode(&self, ids: &[u32]) -> Result<String, InferenceError> {
        self.inner
            .decode(ids, true)
            .map_err(|e| InferenceError::Tokenizer(e.to_string()))
    }

    fn max_input_length(&self) -> usize {
        self.max_input_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::Chunker;
    use std::sync::Arc;

    // WordLevel 词表 + RobertaProcessing 后处理器
    const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/tokenizer.json");

    #[test]
    fn test_missing_file_is_startup_error() {
        let result = HfTokenizer::from_file("does/not/exist/tokenizer.json", 512);
        assert!(matches!(result, Err(StartupError::Model(_))));
    }

    #[test]
    fn test_window_reserves_special_tokens() {
        let tokenizer = HfTokenizer::from_file(FIXTURE, 512).unwrap();
        assert_eq!(tokenizer.model_max_length(), 512);
        assert_eq!(tokenizer.max_input_length(), 510);
    }

    #[test]
    fn test_limit_smaller_than_special_tokens_is_rejected() {
        assert!(matches!(
            HfTokenizer::from_file(FIXTURE, 2),
            Err(StartupError::Model(_))
        ));
    }

    #[test]
    fn test_encode_decode_without_special_tokens() {
        let tokenizer = HfTokenizer::from_file(FIXTURE, 512).unwrap();

        let ids = tokenizer.encode("a b a").unwrap();
        assert_eq!(ids, vec![3, 4, 3]);
        assert_eq!(tokenizer.decode(&ids).unwrap(), "a b a");

        // 模型输入带 <s> </s>，解码时被跳过
        let model_ids = tokenizer.encode_for_model("a b").unwrap();
        assert_eq!(model_ids, vec![0, 3, 4, 1]);
        assert_eq!(tokenizer.decode(&model_ids).unwrap(), "a b");
    }

    #[test]
    fn test_chunks_fit_model_input_with_special_tokens() {
        let tokenizer = Arc::new(HfTokenizer::from_file(FIXTURE, 6).unwrap());
        let chunker = Chunker::new(tokenizer.clone());

        let chunks = chunker
            .split("AAPL", "a b c d e a b c d e")
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["a b c d", "e a b c", "d e"]);
        for chunk in &chunks {
            assert!(tokenizer.encode_for_model(&chunk.text).unwrap().len() <= 6);
        }
    }

    /// 需要本地模型文件：`KIZASHI_MODEL__TOKENIZER_PATH=/path/to/tokenizer.json`
    #[test]
    #[ignore]
    fn test_real_tokenizer_reserves_special_tokens() -> anyhow::Result<()> {
        let path = std::env::var("KIZASHI_MODEL__TOKENIZER_PATH")?;
        let tokenizer = HfTokenizer::from_file(path, 512)?;
        assert_eq!(tokenizer.max_input_length(), 510);

        let ids = tokenizer.encode("Shares of Apple rose after earnings.")?;
        assert!(!ids.is_empty());
        let text = tokenizer.decode(&ids)?;
        assert!(text.contains("Apple"));
        Ok(())
    }
}
