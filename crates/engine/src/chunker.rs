use kizashi_core::sentiment::entity::Chunk;
use kizashi_core::sentiment::error::InferenceError;
use kizashi_core::sentiment::port::TextTokenizer;
use std::sync::Arc;

/// # Summary
/// 按 token 边界将文档切分为不超过模型上限的分块。
///
/// # Invariants
/// - 窗口大小取自分词器的 `max_input_length`，恒为正数。
/// - 分块互不重叠、自左向右、保持原始 token 顺序。
pub struct Chunker {
    tokenizer: Arc<dyn TextTokenizer>,
}

impl Chunker {
    pub fn new(tokenizer: Arc<dyn TextTokenizer>) -> Self {
        Self { tokenizer }
    }

    pub fn max_input_length(&self) -> usize {
        self.tokenizer.max_input_length()
    }

    /// # Summary
    /// 编码整篇文本并返回惰性的分块迭代器。
    ///
    /// # Logic
    /// 1. 将全文编码为 token id 序列。
    /// 2. 迭代器每次取至多 `max_input_length` 个 token 解码为文本。
    /// 3. 空文本得到零个分块，而非一个空分块。
    ///
    /// # Arguments
    /// * `symbol`: 所属证券代码。
    /// * `text`: 文档原文。
    ///
    /// # Returns
    /// 成功返回 `Chunks`，编码失败返回 `InferenceError`。
    /// 迭代器可通过再次调用本方法重新开始。
    pub fn split<'a>(&'a self, symbol: &'a str, text: &str) -> Result<Chunks<'a>, InferenceError> {
        let ids = self.tokenizer.encode(text)?;
        Ok(Chunks {
            tokenizer: self.tokenizer.as_ref(),
            symbol,
            window: self.tokenizer.max_input_length().max(1),
            ids,
            cursor: 0,
            index: 0,
        })
    }
}

/// # Summary
/// 单篇文档的分块迭代器。
///
/// # Invariants
/// - 每次产出后 `cursor` 单调前进，失败的窗口同样会被越过。
pub struct Chunks<'a> {
    tokenizer: &'a dyn TextTokenizer,
    symbol: &'a str,
    window: usize,
    ids: Vec<u32>,
    // 下一个窗口的起点
    cursor: usize,
    index: usize,
}

impl Chunks<'_> {
    /// 文档的 token 总数。
    pub fn token_count(&self) -> usize {
        self.ids.len()
    }

    /// # Summary
    /// 解码 `[start, end)` 并校验重新编码后的长度。
    ///
    /// # Logic
    /// 1. 解码窗口得到文本。
    /// 2. 重新编码，若 token 数超出上限 (BPE 边界重组导致)，按超出量收缩窗口后重试。
    /// 3. 单个 token 仍超出上限时，该 token 作为失败分块返回，不产出超长分块。
    ///
    /// # Returns
    /// 实际消费到的位置，以及该窗口的文本或错误。
    fn fit(&self, start: usize, mut end: usize) -> (usize, Result<String, InferenceError>) {
        loop {
            let text = match self.tokenizer.decode(&self.ids[start..end]) {
                Ok(text) => text,
                Err(e) => return (end, Err(e)),
            };
            let reencoded = match self.tokenizer.encode(&text) {
                Ok(ids) => ids.len(),
                Err(e) => return (end, Err(e)),
            };
            if reencoded <= self.window {
                return (end, Ok(text));
            }
            if end - start <= 1 {
                return (
                    end,
                    Err(InferenceError::MalformedInput(format!(
                        "token {} re-encodes to {} tokens, window is {}",
                        start, reencoded, self.window
                    ))),
                );
            }
            let excess = reencoded - self.window;
            end = end.saturating_sub(excess).max(start + 1);
        }
    }
}

impl Iterator for Chunks<'_> {
    type Item = Result<Chunk, InferenceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.ids.len() {
            return None;
        }
        let start = self.cursor;
        let end = (start + self.window).min(self.ids.len());
        let index = self.index;
        self.index += 1;

        let (end, text) = self.fit(start, end);
        self.cursor = end;
        Some(text.map(|text| Chunk {
            symbol: self.symbol.to_string(),
            index,
            tokens: start..end,
            text,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kizashi_core::testing::WhitespaceTokenizer;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    fn chunker(max: usize) -> Chunker {
        Chunker::new(Arc::new(WhitespaceTokenizer::new(max)))
    }

    fn collect(chunker: &Chunker, text: &str) -> Vec<Chunk> {
        chunker
            .split("AAPL", text)
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        let chunker = chunker(512);
        assert!(collect(&chunker, "").is_empty());
        assert!(collect(&chunker, "   \n ").is_empty());
    }

    #[test]
    fn test_short_text_yields_single_chunk() {
        let chunker = chunker(512);
        let chunks = collect(&chunker, "Apple   shares rose\nafter earnings");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].symbol, "AAPL");
        // 有损解码：空白被规整
        assert_eq!(chunks[0].text, "Apple shares rose after earnings");

        let exact = collect(&chunker, &words(512));
        assert_eq!(exact.len(), 1);
    }

    #[test]
    fn test_long_document_is_split_into_windows() {
        let chunker = chunker(512);
        let chunks = collect(&chunker, &words(2000));

        let sizes: Vec<usize> = chunks.iter().map(|c| c.tokens.len()).collect();
        assert_eq!(sizes, vec![512, 512, 512, 464]);
        assert_eq!(chunks[0].tokens, 0..512);
        assert_eq!(chunks[3].tokens, 1536..2000);
        assert!(chunks[0].text.starts_with("w0 w1"));
        assert!(chunks[3].text.ends_with("w1999"));
    }

    #[test]
    fn test_windows_partition_the_token_stream() {
        let tokenizer = Arc::new(WhitespaceTokenizer::new(7));
        let chunker = Chunker::new(tokenizer.clone());
        let text = words(50);
        let original = tokenizer.encode(&text).unwrap();

        let chunks = collect(&chunker, &text);
        let mut rebuilt = Vec::new();
        let mut expected_start = 0;
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            assert_eq!(chunk.tokens.start, expected_start);
            expected_start = chunk.tokens.end;
            rebuilt.extend_from_slice(&original[chunk.tokens.clone()]);
            // 重新编码不超过上限
            assert!(tokenizer.encode(&chunk.text).unwrap().len() <= 7);
        }
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn test_split_is_restartable() {
        let chunker = chunker(3);
        let text = words(10);
        let first = collect(&chunker, &text);
        let second = collect(&chunker, &text);
        assert_eq!(first, second);
        assert_eq!(chunker.split("AAPL", &text).unwrap().token_count(), 10);
    }

    /// 解码后重新编码会膨胀的分词器，模拟 BPE 在窗口边界处的重组。
    struct ExpandingTokenizer;

    impl TextTokenizer for ExpandingTokenizer {
        fn encode(&self, text: &str) -> Result<Vec<u32>, InferenceError> {
            Ok(text.chars().map(u32::from).collect())
        }

        fn decode(&self, ids: &[u32]) -> Result<String, InferenceError> {
            Ok(ids
                .iter()
                .filter_map(|id| char::from_u32(*id))
                .flat_map(|c| [c, c])
                .collect())
        }

        fn max_input_length(&self) -> usize {
            4
        }
    }

    #[test]
    fn test_window_shrinks_when_reencoding_overflows() {
        let tokenizer = Arc::new(ExpandingTokenizer);
        let chunker = Chunker::new(tokenizer.clone());

        let chunks = collect(&chunker, "abcdefg");
        let mut covered = 0;
        for chunk in &chunks {
            assert_eq!(chunk.tokens.start, covered);
            covered = chunk.tokens.end;
            assert!(tokenizer.encode(&chunk.text).unwrap().len() <= 4);
        }
        assert_eq!(covered, 7);
        assert!(chunks.len() > 2);
    }

    /// 仅 'x' 解码后膨胀为五个字符，单个 token 就会超出窗口。
    struct OversizedTokenTokenizer;

    impl TextTokenizer for OversizedTokenTokenizer {
        fn encode(&self, text: &str) -> Result<Vec<u32>, InferenceError> {
            Ok(text.chars().map(u32::from).collect())
        }

        fn decode(&self, ids: &[u32]) -> Result<String, InferenceError> {
            Ok(ids
                .iter()
                .filter_map(|id| char::from_u32(*id))
                .flat_map(|c| std::iter::repeat_n(c, if c == 'x' { 5 } else { 1 }))
                .collect())
        }

        fn max_input_length(&self) -> usize {
            4
        }
    }

    #[test]
    fn test_single_oversized_token_becomes_failed_chunk() {
        let tokenizer = Arc::new(OversizedTokenTokenizer);
        let chunker = Chunker::new(tokenizer.clone());

        let items: Vec<Result<Chunk, InferenceError>> =
            chunker.split("AAPL", "abxcd").unwrap().collect();

        assert_eq!(items.len(), 4);
        let spans: Vec<Option<std::ops::Range<usize>>> = items
            .iter()
            .map(|item| item.as_ref().ok().map(|c| c.tokens.clone()))
            .collect();
        assert_eq!(spans, vec![Some(0..1), Some(1..2), None, Some(3..5)]);
        assert!(matches!(items[2], Err(InferenceError::MalformedInput(_))));

        for chunk in items.iter().filter_map(|item| item.as_ref().ok()) {
            assert!(tokenizer.encode(&chunk.text).unwrap().len() <= 4);
        }
        // 失败窗口同样占用序号
        assert_eq!(items[3].as_ref().map(|c| c.index).ok(), Some(3));
    }
}
