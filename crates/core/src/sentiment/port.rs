use crate::sentiment::entity::{ChunkSentiment, SentimentOutcome};
use crate::sentiment::error::InferenceError;

/// # Summary
/// 分词器适配接口。
///
/// # Invariants
/// - 进程内只加载一次，之后只读复用，无需同步。
/// - `decode(encode(t))` 允许有损，但 token 数不会增加。
pub trait TextTokenizer: Send + Sync {
    /// # Summary
    /// 将文本编码为 token id 序列 (不附加特殊 token)。
    ///
    /// # Arguments
    /// * `text`: 原始文本，可为空。
    ///
    /// # Returns
    /// 成功返回 token id 列表，失败返回 `InferenceError::Tokenizer`。
    fn encode(&self, text: &str) -> Result<Vec<u32>, InferenceError>;

    /// # Summary
    /// 将 token id 序列解码回文本，跳过特殊 token。
    ///
    /// # Arguments
    /// * `ids`: token id 切片。
    ///
    /// # Returns
    /// 成功返回文本，失败返回 `InferenceError::Tokenizer`。
    fn decode(&self, ids: &[u32]) -> Result<String, InferenceError>;

    /// 单次推理可接受的最大 token 数，恒为正数。
    fn max_input_length(&self) -> usize;
}

/// # Summary
/// 情绪分类器接口。
///
/// # Invariants
/// - 对同一模型确定性输出：相同输入必得相同结果。
/// - 每个分块只调用一次，不重试；除计算外无副作用。
pub trait SentimentClassifier: Send + Sync {
    /// # Summary
    /// 对单个分块执行情绪推理。
    ///
    /// # Arguments
    /// * `text`: 分块文本，应为非空串。
    ///
    /// # Returns
    /// 成功返回 `ChunkSentiment`，无法执行推理时返回 `InferenceError`。
    fn classify(&self, text: &str) -> Result<ChunkSentiment, InferenceError>;
}

/// # Summary
/// 情绪归约策略：将一个证券的全部分块结果合并为一个结论。
///
/// # Invariants
/// - 纯函数且全函数：永不失败，空输入必须返回 `SentimentOutcome::Fallback`。
/// - 输入按文档/分块顺序排列。
pub trait ReductionPolicy: Send + Sync {
    /// 策略名称，用于日志。
    fn name(&self) -> &'static str;

    /// # Summary
    /// 归约分块结果序列。
    ///
    /// # Arguments
    /// * `results`: 按顺序排列的分块结果，失败分块已被剔除。
    ///
    /// # Returns
    /// 证券级结论。
    fn reduce(&self, results: &[ChunkSentiment]) -> SentimentOutcome;
}
