use thiserror::Error;

/// # Summary
/// 推理错误枚举，覆盖分词与分类两个阶段。
///
/// # Invariants
/// - 只影响单个分块：调用方跳过失败分块并记录日志，不重试，不中断证券或请求。
#[derive(Error, Debug)]
pub enum InferenceError {
    /// 输入无法被模型处理 (如空白文本)
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// 编码或解码失败
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// 模型不可用或推理任务异常终止
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),
}
