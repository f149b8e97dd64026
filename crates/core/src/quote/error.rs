use thiserror::Error;

/// # Summary
/// 报价域错误枚举。
///
/// # Invariants
/// - 任何变体在编排层都被视为“该证券无报价”，证券从输出中剔除，不向调用方报告。
#[derive(Error, Debug)]
pub enum QuoteError {
    // 提供者在查询周期内没有任何成交数据
    #[error("Price unavailable for {0}")]
    Unavailable(String),
    // 网络层错误，包含底层 HTTP 客户端错误信息
    #[error("Network error: {0}")]
    Network(String),
    // 响应解析失败
    #[error("Parse error: {0}")]
    Parse(String),
    // 调用超出单次时限
    #[error("Quote request timed out")]
    Timeout,
}
