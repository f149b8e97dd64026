use thiserror::Error;

/// # Summary
/// 新闻抓取错误枚举。
///
/// # Invariants
/// - 编排层捕获后一律按“零篇文档”处理，仅记录日志，不向请求传播。
#[derive(Error, Debug)]
pub enum NewsError {
    /// 网络连接或传输错误
    #[error("Network error: {0}")]
    Network(String),

    /// 新闻平台返回的错误 (如限流、凭证无效)
    #[error("Platform error: {0}")]
    Platform(String),

    /// 响应体解析失败
    #[error("Parse error: {0}")]
    Parse(String),

    /// 调用超出单次时限
    #[error("News request timed out")]
    Timeout,
}
