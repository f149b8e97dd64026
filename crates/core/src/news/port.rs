use crate::news::entity::NewsDocument;
use crate::news::error::NewsError;
use async_trait::async_trait;

/// # Summary
/// 新闻检索接口（外部协作者）。
///
/// # Invariants
/// - 实现必须是 `Send` 和 `Sync` 以支持并发调用。
/// - 返回顺序即提供者的相关度顺序，调用方只取前若干篇。
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// # Summary
    /// 检索与证券相关的新闻。
    ///
    /// # Arguments
    /// * `symbol` - 证券代码，作为检索关键字。
    ///
    /// # Returns
    /// * 成功返回零或多篇 `NewsDocument`。
    /// * 失败返回 `Err(NewsError)`。
    async fn search(&self, symbol: &str) -> Result<Vec<NewsDocument>, NewsError>;
}
