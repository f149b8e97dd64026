use crate::quote::entity::PriceRecord;
use crate::quote::error::QuoteError;
use async_trait::async_trait;

/// # Summary
/// 报价提供者接口（外部协作者）。
///
/// # Invariants
/// - 实现必须是 `Send + Sync`，以便在多个证券间并发复用同一实例。
/// - 无数据时返回 `QuoteError::Unavailable` 而非空记录。
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// # Summary
    /// 获取单个证券的最新收盘价与展示名称。
    ///
    /// # Logic
    /// 1. 查询最近一个交易日的行情。
    /// 2. 取最后一个非空收盘价。
    /// 3. 无成交数据时返回 `Unavailable`。
    ///
    /// # Arguments
    /// * `symbol`: 证券代码。
    ///
    /// # Returns
    /// 成功返回 `PriceRecord`，失败返回 `QuoteError`。
    async fn latest_quote(&self, symbol: &str) -> Result<PriceRecord, QuoteError>;
}
