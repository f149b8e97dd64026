use crate::quote::entity::PriceRecord;
use crate::sentiment::entity::SentimentOutcome;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// # Summary
/// 对外可见的输出单元：报价字段 + 情绪结论。
///
/// # Invariants
/// - 列表顺序等于规范证券列表顺序 (仅保留有报价的证券)。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub symbol: String,
    pub display_name: String,
    pub price: Decimal,
    pub sentiment: SentimentOutcome,
}

impl OutputRecord {
    /// 将报价记录与情绪结论组装为输出记录。
    pub fn new(record: PriceRecord, sentiment: SentimentOutcome) -> Self {
        Self {
            symbol: record.symbol,
            display_name: record.display_name,
            price: record.price,
            sentiment,
        }
    }
}
