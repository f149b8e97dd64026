use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// # Summary
/// 单个证券的最新报价记录，由报价提供者按请求即时生成。
///
/// # Invariants
/// - 创建后不可变，随响应发送后即丢弃。
/// - `display_name` 缺失时由提供者回退为 `symbol`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    // 证券代码 (例如: AAPL)
    pub symbol: String,
    // 展示名称 (例如: Apple Inc.)
    pub display_name: String,
    // 最近收盘价
    pub price: Decimal,
}
