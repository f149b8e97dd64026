//! # DTO (Data Transfer Object) 层
//!
//! 将内部领域模型转化为面向前端 JSON 输出的轻量结构体。
//! 所有 DTO 必须派生 `utoipa::ToSchema` 以自动进入 Swagger 文档。

use kizashi_core::report::entity::OutputRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 单个证券的报表行
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StockResponse {
    /// 证券代码
    #[schema(example = "AAPL")]
    pub symbol: String,
    /// 展示名称，缺失时与代码相同
    #[schema(example = "Apple Inc.")]
    pub name: String,
    /// 最新收盘价，以 JSON 数字输出
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 189.25)]
    pub price: Decimal,
    /// 情绪标签 (Positive / Negative / Neutral) 或回退值 Unknown
    #[schema(example = "Positive")]
    pub sentiment: String,
}

impl From<OutputRecord> for StockResponse {
    fn from(record: OutputRecord) -> Self {
        Self {
            symbol: record.symbol,
            name: record.display_name,
            price: record.price,
            sentiment: record.sentiment.as_str().to_string(),
        }
    }
}
