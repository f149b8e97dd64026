use async_trait::async_trait;
use kizashi_core::config::StartupError;
use kizashi_core::quote::entity::PriceRecord;
use kizashi_core::quote::error::QuoteError;
use kizashi_core::quote::port::QuoteProvider;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// # Summary
/// Yahoo Finance 报价提供者实现。
///
/// # Invariants
/// - 使用 `reqwest` 异步客户端进行通讯，客户端在进程内复用。
#[derive(Clone)]
pub struct YahooProvider {
    /// 内部使用的 HTTP 客户端
    client: Client,
}

impl YahooProvider {
    /// # Summary
    /// 创建一个新的 YahooProvider 实例。
    ///
    /// # Logic
    /// 1. 配置请求超时。
    /// 2. 设置伪装浏览器 Header (User-Agent) 以减少被拦截风险。
    /// 3. 初始化 reqwest 客户端。
    ///
    /// # Arguments
    /// * `timeout`: 单次请求超时。
    ///
    /// # Returns
    /// 成功返回 YahooProvider，客户端构建失败返回 `StartupError::Http`。
    pub fn new(timeout: Duration) -> Result<Self, StartupError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_UA));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| StartupError::Http(e.to_string()))?;

        Ok(Self { client })
    }
}

/// # Summary
/// Yahoo API 响应顶层结构。
///
/// # Invariants
/// - 映射自 Yahoo v8 chart 接口。
#[derive(Deserialize, Debug)]
pub(crate) struct YahooResponse {
    chart: YahooChart,
}

#[derive(Deserialize, Debug)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

/// # Summary
/// Yahoo API 错误详情。
#[derive(Deserialize, Debug)]
struct YahooError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize, Debug)]
struct YahooResult {
    meta: YahooMeta,
    indicators: YahooIndicators,
}

/// # Summary
/// 图表元数据，包含证券名称。
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct YahooMeta {
    long_name: Option<String>,
    short_name: Option<String>,
}

#[derive(Deserialize, Debug)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Deserialize, Debug)]
struct YahooQuote {
    /// 收盘价列表，未成交的时段为 null
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// # Summary
/// 将 chart 响应转换为报价记录。
///
/// # Logic
/// 1. 响应带 error 字段时，Not Found 视为无数据，其余视为未知错误。
/// 2. 取最后一个非空收盘价，没有则视为无数据。
/// 3. 名称依次回退 longName -> shortName -> symbol。
pub(crate) fn parse_chart(symbol: &str, resp: YahooResponse) -> Result<PriceRecord, QuoteError> {
    if let Some(err) = resp.chart.error {
        let description = err.description.unwrap_or_default();
        return match err.code.as_deref() {
            Some("Not Found") => Err(QuoteError::Unavailable(symbol.to_string())),
            _ => Err(QuoteError::Parse(description)),
        };
    }

    let result = resp
        .chart
        .result
        .and_then(|mut r| r.pop())
        .ok_or_else(|| QuoteError::Unavailable(symbol.to_string()))?;

    let close = result
        .indicators
        .quote
        .first()
        .and_then(|q| q.close.iter().rev().find_map(|c| *c))
        .ok_or_else(|| QuoteError::Unavailable(symbol.to_string()))?;

    let price = Decimal::from_f64_retain(close)
        .map(|d| d.round_dp(4))
        .ok_or_else(|| QuoteError::Parse(format!("invalid close price {}", close)))?;

    let display_name = result
        .meta
        .long_name
        .or(result.meta.short_name)
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| symbol.to_string());

    Ok(PriceRecord {
        symbol: symbol.to_string(),
        display_name,
        price,
    })
}

#[async_trait]
impl QuoteProvider for YahooProvider {
    /// # Summary
    /// 从 Yahoo Finance 抓取最近一个交易日的收盘价。
    ///
    /// # Logic
    /// 1. 以 range=1d, interval=1d 请求 chart 接口。
    /// 2. HTTP 404 视为该证券无数据。
    /// 3. 解析 JSON 并交由 `parse_chart` 提取价格与名称。
    ///
    /// # Arguments
    /// * `symbol`: 证券代码。
    ///
    /// # Returns
    /// 成功返回 `PriceRecord`，失败返回 `QuoteError`。
    async fn latest_quote(&self, symbol: &str) -> Result<PriceRecord, QuoteError> {
        let url = format!("{}/{}", CHART_URL, symbol);

        let resp = self
            .client
            .get(&url)
            .query(&[("range", "1d"), ("interval", "1d")])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    QuoteError::Timeout
                } else {
                    QuoteError::Network(e.to_string())
                }
            })?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(QuoteError::Unavailable(symbol.to_string()));
        }
        if !resp.status().is_success() {
            return Err(QuoteError::Network(format!("HTTP {}", resp.status())));
        }

        let json: YahooResponse = resp
            .json()
            .await
            .map_err(|e| QuoteError::Parse(e.to_string()))?;

        let record = parse_chart(symbol, json)?;
        debug!("Quote for {}: {}", symbol, record.price);
        Ok(record)
    }
}
