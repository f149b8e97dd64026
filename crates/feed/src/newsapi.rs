use async_trait::async_trait;
use kizashi_core::config::{NewsConfig, StartupError};
use kizashi_core::news::entity::NewsDocument;
use kizashi_core::news::error::NewsError;
use kizashi_core::news::port::NewsProvider;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

// NewsAPI 对已下架文章返回的占位标题
const REMOVED_MARKER: &str = "[Removed]";

/// # Summary
/// 基于 NewsAPI `/v2/everything` 的新闻检索实现。
///
/// # Invariants
/// * `api_key` 在构造时已校验非空。
/// * 每次检索最多请求 `page_size` 篇，按发布时间倒序。
pub struct NewsApiProvider {
    /// API 凭证，通过 `X-Api-Key` Header 发送
    api_key: String,
    /// 接口地址
    endpoint: String,
    /// 文章语言
    language: String,
    /// 单次请求的文章数
    page_size: usize,
    /// HTTP 客户端
    client: Client,
}

/// # Summary
/// NewsAPI 响应体，成功与失败共用同一结构。
#[derive(Deserialize, Debug)]
pub(crate) struct NewsApiResponse {
    status: String,
    code: Option<String>,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Deserialize, Debug)]
struct NewsApiArticle {
    title: Option<String>,
    description: Option<String>,
}

impl NewsApiProvider {
    /// # Summary
    /// 根据新闻配置创建检索器。
    ///
    /// # Logic
    /// 1. 凭证为空时立即失败。
    /// 2. 以给定超时构建 HTTP 客户端。
    ///
    /// # Arguments
    /// * `config` - 新闻配置段。
    /// * `timeout` - 单次请求超时。
    ///
    /// # Returns
    /// * 成功返回 `NewsApiProvider`，失败返回 `StartupError`。
    pub fn new(config: &NewsConfig, timeout: Duration) -> Result<Self, StartupError> {
        if config.api_key.trim().is_empty() {
            return Err(StartupError::MissingCredential("news.api_key"));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StartupError::Http(e.to_string()))?;

        Ok(Self {
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.clone(),
            language: config.language.clone(),
            page_size: config.articles_per_symbol.max(1),
            client,
        })
    }
}

/// # Summary
/// 将 NewsAPI 响应转换为新闻文档列表。
///
/// # Logic
/// 1. status 非 "ok" 时返回平台错误 (携带 code 与 message)。
/// 2. 丢弃已下架 (`[Removed]`) 与标题、摘要皆空的文章。
/// 3. 标题与摘要拼接为一段文本，保持提供者的原始顺序。
pub(crate) fn parse_articles(
    symbol: &str,
    resp: NewsApiResponse,
) -> Result<Vec<NewsDocument>, NewsError> {
    if resp.status != "ok" {
        return Err(NewsError::Platform(format!(
            "{}: {}",
            resp.code.unwrap_or_else(|| "unknown".to_string()),
            resp.message.unwrap_or_default()
        )));
    }

    Ok(resp
        .articles
        .into_iter()
        .filter(|a| a.title.as_deref() != Some(REMOVED_MARKER))
        .map(|a| {
            NewsDocument::from_parts(
                symbol,
                a.title.as_deref().unwrap_or_default(),
                a.description.as_deref(),
            )
        })
        .filter(|doc| !doc.text.is_empty())
        .collect())
}

#[async_trait]
impl NewsProvider for NewsApiProvider {
    /// # Summary
    /// 以证券代码为关键字检索最新新闻。
    ///
    /// # Logic
    /// 1. 构造 q / language / sortBy / pageSize 查询参数。
    /// 2. 发送请求，网络错误与超时分别映射。
    /// 3. 无论 HTTP 状态如何都尝试解析 JSON，以便取得平台错误信息。
    async fn search(&self, symbol: &str) -> Result<Vec<NewsDocument>, NewsError> {
        let page_size = self.page_size.to_string();
        let resp = self
            .client
            .get(&self.endpoint)
            .header("X-Api-Key", &self.api_key)
            .query(&[
                ("q", symbol),
                ("language", self.language.as_str()),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NewsError::Timeout
                } else {
                    NewsError::Network(e.to_string())
                }
            })?;

        let status = resp.status();
        let json: NewsApiResponse = resp
            .json()
            .await
            .map_err(|e| NewsError::Parse(format!("HTTP {}: {}", status, e)))?;

        let docs = parse_articles(symbol, json)?;
        debug!("NewsAPI returned {} document(s) for {}", docs.len(), symbol);
        Ok(docs)
    }
}
