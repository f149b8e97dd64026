use crate::aggregator::merge;
use futures::stream::{self, StreamExt};
use kizashi_core::config::AppConfig;
use kizashi_core::news::entity::NewsDocument;
use kizashi_core::news::error::NewsError;
use kizashi_core::news::port::NewsProvider;
use kizashi_core::quote::entity::PriceRecord;
use kizashi_core::quote::error::QuoteError;
use kizashi_core::quote::port::QuoteProvider;
use kizashi_core::report::entity::OutputRecord;
use kizashi_core::sentiment::entity::{SentimentOutcome, SymbolSentiment};
use kizashi_engine::pipeline::SentimentEngine;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// # Summary
/// 单次报表构建的运行参数。
#[derive(Debug, Clone)]
pub struct ReportSettings {
    // 规范证券列表，顺序即输出顺序
    pub symbols: Vec<String>,
    // 同时处理的证券数量上限
    pub concurrency: usize,
    // 单次外部调用的超时
    pub fetch_timeout: Duration,
    // 每个证券参与分析的文章数上限
    pub articles_per_symbol: usize,
}

impl ReportSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            symbols: config.market.symbols.clone(),
            concurrency: config.market.concurrency,
            fetch_timeout: Duration::from_secs(config.market.fetch_timeout_secs),
            articles_per_symbol: config.news.articles_per_symbol,
        }
    }
}

/// # Summary
/// 报表管理器，每次 `/stocks` 请求的编排门面。
/// 编译期仅依赖 `kizashi-core` 的 Trait 与情绪引擎，具体提供者通过构造函数注入。
///
/// # Invariants
/// - 输出顺序恒等于 `settings.symbols` 的顺序，与各证券完成的先后无关。
/// - 同时在途的证券数量不超过 `settings.concurrency`。
/// - 任何单个证券的失败都不会使整个报表失败。
pub struct ReportManager {
    // 报价提供者
    quotes: Arc<dyn QuoteProvider>,
    // 新闻提供者
    news: Arc<dyn NewsProvider>,
    // 情绪引擎，进程内共享
    engine: Arc<SentimentEngine>,
    settings: ReportSettings,
}

impl ReportManager {
    /// # Summary
    /// 创建 ReportManager 实例。
    ///
    /// # Arguments
    /// * `quotes` - 报价提供者的具体实现。
    /// * `news` - 新闻提供者的具体实现。
    /// * `engine` - 已加载的情绪引擎。
    /// * `settings` - 运行参数。
    ///
    /// # Returns
    /// * `Arc<Self>` - 可共享的管理器实例。
    pub fn new(
        quotes: Arc<dyn QuoteProvider>,
        news: Arc<dyn NewsProvider>,
        engine: Arc<SentimentEngine>,
        settings: ReportSettings,
    ) -> Arc<Self> {
        Arc::new(Self {
            quotes,
            news,
            engine,
            settings,
        })
    }

    /// # Summary
    /// 构建一次完整报表。
    ///
    /// # Logic
    /// 1. 以 `buffered(concurrency)` 并发处理各证券，结果按提交顺序产出。
    /// 2. 每个证券：先取报价，失败则直接排除，不再检索新闻。
    /// 3. 报价成功后检索新闻，失败视为零篇文章。
    /// 4. 在阻塞线程池中执行情绪分析。
    /// 5. 合并报价与结论，缺失结论的证券使用回退值。
    ///
    /// # Returns
    /// 按规范顺序排列、仅包含报价成功证券的输出列表。
    pub async fn build_report(self: &Arc<Self>) -> Vec<OutputRecord> {
        let started = Instant::now();
        let total = self.settings.symbols.len();

        let results: Vec<Option<(PriceRecord, SymbolSentiment)>> =
            stream::iter(self.settings.symbols.clone())
                .map(|symbol| {
                    let this = Arc::clone(self);
                    async move { this.process_symbol(symbol).await }
                })
                .buffered(self.settings.concurrency.max(1))
                .collect()
                .await;

        let mut prices = Vec::with_capacity(total);
        let mut sentiments = HashMap::with_capacity(total);
        for (price, sentiment) in results.into_iter().flatten() {
            sentiments.insert(sentiment.symbol, sentiment.outcome);
            prices.push(price);
        }

        let report = merge(prices, &sentiments);
        info!(
            "Report built: {}/{} symbols priced in {:?}",
            report.len(),
            total,
            started.elapsed()
        );
        report
    }

    /// # Summary
    /// 处理单个证券：报价 -> 新闻 -> 情绪。
    ///
    /// # Returns
    /// 报价失败返回 `None`，否则返回报价与情绪结论。
    async fn process_symbol(&self, symbol: String) -> Option<(PriceRecord, SymbolSentiment)> {
        let price = match self.fetch_quote(&symbol).await {
            Ok(price) => price,
            Err(e) => {
                warn!("Skipping {}: {}", symbol, e);
                return None;
            }
        };

        let docs = match self.fetch_news(&symbol).await {
            Ok(docs) => docs,
            Err(e) => {
                warn!("News unavailable for {}: {}", symbol, e);
                Vec::new()
            }
        };

        let sentiment = self.analyze(symbol, docs).await;
        Some((price, sentiment))
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<PriceRecord, QuoteError> {
        tokio::time::timeout(self.settings.fetch_timeout, self.quotes.latest_quote(symbol))
            .await
            .map_err(|_| QuoteError::Timeout)?
    }

    async fn fetch_news(&self, symbol: &str) -> Result<Vec<NewsDocument>, NewsError> {
        let mut docs =
            tokio::time::timeout(self.settings.fetch_timeout, self.news.search(symbol))
                .await
                .map_err(|_| NewsError::Timeout)??;
        docs.truncate(self.settings.articles_per_symbol);
        debug!("{} document(s) selected for {}", docs.len(), symbol);
        Ok(docs)
    }

    /// # Summary
    /// 在阻塞线程池中运行情绪引擎，避免推理占用异步工作线程。
    ///
    /// # Logic
    /// 任务异常退出 (panic 或被取消) 时记录错误并返回回退结论。
    async fn analyze(&self, symbol: String, docs: Vec<NewsDocument>) -> SymbolSentiment {
        let engine = Arc::clone(&self.engine);
        let task_symbol = symbol.clone();
        match tokio::task::spawn_blocking(move || engine.analyze(&task_symbol, &docs)).await {
            Ok(sentiment) => sentiment,
            Err(e) => {
                warn!("Sentiment task for {} failed: {}", symbol, e);
                SymbolSentiment {
                    symbol,
                    outcome: SentimentOutcome::Fallback,
                }
            }
        }
    }
}
