mod logging;
mod settings;

use std::sync::Arc;
use std::time::Duration;

use kizashi_api::server::{AppState, start_server};
use kizashi_engine::pipeline::SentimentEngine;
use kizashi_feed::newsapi::NewsApiProvider;
use kizashi_feed::yahoo::YahooProvider;
use kizashi_manager::report::{ReportManager, ReportSettings};
use tracing::{debug, info, warn};

/// # Summary
/// 应用启动入口，纯粹的 DI 容器。
/// 负责实例化所有具体实现组件并通过 Arc<dyn Trait> 注入到 ReportManager。
///
/// # Logic
/// 1. 加载 `.env` 与配置并校验，失败立即退出。
/// 2. 初始化全局日志与 TLS 加密后端。
/// 3. 实例化基础设施层（报价、新闻）。
/// 4. 加载情绪引擎（分词器 + 分类器 + 归约策略）。
/// 5. 构造应用服务层（ReportManager）并启动 HTTP 服务，直到收到退出信号。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 配置
    let dotenv = dotenvy::dotenv();
    let config = settings::load_config()?;

    // 2. 日志与 TLS
    let _log_guard = logging::init_logging(&config.log);
    match dotenv {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => warn!("Failed to read .env file: {}", e),
    }
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        warn!("TLS crypto provider already installed");
    }
    info!(
        "Kizashi starting with {} symbols (concurrency {}, policy {:?})",
        config.market.symbols.len(),
        config.market.concurrency,
        config.model.policy
    );

    // 3. 基础设施层
    let timeout = Duration::from_secs(config.market.fetch_timeout_secs);
    let quotes = Arc::new(YahooProvider::new(timeout)?);
    let news = Arc::new(NewsApiProvider::new(&config.news, timeout)?);

    // 4. 情绪引擎，进程内只加载一次
    let engine = Arc::new(SentimentEngine::load(&config.model)?);

    // 5. 应用服务层
    let report_manager =
        ReportManager::new(quotes, news, engine, ReportSettings::from_config(&config));
    let state = AppState { report_manager };

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    start_server(state, &bind_addr).await?;

    info!("Kizashi stopped");
    Ok(())
}
