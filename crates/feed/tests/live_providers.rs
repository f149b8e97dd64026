use kizashi_core::config::NewsConfig;
use kizashi_core::news::port::NewsProvider;
use kizashi_core::quote::error::QuoteError;
use kizashi_core::quote::port::QuoteProvider;
use kizashi_feed::newsapi::NewsApiProvider;
use kizashi_feed::yahoo::YahooProvider;
use std::time::Duration;

fn install_crypto() {
    // 重复安装会返回 Err，多个测试共用进程时忽略即可
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        println!("crypto provider already installed");
    }
}

/// # Summary
/// 雅虎财经报价获取的集成测试。
///
/// # Logic
/// 1. 初始化 YahooProvider。
/// 2. 抓取 AAPL 最新收盘价。
/// 3. 断言价格为正且名称非空。
#[tokio::test]
#[ignore] // 依赖外网，手动运行
async fn test_yahoo_real_quote() -> anyhow::Result<()> {
    install_crypto();
    let provider = YahooProvider::new(Duration::from_secs(10))?;

    let record = provider.latest_quote("AAPL").await?;
    println!("{} ({}) = {}", record.symbol, record.display_name, record.price);
    assert!(record.price.is_sign_positive());
    assert!(!record.display_name.is_empty());
    Ok(())
}

/// # Summary
/// 不存在的证券代码应被识别为无数据，而不是网络错误。
#[tokio::test]
#[ignore] // 依赖外网，手动运行
async fn test_yahoo_unknown_symbol_is_unavailable() -> anyhow::Result<()> {
    install_crypto();
    let provider = YahooProvider::new(Duration::from_secs(10))?;

    let result = provider.latest_quote("NOSUCHTICKERXYZ").await;
    assert!(matches!(result, Err(QuoteError::Unavailable(_))), "{:?}", result);
    Ok(())
}

/// # Summary
/// NewsAPI 检索的集成测试，需要环境变量 `KIZASHI_NEWS__API_KEY`。
#[tokio::test]
#[ignore] // 需要真实凭证
async fn test_newsapi_real_search() -> anyhow::Result<()> {
    install_crypto();
    let config = NewsConfig {
        api_key: std::env::var("KIZASHI_NEWS__API_KEY")?,
        ..NewsConfig::default()
    };
    let provider = NewsApiProvider::new(&config, Duration::from_secs(10))?;

    let docs = provider.search("AAPL").await?;
    for doc in &docs {
        println!("{}", doc.text);
    }
    assert!(docs.iter().all(|d| d.symbol == "AAPL"));
    Ok(())
}
