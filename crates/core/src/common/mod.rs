/// # Summary
/// 默认的规范证券列表 (Canonical symbol list)，即美股市值前 50 的代码。
///
/// # Invariants
/// - 顺序即输出顺序，报告中的记录永远按此顺序排列。
/// - 代码内不得重复。
pub const DEFAULT_SYMBOLS: [&str; 50] = [
    "AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "NVDA", "META", "BRK-B", "JNJ", "V",
    "WMT", "PG", "MA", "UNH", "HD", "DIS", "BAC", "PYPL", "XOM", "VZ",
    "KO", "PEP", "INTC", "CSCO", "CMCSA", "ABT", "CVX", "MRK", "NFLX", "ADBE",
    "CRM", "TMO", "PFE", "ABBV", "ORCL", "ACN", "NKE", "T", "QCOM", "DHR",
    "MDT", "LLY", "COST", "AMD", "UNP", "LOW", "UPS", "IBM", "TXN", "SBUX",
];

/// 以 `Vec<String>` 形式返回默认规范列表。
pub fn default_symbols() -> Vec<String> {
    DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect()
}
