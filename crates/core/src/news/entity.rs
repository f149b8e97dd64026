use serde::{Deserialize, Serialize};

/// # Summary
/// 单篇新闻文档，标题与可选摘要拼接为一段文本。
///
/// # Invariants
/// - 请求级临时对象，不跨请求共享。
/// - `text` 可以为空串，分块器对空文本产出零个分块。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsDocument {
    // 关联的证券代码
    pub symbol: String,
    // 标题 + 摘要
    pub text: String,
}

impl NewsDocument {
    /// # Summary
    /// 由标题与可选摘要构造文档。
    ///
    /// # Logic
    /// 1. 去除两端空白。
    /// 2. 摘要非空时以单个空格拼接到标题之后。
    pub fn from_parts(symbol: &str, title: &str, description: Option<&str>) -> Self {
        let title = title.trim();
        let text = match description.map(str::trim).filter(|d| !d.is_empty()) {
            Some(desc) if !title.is_empty() => format!("{} {}", title, desc),
            Some(desc) => desc.to_string(),
            None => title.to_string(),
        };
        Self {
            symbol: symbol.to_string(),
            text,
        }
    }
}
