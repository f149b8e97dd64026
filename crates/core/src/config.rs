use crate::common::default_symbols;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// # Summary
/// 启动期错误，出现即终止进程，不进入服务状态。
#[derive(Error, Debug)]
pub enum StartupError {
    /// 配置读取或校验失败
    #[error("Configuration error: {0}")]
    Config(String),

    /// 缺少必需的凭证
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    /// 模型或分词器加载失败
    #[error("Model load error: {0}")]
    Model(String),

    /// HTTP 客户端初始化失败
    #[error("HTTP client error: {0}")]
    Http(String),
}

/// 全局应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub market: MarketConfig,
    pub news: NewsConfig,
    pub model: ModelConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    // 规范证券列表，顺序即输出顺序
    pub symbols: Vec<String>,
    // 同时处理的证券数量上限
    pub concurrency: usize,
    // 单次外部调用的超时时间 (秒)
    pub fetch_timeout_secs: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            concurrency: 8,
            fetch_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub api_key: String,
    pub endpoint: String,
    pub language: String,
    // 每个证券参与情绪分析的文章数
    pub articles_per_symbol: usize,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: "https://newsapi.org/v2/everything".to_string(),
            language: "en".to_string(),
            articles_per_symbol: 1,
        }
    }
}

/// 情绪归约策略选择
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReductionPolicyKind {
    // 取第一个分块的标签
    #[default]
    First,
    // 多数表决
    Majority,
    // 按置信度加权
    Weighted,
}

/// 分块分类器选择
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    // 金融新闻微调的 DistilRoBERTa (ONNX)
    #[default]
    Transformer,
    // VADER 通用情绪词典，无需模型文件
    Lexicon,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub classifier: ClassifierKind,
    // HuggingFace tokenizer.json 路径
    pub tokenizer_path: String,
    // 导出的 ONNX 模型路径
    pub model_path: String,
    // 模型 config.json 路径，提供 id2label
    pub labels_path: String,
    // 模型的最大输入长度 (含特殊 token)
    pub max_input_length: usize,
    pub policy: ReductionPolicyKind,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierKind::Transformer,
            tokenizer_path: "models/tokenizer.json".to_string(),
            model_path: "models/model.onnx".to_string(),
            labels_path: "models/config.json".to_string(),
            max_input_length: 512,
            policy: ReductionPolicyKind::First,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    // 设置后额外按天滚动写入该目录
    pub dir: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
        }
    }
}

impl AppConfig {
    /// # Summary
    /// 启动期校验，保证服务不会带着无效配置进入请求处理。
    ///
    /// # Logic
    /// 1. 新闻凭证必须非空。
    /// 2. 证券列表非空且无重复。
    /// 3. 并发度、超时、文章数与最大输入长度至少为 1。
    ///
    /// # Returns
    /// 校验通过返回 Ok，否则返回 `StartupError`。
    pub fn validate(&self) -> Result<(), StartupError> {
        if self.news.api_key.trim().is_empty() {
            return Err(StartupError::MissingCredential("news.api_key"));
        }
        if self.market.symbols.is_empty() {
            return Err(StartupError::Config("market.symbols must not be empty".into()));
        }
        let mut seen = std::collections::HashSet::new();
        if let Some(dup) = self.market.symbols.iter().find(|s| !seen.insert(s.as_str())) {
            return Err(StartupError::Config(format!("duplicate symbol: {}", dup)));
        }
        if self.market.concurrency == 0 {
            return Err(StartupError::Config("market.concurrency must be >= 1".into()));
        }
        if self.market.fetch_timeout_secs == 0 {
            return Err(StartupError::Config("market.fetch_timeout_secs must be >= 1".into()));
        }
        if self.news.articles_per_symbol == 0 {
            return Err(StartupError::Config("news.articles_per_symbol must be >= 1".into()));
        }
        if self.model.max_input_length == 0 {
            return Err(StartupError::Config("model.max_input_length must be >= 1".into()));
        }
        Ok(())
    }
}
