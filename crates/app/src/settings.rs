use kizashi_core::config::{AppConfig, StartupError};
use std::collections::HashMap;
use std::path::Path;

/// 默认配置文件 (可选，不存在时跳过)
pub const CONFIG_FILE: &str = "kizashi.toml";

// 环境变量前缀，如 KIZASHI_NEWS__API_KEY -> news.api_key
const ENV_PREFIX: &str = "KIZASHI";

/// # Summary
/// 读取并校验应用配置。
///
/// # Logic
/// 1. 内置默认值。
/// 2. 覆盖为 `kizashi.toml` (若存在)。
/// 3. 覆盖为 `KIZASHI_` 前缀的环境变量。
/// 4. 执行启动期校验。
pub fn load_config() -> Result<AppConfig, StartupError> {
    let config = load_from(Path::new(CONFIG_FILE), None)?;
    config.validate()?;
    Ok(config)
}

/// # Summary
/// 从指定文件与环境变量源合并配置，不做校验。
///
/// # Arguments
/// * `file` - TOML 配置文件路径，不存在时忽略。
/// * `env` - 环境变量源，`None` 表示读取进程环境。
pub fn load_from(
    file: &Path,
    env: Option<HashMap<String, String>>,
) -> Result<AppConfig, StartupError> {
    let environment = config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("market.symbols")
        .source(env);

    config::Config::builder()
        .add_source(config::File::from(file).required(false))
        .add_source(environment)
        .build()
        .and_then(|c| c.try_deserialize::<AppConfig>())
        .map_err(|e| StartupError::Config(e.to_string()))
}
