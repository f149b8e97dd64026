use kizashi_core::config::LogConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// # Summary
/// 初始化全局日志。
///
/// # Logic
/// 1. 过滤级别优先取 `RUST_LOG`，否则取配置中的 `log.level`。
/// 2. 始终输出到 stdout。
/// 3. 配置了 `log.dir` 时，额外按天滚动写入文件 (非阻塞、无 ANSI 颜色)。
///
/// # Returns
/// 文件写入器的守卫，必须持有到进程退出，否则缓冲日志会丢失。
pub fn init_logging(config: &LogConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (file_layer, guard) = match &config.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "kizashi.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    if tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()
        .is_err()
    {
        eprintln!("global tracing subscriber already installed");
    }

    guard
}
