//! # `kizashi-core` - 领域核心
//!
//! 定义行情、新闻与情绪三个子域的实体、错误与端口 (Trait)。
//! 本 crate 不做任何 I/O，具体实现由 `kizashi-feed` / `kizashi-engine` 注入。

pub mod common;
pub mod config;
pub mod news;
pub mod quote;
pub mod report;
pub mod sentiment;

#[cfg(feature = "test-utils")]
pub mod testing;
