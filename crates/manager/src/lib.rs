//! # `kizashi-manager` - 应用服务层
//!
//! 每次请求的编排：并发抓取报价与新闻、调用情绪引擎、按规范顺序合并输出。

pub mod aggregator;
pub mod report;
