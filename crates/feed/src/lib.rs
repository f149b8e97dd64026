//! # `kizashi-feed` - 外部数据源
//!
//! 报价 (Yahoo Finance) 与新闻 (NewsAPI) 两个外部协作者的 HTTP 实现。

pub mod newsapi;
pub mod yahoo;
