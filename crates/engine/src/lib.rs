//! # `kizashi-engine` - 情绪推理引擎
//!
//! 分词适配、按 token 边界分块、逐块分类、证券级归约，
//! 以及把它们组装为进程级单例的 `SentimentEngine`。

pub mod chunker;
pub mod classifier;
pub mod pipeline;
pub mod reducer;
pub mod tokenizer;
pub mod transformer;
