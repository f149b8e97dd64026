//! 金融新闻情绪模型 (DistilRoBERTa，ONNX 导出) 的分类器。

use crate::tokenizer::HfTokenizer;
use kizashi_core::config::{ModelConfig, StartupError};
use kizashi_core::sentiment::entity::{ChunkSentiment, SentimentLabel};
use kizashi_core::sentiment::error::InferenceError;
use kizashi_core::sentiment::port::SentimentClassifier;
use ort::session::Session;
use ort::value::Tensor;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

/// 模型 config.json 中本分类器关心的部分
#[derive(Deserialize, Debug)]
struct LabelConfig {
    id2label: HashMap<String, String>,
}

/// # Summary
/// 序列分类 Transformer 的 ONNX 推理封装。
///
/// # Invariants
/// - 模型权重在构造时载入内存，进程内只加载一次。
/// - 与分块器共用同一个分词器，输入长度上限为 `model_max_length`。
/// - `labels[i]` 对应 logits 的第 i 维。
pub struct TransformerClassifier {
    tokenizer: Arc<HfTokenizer>,
    // ONNX Runtime 会话，推理需要独占访问
    session: Mutex<Session>,
    labels: Vec<SentimentLabel>,
}

impl TransformerClassifier {
    /// # Summary
    /// 加载 ONNX 模型与标签表。
    ///
    /// # Logic
    /// 1. 读取 `labels_path` (HF config.json) 中的 id2label。
    /// 2. 校验模型文件存在后创建 ONNX Runtime 会话。
    ///
    /// # Arguments
    /// * `config` - 模型配置段。
    /// * `tokenizer` - 已加载的分词器，与分块器共享。
    ///
    /// # Returns
    /// 成功返回分类器，任一文件缺失或无效返回 `StartupError::Model`。
    pub fn load(config: &ModelConfig, tokenizer: Arc<HfTokenizer>) -> Result<Self, StartupError> {
        let raw = std::fs::read_to_string(&config.labels_path)
            .map_err(|e| StartupError::Model(format!("{}: {}", config.labels_path, e)))?;
        let labels = parse_labels(&raw)?;

        if !Path::new(&config.model_path).is_file() {
            return Err(StartupError::Model(format!(
                "{}: model file not found",
                config.model_path
            )));
        }
        let session = Session::builder()
            .map_err(|e| StartupError::Model(e.to_string()))?
            .commit_from_file(&config.model_path)
            .map_err(|e| StartupError::Model(format!("{}: {}", config.model_path, e)))?;

        info!(
            "Sentiment model loaded from {} (labels {:?})",
            config.model_path,
            labels.iter().map(SentimentLabel::as_str).collect::<Vec<_>>()
        );
        Ok(Self {
            tokenizer,
            session: Mutex::new(session),
            labels,
        })
    }

    /// 对一条已编码输入执行前向计算，返回 logits。
    fn forward(&self, ids: &[u32]) -> Result<Vec<f32>, InferenceError> {
        let len = ids.len();
        let input_ids: Vec<i64> = ids.iter().map(|id| i64::from(*id)).collect();
        let attention_mask = vec![1_i64; len];

        let input_ids = Tensor::from_array(([1usize, len], input_ids))
            .map_err(|e| InferenceError::ModelUnavailable(e.to_string()))?;
        let attention_mask = Tensor::from_array(([1usize, len], attention_mask))
            .map_err(|e| InferenceError::ModelUnavailable(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| InferenceError::ModelUnavailable("session lock poisoned".into()))?;
        let outputs = session
            .run(ort::inputs![
                "input_ids" => input_ids,
                "attention_mask" => attention_mask
            ])
            .map_err(|e| InferenceError::ModelUnavailable(e.to_string()))?;
        let logits = outputs
            .get("logits")
            .ok_or_else(|| InferenceError::ModelUnavailable("model has no 'logits' output".into()))?;
        let (_, values) = logits
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::ModelUnavailable(e.to_string()))?;
        Ok(values.to_vec())
    }
}

impl SentimentClassifier for TransformerClassifier {
    /// # Summary
    /// 对单个分块执行一次推理。
    ///
    /// # Logic
    /// 1. 空白文本视为非法输入。
    /// 2. 按模型格式编码 (附加 `<s>` `</s>`)，超出 `model_max_length` 视为非法输入，不截断。
    /// 3. 前向计算后对 logits 做 softmax，取概率最大的标签。
    fn classify(&self, text: &str) -> Result<ChunkSentiment, InferenceError> {
        if text.trim().is_empty() {
            return Err(InferenceError::MalformedInput("empty chunk".into()));
        }
        let ids = self.tokenizer.encode_for_model(text)?;
        if ids.len() > self.tokenizer.model_max_length() {
            return Err(InferenceError::MalformedInput(format!(
                "chunk has {} tokens, model accepts {}",
                ids.len(),
                self.tokenizer.model_max_length()
            )));
        }
        let logits = self.forward(&ids)?;
        pick_label(&logits, &self.labels)
    }
}

/// # Summary
/// 解析 HF config.json 的 id2label，生成按下标排列的标签表。
///
/// # Logic
/// 1. 键必须是十进制下标，并且恰好覆盖 `0..n`。
/// 2. 标签名经 `SentimentLabel::parse` 归一化 (negative -> Negative)。
pub(crate) fn parse_labels(raw: &str) -> Result<Vec<SentimentLabel>, StartupError> {
    let config: LabelConfig = serde_json::from_str(raw)
        .map_err(|e| StartupError::Model(format!("invalid model config: {}", e)))?;

    let mut indexed = config
        .id2label
        .into_iter()
        .map(|(id, name)| {
            id.parse::<usize>()
                .map(|i| (i, SentimentLabel::parse(&name)))
                .map_err(|_| StartupError::Model(format!("invalid label id '{}'", id)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    indexed.sort_by_key(|(i, _)| *i);

    if indexed.is_empty() || indexed.iter().enumerate().any(|(pos, (i, _))| pos != *i) {
        return Err(StartupError::Model(
            "id2label must cover every index from 0".into(),
        ));
    }
    Ok(indexed.into_iter().map(|(_, label)| label).collect())
}

/// # Summary
/// 对 logits 做 softmax 并取最大概率的标签。
///
/// # Returns
/// 标签与其概率；logits 维度与标签数不一致时返回 `ModelUnavailable`。
pub(crate) fn pick_label(
    logits: &[f32],
    labels: &[SentimentLabel],
) -> Result<ChunkSentiment, InferenceError> {
    if logits.is_empty() || logits.len() != labels.len() {
        return Err(InferenceError::ModelUnavailable(format!(
            "model returned {} logits for {} labels",
            logits.len(),
            labels.len()
        )));
    }

    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f64> = logits.iter().map(|l| f64::from(l - max).exp()).collect();
    let total: f64 = exps.iter().sum();

    let mut best = 0;
    for (i, e) in exps.iter().enumerate() {
        if *e > exps[best] {
            best = i;
        }
    }
    Ok(ChunkSentiment::new(labels[best].clone(), exps[best] / total))
}
