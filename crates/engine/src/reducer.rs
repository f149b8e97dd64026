use kizashi_core::config::ReductionPolicyKind;
use kizashi_core::sentiment::entity::{
    ChunkSentiment, SentimentLabel, SentimentOutcome, SymbolSentiment,
};
use kizashi_core::sentiment::error::InferenceError;
use kizashi_core::sentiment::port::ReductionPolicy;
use tracing::{debug, warn};

/// # Summary
/// 首个结果胜出：取文档/分块顺序中第一个结果的标签。
pub struct FirstWins;

impl ReductionPolicy for FirstWins {
    fn name(&self) -> &'static str {
        "first"
    }

    fn reduce(&self, results: &[ChunkSentiment]) -> SentimentOutcome {
        results
            .first()
            .map(|r| SentimentOutcome::Label(r.label.clone()))
            .unwrap_or(SentimentOutcome::Fallback)
    }
}

/// # Summary
/// 多数表决：出现次数最多的标签胜出，平票时取最先出现者。
pub struct MajorityVote;

impl ReductionPolicy for MajorityVote {
    fn name(&self) -> &'static str {
        "majority"
    }

    fn reduce(&self, results: &[ChunkSentiment]) -> SentimentOutcome {
        best_by(results, |_| 1.0)
    }
}

/// # Summary
/// 置信度加权：各标签的置信度之和最大者胜出，平局时取最先出现者。
pub struct ConfidenceWeighted;

impl ReductionPolicy for ConfidenceWeighted {
    fn name(&self) -> &'static str {
        "weighted"
    }

    fn reduce(&self, results: &[ChunkSentiment]) -> SentimentOutcome {
        best_by(results, |r| r.score)
    }
}

/// 按标签累加权重并取最大值，标签按首次出现的顺序参与比较。
fn best_by(results: &[ChunkSentiment], weight: impl Fn(&ChunkSentiment) -> f64) -> SentimentOutcome {
    let mut tally: Vec<(&SentimentLabel, f64)> = Vec::new();
    for r in results {
        match tally.iter_mut().find(|(label, _)| *label == &r.label) {
            Some((_, total)) => *total += weight(r),
            None => tally.push((&r.label, weight(r))),
        }
    }

    let mut best: Option<(&SentimentLabel, f64)> = None;
    for (label, total) in tally {
        // 严格大于，保留先出现的标签
        if best.is_none_or(|(_, b)| total > b) {
            best = Some((label, total));
        }
    }
    best.map(|(label, _)| SentimentOutcome::Label(label.clone()))
        .unwrap_or(SentimentOutcome::Fallback)
}

/// 根据配置选择归约策略。
pub fn policy_for(kind: ReductionPolicyKind) -> Box<dyn ReductionPolicy> {
    match kind {
        ReductionPolicyKind::First => Box::new(FirstWins),
        ReductionPolicyKind::Majority => Box::new(MajorityVote),
        ReductionPolicyKind::Weighted => Box::new(ConfidenceWeighted),
    }
}

/// # Summary
/// 证券级情绪归约器。
///
/// # Invariants
/// - 全函数：失败分块被跳过并记录日志，全部失败或为空时得到 `Fallback`。
pub struct SentimentReducer {
    policy: Box<dyn ReductionPolicy>,
}

impl SentimentReducer {
    pub fn new(policy: Box<dyn ReductionPolicy>) -> Self {
        Self { policy }
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// # Summary
    /// 归约一个证券的全部分块结果。
    ///
    /// # Logic
    /// 1. 按顺序遍历结果，`Err` 记录告警后丢弃。
    /// 2. 将剩余结果交给策略归约。
    ///
    /// # Arguments
    /// * `symbol`: 证券代码。
    /// * `results`: 按文档/分块顺序排列的分类结果。
    ///
    /// # Returns
    /// 证券级结论，永不失败。
    pub fn reduce<I>(&self, symbol: &str, results: I) -> SymbolSentiment
    where
        I: IntoIterator<Item = Result<ChunkSentiment, InferenceError>>,
    {
        let mut usable = Vec::new();
        let mut skipped = 0usize;
        for result in results {
            match result {
                Ok(r) => usable.push(r),
                Err(e) => {
                    skipped += 1;
                    warn!("Skipping chunk for {}: {}", symbol, e);
                }
            }
        }

        let outcome = self.policy.reduce(&usable);
        debug!(
            "{}: {} chunk(s) reduced by '{}' ({} skipped) -> {}",
            symbol,
            usable.len(),
            self.policy.name(),
            skipped,
            outcome
        );
        SymbolSentiment {
            symbol: symbol.to_string(),
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(label: SentimentLabel, score: f64) -> ChunkSentiment {
        ChunkSentiment::new(label, score)
    }

    fn label(l: SentimentLabel) -> SentimentOutcome {
        SentimentOutcome::Label(l)
    }

    #[test]
    fn test_every_policy_falls_back_on_empty_input() {
        for kind in [
            ReductionPolicyKind::First,
            ReductionPolicyKind::Majority,
            ReductionPolicyKind::Weighted,
        ] {
            assert_eq!(policy_for(kind).reduce(&[]), SentimentOutcome::Fallback);
        }
    }

    #[test]
    fn test_single_result_wins_under_every_policy() {
        let input = [r(SentimentLabel::Negative, 0.3)];
        for kind in [
            ReductionPolicyKind::First,
            ReductionPolicyKind::Majority,
            ReductionPolicyKind::Weighted,
        ] {
            assert_eq!(
                policy_for(kind).reduce(&input),
                label(SentimentLabel::Negative)
            );
        }
    }

    #[test]
    fn test_first_wins_ignores_later_evidence() {
        let input = [
            r(SentimentLabel::Neutral, 0.2),
            r(SentimentLabel::Positive, 0.99),
            r(SentimentLabel::Positive, 0.99),
        ];
        assert_eq!(FirstWins.reduce(&input), label(SentimentLabel::Neutral));
    }

    #[test]
    fn test_majority_vote_and_tie_break() {
        let input = [
            r(SentimentLabel::Neutral, 0.9),
            r(SentimentLabel::Positive, 0.6),
            r(SentimentLabel::Positive, 0.6),
        ];
        assert_eq!(MajorityVote.reduce(&input), label(SentimentLabel::Positive));

        let tie = [
            r(SentimentLabel::Negative, 0.5),
            r(SentimentLabel::Positive, 0.5),
        ];
        assert_eq!(MajorityVote.reduce(&tie), label(SentimentLabel::Negative));
    }

    #[test]
    fn test_confidence_weighted() {
        let input = [
            r(SentimentLabel::Positive, 0.3),
            r(SentimentLabel::Positive, 0.3),
            r(SentimentLabel::Negative, 0.95),
        ];
        assert_eq!(
            ConfidenceWeighted.reduce(&input),
            label(SentimentLabel::Negative)
        );
    }

    #[test]
    fn test_reducer_skips_failed_chunks() {
        let reducer = SentimentReducer::new(Box::new(FirstWins));
        let results = vec![
            Err(InferenceError::ModelUnavailable("boom".into())),
            Ok(r(SentimentLabel::Positive, 0.8)),
            Ok(r(SentimentLabel::Negative, 0.8)),
        ];
        let verdict = reducer.reduce("AAPL", results);
        assert_eq!(verdict.symbol, "AAPL");
        assert_eq!(verdict.outcome, label(SentimentLabel::Positive));

        let all_failed = vec![Err(InferenceError::MalformedInput("empty".into()))];
        assert!(reducer.reduce("AAPL", all_failed).outcome.is_fallback());
    }
}
