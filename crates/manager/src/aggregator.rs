use kizashi_core::quote::entity::PriceRecord;
use kizashi_core::report::entity::OutputRecord;
use kizashi_core::sentiment::entity::SentimentOutcome;
use std::collections::HashMap;

/// # Summary
/// 合并报价与情绪结论，生成最终输出列表。
///
/// # Logic
/// 1. 按报价列表的顺序 (即规范顺序) 逐条处理。
/// 2. 映射中存在该证券则附加其结论，否则附加 `Fallback`。
/// 3. 没有报价的证券不会出现在输入中，因而也不会出现在输出中。
///
/// # Arguments
/// * `prices`: 按规范顺序排列、报价成功的记录。
/// * `sentiments`: 证券代码到结论的映射，可缺项。
///
/// # Returns
/// 输出记录列表，长度等于 `prices`，永不失败。
pub fn merge(
    prices: Vec<PriceRecord>,
    sentiments: &HashMap<String, SentimentOutcome>,
) -> Vec<OutputRecord> {
    prices
        .into_iter()
        .map(|record| {
            let outcome = sentiments
                .get(&record.symbol)
                .cloned()
                .unwrap_or(SentimentOutcome::Fallback);
            OutputRecord::new(record, outcome)
        })
        .collect()
}
