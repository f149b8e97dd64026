use axum::Json;
use axum::extract::State;

use crate::server::AppState;
use crate::types::StockResponse;

/// 获取行情与情绪报表
///
/// 每次请求都重新抓取报价与新闻并完成情绪分析。
/// 单个证券的失败不会影响整体响应：报价失败的证券不出现，新闻或推理失败的证券情绪为 `Unknown`。
#[utoipa::path(
    get,
    path = "/stocks",
    tag = "行情 (Stocks)",
    responses(
        (status = 200, description = "按固定证券顺序排列的报表", body = [StockResponse])
    )
)]
pub async fn list_stocks(State(state): State<AppState>) -> Json<Vec<StockResponse>> {
    let report = state.report_manager.build_report().await;
    Json(report.into_iter().map(StockResponse::from).collect())
}
