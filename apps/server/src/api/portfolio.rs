use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use tickerfolio_core::PortfolioSummary;

use crate::{error::ApiResult, main_lib::AppState};

async fn get_portfolio_summary(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PortfolioSummary>> {
    let summary = state.enrichment_service.get_portfolio_summary().await?;
    Ok(Json(summary))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/portfolio/summary", get(get_portfolio_summary))
}
