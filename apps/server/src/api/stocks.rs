use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tickerfolio_core::EnrichedHolding;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

/// Every holding with live figures, in configuration order.
async fn get_stocks(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<EnrichedHolding>>> {
    let rows = state.enrichment_service.get_enriched_portfolio().await?;
    Ok(Json(rows))
}

async fn get_stock(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<EnrichedHolding>> {
    state
        .enrichment_service
        .get_enriched_holding(&name)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stocks", get(get_stocks))
        .route("/stocks/{name}", get(get_stock))
}
