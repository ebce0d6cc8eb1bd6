//! Read-only stock endpoints.
//!
//! `GET /api/stock` lists every stored total; `GET /api/stock/{flower_id}`
//! reports one, with never-adjusted items reading as zero.

use axum::Json;
use axum::extract::{Path, State};

use crate::message::StockLevel;
use crate::state::AppState;

pub async fn list_levels(State(state): State<AppState>) -> Json<Vec<StockLevel>> {
    Json(state.stock.snapshot().await)
}

pub async fn get_level(State(state): State<AppState>, Path(flower_id): Path<u64>) -> Json<StockLevel> {
    Json(state.stock.level(flower_id).await)
}

#[cfg(test)]
#[path = "stock_test.rs"]
mod tests;
