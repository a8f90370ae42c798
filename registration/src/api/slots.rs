//! Slot statistics.
//!
//! - GET /api/slots - Capacity, occupancy and remaining seats per pool

use crate::admission::PoolStatus;
use crate::error::AppError;
use crate::server::state::AppState;
use axum::{Json, extract::State};
use serde::Serialize;

/// Response for the slot statistics query.
#[derive(Debug, Serialize)]
pub struct SlotsResponse {
    /// One entry per pool
    pub pools: Vec<PoolStatus>,
}

/// Current occupancy of every pool.
///
/// ```json
/// {
///   "pools": [
///     { "pool": "overall", "capacity": 400, "occupied": 397, "remaining": 3, "full": false },
///     { "pool": "workshop:Cloud", "capacity": 200, "occupied": 200, "remaining": 0, "full": true }
///   ]
/// }
/// ```
///
/// # Errors
///
/// 500 if the store cannot be read.
pub async fn slot_statistics(State(state): State<AppState>) -> Result<Json<SlotsResponse>, AppError> {
    let capacities = state.orchestrator.settings().capacities;
    let pools = state
        .orchestrator
        .inventory()
        .slot_statistics(&capacities)
        .await
        .map_err(|e| AppError::internal("Failed to read slot statistics").with_source(e.into()))?;

    Ok(Json(SlotsResponse { pools }))
}
