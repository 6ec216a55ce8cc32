//! Table API Handlers

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    extract::{Path, State},
};

use shared::models::{DiningTable, TableAvailabilityUpdate};

use crate::api::MessageResponse;
use crate::core::ServerState;
use crate::db::repository::dining_table;
use crate::utils::{AppError, AppResult};

/// GET /api/tables - 获取所有桌台
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<DiningTable>>> {
    let tables = dining_table::find_all(&state.db.pool).await?;
    Ok(Json(tables))
}

/// GET /api/tables/:id - 获取单个桌台
pub async fn get_by_id(
    State(state): State<ServerState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<DiningTable>> {
    let Path(id) = id?;
    let table = dining_table::find_by_id(&state.db.pool, id)
        .await?
        .ok_or_else(|| AppError::table_not_found(id))?;
    Ok(Json(table))
}

/// PUT /api/tables/:id/availability - 启用/停用桌台
///
/// 不影响已有预订，只影响之后的分配与可用时段
pub async fn update_availability(
    State(state): State<ServerState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<TableAvailabilityUpdate>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    if !dining_table::set_availability(&state.db.pool, id, payload.is_available).await? {
        return Err(AppError::table_not_found(id));
    }
    tracing::info!(table_id = id, is_available = payload.is_available, "Table availability updated");
    Ok(Json(MessageResponse::new("Table availability updated")))
}
