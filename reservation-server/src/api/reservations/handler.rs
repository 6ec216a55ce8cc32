//! Reservation API Handlers

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Serialize;

use shared::models::{
    AvailabilityQuery, AvailableSlots, Reservation, ReservationCreate, ReservationCreated,
    ReservationDetail, ReservationUpdate,
};

use crate::api::MessageResponse;
use crate::core::ServerState;
use crate::utils::AppResult;

/// PUT response: acknowledgement plus the stored row
#[derive(Debug, Serialize)]
pub struct UpdatedResponse {
    message: String,
    reservation: Reservation,
}

/// GET /api/reservations - 获取所有预订 (日期、时间倒序)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<ReservationDetail>>> {
    let reservations = state.booking.list_reservations().await?;
    Ok(Json(reservations))
}

/// GET /api/reservations/available-slots?date=&partySize= - 查询可预订时段
pub async fn available_slots(
    State(state): State<ServerState>,
    query: Result<Query<AvailabilityQuery>, QueryRejection>,
) -> AppResult<Json<AvailableSlots>> {
    let Query(query) = query?;
    let slots = state
        .booking
        .available_slots(&query.date, query.party_size)
        .await?;
    Ok(Json(slots))
}

/// GET /api/reservations/:id - 获取单个预订
pub async fn get_by_id(
    State(state): State<ServerState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<ReservationDetail>> {
    let Path(id) = id?;
    let reservation = state.booking.get_reservation(id).await?;
    Ok(Json(reservation))
}

/// POST /api/reservations - 创建预订 (自动分配桌台)
pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<ReservationCreate>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ReservationCreated>)> {
    let Json(payload) = payload?;
    let created = state.booking.create_reservation(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/reservations/:id - 更新预订
pub async fn update(
    State(state): State<ServerState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ReservationUpdate>, JsonRejection>,
) -> AppResult<Json<UpdatedResponse>> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let reservation = state.booking.update_reservation(id, payload).await?;
    Ok(Json(UpdatedResponse {
        message: "Reservation updated successfully".to_string(),
        reservation,
    }))
}

/// DELETE /api/reservations/:id - 取消预订
pub async fn cancel(
    State(state): State<ServerState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Path(id) = id?;
    state.booking.cancel(id).await?;
    Ok(Json(MessageResponse::new("Reservation cancelled successfully")))
}
