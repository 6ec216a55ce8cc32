//! 健康检查路由
//!
//! ```json
//! { "status": "ok", "version": "0.1.0", "timestamp": 1717236000000 }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;
use shared::util::now_millis;

/// 健康检查路由 - 公共路由
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(health))
}

/// 健康检查响应
#[derive(Serialize)]
pub struct HealthResponse {
    /// 状态 (ok | degraded)
    status: &'static str,
    /// 版本号
    version: &'static str,
    /// 当前时间 (Unix millis)
    timestamp: i64,
}

/// GET /api/health - 健康检查
async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let status = if state.db.ping().await { "ok" } else { "degraded" };
    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: now_millis(),
    })
}
