//! 集成测试公共工具 - 内存数据库 + oneshot 路由

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use reservation_server::api::build_app;
use reservation_server::db::repository::dining_table;
use reservation_server::{Config, DbService, ServerState};
use serde_json::{Value, json};
use tower::ServiceExt;

pub const DATE: &str = "2024-06-01";
pub const TIME: &str = "18:00:00";

pub struct TestApp {
    pub app: Router,
    pub state: ServerState,
    /// Table ids in the order of the capacities passed to `setup`
    pub tables: Vec<i64>,
}

/// Fresh in-memory database with one table per capacity (numbered from 1)
pub async fn setup(capacities: &[i32]) -> TestApp {
    let db = DbService::in_memory().await.unwrap();
    let mut tables = Vec::new();
    for (i, capacity) in capacities.iter().enumerate() {
        let id = dining_table::insert(&db.pool, i as i32 + 1, *capacity, Some("main"))
            .await
            .unwrap();
        tables.push(id);
    }

    let config = Config::with_overrides(std::env::temp_dir().to_string_lossy(), 0);
    let state = ServerState::new(config, db);
    let app = build_app(&state).with_state(state.clone());
    TestApp { app, state, tables }
}

impl TestApp {
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                builder = builder.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    /// POST a booking and return (status, body)
    pub async fn book(&self, email: &str, date: &str, time: &str, party_size: i32) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            "/api/reservations",
            Some(booking(email, date, time, party_size)),
        )
        .await
    }
}

pub fn booking(email: &str, date: &str, time: &str, party_size: i32) -> Value {
    json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": email,
        "phone": "555-0100",
        "reservationDate": date,
        "reservationTime": time,
        "partySize": party_size,
        "specialRequests": null
    })
}
