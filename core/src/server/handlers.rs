//! HTTP request handlers.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::info;

use super::ApiState;

/// GET /getIP
pub async fn get_ip(
    State(state): State<Arc<ApiState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
) -> Response {
    let count: usize = state.record_request();
    info!("Request {}/{} received from {}", count, state.max_requests, peer);

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        state.body.clone(),
    )
        .into_response()
}

pub async fn not_found() -> Response {
    StatusCode::NOT_FOUND.into_response()
}
