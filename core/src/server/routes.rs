//! Route table and CORS handling.

use std::sync::Arc;

use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;

use super::ApiState;
use super::handlers;

pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/getIP", get(handlers::get_ip))
        .fallback(handlers::not_found)
        .layer(middleware::from_fn(cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Adds the CORS headers to every response and answers preflights directly.
///
/// `OPTIONS` never reaches a handler, so it is not counted against the
/// request budget.
async fn cors(request: Request, next: Next) -> Response {
    let mut response: Response = if request.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );

    response
}
