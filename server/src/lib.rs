use axum::{
    http::{header, HeaderName, Method},
    routing::{get, post},
    Router,
};
use shared::{
    api::{ASK_ROUTE, CONVERSATIONS_ROUTE},
    USER_ID_HEADER,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod identity;
pub mod rpc;
pub mod state;

pub use state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        // allow `GET` and `POST` when accessing the resource
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(USER_ID_HEADER)])
        // allow requests from any origin
        .allow_origin(Any);

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route(ASK_ROUTE, post(rpc::ask))
        .route(CONVERSATIONS_ROUTE, get(rpc::recent_conversations))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
