use axum::{http::Method, routing::get, Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod analytics;
pub mod auth;
pub mod bookings;
pub mod error;
pub mod faculty;
pub mod listings;
pub mod middleware;
pub mod password;
pub mod state;
pub mod users;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    let public = Router::new()
        .route("/health", get(health))
        .merge(auth::routes())
        .merge(listings::public_routes())
        .merge(faculty::public_routes());

    let protected = Router::new()
        .merge(users::routes())
        .merge(listings::routes())
        .merge(faculty::routes())
        .merge(bookings::routes())
        .merge(analytics::routes())
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    let admin = Router::new()
        .merge(users::admin_routes())
        .merge(listings::admin_routes())
        .merge(bookings::admin_routes())
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::admin_auth_middleware,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .nest("/v1/admin", admin)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
