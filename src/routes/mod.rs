use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::config::{apply_security_headers, create_cors_layer, Config};
use crate::handlers::{attendance, events, health_check, AppState};

pub fn create_routes(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .route("/events", get(events::list).post(events::create))
        .route(
            "/events/:id",
            get(events::find_one)
                .patch(events::update)
                .delete(events::remove),
        )
        .route("/events/:id/attendees", get(attendance::list_event_attendees))
        .route("/users/:id/events", get(events::list_organized_by))
        .route("/events-attendance", get(attendance::list_attended))
        .route(
            "/events-attendance/:id",
            get(attendance::find_attendance).post(attendance::upsert_attendance),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer(&config.cors_allowed_origins));

    apply_security_headers(router, config.enable_hsts)
}
