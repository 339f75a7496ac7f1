use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::handlers::extract::CurrentUser;
use crate::handlers::{AppState, ListEventsQuery};
use crate::models::Event;
use crate::services::input::{CreateEventDto, UpdateEventDto};
use crate::services::EventsService;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListEventsQuery>,
) -> Result<Response, AppError> {
    let filter = params.when_filter()?;
    let options = params.paginate_options()?;
    let page = EventsService::new(state.pool)
        .list_filtered(filter, &options)
        .await?;
    Ok(success(page, "Events retrieved").into_response())
}

pub async fn list_organized_by(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(params): Query<ListEventsQuery>,
) -> Result<Response, AppError> {
    let options = params.paginate_options()?;
    let page = EventsService::new(state.pool)
        .list_organized_by(user_id, &options)
        .await?;
    Ok(success(page, "Events retrieved").into_response())
}

pub async fn find_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let event = EventsService::new(state.pool)
        .get_with_counts(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event with id '{}' was not found", id)))?;
    Ok(success(event, "Event retrieved").into_response())
}

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<CreateEventDto>,
) -> Result<Response, AppError> {
    input.validate()?;
    let event = EventsService::new(state.pool).create(input, user.0).await?;
    Ok(created(event, "Event created").into_response())
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: CurrentUser,
    Json(input): Json<UpdateEventDto>,
) -> Result<Response, AppError> {
    // Validation errors must be rejected before any store access.
    input.validate()?;
    let service = EventsService::new(state.pool);
    check_event_ownership(&service, id, user.0).await?;
    let event = service.update(id, input).await?;
    Ok(success(event, "Event updated").into_response())
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: CurrentUser,
) -> Result<Response, AppError> {
    let service = EventsService::new(state.pool);
    check_event_ownership(&service, id, user.0).await?;
    service.delete(id).await?;
    Ok(empty_success("Event deleted").into_response())
}

// Existence first, then ownership, so a missing event reads as 404 and
// someone else's event as 403.
async fn check_event_ownership(
    service: &EventsService,
    id: i64,
    user_id: i64,
) -> Result<Event, AppError> {
    let event = service
        .find_one(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event with id '{}' was not found", id)))?;
    if !event.is_owner(user_id) {
        return Err(AppError::Forbidden(
            "You are not allowed to modify this event".to_string(),
        ));
    }
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    // A lazy pool never connects until queried; a handler that touches
    // the store with it fails as a database error, not a validation one.
    fn disconnected_state() -> AppState {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://127.0.0.1:1/gathera")
            .unwrap();
        AppState { pool }
    }

    #[tokio::test]
    async fn malformed_update_is_rejected_before_any_store_access() {
        let input = UpdateEventDto {
            when: Some("not-a-date".to_string()),
            ..Default::default()
        };
        let response = update(
            State(disconnected_state()),
            Path(9),
            CurrentUser(1),
            Json(input),
        )
        .await;
        let err = response.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
