use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::handlers::extract::CurrentUser;
use crate::handlers::{AppState, ListEventsQuery};
use crate::services::input::CreateAttendeeDto;
use crate::services::{AttendeesService, EventsService};
use crate::utils::error::AppError;
use crate::utils::response::success;

pub async fn list_event_attendees(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> Result<Response, AppError> {
    let attendees = AttendeesService::new(state.pool)
        .find_by_event(event_id)
        .await?;
    Ok(success(attendees, "Attendees retrieved").into_response())
}

pub async fn list_attended(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<ListEventsQuery>,
) -> Result<Response, AppError> {
    let options = params.paginate_options()?;
    let page = EventsService::new(state.pool)
        .list_attended_by(user.0, &options)
        .await?;
    Ok(success(page, "Events retrieved").into_response())
}

pub async fn find_attendance(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(event_id): Path<i64>,
) -> Result<Response, AppError> {
    let attendee = AttendeesService::new(state.pool)
        .find_one(event_id, user.0)
        .await?
        .ok_or_else(|| AppError::NotFound("This user is not attending this event".to_string()))?;
    Ok(success(attendee, "Attendance retrieved").into_response())
}

pub async fn upsert_attendance(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(event_id): Path<i64>,
    Json(input): Json<CreateAttendeeDto>,
) -> Result<Response, AppError> {
    let attendee = AttendeesService::new(state.pool)
        .create_or_update(input, event_id, user.0)
        .await?;
    Ok(success(attendee, "Attendance saved").into_response())
}
