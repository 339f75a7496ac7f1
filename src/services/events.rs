use sqlx::PgPool;

use crate::models::Event;
use crate::pagination::{paginate, PaginateOptions, PaginationResult};
use crate::query::{EventQuery, WhenFilter};
use crate::services::input::{parse_when, CreateEventDto, UpdateEventDto};
use crate::utils::error::AppError;

const RETURNING_EVENT: &str = r#"RETURNING id, name, description, "when", address, organizer_id"#;

/// Authorization is the caller's job: existence and ownership are
/// checked at the handler layer before `update` or `delete` run.
#[derive(Clone)]
pub struct EventsService {
    pool: PgPool,
}

impl EventsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_filtered(
        &self,
        filter: WhenFilter,
        options: &PaginateOptions,
    ) -> Result<PaginationResult<Event>, AppError> {
        let query = EventQuery::base().with_attendee_counts().in_window(filter);
        paginate(&self.pool, &query, options).await
    }

    pub async fn list_organized_by(
        &self,
        user_id: i64,
        options: &PaginateOptions,
    ) -> Result<PaginationResult<Event>, AppError> {
        let query = EventQuery::base().organized_by(user_id);
        paginate(&self.pool, &query, options).await
    }

    pub async fn list_attended_by(
        &self,
        user_id: i64,
        options: &PaginateOptions,
    ) -> Result<PaginationResult<Event>, AppError> {
        let query = EventQuery::base().attended_by(user_id);
        paginate(&self.pool, &query, options).await
    }

    pub async fn get_with_counts(&self, id: i64) -> Result<Option<Event>, AppError> {
        EventQuery::base()
            .with_attendee_counts()
            .with_id(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Bare lookup without counts, the cheap path for ownership checks.
    pub async fn find_one(&self, id: i64) -> Result<Option<Event>, AppError> {
        EventQuery::base().with_id(id).fetch_optional(&self.pool).await
    }

    pub async fn create(&self, input: CreateEventDto, organizer_id: i64) -> Result<Event, AppError> {
        let when = parse_when(&input.when)?;
        let sql = format!(
            r#"INSERT INTO events (name, description, "when", address, organizer_id)
               VALUES ($1, $2, $3, $4, $5) {}"#,
            RETURNING_EVENT
        );
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(&input.name)
            .bind(&input.description)
            .bind(when)
            .bind(&input.address)
            .bind(organizer_id)
            .fetch_one(&self.pool)
            .await?;
        tracing::info!(event_id = event.id, organizer_id, "event created");
        Ok(event)
    }

    pub async fn update(&self, id: i64, input: UpdateEventDto) -> Result<Event, AppError> {
        let existing = self
            .find_one(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event with id '{}' was not found", id)))?;

        let merged = merge_update(existing, input)?;

        let sql = format!(
            r#"UPDATE events SET name = $1, description = $2, "when" = $3, address = $4
               WHERE id = $5 {}"#,
            RETURNING_EVENT
        );
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(&merged.name)
            .bind(&merged.description)
            .bind(merged.when)
            .bind(&merged.address)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        tracing::info!(event_id = id, "event updated");
        Ok(event)
    }

    // Attendee rows go with the event; the attendees table carries
    // ON DELETE CASCADE on its event reference.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Event with id '{}' was not found",
                id
            )));
        }
        tracing::info!(event_id = id, "event deleted");
        Ok(())
    }
}

/// Partial-update merge: present fields replace stored values, absent
/// fields keep them, a present `when` string is re-parsed.
fn merge_update(existing: Event, input: UpdateEventDto) -> Result<Event, AppError> {
    let when = match &input.when {
        Some(raw) => parse_when(raw)?,
        None => existing.when,
    };
    Ok(Event {
        id: existing.id,
        name: input.name.unwrap_or(existing.name),
        description: input.description.unwrap_or(existing.description),
        when,
        address: input.address.unwrap_or(existing.address),
        organizer_id: existing.organizer_id,
        attendee_count: existing.attendee_count,
        attendee_accepted: existing.attendee_accepted,
        attendee_maybe: existing.attendee_maybe,
        attendee_rejected: existing.attendee_rejected,
    })
}
