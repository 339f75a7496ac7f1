use sqlx::PgPool;

use crate::models::Attendee;
use crate::services::input::CreateAttendeeDto;
use crate::utils::error::AppError;

const ATTENDEE_COLUMNS: &str = "id, user_id, event_id, answer";

#[derive(Clone)]
pub struct AttendeesService {
    pool: PgPool,
}

impl AttendeesService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_event(&self, event_id: i64) -> Result<Vec<Attendee>, AppError> {
        let sql = format!("SELECT {} FROM attendees WHERE event_id = $1", ATTENDEE_COLUMNS);
        Ok(sqlx::query_as::<_, Attendee>(&sql)
            .bind(event_id)
            .fetch_all(&self.pool)
            .await?)
    }

    // None means "not attending".
    pub async fn find_one(&self, event_id: i64, user_id: i64) -> Result<Option<Attendee>, AppError> {
        let sql = format!(
            "SELECT {} FROM attendees WHERE event_id = $1 AND user_id = $2",
            ATTENDEE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Attendee>(&sql)
            .bind(event_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Read-before-write upsert, not atomic: two concurrent calls for
    /// the same (event, user) pair can both observe "absent" and insert
    /// twice, since the store carries no unique constraint on the pair.
    pub async fn create_or_update(
        &self,
        input: CreateAttendeeDto,
        event_id: i64,
        user_id: i64,
    ) -> Result<Attendee, AppError> {
        if let Some(existing) = self.find_one(event_id, user_id).await? {
            let sql = format!(
                "UPDATE attendees SET answer = $1 WHERE id = $2 RETURNING {}",
                ATTENDEE_COLUMNS
            );
            let attendee = sqlx::query_as::<_, Attendee>(&sql)
                .bind(input.answer)
                .bind(existing.id)
                .fetch_one(&self.pool)
                .await?;
            tracing::info!(event_id, user_id, answer = ?attendee.answer, "attendance updated");
            return Ok(attendee);
        }

        let sql = format!(
            "INSERT INTO attendees (user_id, event_id, answer) VALUES ($1, $2, $3) RETURNING {}",
            ATTENDEE_COLUMNS
        );
        let attendee = sqlx::query_as::<_, Attendee>(&sql)
            .bind(user_id)
            .bind(event_id)
            .bind(input.answer)
            .fetch_one(&self.pool)
            .await?;
        tracing::info!(event_id, user_id, answer = ?attendee.answer, "attendance recorded");
        Ok(attendee)
    }
}
