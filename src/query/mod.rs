//! Composable event query fragments: order, then filter, then
//! optional attendee-count aggregation, rendered as one SQL statement.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;
use std::str::FromStr;

use crate::models::Event;
use crate::pagination::PageSource;
use crate::utils::error::AppError;

/// Relative-time bucket. Wire keywords are a contract surface:
/// `all`, `today`, `tomorrow`, `this_week`, `next_week`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WhenFilter {
    #[default]
    All,
    Today,
    Tomorrow,
    ThisWeek,
    NextWeek,
}

impl FromStr for WhenFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(WhenFilter::All),
            "today" => Ok(WhenFilter::Today),
            "tomorrow" => Ok(WhenFilter::Tomorrow),
            "this_week" => Ok(WhenFilter::ThisWeek),
            "next_week" => Ok(WhenFilter::NextWeek),
            other => Err(AppError::ValidationError(format!(
                "Unknown event window filter '{}'",
                other
            ))),
        }
    }
}

impl WhenFilter {
    /// Half-open UTC interval `[lo, hi)`, or `None` for `All`. An event
    /// at `today+1 00:00` belongs to `Tomorrow`, not `Today`.
    pub fn bounds(self, today: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let midnight = |offset: i64| {
            (today + Duration::days(offset))
                .and_time(NaiveTime::MIN)
                .and_utc()
        };
        match self {
            WhenFilter::All => None,
            WhenFilter::Today => Some((midnight(0), midnight(1))),
            WhenFilter::Tomorrow => Some((midnight(1), midnight(2))),
            WhenFilter::ThisWeek => Some((midnight(0), midnight(7))),
            WhenFilter::NextWeek => Some((midnight(7), midnight(14))),
        }
    }
}

#[derive(Debug, Clone)]
enum Bind {
    Int(i64),
    Timestamp(DateTime<Utc>),
}

const EVENT_COLUMNS: &str = r#"e.id, e.name, e.description, e."when", e.address, e.organizer_id"#;

/// A filtered selection over the events table. Every constructor path
/// renders `ORDER BY e.id DESC`, so a paginated query is ordered by
/// construction.
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    conditions: Vec<String>,
    binds: Vec<Bind>,
    with_counts: bool,
}

impl EventQuery {
    pub fn base() -> Self {
        Self::default()
    }

    /// Annotate each row with the per-answer attendee breakdown.
    pub fn with_attendee_counts(mut self) -> Self {
        self.with_counts = true;
        self
    }

    pub fn in_window(self, filter: WhenFilter) -> Self {
        self.in_window_at(filter, Utc::now().date_naive())
    }

    fn in_window_at(mut self, filter: WhenFilter, today: NaiveDate) -> Self {
        if let Some((lo, hi)) = filter.bounds(today) {
            let n = self.binds.len();
            self.conditions.push(format!(
                r#"e."when" >= ${} AND e."when" < ${}"#,
                n + 1,
                n + 2
            ));
            self.binds.push(Bind::Timestamp(lo));
            self.binds.push(Bind::Timestamp(hi));
        }
        self
    }

    pub fn organized_by(mut self, user_id: i64) -> Self {
        let n = self.binds.len();
        self.conditions.push(format!("e.organizer_id = ${}", n + 1));
        self.binds.push(Bind::Int(user_id));
        self
    }

    // EXISTS rather than a join: an event never appears twice even if
    // duplicate attendee rows slipped in.
    pub fn attended_by(mut self, user_id: i64) -> Self {
        let n = self.binds.len();
        self.conditions.push(format!(
            "EXISTS (SELECT 1 FROM attendees att WHERE att.event_id = e.id AND att.user_id = ${})",
            n + 1
        ));
        self.binds.push(Bind::Int(user_id));
        self
    }

    pub fn with_id(mut self, id: i64) -> Self {
        let n = self.binds.len();
        self.conditions.push(format!("e.id = ${}", n + 1));
        self.binds.push(Bind::Int(id));
        self
    }

    fn push_where(&self, sql: &mut String) {
        for (i, condition) in self.conditions.iter().enumerate() {
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            sql.push_str(condition);
        }
    }

    /// With `paged`, two trailing placeholders are reserved for LIMIT
    /// and OFFSET.
    pub fn select_sql(&self, paged: bool) -> String {
        let mut sql = String::from("SELECT ");
        sql.push_str(EVENT_COLUMNS);
        if self.with_counts {
            sql.push_str(", COUNT(a.id) AS attendee_count");
            sql.push_str(", COUNT(a.id) FILTER (WHERE a.answer = 1) AS attendee_accepted");
            sql.push_str(", COUNT(a.id) FILTER (WHERE a.answer = 2) AS attendee_maybe");
            sql.push_str(", COUNT(a.id) FILTER (WHERE a.answer = 3) AS attendee_rejected");
        }
        sql.push_str(" FROM events e");
        if self.with_counts {
            sql.push_str(" LEFT JOIN attendees a ON a.event_id = e.id");
        }
        self.push_where(&mut sql);
        if self.with_counts {
            sql.push_str(" GROUP BY e.id");
        }
        sql.push_str(" ORDER BY e.id DESC");
        if paged {
            let n = self.binds.len();
            sql.push_str(&format!(" LIMIT ${} OFFSET ${}", n + 1, n + 2));
        }
        sql
    }

    // The predicates alone decide the total; count annotations and
    // pagination never apply here.
    pub fn count_sql(&self) -> String {
        let mut sql = String::from("SELECT COUNT(*) FROM events e");
        self.push_where(&mut sql);
        sql
    }

    fn bind_all<'q>(
        &'q self,
        mut query: sqlx::query::QueryAs<'q, sqlx::Postgres, Event, sqlx::postgres::PgArguments>,
    ) -> sqlx::query::QueryAs<'q, sqlx::Postgres, Event, sqlx::postgres::PgArguments> {
        for bind in &self.binds {
            query = match bind {
                Bind::Int(v) => query.bind(v),
                Bind::Timestamp(t) => query.bind(t),
            };
        }
        query
    }

    pub async fn fetch_optional(&self, pool: &PgPool) -> Result<Option<Event>, AppError> {
        let sql = self.select_sql(false);
        tracing::debug!(%sql, "fetching single event");
        let query = self.bind_all(sqlx::query_as::<_, Event>(&sql));
        Ok(query.fetch_optional(pool).await?)
    }
}

impl PageSource for EventQuery {
    type Item = Event;

    async fn fetch_page(
        &self,
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Event>, AppError> {
        let sql = self.select_sql(true);
        tracing::debug!(%sql, limit, offset, "fetching event page");
        let query = self.bind_all(sqlx::query_as::<_, Event>(&sql));
        Ok(query.bind(limit).bind(offset).fetch_all(pool).await?)
    }

    async fn count(&self, pool: &PgPool) -> Result<i64, AppError> {
        let sql = self.count_sql();
        tracing::debug!(%sql, "counting matching events");
        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for bind in &self.binds {
            query = match bind {
                Bind::Int(v) => query.bind(v),
                Bind::Timestamp(t) => query.bind(t),
            };
        }
        Ok(query.fetch_one(pool).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn at_midnight(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn filter_keywords_parse_exactly() {
        assert_eq!("all".parse::<WhenFilter>().unwrap(), WhenFilter::All);
        assert_eq!("today".parse::<WhenFilter>().unwrap(), WhenFilter::Today);
        assert_eq!(
            "this_week".parse::<WhenFilter>().unwrap(),
            WhenFilter::ThisWeek
        );
        assert_eq!(
            "next_week".parse::<WhenFilter>().unwrap(),
            WhenFilter::NextWeek
        );
        assert!("Today".parse::<WhenFilter>().is_err());
        assert!("thisweek".parse::<WhenFilter>().is_err());
        assert!("yesterday".parse::<WhenFilter>().is_err());
    }

    #[test]
    fn all_filter_has_no_bounds() {
        assert!(WhenFilter::All.bounds(today()).is_none());
    }

    #[test]
    fn today_window_is_lower_inclusive_upper_exclusive() {
        let (lo, hi) = WhenFilter::Today.bounds(today()).unwrap();
        assert_eq!(lo, at_midnight(2024, 6, 10));
        assert_eq!(hi, at_midnight(2024, 6, 11));
        // An event at today 00:00 is in Today; one at today+1 00:00 is not.
        let boundary = at_midnight(2024, 6, 11);
        assert!(!(lo <= boundary && boundary < hi));
        let start = at_midnight(2024, 6, 10);
        assert!(lo <= start && start < hi);
    }

    #[test]
    fn tomorrow_window_starts_where_today_ends() {
        let (_, today_hi) = WhenFilter::Today.bounds(today()).unwrap();
        let (tomorrow_lo, tomorrow_hi) = WhenFilter::Tomorrow.bounds(today()).unwrap();
        assert_eq!(today_hi, tomorrow_lo);
        assert_eq!(tomorrow_hi, at_midnight(2024, 6, 12));
    }

    #[test]
    fn week_windows_span_seven_days() {
        let (lo, hi) = WhenFilter::ThisWeek.bounds(today()).unwrap();
        assert_eq!(hi - lo, Duration::days(7));
        let (next_lo, next_hi) = WhenFilter::NextWeek.bounds(today()).unwrap();
        assert_eq!(next_lo, hi);
        assert_eq!(next_hi - next_lo, Duration::days(7));
    }

    #[test]
    fn base_query_is_always_ordered() {
        let sql = EventQuery::base().select_sql(false);
        assert!(sql.contains("ORDER BY e.id DESC"));
        let paged = EventQuery::base().select_sql(true);
        let order_at = paged.find("ORDER BY").unwrap();
        let limit_at = paged.find("LIMIT").unwrap();
        assert!(order_at < limit_at);
    }

    #[test]
    fn aggregation_renders_conditional_counts_in_one_statement() {
        let sql = EventQuery::base().with_attendee_counts().select_sql(false);
        assert!(sql.contains("LEFT JOIN attendees a ON a.event_id = e.id"));
        assert!(sql.contains("COUNT(a.id) AS attendee_count"));
        assert!(sql.contains("COUNT(a.id) FILTER (WHERE a.answer = 1) AS attendee_accepted"));
        assert!(sql.contains("COUNT(a.id) FILTER (WHERE a.answer = 2) AS attendee_maybe"));
        assert!(sql.contains("COUNT(a.id) FILTER (WHERE a.answer = 3) AS attendee_rejected"));
        assert!(sql.contains("GROUP BY e.id"));
        // One statement, not one count query per event.
        assert_eq!(sql.matches("SELECT").count(), 1);
    }

    #[test]
    fn attended_by_uses_exists_not_a_row_multiplying_join() {
        let sql = EventQuery::base().attended_by(7).select_sql(false);
        assert!(sql.contains("EXISTS (SELECT 1 FROM attendees att"));
        assert!(sql.contains("att.user_id = $1"));
        assert!(!sql.contains("LEFT JOIN"));
    }

    #[test]
    fn window_predicate_binds_half_open_bounds() {
        let query = EventQuery::base().in_window_at(WhenFilter::Tomorrow, today());
        let sql = query.select_sql(false);
        assert!(sql.contains(r#"e."when" >= $1 AND e."when" < $2"#));
        assert_eq!(query.binds.len(), 2);
    }

    #[test]
    fn all_window_adds_no_predicate() {
        let query = EventQuery::base().in_window_at(WhenFilter::All, today());
        assert!(query.conditions.is_empty());
        assert!(query.binds.is_empty());
    }

    #[test]
    fn predicates_compose_with_sequential_placeholders() {
        let query = EventQuery::base()
            .organized_by(3)
            .in_window_at(WhenFilter::ThisWeek, today());
        let sql = query.select_sql(true);
        assert!(sql.contains("e.organizer_id = $1"));
        assert!(sql.contains(r#"e."when" >= $2 AND e."when" < $3"#));
        assert!(sql.contains("LIMIT $4 OFFSET $5"));
    }

    #[test]
    fn count_sql_ignores_aggregation_and_pagination() {
        let query = EventQuery::base().with_attendee_counts().organized_by(3);
        let sql = query.count_sql();
        assert_eq!(
            sql,
            "SELECT COUNT(*) FROM events e WHERE e.organizer_id = $1"
        );
    }
}
