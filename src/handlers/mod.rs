use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::pagination::PaginateOptions;
use crate::query::WhenFilter;
use crate::utils::error::AppError;
use crate::utils::response::success;

pub mod attendance;
pub mod events;
pub mod extract;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

#[derive(Debug, Deserialize)]
pub struct ListEventsQuery {
    pub when: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

impl ListEventsQuery {
    pub fn when_filter(&self) -> Result<WhenFilter, AppError> {
        match &self.when {
            None => Ok(WhenFilter::All),
            Some(keyword) => keyword.parse(),
        }
    }

    // Page and limit are not clamped; out-of-range values stop here.
    pub fn paginate_options(&self) -> Result<PaginateOptions, AppError> {
        if self.page < 1 {
            return Err(AppError::ValidationError(
                "page must be 1 or greater".to_string(),
            ));
        }
        if self.limit < 1 {
            return Err(AppError::ValidationError(
                "limit must be 1 or greater".to_string(),
            ));
        }
        Ok(PaginateOptions {
            limit: self.limit,
            current_page: self.page,
            total: true,
        })
    }
}

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "gathera-api",
    };

    success(payload, "Health check successful").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(when: Option<&str>, page: i64, limit: i64) -> ListEventsQuery {
        ListEventsQuery {
            when: when.map(String::from),
            page,
            limit,
        }
    }

    #[test]
    fn missing_when_means_all_events() {
        assert_eq!(query(None, 1, 10).when_filter().unwrap(), WhenFilter::All);
    }

    #[test]
    fn unknown_when_keyword_is_a_validation_error() {
        let err = query(Some("someday"), 1, 10).when_filter().unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn page_and_limit_below_one_are_rejected() {
        assert!(query(None, 0, 10).paginate_options().is_err());
        assert!(query(None, -1, 10).paginate_options().is_err());
        assert!(query(None, 1, 0).paginate_options().is_err());
        let options = query(None, 2, 25).paginate_options().unwrap();
        assert_eq!(options.current_page, 2);
        assert_eq!(options.limit, 25);
        assert!(options.total);
    }
}
