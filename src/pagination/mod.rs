//! Offset pagination over ordered queries.

use serde::Serialize;
use sqlx::PgPool;

use crate::utils::error::AppError;

/// `current_page` is 1-based; values below 1 must be rejected before
/// reaching `paginate`. `total` costs a second round trip.
#[derive(Debug, Clone, Copy)]
pub struct PaginateOptions {
    pub limit: i64,
    pub current_page: i64,
    pub total: bool,
}

impl Default for PaginateOptions {
    fn default() -> Self {
        Self {
            limit: 10,
            current_page: 1,
            total: true,
        }
    }
}

/// One page of an ordered, filtered result set. `first` and `last` are
/// 1-based inclusive row positions within the full set; `first` comes
/// from the offset alone, so an empty page has `last < first`.
#[derive(Debug, Clone, Serialize)]
pub struct PaginationResult<T> {
    pub first: i64,
    pub last: i64,
    pub limit: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    pub data: Vec<T>,
}

impl<T> PaginationResult<T> {
    pub fn assemble(data: Vec<T>, options: &PaginateOptions, total: Option<i64>) -> Self {
        let offset = (options.current_page - 1) * options.limit;
        Self {
            first: offset + 1,
            last: offset + data.len() as i64,
            limit: options.limit,
            total,
            data,
        }
    }
}

/// A query that can serve pages.
pub trait PageSource {
    type Item;

    fn fetch_page(
        &self,
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> impl std::future::Future<Output = Result<Vec<Self::Item>, AppError>> + Send;

    fn count(
        &self,
        pool: &PgPool,
    ) -> impl std::future::Future<Output = Result<i64, AppError>> + Send;
}

// The data and total reads are independent; a row inserted between
// them may be reflected in one but not the other.
pub async fn paginate<S: PageSource>(
    pool: &PgPool,
    source: &S,
    options: &PaginateOptions,
) -> Result<PaginationResult<S::Item>, AppError> {
    let offset = (options.current_page - 1) * options.limit;
    let data = source.fetch_page(pool, options.limit, offset).await?;
    let total = if options.total {
        Some(source.count(pool).await?)
    } else {
        None
    };
    Ok(PaginationResult::assemble(data, options, total))
}
