pub mod auth;
pub mod connections;
pub mod error;
pub mod feed;
pub mod posts;
pub mod profile;
pub mod users;

pub use error::{ApiError, ApiResult};

use axum::http::HeaderMap;
use serde::Deserialize;
use uuid::Uuid;

use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

/// Offset/limit query parameters shared by the list endpoints
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl PaginationParams {
    /// Resolve to a non-negative (offset, limit) pair with the limit
    /// capped at MAX_PAGE_SIZE
    pub fn clamped(&self) -> (i64, i64) {
        let offset = self.skip.unwrap_or(0).max(0);
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        (offset, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pagination_defaults() {
        let params = PaginationParams {
            skip: None,
            limit: None,
        };
        assert_eq!(params.clamped(), (0, DEFAULT_PAGE_SIZE));
    }

    // Whatever the client sends, the resolved pair is safe to splice
    // into a LIMIT/OFFSET clause.
    proptest! {
        #[test]
        fn prop_clamped_pagination_is_always_in_range(
            skip in prop::option::of(any::<i64>()),
            limit in prop::option::of(any::<i64>())
        ) {
            let params = PaginationParams { skip, limit };
            let (offset, limit) = params.clamped();

            prop_assert!(offset >= 0);
            prop_assert!(limit >= 1);
            prop_assert!(limit <= MAX_PAGE_SIZE);
        }
    }
}

/// Extract user ID from session token header
pub(crate) fn get_user_from_headers(state: &AppState, headers: &HeaderMap) -> Result<Uuid, ApiError> {
    let token = headers
        .get("X-Session-Token")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing session token".to_string()))?;

    state
        .get_authenticated_user_id_from_token(token)
        .ok_or_else(|| ApiError::Unauthorized("Invalid session token".to_string()))
}

/// Extract optional user ID from session token header (for public endpoints)
pub(crate) fn get_optional_user_from_headers(state: &AppState, headers: &HeaderMap) -> Option<Uuid> {
    let token = headers.get("X-Session-Token")?.to_str().ok()?;
    state.get_authenticated_user_id_from_token(token)
}
