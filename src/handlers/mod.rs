pub mod auth;
pub mod categories;
pub mod customization;
pub mod items;

use crate::error::ApiError;
use crate::ordering::OrderingError;

/// Map a reorder engine failure onto the wire contract. The empty-list and
/// id-mismatch messages differ per endpoint (`categoryIds` vs `itemIds`), so
/// callers pass their own.
pub(crate) fn ordering_error_response(
    err: OrderingError,
    empty_message: &str,
    mismatch_message: &str,
) -> ApiError {
    match err {
        // Only item scopes can vanish; the category list always exists
        OrderingError::ScopeNotFound => ApiError::not_found("Category not found"),
        OrderingError::Empty => ApiError::bad_request(empty_message),
        OrderingError::WrongCount { .. } | OrderingError::UnknownId(_) => {
            ApiError::bad_request(mismatch_message)
        }
        OrderingError::Store(db_err) => db_err.into(),
    }
}
