//! Typed path parameter helpers.

use std::str::FromStr;

use projectfs_core::error::{AppError, ErrorKind};
use projectfs_core::types::{ClientId, InvalidId, ProjectId, RecycleItemId};

fn parse_id<T: FromStr<Err = InvalidId>>(raw: &str) -> Result<T, AppError> {
    raw.parse::<T>()
        .map_err(|e| AppError::with_source(ErrorKind::Validation, e.to_string(), e))
}

/// Parses a project id from a path segment.
pub fn project_id(raw: &str) -> Result<ProjectId, AppError> {
    parse_id(raw)
}

/// Parses a client id from a path segment.
pub fn client_id(raw: &str) -> Result<ClientId, AppError> {
    parse_id(raw)
}

/// Parses a recycle bin item id from a path segment.
pub fn item_id(raw: &str) -> Result<RecycleItemId, AppError> {
    parse_id(raw)
}
