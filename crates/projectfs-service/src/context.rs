//! Request context carrying the acting user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User id recorded when the upstream auth layer supplied none.
pub const ANONYMOUS: &str = "anonymous";

/// Context for the current request.
///
/// Authentication happens upstream; this only records who is acting so
/// recycle bin audit entries can name them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting user's identifier.
    pub user_id: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context for `user_id`.
    pub fn new(user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        Self {
            user_id: if user_id.trim().is_empty() {
                ANONYMOUS.to_string()
            } else {
                user_id
            },
            request_time: Utc::now(),
        }
    }

    /// A context for unauthenticated callers.
    pub fn anonymous() -> Self {
        Self::new(ANONYMOUS)
    }
}
