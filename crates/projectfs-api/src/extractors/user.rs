//! `ActingUser` extractor: the user id set by the upstream auth layer.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use projectfs_service::RequestContext;

/// Header carrying the authenticated user's id.
pub const USER_HEADER: &str = "x-user-id";

/// The acting user for audit entries. Falls back to `anonymous`.
#[derive(Debug, Clone)]
pub struct ActingUser(pub RequestContext);

impl ActingUser {
    /// The acting user's id.
    pub fn id(&self) -> &str {
        &self.0.user_id
    }
}

impl std::ops::Deref for ActingUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(RequestContext::new)
            .unwrap_or_else(RequestContext::anonymous);
        Ok(ActingUser(ctx))
    }
}
