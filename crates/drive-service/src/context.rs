//! Request context carrying the resolved caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context for the current caller.
///
/// Produced by [`crate::IdentityService::context_for`] from an already
/// authenticated external identity and passed into every service method so
/// that each operation knows *who* is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The caller's internal user ID.
    pub user_id: Uuid,
    /// The external identity the caller authenticated as.
    pub external_identity_id: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context stamped with the current time.
    pub fn new(user_id: Uuid, external_identity_id: impl Into<String>) -> Self {
        Self {
            user_id,
            external_identity_id: external_identity_id.into(),
            request_time: Utc::now(),
        }
    }
}
