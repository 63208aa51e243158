//! Session expiry.

use chrono::{DateTime, Duration, Utc};

use crate::models::Session;

/// The instant after which `session` is swept.
///
/// `None` when the instant lies beyond the representable range; such a
/// session never expires.
pub fn expires_at(session: &Session, grace: Duration) -> Option<DateTime<Utc>> {
    session.scheduled_start.checked_add_signed(grace)
}

/// A session expires once `now` reaches its start plus the grace window.
pub fn is_expired(session: &Session, grace: Duration, now: DateTime<Utc>) -> bool {
    expires_at(session, grace).is_some_and(|at| at <= now)
}

/// Ids of every expired session in `sessions`.
pub fn expired_ids(sessions: &[Session], grace: Duration, now: DateTime<Utc>) -> Vec<String> {
    sessions
        .iter()
        .filter(|session| is_expired(session, grace, now))
        .map(|session| session.id.clone())
        .collect()
}
