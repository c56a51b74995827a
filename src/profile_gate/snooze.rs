// src/profile_gate/snooze.rs
//! "Skip for now" window evaluation

use chrono::{DateTime, Duration, Utc};

use super::models::UserProfile;

/// True while the user's skip window is still open; independent of login sessions
pub fn is_snoozed(user: &UserProfile, now: DateTime<Utc>) -> bool {
    user.preferences
        .profile_completion_skipped_until
        .map(|until| until > now)
        .unwrap_or(false)
}

/// End of a skip window that starts now
pub fn snooze_until(now: DateTime<Utc>, length: Duration) -> DateTime<Utc> {
    now + length
}
