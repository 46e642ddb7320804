use chrono::{DateTime, SubsecRound, Utc};

/// Drop the sub-second part of a timestamp.
///
/// Commit times are stored with second precision; timestamps that are handed
/// back to callers before and after a commit must agree.
pub fn truncate_to_second(when: DateTime<Utc>) -> DateTime<Utc> {
    when.trunc_subsecs(0)
}

/// The current wall-clock time, truncated to the second.
pub fn now_truncated() -> DateTime<Utc> {
    truncate_to_second(Utc::now())
}
