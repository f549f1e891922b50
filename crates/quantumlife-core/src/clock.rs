//! Injected clock.
//!
//! Every component that needs "now" takes a `&dyn Clock` instead of calling
//! `OffsetDateTime::now_utc()` directly. Reading wall-clock time from inside
//! a pipeline stage is a bug: determinism across repeated runs (the Hash
//! Determinism invariant) depends on the clock being supplied, not sampled.

use time::macros::format_description;
use time::OffsetDateTime;

/// A source of the current instant, injected into every pipeline stage.
pub trait Clock: Send + Sync {
    /// The current instant, UTC.
    fn now(&self) -> OffsetDateTime;

    /// The UTC day of `now()`, formatted `YYYY-MM-DD`.
    fn period_key(&self) -> String {
        period_key_of(self.now())
    }

    /// The 15-minute UTC bucket containing `now()`, formatted
    /// `YYYY-MM-DDTHH:MM` with minutes floored to {00,15,30,45}.
    fn time_bucket(&self) -> String {
        time_bucket_of(self.now())
    }
}

/// Format an instant's UTC day as `YYYY-MM-DD`.
pub fn period_key_of(at: OffsetDateTime) -> String {
    let at = at.to_offset(time::UtcOffset::UTC);
    let fmt = format_description!("[year]-[month]-[day]");
    at.format(&fmt).expect("fixed format never fails")
}

/// Format an instant's 15-minute UTC bucket as `YYYY-MM-DDTHH:MM`.
pub fn time_bucket_of(at: OffsetDateTime) -> String {
    let at = at.to_offset(time::UtcOffset::UTC);
    let floored_minute = (at.minute() / 15) * 15;
    let fmt = format_description!("[year]-[month]-[day]T[hour]:[minute]");
    let floored = at
        .replace_minute(floored_minute)
        .expect("floored minute is always valid")
        .replace_second(0)
        .expect("zero seconds is always valid");
    floored.format(&fmt).expect("fixed format never fails")
}

/// Real wall-clock implementation. Used only by the outer host, never by a
/// pipeline stage's own tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// A clock pinned to a fixed instant, for deterministic tests and for
/// reproducing a specific evaluation.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl FixedClock {
    /// Build a fixed clock from a Unix timestamp in seconds.
    pub fn from_unix(seconds: i64) -> Self {
        Self(OffsetDateTime::from_unix_timestamp(seconds).expect("valid unix timestamp"))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}
