//! Time abstraction for the gate: observation plus suspension behind one trait.
//!
//! Every gate operation observes time and sleeps exclusively through [`Clock`],
//! which keeps the library runtime-agnostic and makes every suspension point
//! deterministic under [`ManualClock`]. The millisecond helpers here are the
//! single codec between instants and the integer stamps persisted by stores.

pub mod manual;
#[cfg(feature = "tokio")] pub mod system;

pub use manual::ManualClock;
#[cfg(feature = "tokio")] pub use system::SystemClock;

// self
use crate::_prelude::*;

/// Boxed future returned by [`Clock::sleep`].
pub type ClockFuture<'a> = Pin<Box<dyn Future<Output = ()> + 'a + Send>>;

/// Source of time observations and suspensions used by every gate operation.
pub trait Clock
where
	Self: Send + Sync,
{
	/// Returns the current instant.
	fn now(&self) -> OffsetDateTime;

	/// Suspends the caller for the provided duration.
	///
	/// Non-positive durations must complete immediately.
	fn sleep(&self, duration: Duration) -> ClockFuture<'_>;
}

/// Converts an instant to whole milliseconds since the Unix epoch.
pub fn unix_ms(instant: OffsetDateTime) -> i64 {
	(instant.unix_timestamp_nanos() / 1_000_000) as i64
}

/// Converts whole milliseconds since the Unix epoch back to an instant.
///
/// Stamps outside the representable range collapse to the Unix epoch.
pub fn from_unix_ms(stamp: i64) -> OffsetDateTime {
	OffsetDateTime::from_unix_timestamp_nanos(i128::from(stamp) * 1_000_000)
		.unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

/// Converts a duration to whole milliseconds, saturating at the `i64` range.
pub fn duration_ms(duration: Duration) -> i64 {
	duration.whole_milliseconds().clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}
