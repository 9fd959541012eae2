//! Virtual clock for deterministic tests and simulations.

// self
use crate::{
	_prelude::*,
	clock::{Clock, ClockFuture},
};

/// Shared virtual clock whose sleeps advance time instead of suspending.
///
/// Clones share one instant, so a gate and the test driving it observe the
/// same timeline. Every sleep is journaled, letting tests assert the exact
/// suspension pattern an operation produced.
#[derive(Clone, Debug)]
pub struct ManualClock(Arc<ManualClockInner>);

#[derive(Debug)]
struct ManualClockInner {
	now: Mutex<OffsetDateTime>,
	journal: Mutex<Vec<Duration>>,
}

impl ManualClock {
	/// Creates a clock positioned at the provided instant.
	pub fn starting_at(instant: OffsetDateTime) -> Self {
		Self(Arc::new(ManualClockInner {
			now: Mutex::new(instant),
			journal: Mutex::new(Vec::new()),
		}))
	}

	/// Repositions the clock to an absolute instant.
	pub fn set(&self, instant: OffsetDateTime) {
		*self.0.now.lock() = instant;
	}

	/// Moves the clock forward (or backward, with a negative delta).
	pub fn advance(&self, delta: Duration) {
		let mut now = self.0.now.lock();
		let current = *now;

		*now = current.checked_add(delta).unwrap_or(current);
	}

	/// Returns every sleep performed so far, in request order.
	///
	/// Negative requests are journaled as zero, matching the time actually
	/// advanced.
	pub fn recorded_sleeps(&self) -> Vec<Duration> {
		self.0.journal.lock().clone()
	}

	/// Total virtual time spent sleeping.
	pub fn total_slept(&self) -> Duration {
		self.0.journal.lock().iter().copied().sum()
	}
}
impl Default for ManualClock {
	fn default() -> Self {
		Self::starting_at(OffsetDateTime::UNIX_EPOCH)
	}
}
impl Clock for ManualClock {
	fn now(&self) -> OffsetDateTime {
		*self.0.now.lock()
	}

	fn sleep(&self, duration: Duration) -> ClockFuture<'_> {
		let slept = duration.max(Duration::ZERO);

		{
			let mut now = self.0.now.lock();
			let current = *now;

			*now = current.checked_add(slept).unwrap_or(current);
		}

		self.0.journal.lock().push(slept);

		Box::pin(async {})
	}
}
