//! Cooperative cancellation for admission waits.

// std
use std::sync::atomic::{AtomicBool, Ordering};
// self
use crate::_prelude::*;

/// Cancellation source polled between sleeps of a bounded admission wait.
///
/// The wait loop never parks on the signal itself; it checks [`Self::is_cancelled`]
/// each time it wakes, so a flipped signal takes effect at the next wake point
/// rather than instantly.
pub trait CancelSignal
where
	Self: Send + Sync,
{
	/// Whether the caller has asked the wait to stop.
	fn is_cancelled(&self) -> bool;
}

/// Shared boolean cancellation flag.
///
/// Clones observe the same underlying flag, so one copy can live with the
/// shutdown handler while another is lent to the wait.
#[derive(Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);
impl CancelFlag {
	/// Creates a flag in the not-cancelled state.
	pub fn new() -> Self {
		Default::default()
	}

	/// Flips the flag; every clone observes the cancellation.
	pub fn cancel(&self) {
		self.0.store(true, Ordering::Release);
	}
}
impl CancelSignal for CancelFlag {
	fn is_cancelled(&self) -> bool {
		self.0.load(Ordering::Acquire)
	}
}
impl Debug for CancelFlag {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("CancelFlag").field(&self.is_cancelled()).finish()
	}
}

/// Signal that never fires; the uncancellable wait.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverCancelled;
impl CancelSignal for NeverCancelled {
	fn is_cancelled(&self) -> bool {
		false
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn cancel_flag_is_shared_across_clones() {
		let flag = CancelFlag::new();
		let observer = flag.clone();

		assert!(!observer.is_cancelled());

		flag.cancel();

		assert!(observer.is_cancelled());
		assert!(flag.is_cancelled());
	}

	#[test]
	fn never_cancelled_stays_quiet() {
		assert!(!NeverCancelled.is_cancelled());
	}
}
