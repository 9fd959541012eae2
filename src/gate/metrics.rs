//! Always-on, process-local counters for gate activity.

// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counters tracking one gate's activity in-process.
///
/// The block is shared by every clone of a gate and is independent of the
/// optional `metrics` recorder integration, so tests and health endpoints can
/// read it without wiring a recorder.
#[derive(Debug, Default)]
pub struct GateMetrics {
	records: AtomicU64,
	rejections: AtomicU64,
	waits: AtomicU64,
	timeouts: AtomicU64,
}
impl GateMetrics {
	/// Number of calls successfully recorded into the window.
	pub fn records(&self) -> u64 {
		self.records.load(Ordering::Relaxed)
	}

	/// Number of strict-mode records refused because the window was full.
	pub fn rejections(&self) -> u64 {
		self.rejections.load(Ordering::Relaxed)
	}

	/// Number of sleeps initiated by spacing enforcement and bounded waits.
	pub fn waits(&self) -> u64 {
		self.waits.load(Ordering::Relaxed)
	}

	/// Number of bounded waits that elapsed without admission.
	pub fn timeouts(&self) -> u64 {
		self.timeouts.load(Ordering::Relaxed)
	}

	pub(crate) fn note_record(&self) {
		self.records.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn note_rejection(&self) {
		self.rejections.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn note_wait(&self) {
		self.waits.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn note_timeout(&self) {
		self.timeouts.fetch_add(1, Ordering::Relaxed);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn counters_accumulate_independently() {
		let metrics = GateMetrics::default();

		metrics.note_record();
		metrics.note_record();
		metrics.note_rejection();
		metrics.note_wait();
		metrics.note_wait();
		metrics.note_wait();
		metrics.note_timeout();

		assert_eq!(metrics.records(), 2);
		assert_eq!(metrics.rejections(), 1);
		assert_eq!(metrics.waits(), 3);
		assert_eq!(metrics.timeouts(), 1);
	}
}
