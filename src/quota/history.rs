//! Sliding-window call history tracked as epoch-millisecond stamps.

/// Ordered sequence of call instants, in whole milliseconds since the Unix epoch.
///
/// The series is kept ascending; expired entries are dropped lazily via
/// [`prune`](CallHistory::prune) rather than by any background task. A stamp is
/// considered inside the window while its age is at most the window length, so
/// capacity frees exactly one millisecond after the oldest stamp ages out.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallHistory(Vec<i64>);
impl CallHistory {
	/// Builds a history from raw stamps, restoring ascending order.
	///
	/// Stores may return series that were edited out of band; ordering is the
	/// only invariant repaired here, duplicates are legitimate (several calls
	/// can land on the same millisecond).
	pub fn from_stamps(mut stamps: Vec<i64>) -> Self {
		stamps.sort_unstable();

		Self(stamps)
	}

	/// Appends a call stamp, keeping the series ascending even when the stamp
	/// is older than the current tail (cross-host clock skew).
	pub fn record(&mut self, stamp: i64) {
		match self.0.last() {
			Some(&tail) if tail > stamp => {
				let position = self.0.partition_point(|&s| s <= stamp);

				self.0.insert(position, stamp);
			},
			_ => self.0.push(stamp),
		}
	}

	/// Drops every stamp whose age exceeds the window.
	///
	/// A stamp aged exactly `window_ms` still counts; it expires on the next
	/// millisecond.
	pub fn prune(&mut self, now_ms: i64, window_ms: i64) {
		self.0.retain(|stamp| now_ms - stamp <= window_ms);
	}

	/// Returns the number of live stamps.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when no stamps are recorded.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns `true` while the series holds fewer stamps than `limit`.
	pub fn has_room(&self, limit: u32) -> bool {
		self.0.len() < limit as usize
	}

	/// Oldest live stamp, the input to exact-wake computations.
	pub fn oldest(&self) -> Option<i64> {
		self.0.first().copied()
	}

	/// Most recent live stamp.
	pub fn newest(&self) -> Option<i64> {
		self.0.last().copied()
	}

	/// Read-only view of the stamps.
	pub fn stamps(&self) -> &[i64] {
		&self.0
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn from_stamps_restores_ordering() {
		let history = CallHistory::from_stamps(vec![3_000, 1_000, 2_000, 1_000]);

		assert_eq!(history.stamps(), &[1_000, 1_000, 2_000, 3_000]);
		assert_eq!(history.oldest(), Some(1_000));
		assert_eq!(history.newest(), Some(3_000));
	}

	#[test]
	fn record_keeps_series_ascending_under_skew() {
		let mut history = CallHistory::default();

		history.record(2_000);
		history.record(3_000);
		history.record(1_000);

		assert_eq!(history.stamps(), &[1_000, 2_000, 3_000]);
	}

	#[test]
	fn prune_is_window_exact() {
		let mut history = CallHistory::from_stamps(vec![0, 1_000, 2_000]);

		// At t = window the oldest stamp still counts.
		history.prune(5_000, 5_000);

		assert_eq!(history.len(), 3);

		// One millisecond later it ages out.
		history.prune(5_001, 5_000);

		assert_eq!(history.stamps(), &[1_000, 2_000]);
		assert_eq!(history.oldest(), Some(1_000));
	}

	#[test]
	fn prune_keeps_future_stamps() {
		let mut history = CallHistory::from_stamps(vec![9_000]);

		history.prune(1_000, 5_000);

		assert_eq!(history.len(), 1, "A future-dated stamp still occupies the window.");
	}

	#[test]
	fn room_tracks_limit_boundary() {
		let mut history = CallHistory::default();

		assert!(history.has_room(2));

		history.record(1);
		history.record(2);

		assert!(!history.has_room(2));
		assert!(history.has_room(3));
	}
}
