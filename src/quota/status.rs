//! Derived, point-in-time view of a gate's window usage.

// self
use crate::{
	_prelude::*,
	clock,
	quota::{CallHistory, GatePolicy},
};

/// Snapshot of window usage computed on demand; never stored.
#[derive(Clone, Debug, PartialEq)]
pub struct AdmissionStatus {
	/// Number of calls inside the trailing window.
	pub used: u32,
	/// Maximum number of calls the window admits.
	pub limit: u32,
	/// Calls still admissible before the window fills.
	pub remaining: u32,
	/// Usage as a percentage of the limit.
	pub percent_used: f64,
	/// Instant the oldest stamp ages out of the window, when one exists.
	/// Capacity frees one millisecond after this instant.
	pub reset_at: Option<OffsetDateTime>,
	/// The window is completely full.
	pub at_limit: bool,
	/// Usage is strictly above the policy's near-limit threshold.
	pub near_limit: bool,
}
impl AdmissionStatus {
	/// Derives a snapshot from a pruned history and the governing policy.
	pub fn derive(history: &CallHistory, policy: &GatePolicy) -> Self {
		let used = u32::try_from(history.len()).unwrap_or(u32::MAX);
		let limit = policy.limit;
		let window_ms = clock::duration_ms(policy.window);
		let reset_at =
			history.oldest().map(|oldest| clock::from_unix_ms(oldest.saturating_add(window_ms)));
		let at_limit = used >= limit;
		let near_limit =
			u64::from(used) * 100 > u64::from(limit) * u64::from(policy.near_limit_percent);

		Self {
			used,
			limit,
			remaining: limit.saturating_sub(used),
			percent_used: f64::from(used) * 100. / f64::from(limit),
			reset_at,
			at_limit,
			near_limit,
		}
	}

	/// Returns `true` when usage warrants caller attention (near or at the limit).
	pub fn should_warn(&self) -> bool {
		self.near_limit || self.at_limit
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn policy(limit: u32) -> GatePolicy {
		GatePolicy::builder(limit, Duration::seconds(5))
			.build()
			.expect("Status test policy should build successfully.")
	}

	#[test]
	fn empty_history_yields_idle_snapshot() {
		let status = AdmissionStatus::derive(&CallHistory::default(), &policy(3));

		assert_eq!(status.used, 0);
		assert_eq!(status.remaining, 3);
		assert_eq!(status.percent_used, 0.);
		assert_eq!(status.reset_at, None);
		assert!(!status.at_limit);
		assert!(!status.near_limit);
		assert!(!status.should_warn());
	}

	#[test]
	fn full_window_reports_reset_instant() {
		let history = CallHistory::from_stamps(vec![1_000, 2_000, 3_000]);
		let status = AdmissionStatus::derive(&history, &policy(3));

		assert_eq!(status.used, 3);
		assert_eq!(status.remaining, 0);
		assert!(status.at_limit);
		assert!(status.should_warn());
		// Oldest stamp (t = 1 s) plus the 5 s window.
		assert_eq!(status.reset_at, Some(clock::from_unix_ms(6_000)));
	}

	#[test]
	fn near_limit_is_strictly_above_the_threshold() {
		let policy = policy(5);
		let four = CallHistory::from_stamps(vec![1, 2, 3, 4]);
		let at_eighty = AdmissionStatus::derive(&four, &policy);

		assert!(!at_eighty.near_limit, "Exactly 80% must not count as near-limit.");

		let five = CallHistory::from_stamps(vec![1, 2, 3, 4, 5]);
		let above = AdmissionStatus::derive(&five, &policy);

		assert!(above.near_limit);
		assert!(above.at_limit);
	}

	#[test]
	fn percent_used_is_exact() {
		let status = AdmissionStatus::derive(&CallHistory::from_stamps(vec![1, 2]), &policy(4));

		assert_eq!(status.percent_used, 50.);
		assert_eq!(status.remaining, 2);
	}
}
