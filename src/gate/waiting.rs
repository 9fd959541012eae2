//! Bounded waits for window capacity.

// self
use crate::{
	_prelude::*,
	clock::{self, Clock},
	ext::{CancelSignal, NeverCancelled},
	gate::AdmissionGate,
	obs::{self, GateOp, OpOutcome, OpSpan},
	quota::CallHistory,
};

/// How a bounded admission wait ended.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum WaitVerdict {
	/// The window gained room within the budget.
	Admitted,
	/// The budget elapsed with the window still full.
	TimedOut,
	/// The caller's cancel signal fired at a wake point.
	Cancelled,
}

impl<K> AdmissionGate<K>
where
	K: ?Sized + Clock,
{
	/// Waits until the window has room, up to `max_wait`.
	///
	/// Returns `true` once admissible; the pending call is *not* recorded.
	/// Wakes are scheduled for the exact instant the oldest stamp ages out;
	/// when that instant is unusable (stamp skew, or a shared store mutating
	/// underneath the wait) the loop falls back to the policy's floor sleep,
	/// clamped to the remaining budget.
	pub async fn await_admission(&self, max_wait: Duration) -> bool {
		self.await_admission_or_cancel(max_wait, &NeverCancelled).await == WaitVerdict::Admitted
	}

	/// Bounded wait that additionally stops at the caller's cancel signal.
	///
	/// The signal is polled at every wake point rather than awaited, so a
	/// cancellation takes effect at the next wake instead of instantly.
	pub async fn await_admission_or_cancel(
		&self,
		max_wait: Duration,
		cancel: &dyn CancelSignal,
	) -> WaitVerdict {
		const OP: GateOp = GateOp::Await;

		obs::record_op_outcome(OP, OpOutcome::Attempt);

		let span = OpSpan::new(OP, "await_admission");
		let verdict = span.instrument(self.wait_loop(max_wait, cancel)).await;
		let outcome = match verdict {
			WaitVerdict::Admitted => OpOutcome::Granted,
			WaitVerdict::TimedOut | WaitVerdict::Cancelled => OpOutcome::Denied,
		};

		obs::record_op_outcome(OP, outcome);

		verdict
	}

	async fn wait_loop(&self, max_wait: Duration, cancel: &dyn CancelSignal) -> WaitVerdict {
		let started = self.clock.now();
		let window_ms = clock::duration_ms(self.policy.window);

		loop {
			if cancel.is_cancelled() {
				return WaitVerdict::Cancelled;
			}

			let now = self.clock.now();
			let now_ms = clock::unix_ms(now);
			let mut history = self.load_history_or_empty("await").await;

			history.prune(now_ms, window_ms);

			if history.has_room(self.policy.limit) {
				return WaitVerdict::Admitted;
			}

			let remaining = max_wait.saturating_sub(now - started);

			if !remaining.is_positive() {
				self.metrics.note_timeout();

				return WaitVerdict::TimedOut;
			}

			let pause = match self.exact_wake(&history, now_ms) {
				Some(delta) if delta <= remaining => delta,
				_ => self.policy.floor_sleep.min(remaining),
			};

			self.metrics.note_wait();
			self.clock.sleep(pause).await;
		}
	}

	/// Time until the oldest stamp ages out, one millisecond past its window.
	fn exact_wake(&self, history: &CallHistory, now_ms: i64) -> Option<Duration> {
		let oldest = history.oldest()?;
		let window_ms = clock::duration_ms(self.policy.window);
		let wake_ms = oldest.saturating_add(window_ms).saturating_add(1);
		let delta = Duration::milliseconds(wake_ms.saturating_sub(now_ms));

		delta.is_positive().then_some(delta)
	}
}
