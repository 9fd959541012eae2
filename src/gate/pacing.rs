//! Inter-call spacing enforcement and advisory delays.

// self
use crate::{
	_prelude::*,
	clock::{self, Clock},
	gate::AdmissionGate,
	obs::{self, GateOp, OpOutcome, OpSpan},
	quota::AdmissionStatus,
};

/// Advised delay while usage sits above nine tenths of the limit.
const HEAVY_LOAD_DELAY: Duration = Duration::milliseconds(2_000);
/// Advised delay while usage sits above three quarters of the limit.
const ELEVATED_LOAD_DELAY: Duration = Duration::milliseconds(1_500);

impl<K> AdmissionGate<K>
where
	K: ?Sized + Clock,
{
	/// Sleeps until the policy's minimum spacing since the previous recorded
	/// call has elapsed, returning the time actually slept.
	///
	/// A clock running behind the stored last-call stamp (cross-host skew)
	/// never produces more than one full `min_spacing` pause.
	pub async fn enforce_spacing(&self) -> Duration {
		const OP: GateOp = GateOp::Spacing;

		obs::record_op_outcome(OP, OpOutcome::Attempt);

		let span = OpSpan::new(OP, "enforce_spacing");
		let slept = span.instrument(self.spacing_inner()).await;

		obs::record_op_outcome(OP, OpOutcome::Granted);

		slept
	}

	/// Advisory delay before the next call, scaled by current window usage.
	///
	/// Purely informational; the caller decides whether to honor it. The
	/// policy's `min_spacing` is the answer while usage stays moderate.
	pub async fn recommended_delay(&self) -> Duration {
		let status = self.status().await;

		self.recommended_delay_for(&status)
	}

	/// Advisory delay for a usage snapshot the caller already holds.
	pub fn recommended_delay_for(&self, status: &AdmissionStatus) -> Duration {
		let (used, limit) = (u64::from(status.used), u64::from(status.limit));

		if used * 10 > limit * 9 {
			HEAVY_LOAD_DELAY
		} else if used * 4 > limit * 3 {
			ELEVATED_LOAD_DELAY
		} else {
			self.policy.min_spacing
		}
	}

	async fn spacing_inner(&self) -> Duration {
		let Some(last_ms) = self.load_last_call_or_none("spacing").await else {
			return Duration::ZERO;
		};
		let now_ms = clock::unix_ms(self.clock.now());
		let elapsed = Duration::milliseconds(now_ms.saturating_sub(last_ms));
		let pause = self.policy.min_spacing.saturating_sub(elapsed).min(self.policy.min_spacing);

		if !pause.is_positive() {
			return Duration::ZERO;
		}

		self.metrics.note_wait();
		self.clock.sleep(pause).await;

		pause
	}
}
