// self
use crate::{
	obs::{GateOp, OpOutcome},
	quota::GateId,
};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_op_outcome(op: GateOp, outcome: OpOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"quota_gate_op_total",
			"op" => op.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (op, outcome);
	}
}

/// Publishes the post-record window usage via the global metrics recorder.
pub fn record_window_used(gate: &GateId, used: u32) {
	#[cfg(feature = "metrics")]
	{
		metrics::gauge!("quota_gate_window_used", "gate" => gate.to_string())
			.set(f64::from(used));
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (gate, used);
	}
}
