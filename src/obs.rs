//! Optional observability helpers for gate operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `quota_gate.op` with the `op` and `stage`
//!   (call site) fields, plus warnings for fail-open reads and near-limit windows.
//! - Enable `metrics` to increment the `quota_gate_op_total` counter for every
//!   attempt/grant/denial/failure, labeled by `op` + `outcome`, and to update the
//!   `quota_gate_window_used` gauge after each recorded call, labeled by `gate`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Gate operations observed by the crate.
///
/// Pure reads (`admissible`, `status`, `oldest_call`) are deliberately not
/// represented; they may run at monitoring frequency without producing noise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GateOp {
	/// Recording a performed call into the window.
	Record,
	/// Enforcing the minimum inter-call spacing.
	Spacing,
	/// Waiting for window capacity.
	Await,
	/// Clearing all persisted gate state.
	Reset,
}
impl GateOp {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			GateOp::Record => "record",
			GateOp::Spacing => "spacing",
			GateOp::Await => "await",
			GateOp::Reset => "reset",
		}
	}
}
impl Display for GateOp {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to a gate operation.
	Attempt,
	/// The operation completed and the caller may proceed.
	Granted,
	/// The operation completed by refusing the caller (full window, timeout).
	Denied,
	/// Failure propagated back to the caller.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Granted => "granted",
			OpOutcome::Denied => "denied",
			OpOutcome::Failure => "failure",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
