//! Advisory pacing layered on top of an admission gate.
//!
//! The pacer never blocks a call outright; it inspects window usage and tells
//! the caller how long to hold back so the window drains before it fills.
//! Services that prefer hard rejection use the gate directly instead.

// self
use crate::{_prelude::*, clock::Clock, gate::AdmissionGate};

/// What the pacer advises for the next outbound call.
#[derive(Clone, Debug, PartialEq)]
pub enum PacerDecision {
	/// Usage is comfortably inside the window; call away.
	Proceed,
	/// Usage is high; hold back as directed before calling.
	Pause(PauseDirective),
}

/// Advice on how long to hold back and why.
#[derive(Clone, Debug, PartialEq)]
pub struct PauseDirective {
	/// Earliest instant the window is expected to have room again.
	///
	/// Only known when the window is full; a near-limit pause carries just the
	/// backoff.
	pub resume_at: Option<OffsetDateTime>,
	/// How long the pacer advises sleeping before the next call.
	pub backoff: Duration,
	/// Human-readable cause, suitable for logs.
	pub reason: Option<String>,
}
impl PauseDirective {
	/// Directive with the given backoff and nothing else known.
	pub fn new(backoff: Duration) -> Self {
		Self { resume_at: None, backoff, reason: None }
	}

	/// Attach the instant the window is expected to reopen.
	pub fn resume_at(mut self, at: OffsetDateTime) -> Self {
		self.resume_at = Some(at);

		self
	}

	/// Attach a human-readable cause.
	pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
		self.reason = Some(reason.into());

		self
	}
}

/// Self-throttling advisor over an [`AdmissionGate`].
pub struct AdvisoryPacer<K>
where
	K: ?Sized + Clock,
{
	/// Gate whose window state drives the advice.
	pub gate: AdmissionGate<K>,
}
impl<K> AdvisoryPacer<K>
where
	K: ?Sized + Clock,
{
	/// Wraps a gate.
	pub fn new(gate: AdmissionGate<K>) -> Self {
		Self { gate }
	}

	/// Inspects window usage and decides whether the next call should pause.
	///
	/// Pure read; nothing is recorded and nothing sleeps.
	pub async fn plan(&self) -> PacerDecision {
		let status = self.gate.status().await;

		if !status.should_warn() {
			return PacerDecision::Proceed;
		}

		let mut directive = PauseDirective::new(self.gate.recommended_delay_for(&status));

		directive = if status.at_limit {
			directive.with_reason("The call window is full.")
		} else {
			directive.with_reason("Usage crossed the near-limit threshold.")
		};

		if let Some(at) = status.reset_at.filter(|_| status.at_limit) {
			directive = directive.resume_at(at);
		}

		PacerDecision::Pause(directive)
	}

	/// Enforces spacing, then serves any advised pause, before one outbound call.
	///
	/// Returns the total time spent sleeping.
	pub async fn pause_before_call(&self) -> Duration {
		let spacing = self.gate.enforce_spacing().await;

		match self.plan().await {
			PacerDecision::Proceed => spacing,
			PacerDecision::Pause(directive) => {
				self.gate.clock.sleep(directive.backoff).await;

				spacing.saturating_add(directive.backoff)
			},
		}
	}
}
impl<K> Clone for AdvisoryPacer<K>
where
	K: ?Sized + Clock,
{
	fn clone(&self) -> Self {
		Self { gate: self.gate.clone() }
	}
}
impl<K> Debug for AdvisoryPacer<K>
where
	K: ?Sized + Clock,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AdvisoryPacer").field("gate", &self.gate).finish()
	}
}
