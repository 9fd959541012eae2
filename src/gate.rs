//! Sliding-window admission gate, the crate's primary facade.
//!
//! An [`AdmissionGate`] guards one logical call quota: at most `limit` calls
//! inside a trailing window, with a minimum spacing between consecutive calls.
//! The gate holds no window state of its own; every decision replays the
//! stamp series persisted in its [`CounterStore`] against the policy at the
//! moment of the call, so any number of gates (and processes, given a shared
//! backend) can guard the same quota.

mod admission;
mod pacing;
mod waiting;

pub mod metrics;

pub use metrics::GateMetrics;
pub use waiting::WaitVerdict;

// self
use crate::{
	_prelude::*,
	clock::Clock,
	obs,
	quota::{CallHistory, GateId, GatePolicy},
	store::{CounterStore, CounterValue, StoreError, StoreKey},
};
#[cfg(feature = "tokio")] use crate::clock::SystemClock;

/// Gate driven by the Tokio-backed [`SystemClock`].
#[cfg(feature = "tokio")]
pub type SystemGate = AdmissionGate<SystemClock>;

/// Admission gate enforcing a sliding-window call quota for one identifier.
///
/// Clones share the store handle, the metrics block, and the strict-mode
/// record guard; cloning is the intended way to hand one gate to several
/// tasks.
pub struct AdmissionGate<K>
where
	K: ?Sized + Clock,
{
	/// Storage backend holding the persisted counter state.
	pub store: Arc<dyn CounterStore>,
	/// Time source behind every observation and suspension.
	pub clock: Arc<K>,
	/// Identifier namespacing this gate's keys in the store.
	pub id: GateId,
	/// Validated policy governing the window.
	pub policy: GatePolicy,
	/// Always-on operation counters, shared across clones.
	pub metrics: Arc<GateMetrics>,
	record_guard: Arc<AsyncMutex<()>>,
}
impl<K> AdmissionGate<K>
where
	K: ?Sized + Clock,
{
	/// Creates a gate over the provided store and clock.
	pub fn with_clock<S>(
		store: S,
		clock: impl Into<Arc<K>>,
		id: GateId,
		policy: GatePolicy,
	) -> Self
	where
		S: CounterStore + 'static,
	{
		Self {
			store: Arc::new(store),
			clock: clock.into(),
			id,
			policy,
			metrics: Arc::new(GateMetrics::default()),
			record_guard: Arc::new(AsyncMutex::new(())),
		}
	}

	pub(crate) fn window_key(&self) -> StoreKey {
		StoreKey::window(&self.id)
	}

	pub(crate) fn last_call_key(&self) -> StoreKey {
		StoreKey::last_call(&self.id)
	}

	/// Reads the stamp series, propagating store failures to the caller.
	pub(crate) async fn load_history(&self) -> Result<CallHistory, StoreError> {
		let key = self.window_key();
		let value = self.store.get(&key).await?;

		Ok(history_from(value))
	}

	/// Reads the stamp series, treating a failed read as an empty window.
	pub(crate) async fn load_history_or_empty(&self, stage: &'static str) -> CallHistory {
		match self.load_history().await {
			Ok(history) => history,
			Err(error) => {
				obs::warn_fail_open(stage, &error);

				CallHistory::default()
			},
		}
	}

	/// Reads the last-call stamp, treating a failed read as no prior call.
	pub(crate) async fn load_last_call_or_none(&self, stage: &'static str) -> Option<i64> {
		let key = self.last_call_key();

		match self.store.get(&key).await {
			Ok(value) => value.as_ref().and_then(CounterValue::as_instant),
			Err(error) => {
				obs::warn_fail_open(stage, &error);

				None
			},
		}
	}

	/// Persists the stamp series, refreshing its TTL.
	pub(crate) async fn persist_history(&self, history: &CallHistory) -> Result<(), StoreError> {
		self.store
			.set(
				self.window_key(),
				CounterValue::Series(history.stamps().to_vec()),
				self.policy.store_ttl(),
			)
			.await
	}

	/// Persists the last-call stamp, refreshing its TTL.
	pub(crate) async fn persist_last_call(&self, stamp: i64) -> Result<(), StoreError> {
		self.store
			.set(self.last_call_key(), CounterValue::Instant(stamp), self.policy.store_ttl())
			.await
	}
}
#[cfg(feature = "tokio")]
impl SystemGate {
	/// Creates a gate over the provided store, observing real time.
	pub fn new<S>(store: S, id: GateId, policy: GatePolicy) -> Self
	where
		S: CounterStore + 'static,
	{
		Self::with_clock(store, SystemClock, id, policy)
	}
}
impl<K> Clone for AdmissionGate<K>
where
	K: ?Sized + Clock,
{
	fn clone(&self) -> Self {
		Self {
			store: self.store.clone(),
			clock: self.clock.clone(),
			id: self.id.clone(),
			policy: self.policy.clone(),
			metrics: self.metrics.clone(),
			record_guard: self.record_guard.clone(),
		}
	}
}
impl<K> Debug for AdmissionGate<K>
where
	K: ?Sized + Clock,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AdmissionGate")
			.field("id", &self.id)
			.field("policy", &self.policy)
			.finish()
	}
}

/// Decodes a stored value into a history; absent or mismatched shapes start fresh.
pub(crate) fn history_from(value: Option<CounterValue>) -> CallHistory {
	match value {
		Some(CounterValue::Series(stamps)) => CallHistory::from_stamps(stamps),
		_ => CallHistory::default(),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet::{ManualGate, build_manual_gate, default_test_policy};

	fn gate() -> ManualGate {
		build_manual_gate("gate-facade", default_test_policy())
	}

	#[test]
	fn clones_share_metrics_and_record_guard() {
		let gate = gate();
		let clone = gate.clone();

		assert!(Arc::ptr_eq(&gate.metrics, &clone.metrics));
		assert!(Arc::ptr_eq(&gate.record_guard, &clone.record_guard));
		assert_eq!(gate.id, clone.id);
		assert_eq!(gate.policy, clone.policy);
	}

	#[test]
	fn debug_reports_identifier_and_policy() {
		let rendered = format!("{:?}", gate());

		assert!(rendered.contains("gate-facade"));
		assert!(rendered.contains("limit: 3"));
	}

	#[test]
	fn history_from_ignores_mismatched_shapes() {
		assert!(history_from(None).is_empty());
		assert!(history_from(Some(CounterValue::Instant(7))).is_empty());
		assert_eq!(
			history_from(Some(CounterValue::Series(vec![2, 1]))).stamps(),
			&[1, 2],
			"A decoded series should come back ordered.",
		);
	}
}
