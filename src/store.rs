//! Storage contracts and built-in backends for gate counter state.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, clock, quota::GateId};

/// Boxed future returned by [`CounterStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract shared by every caller of one logical quota.
///
/// Values carry a per-key TTL refreshed on every write; an expired entry must
/// behave exactly like an absent one. The TTL is a janitorial backstop, never
/// a correctness input: window math always happens gate-side against the
/// stamps themselves.
pub trait CounterStore
where
	Self: Send + Sync,
{
	/// Fetches the live value stored under the key, if present.
	fn get<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, Option<CounterValue>>;

	/// Stores or replaces a value, refreshing its TTL.
	///
	/// A non-positive TTL expires the entry immediately.
	fn set(&self, key: StoreKey, value: CounterValue, ttl: Duration) -> StoreFuture<'_, ()>;

	/// Removes the value stored under the key; absent keys are not an error.
	fn delete<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, ()>;

	/// Atomically replaces the stored value if it matches the expectation.
	///
	/// `expected = None` asserts the key is absent, so the first writer of a
	/// fresh key still goes through the same conflict detection.
	fn compare_and_swap<'a>(
		&'a self,
		key: &'a StoreKey,
		expected: Option<&'a CounterValue>,
		replacement: CounterValue,
		ttl: Duration,
	) -> StoreFuture<'a, CompareAndSwapOutcome>;
}

/// Result of a counter compare-and-swap attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareAndSwapOutcome {
	/// The stored value matched the expectation and the replacement was written.
	Updated,
	/// A live value exists but does not match the expectation.
	Mismatch,
	/// No live value exists while one was expected.
	Missing,
}

/// Error type produced by [`CounterStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Counter state persisted by a gate.
///
/// The shape is part of each key's contract; a gate reading an unexpected
/// shape treats the entry as absent rather than failing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CounterValue {
	/// Ordered epoch-millisecond call stamps forming a window series.
	Series(Vec<i64>),
	/// Single epoch-millisecond stamp (the last recorded call).
	Instant(i64),
}
impl CounterValue {
	/// Returns the stamp series when the value carries one.
	pub fn as_series(&self) -> Option<&[i64]> {
		match self {
			Self::Series(stamps) => Some(stamps),
			Self::Instant(_) => None,
		}
	}

	/// Returns the single stamp when the value carries one.
	pub fn as_instant(&self) -> Option<i64> {
		match self {
			Self::Series(_) => None,
			Self::Instant(stamp) => Some(*stamp),
		}
	}
}

/// Well-known per-gate slots addressed through [`StoreKey`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeySlot {
	/// The sliding-window stamp series.
	Window,
	/// The last recorded call instant used for spacing.
	LastCall,
}
impl KeySlot {
	/// Returns the stable key suffix for the slot.
	pub const fn as_str(self) -> &'static str {
		match self {
			KeySlot::Window => "window",
			KeySlot::LastCall => "last_call",
		}
	}
}

/// Unique key identifying one slot of one gate's counter state.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreKey {
	/// Gate whose state the key addresses.
	pub gate: GateId,
	/// Slot within the gate's namespace.
	pub slot: KeySlot,
}
impl StoreKey {
	/// Builds a key for the provided gate and slot.
	pub fn new(gate: &GateId, slot: KeySlot) -> Self {
		Self { gate: gate.clone(), slot }
	}

	/// Key addressing the gate's window series.
	pub fn window(gate: &GateId) -> Self {
		Self::new(gate, KeySlot::Window)
	}

	/// Key addressing the gate's last-call stamp.
	pub fn last_call(gate: &GateId) -> Self {
		Self::new(gate, KeySlot::LastCall)
	}
}
impl Display for StoreKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}/{}", self.gate, self.slot.as_str())
	}
}

/// Stored value plus the absolute instant it expires, in epoch milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct StoredEntry {
	pub value: CounterValue,
	pub expires_at_ms: i64,
}
impl StoredEntry {
	pub fn new(value: CounterValue, ttl: Duration, now: OffsetDateTime) -> Self {
		let expires_at_ms = clock::unix_ms(now).saturating_add(clock::duration_ms(ttl));

		Self { value, expires_at_ms }
	}

	pub fn live(&self, now_ms: i64) -> Option<&CounterValue> {
		(self.expires_at_ms > now_ms).then_some(&self.value)
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;
	use crate::error::Error;

	#[test]
	fn store_error_converts_into_gate_error_with_source() {
		let store_error = StoreError::Backend { message: "database unreachable".into() };
		let gate_error: Error = store_error.clone().into();

		assert!(matches!(gate_error, Error::Storage(_)));
		assert!(gate_error.to_string().contains("database unreachable"));

		let source = StdError::source(&gate_error)
			.expect("Gate error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn store_keys_render_the_documented_layout() {
		let gate = GateId::new("api-main").expect("Gate fixture should be valid.");

		assert_eq!(StoreKey::window(&gate).to_string(), "api-main/window");
		assert_eq!(StoreKey::last_call(&gate).to_string(), "api-main/last_call");
		assert_eq!(StoreKey::window(&gate), StoreKey::new(&gate, KeySlot::Window));
	}

	#[test]
	fn counter_value_shape_accessors() {
		let series = CounterValue::Series(vec![1, 2, 3]);
		let instant = CounterValue::Instant(42);

		assert_eq!(series.as_series(), Some(&[1_i64, 2, 3][..]));
		assert_eq!(series.as_instant(), None);
		assert_eq!(instant.as_instant(), Some(42));
		assert_eq!(instant.as_series(), None);
	}

	#[test]
	fn compare_and_swap_outcome_can_be_serialized() {
		let payload = serde_json::to_string(&CompareAndSwapOutcome::Updated)
			.expect("CompareAndSwapOutcome should serialize to JSON.");

		assert_eq!(payload, "\"Updated\"");

		let round_trip: CompareAndSwapOutcome = serde_json::from_str(&payload)
			.expect("Serialized outcome should deserialize from JSON.");

		assert_eq!(round_trip, CompareAndSwapOutcome::Updated);
	}

	#[test]
	fn stored_entries_expire_at_their_stamp() {
		let now = OffsetDateTime::UNIX_EPOCH;
		let entry = StoredEntry::new(CounterValue::Instant(7), Duration::seconds(1), now);

		assert_eq!(entry.live(999), Some(&CounterValue::Instant(7)));
		assert_eq!(entry.live(1_000), None, "An entry is dead exactly at its expiry stamp.");

		let expired = StoredEntry::new(CounterValue::Instant(7), Duration::ZERO, now);

		assert_eq!(expired.live(0), None, "A non-positive TTL expires immediately.");
	}
}
