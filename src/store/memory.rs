//! Thread-safe in-memory [`CounterStore`] for tests and single-process pacing.

// self
use crate::{
	_prelude::*,
	clock,
	store::{
		CompareAndSwapOutcome, CounterStore, CounterValue, StoreError, StoreFuture, StoreKey,
		StoredEntry,
	},
};

type StoreMap = Arc<RwLock<HashMap<StoreKey, StoredEntry>>>;

/// Thread-safe storage backend that keeps counters in-process.
///
/// Expired entries are invisible to reads and swept on every mutation.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	fn get_now(map: StoreMap, key: StoreKey) -> Option<CounterValue> {
		let now_ms = wall_now_ms();

		map.read().get(&key).and_then(|entry| entry.live(now_ms)).cloned()
	}

	fn set_now(
		map: StoreMap,
		key: StoreKey,
		value: CounterValue,
		ttl: Duration,
	) -> Result<(), StoreError> {
		let now = OffsetDateTime::now_utc();
		let mut guard = map.write();

		sweep_expired(&mut guard, clock::unix_ms(now));
		guard.insert(key, StoredEntry::new(value, ttl, now));

		Ok(())
	}

	fn delete_now(map: StoreMap, key: StoreKey) {
		let mut guard = map.write();

		sweep_expired(&mut guard, wall_now_ms());
		guard.remove(&key);
	}

	fn cas_now(
		map: StoreMap,
		key: StoreKey,
		expected: Option<&CounterValue>,
		replacement: CounterValue,
		ttl: Duration,
	) -> CompareAndSwapOutcome {
		let now = OffsetDateTime::now_utc();
		let now_ms = clock::unix_ms(now);
		let mut guard = map.write();

		sweep_expired(&mut guard, now_ms);

		let current = guard.get(&key).and_then(|entry| entry.live(now_ms));
		let outcome = match (current, expected) {
			(None, None) => CompareAndSwapOutcome::Updated,
			(None, Some(_)) => CompareAndSwapOutcome::Missing,
			(Some(cur), Some(exp)) if cur == exp => CompareAndSwapOutcome::Updated,
			_ => CompareAndSwapOutcome::Mismatch,
		};

		if matches!(outcome, CompareAndSwapOutcome::Updated) {
			guard.insert(key, StoredEntry::new(replacement, ttl, now));
		}

		outcome
	}
}
impl CounterStore for MemoryStore {
	fn get<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, Option<CounterValue>> {
		let map = self.0.clone();
		let key = key.to_owned();

		Box::pin(async move { Ok(Self::get_now(map, key)) })
	}

	fn set(&self, key: StoreKey, value: CounterValue, ttl: Duration) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::set_now(map, key, value, ttl) })
	}

	fn delete<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, ()> {
		let map = self.0.clone();
		let key = key.to_owned();

		Box::pin(async move {
			Self::delete_now(map, key);

			Ok(())
		})
	}

	fn compare_and_swap<'a>(
		&'a self,
		key: &'a StoreKey,
		expected: Option<&'a CounterValue>,
		replacement: CounterValue,
		ttl: Duration,
	) -> StoreFuture<'a, CompareAndSwapOutcome> {
		let map = self.0.clone();
		let key = key.to_owned();

		Box::pin(async move { Ok(Self::cas_now(map, key, expected, replacement, ttl)) })
	}
}

fn wall_now_ms() -> i64 {
	clock::unix_ms(OffsetDateTime::now_utc())
}

fn sweep_expired(entries: &mut HashMap<StoreKey, StoredEntry>, now_ms: i64) {
	entries.retain(|_, entry| entry.expires_at_ms > now_ms);
}
