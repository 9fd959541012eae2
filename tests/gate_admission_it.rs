// std
use std::{env, path::PathBuf, process};
// crates.io
use time::{Duration, OffsetDateTime};
// self
use quota_gate::{
	clock::ManualClock,
	error::Error,
	gate::AdmissionGate,
	quota::{AdmissionMode, GateId, GatePolicy},
	store::{
		CompareAndSwapOutcome, CounterStore, CounterValue, FileStore, MemoryStore, StoreError,
		StoreFuture, StoreKey,
	},
};

fn gate_id(label: &str) -> GateId {
	GateId::new(label).expect("Failed to build gate identifier for admission tests.")
}

fn policy(limit: u32, window: Duration, mode: AdmissionMode) -> GatePolicy {
	GatePolicy::builder(limit, window)
		.mode(mode)
		.build()
		.expect("Admission test policy should build successfully.")
}

fn manual_gate(label: &str, policy: GatePolicy) -> AdmissionGate<ManualClock> {
	AdmissionGate::with_clock(
		MemoryStore::default(),
		ManualClock::default(),
		gate_id(label),
		policy,
	)
}

fn temp_path(tag: &str) -> PathBuf {
	let unique = format!(
		"quota_gate_admission_it_{tag}_{}_{}.json",
		process::id(),
		OffsetDateTime::now_utc().unix_timestamp_nanos(),
	);

	env::temp_dir().join(unique)
}

/// Store whose every operation fails, as if the backend were unreachable.
struct FailingStore;
impl CounterStore for FailingStore {
	fn get<'a>(&'a self, _: &'a StoreKey) -> StoreFuture<'a, Option<CounterValue>> {
		Box::pin(async { Err(offline()) })
	}

	fn set(&self, _: StoreKey, _: CounterValue, _: Duration) -> StoreFuture<'_, ()> {
		Box::pin(async { Err(offline()) })
	}

	fn delete<'a>(&'a self, _: &'a StoreKey) -> StoreFuture<'a, ()> {
		Box::pin(async { Err(offline()) })
	}

	fn compare_and_swap<'a>(
		&'a self,
		_: &'a StoreKey,
		_: Option<&'a CounterValue>,
		_: CounterValue,
		_: Duration,
	) -> StoreFuture<'a, CompareAndSwapOutcome> {
		Box::pin(async { Err(offline()) })
	}
}

fn offline() -> StoreError {
	StoreError::Backend { message: "store offline".into() }
}

#[tokio::test]
async fn window_admits_again_once_the_oldest_call_ages_out() {
	let gate =
		manual_gate("scenario", policy(3, Duration::seconds(5), AdmissionMode::BestEffort));

	// Three calls land at t = 0 s, 1 s, and 2 s, filling the window.
	for _ in 0..3 {
		assert!(gate.admissible().await);

		gate.record_call().await.expect("Recording within the limit should succeed.");
		gate.clock.advance(Duration::seconds(1));
	}

	assert!(!gate.admissible().await);

	let status = gate.status().await;

	assert_eq!((status.used, status.remaining), (3, 0));
	assert!(status.at_limit);

	// At exactly t = 5 s the oldest stamp still counts.
	gate.clock.set(OffsetDateTime::UNIX_EPOCH + Duration::seconds(5));

	assert!(!gate.admissible().await);

	// One tenth of a second later it has aged out.
	gate.clock.advance(Duration::milliseconds(100));

	assert!(gate.admissible().await);

	gate.record_call().await.expect("Recording into the reopened window should succeed.");

	assert_eq!(gate.status().await.used, 3, "The expired stamp no longer counts.");
}

#[tokio::test]
async fn pure_reads_leave_the_stored_series_untouched() {
	let store = MemoryStore::default();
	let id = gate_id("read-only");
	let window_key = StoreKey::window(&id);
	let seeded = CounterValue::Series(vec![2_000, 7_000, 9_000]);

	store
		.set(window_key.clone(), seeded.clone(), Duration::hours(1))
		.await
		.expect("Seeding the window series should succeed.");

	// Clones share the underlying map, so `store` sees the gate's backend.
	let gate = AdmissionGate::with_clock(
		store.clone(),
		ManualClock::starting_at(OffsetDateTime::UNIX_EPOCH + Duration::seconds(10)),
		id.clone(),
		policy(3, Duration::seconds(5), AdmissionMode::BestEffort),
	);
	let oldest_live = OffsetDateTime::UNIX_EPOCH + Duration::seconds(7);

	// The stamp at t = 2 s is stale at t = 10 s; only the derived views drop it.
	for _ in 0..3 {
		assert!(gate.admissible().await);
		assert_eq!(gate.status().await.used, 2);
		assert_eq!(gate.oldest_call().await, Some(oldest_live));
	}

	let raw = store
		.get(&window_key)
		.await
		.expect("Reading the seeded key should succeed.")
		.expect("The seeded series should still be present.");

	assert_eq!(raw, seeded, "Reads must not compact or rewrite the stored series.");

	let last_call = store
		.get(&StoreKey::last_call(&id))
		.await
		.expect("Reading the last-call key should succeed.");

	assert_eq!(last_call, None, "Reads must not record a call.");
}

#[tokio::test]
async fn strict_mode_admits_a_single_winner_for_the_last_slot() {
	let gate =
		manual_gate("single-winner", policy(1, Duration::seconds(30), AdmissionMode::Strict));
	let rival = gate.clone();
	let (first, second) = tokio::join!(gate.record_call(), rival.record_call());
	let winners = usize::from(first.is_ok()) + usize::from(second.is_ok());

	assert_eq!(winners, 1, "Exactly one concurrent recorder may take the last slot.");

	let loser = if first.is_ok() { second } else { first };
	let denied = loser.expect_err("The losing recorder should be refused.");

	assert!(matches!(denied, Error::QuotaExhausted { retry_at: Some(_) }));
	assert_eq!(gate.metrics.records(), 1);
	assert_eq!(gate.metrics.rejections(), 1);
}

#[tokio::test]
async fn reads_fail_open_and_writes_surface() {
	let gate = AdmissionGate::with_clock(
		FailingStore,
		ManualClock::default(),
		gate_id("outage"),
		policy(3, Duration::seconds(5), AdmissionMode::BestEffort),
	);

	// Monitoring-path reads treat the unreachable store as an empty window.
	assert!(gate.admissible().await);
	assert_eq!(gate.status().await.used, 0);
	assert_eq!(gate.oldest_call().await, None);

	// Recording must not silently drop the stamp.
	let error = gate.record_call().await.expect_err("A failed write should surface.");

	assert!(matches!(error, Error::Storage(_)));
	assert_eq!(gate.metrics.records(), 0);

	let error = gate.reset().await.expect_err("A failed delete should surface.");

	assert!(matches!(error, Error::Storage(_)));
}

#[tokio::test]
async fn strict_mode_reads_fail_closed() {
	let gate = AdmissionGate::with_clock(
		FailingStore,
		ManualClock::default(),
		gate_id("strict-outage"),
		policy(3, Duration::seconds(5), AdmissionMode::Strict),
	);
	let error = gate.record_call().await.expect_err("Strict mode should refuse blind records.");

	assert!(
		matches!(error, Error::Storage(_)),
		"Strict recording surfaces the read failure instead of assuming an empty window.",
	);
}

#[tokio::test]
async fn window_usage_survives_a_process_restart() {
	let path = temp_path("restart");
	let id = gate_id("restart");
	let policy = policy(3, Duration::hours(1), AdmissionMode::BestEffort);

	{
		let store = FileStore::open(&path).expect("Opening a fresh file store should succeed.");
		let gate =
			AdmissionGate::with_clock(store, ManualClock::default(), id.clone(), policy.clone());

		gate.record_call().await.expect("Recording within the limit should succeed.");
		gate.record_call().await.expect("Recording within the limit should succeed.");
	}

	let store = FileStore::open(&path).expect("Reopening the file store should succeed.");
	let gate = AdmissionGate::with_clock(store, ManualClock::default(), id, policy);
	let status = gate.status().await;

	assert_eq!(status.used, 2, "Recorded stamps must survive the restart.");
	assert_eq!(status.remaining, 1);

	std::fs::remove_file(&path).expect("Removing the snapshot fixture should succeed.");
}
