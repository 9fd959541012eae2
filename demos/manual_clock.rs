//! Demonstrates driving a gate on a virtual clock: the whole scenario runs in
//! microseconds of wall time while the journal shows exactly how long a live
//! deployment would have slept, and when the bounded wait would have woken.

// crates.io
use color_eyre::Result;
use time::{Duration, macros::datetime};
// self
use quota_gate::{
	clock::{Clock, ManualClock},
	gate::AdmissionGate,
	quota::{GateId, GatePolicy},
	store::MemoryStore,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let clock = ManualClock::starting_at(datetime!(2026-01-01 0:00 UTC));
	let policy = GatePolicy::builder(3, Duration::seconds(5)).build()?;
	let gate = AdmissionGate::with_clock(
		MemoryStore::default(),
		clock.clone(),
		GateId::new("demo-virtual")?,
		policy,
	);

	// Three calls one second apart fill the window.
	for second in 0..3 {
		gate.record_call().await?;

		println!("Recorded a call at t = {second} s.");

		clock.advance(Duration::seconds(1));
	}

	println!("Window admissible at t = 3 s: {}.", gate.admissible().await);

	// The bounded wait computes the exact reopening instant and sleeps once.
	let admitted = gate.await_admission(Duration::seconds(30)).await;

	println!("Wait admitted: {admitted}; virtual time is now {}.", clock.now());

	for sleep in clock.recorded_sleeps() {
		println!("Journaled sleep: {} ms.", sleep.whole_milliseconds());
	}

	println!("Total virtual time slept: {} ms.", clock.total_slept().whole_milliseconds());

	Ok(())
}
