//! Demonstrates pacing a burst of outbound submissions through a system-clock
//! gate: a bounded wait for window capacity, spacing between calls, and live
//! status snapshots along the way.

// crates.io
use color_eyre::Result;
use time::Duration;
// self
use quota_gate::{
	gate::SystemGate,
	quota::{GateId, GatePolicy},
	store::MemoryStore,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let policy = GatePolicy::builder(5, Duration::seconds(10))
		.min_spacing(Duration::milliseconds(250))
		.build()?;
	let gate = SystemGate::new(MemoryStore::default(), GateId::new("demo-submitter")?, policy);

	for attempt in 1..=6 {
		// Capacity first, then spacing; recording never checks the quota on
		// its own.
		if !gate.await_admission(Duration::seconds(2)).await {
			let status = gate.status().await;

			println!(
				"Submission {attempt} skipped; the window stays full until {:?}.",
				status.reset_at,
			);

			continue;
		}

		let paused = gate.enforce_spacing().await;

		gate.record_call().await?;

		let status = gate.status().await;

		println!(
			"Submission {attempt} admitted after a {} ms pause ({}/{} used).",
			paused.whole_milliseconds(),
			status.used,
			status.limit,
		);
	}

	let delay = gate.recommended_delay().await;

	println!("Advised delay before the next call: {} ms.", delay.whole_milliseconds());
	println!(
		"Gate counters: {} recorded, {} waits, {} timeouts.",
		gate.metrics.records(),
		gate.metrics.waits(),
		gate.metrics.timeouts(),
	);

	Ok(())
}
