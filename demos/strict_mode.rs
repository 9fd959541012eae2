//! Demonstrates strict admission: two tasks race for the final window slot
//! and the compare-and-swap loop guarantees a single winner.

// crates.io
use color_eyre::Result;
use time::Duration;
// self
use quota_gate::{
	clock::ManualClock,
	error::Error,
	gate::AdmissionGate,
	quota::{AdmissionMode, GateId, GatePolicy},
	store::MemoryStore,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let policy = GatePolicy::builder(1, Duration::seconds(30))
		.mode(AdmissionMode::Strict)
		.build()?;
	let gate = AdmissionGate::with_clock(
		MemoryStore::default(),
		ManualClock::default(),
		GateId::new("demo-strict")?,
		policy,
	);
	let rival = gate.clone();
	let (first, second) = tokio::join!(gate.record_call(), rival.record_call());

	for (task, outcome) in [("first", first), ("second", second)] {
		match outcome {
			Ok(()) => println!("The {task} task took the last slot."),
			Err(Error::QuotaExhausted { retry_at }) => {
				println!("The {task} task was refused; the window reopens at {retry_at:?}.");
			},
			Err(error) => return Err(error.into()),
		}
	}

	println!(
		"Recorded: {}; rejected: {}. The window never over-admits in strict mode.",
		gate.metrics.records(),
		gate.metrics.rejections(),
	);

	Ok(())
}
