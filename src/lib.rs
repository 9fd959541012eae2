//! Sliding-window admission control for quota-limited APIs: windowed call budgets, inter-call
//! spacing, exact-wake waits, and pluggable counter persistence in one runtime-agnostic crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod clock;
pub mod error;
pub mod ext;
pub mod gate;
pub mod obs;
pub mod quota;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		clock::ManualClock,
		gate::AdmissionGate,
		quota::{GateId, GatePolicy},
		store::MemoryStore,
	};

	/// Gate type alias used by deterministic, virtual-clock tests.
	pub type ManualGate = AdmissionGate<ManualClock>;

	/// Builds a validated gate identifier fixture.
	pub fn test_gate_id(label: &str) -> GateId {
		GateId::new(label).expect("Test gate identifier should be valid.")
	}

	/// Policy fixture admitting three calls per five-second window, default knobs otherwise.
	pub fn default_test_policy() -> GatePolicy {
		GatePolicy::builder(3, Duration::seconds(5))
			.build()
			.expect("Test gate policy should build successfully.")
	}

	/// Constructs a gate over a fresh in-memory store and an epoch-anchored manual clock;
	/// drive the timeline through the gate's own clock handle.
	pub fn build_manual_gate(label: &str, policy: GatePolicy) -> ManualGate {
		AdmissionGate::with_clock(
			MemoryStore::default(),
			ManualClock::default(),
			test_gate_id(label),
			policy,
		)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};

	pub use crate::error::{Error, Result};
}

pub use time;
#[cfg(test)] use color_eyre as _;
