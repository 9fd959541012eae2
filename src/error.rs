//! Gate-level error types shared across admission operations and stores.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical gate error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// A strict-mode record found the call window full and refused to append.
	#[error("Call quota is exhausted within the current window.")]
	QuotaExhausted {
		/// Earliest instant the window can admit a new call, when known.
		retry_at: Option<OffsetDateTime>,
	},
	/// Concurrent writers kept invalidating the compare-and-swap loop.
	#[error("Store contention exhausted {attempts} compare-and-swap attempts.")]
	Contention {
		/// Number of attempts performed before giving up.
		attempts: u32,
	},
}

/// Configuration and validation failures raised while assembling a gate.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Gate policy validation failed.
	#[error(transparent)]
	Policy(#[from] crate::quota::GatePolicyError),
	/// Gate identifier validation failed.
	#[error(transparent)]
	Identifier(#[from] crate::quota::GateIdError),
}
