//! Gate policy: window limits, spacing, waiting, and admission-mode knobs.

// self
use crate::_prelude::*;

const DEFAULT_MIN_SPACING: Duration = Duration::milliseconds(1_100);
const DEFAULT_NEAR_LIMIT_PERCENT: u8 = 80;
const DEFAULT_FLOOR_SLEEP: Duration = Duration::seconds(1);
const DEFAULT_TTL_MARGIN: Duration = Duration::seconds(60);

/// Errors raised while constructing or validating gate policies.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum GatePolicyError {
	/// The call limit must admit at least one call per window.
	#[error("Call limit must be at least one.")]
	ZeroLimit,
	/// The window length must be a positive duration.
	#[error("Window length must be positive.")]
	NonPositiveWindow,
	/// The minimum spacing cannot be negative.
	#[error("Minimum spacing cannot be negative.")]
	NegativeSpacing,
	/// The near-limit threshold must be a percentage in `1..=100`.
	#[error("Near-limit threshold must be between 1 and 100 percent, got {percent}.")]
	ThresholdOutOfRange {
		/// Threshold that failed validation.
		percent: u8,
	},
	/// The fallback sleep must be positive or waiters could spin.
	#[error("Floor sleep must be positive.")]
	NonPositiveFloorSleep,
	/// The TTL margin cannot be negative.
	#[error("TTL margin cannot be negative.")]
	NegativeTtlMargin,
}

/// How `record_call` resolves the cross-caller check-then-record race.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionMode {
	/// Append without checking the quota; callers are expected to gate on
	/// admissibility first, and transient over-admission is possible when
	/// independent callers race. Cheapest, and sufficient when the remote
	/// API tolerates an occasional extra call.
	#[default]
	BestEffort,
	/// Revalidate the quota inside a compare-and-swap loop so concurrent
	/// recorders can never exceed the limit; the loser receives
	/// [`Error::QuotaExhausted`](crate::error::Error::QuotaExhausted).
	Strict,
}

/// Validated policy governing a gate's window, spacing, and waiting behavior.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatePolicy {
	/// Maximum number of calls admitted inside one trailing window.
	pub limit: u32,
	/// Length of the trailing window.
	pub window: Duration,
	/// Minimum spacing enforced between consecutive calls (default 1100 ms).
	pub min_spacing: Duration,
	/// Percentage of the limit above which the gate is considered near-limit
	/// (strictly greater; default 80).
	pub near_limit_percent: u8,
	/// Fallback sleep used when no exact wake instant is usable (default 1 s).
	pub floor_sleep: Duration,
	/// Extra lifetime added to the window when computing store TTLs
	/// (default 60 s).
	pub ttl_margin: Duration,
	/// Admission mode applied by `record_call`.
	pub mode: AdmissionMode,
}
impl GatePolicy {
	/// Starts a builder seeded with the two required knobs.
	pub fn builder(limit: u32, window: Duration) -> GatePolicyBuilder {
		GatePolicyBuilder::new(limit, window)
	}

	/// Lifetime applied to stored entries: the window plus the TTL margin.
	pub fn store_ttl(&self) -> Duration {
		self.window.saturating_add(self.ttl_margin)
	}
}

/// Builder for [`GatePolicy`] values.
#[derive(Debug)]
pub struct GatePolicyBuilder {
	/// Maximum number of calls admitted inside one trailing window.
	pub limit: u32,
	/// Length of the trailing window.
	pub window: Duration,
	/// Minimum spacing enforced between consecutive calls.
	pub min_spacing: Duration,
	/// Near-limit threshold as a percentage of the limit.
	pub near_limit_percent: u8,
	/// Fallback sleep used when no exact wake instant is usable.
	pub floor_sleep: Duration,
	/// Extra lifetime added to the window when computing store TTLs.
	pub ttl_margin: Duration,
	/// Admission mode applied by `record_call`.
	pub mode: AdmissionMode,
}
impl GatePolicyBuilder {
	/// Creates a new builder seeded with the provided limit and window.
	pub fn new(limit: u32, window: Duration) -> Self {
		Self {
			limit,
			window,
			min_spacing: DEFAULT_MIN_SPACING,
			near_limit_percent: DEFAULT_NEAR_LIMIT_PERCENT,
			floor_sleep: DEFAULT_FLOOR_SLEEP,
			ttl_margin: DEFAULT_TTL_MARGIN,
			mode: AdmissionMode::default(),
		}
	}

	/// Overrides the minimum inter-call spacing.
	pub fn min_spacing(mut self, spacing: Duration) -> Self {
		self.min_spacing = spacing;

		self
	}

	/// Overrides the near-limit threshold percentage.
	pub fn near_limit_percent(mut self, percent: u8) -> Self {
		self.near_limit_percent = percent;

		self
	}

	/// Overrides the fallback sleep used by waiters.
	pub fn floor_sleep(mut self, sleep: Duration) -> Self {
		self.floor_sleep = sleep;

		self
	}

	/// Overrides the TTL margin added to stored entries.
	pub fn ttl_margin(mut self, margin: Duration) -> Self {
		self.ttl_margin = margin;

		self
	}

	/// Overrides the admission mode.
	pub fn mode(mut self, mode: AdmissionMode) -> Self {
		self.mode = mode;

		self
	}

	/// Consumes the builder and validates the resulting policy.
	pub fn build(self) -> Result<GatePolicy, GatePolicyError> {
		if self.limit == 0 {
			return Err(GatePolicyError::ZeroLimit);
		}
		if !self.window.is_positive() {
			return Err(GatePolicyError::NonPositiveWindow);
		}
		if self.min_spacing.is_negative() {
			return Err(GatePolicyError::NegativeSpacing);
		}
		if self.near_limit_percent == 0 || self.near_limit_percent > 100 {
			return Err(GatePolicyError::ThresholdOutOfRange { percent: self.near_limit_percent });
		}
		if !self.floor_sleep.is_positive() {
			return Err(GatePolicyError::NonPositiveFloorSleep);
		}
		if self.ttl_margin.is_negative() {
			return Err(GatePolicyError::NegativeTtlMargin);
		}

		Ok(GatePolicy {
			limit: self.limit,
			window: self.window,
			min_spacing: self.min_spacing,
			near_limit_percent: self.near_limit_percent,
			floor_sleep: self.floor_sleep,
			ttl_margin: self.ttl_margin,
			mode: self.mode,
		})
	}
}
