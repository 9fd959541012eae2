//! Admission checks, call recording, and state teardown.

// self
use crate::{
	_prelude::*,
	clock::{self, Clock},
	gate::{AdmissionGate, history_from},
	obs::{self, GateOp, OpOutcome, OpSpan},
	quota::{AdmissionMode, AdmissionStatus, CallHistory},
	store::{CompareAndSwapOutcome, CounterValue},
};

/// Upper bound on strict-mode compare-and-swap attempts before giving up.
const CAS_ATTEMPT_BUDGET: u32 = 16;

impl<K> AdmissionGate<K>
where
	K: ?Sized + Clock,
{
	/// Returns `true` while the window still has room for another call.
	///
	/// Pure read: nothing is recorded, and a failed store read fails open so
	/// monitoring-frequency polls never wedge the caller.
	pub async fn admissible(&self) -> bool {
		let now_ms = clock::unix_ms(self.clock.now());
		let mut history = self.load_history_or_empty("admissible").await;

		history.prune(now_ms, clock::duration_ms(self.policy.window));

		history.has_room(self.policy.limit)
	}

	/// Derives a point-in-time usage snapshot without mutating anything.
	pub async fn status(&self) -> AdmissionStatus {
		let now_ms = clock::unix_ms(self.clock.now());
		let mut history = self.load_history_or_empty("status").await;

		history.prune(now_ms, clock::duration_ms(self.policy.window));

		AdmissionStatus::derive(&history, &self.policy)
	}

	/// Instant of the oldest call still inside the window, if any.
	pub async fn oldest_call(&self) -> Option<OffsetDateTime> {
		let now_ms = clock::unix_ms(self.clock.now());
		let mut history = self.load_history_or_empty("oldest_call").await;

		history.prune(now_ms, clock::duration_ms(self.policy.window));

		history.oldest().map(clock::from_unix_ms)
	}

	/// Records one performed call into the window.
	///
	/// Best-effort mode appends unconditionally; callers are expected to
	/// check [`admissible`](Self::admissible) first, and concurrent callers
	/// may transiently overfill the window. Strict mode revalidates the
	/// quota inside a compare-and-swap loop and refuses the append at the
	/// limit. Spacing is a separate concern handled by
	/// [`enforce_spacing`](Self::enforce_spacing).
	///
	/// # Errors
	///
	/// [`Error::QuotaExhausted`] when strict mode finds the window full,
	/// [`Error::Contention`] when strict mode exhausts its compare-and-swap
	/// budget, and [`Error::Storage`] when a write fails. Writes are always
	/// surfaced; reads fail open in best-effort mode only.
	pub async fn record_call(&self) -> Result<()> {
		const OP: GateOp = GateOp::Record;

		obs::record_op_outcome(OP, OpOutcome::Attempt);

		let span = OpSpan::new(OP, "record_call");
		let result = match self.policy.mode {
			AdmissionMode::BestEffort => span.instrument(self.record_best_effort()).await,
			AdmissionMode::Strict => span.instrument(self.record_strict()).await,
		};
		let outcome = match &result {
			Ok(()) => OpOutcome::Granted,
			Err(Error::QuotaExhausted { .. }) => OpOutcome::Denied,
			Err(_) => OpOutcome::Failure,
		};

		obs::record_op_outcome(OP, outcome);

		result
	}

	/// Clears every persisted slot of this gate: the window series and the
	/// last-call stamp.
	///
	/// # Errors
	///
	/// [`Error::Storage`] when a delete fails; a partial reset leaves the
	/// other slot untouched.
	pub async fn reset(&self) -> Result<()> {
		const OP: GateOp = GateOp::Reset;

		obs::record_op_outcome(OP, OpOutcome::Attempt);

		let span = OpSpan::new(OP, "reset");
		let result = span.instrument(self.reset_inner()).await;
		let outcome = if result.is_ok() { OpOutcome::Granted } else { OpOutcome::Failure };

		obs::record_op_outcome(OP, outcome);

		result
	}

	async fn record_best_effort(&self) -> Result<()> {
		// No quota check here: callers gate on `admissible` first, and
		// over-admission under races is accepted.
		let now_ms = clock::unix_ms(self.clock.now());
		let mut history = self.load_history_or_empty("record").await;

		history.prune(now_ms, clock::duration_ms(self.policy.window));
		history.record(now_ms);
		self.persist_history(&history).await?;
		self.persist_last_call(now_ms).await?;
		self.finish_record(&history);

		Ok(())
	}

	async fn record_strict(&self) -> Result<()> {
		// One recorder per process; the CAS loop settles cross-process races.
		let _guard = self.record_guard.lock().await;
		let window_ms = clock::duration_ms(self.policy.window);
		let key = self.window_key();

		for _ in 0..CAS_ATTEMPT_BUDGET {
			let now_ms = clock::unix_ms(self.clock.now());
			let current = self.store.get(&key).await?;
			let mut history = history_from(current.clone());

			history.prune(now_ms, window_ms);

			if !history.has_room(self.policy.limit) {
				return Err(self.reject(&history));
			}

			history.record(now_ms);

			let replacement = CounterValue::Series(history.stamps().to_vec());
			let outcome = self
				.store
				.compare_and_swap(&key, current.as_ref(), replacement, self.policy.store_ttl())
				.await?;

			if outcome == CompareAndSwapOutcome::Updated {
				self.persist_last_call(now_ms).await?;
				self.finish_record(&history);

				return Ok(());
			}
		}

		Err(Error::Contention { attempts: CAS_ATTEMPT_BUDGET })
	}

	async fn reset_inner(&self) -> Result<()> {
		self.store.delete(&self.window_key()).await?;
		self.store.delete(&self.last_call_key()).await?;
		obs::record_window_used(&self.id, 0);

		Ok(())
	}

	fn reject(&self, history: &CallHistory) -> Error {
		self.metrics.note_rejection();

		let status = AdmissionStatus::derive(history, &self.policy);

		Error::QuotaExhausted { retry_at: status.reset_at }
	}

	fn finish_record(&self, history: &CallHistory) {
		self.metrics.note_record();

		let status = AdmissionStatus::derive(history, &self.policy);

		obs::record_window_used(&self.id, status.used);

		if status.should_warn() {
			obs::warn_near_limit(&self.id, status.used, status.limit);
		}
	}
}
