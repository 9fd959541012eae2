//! Wall-clock [`Clock`] backed by the tokio timer.

// self
use crate::{
	_prelude::*,
	clock::{Clock, ClockFuture},
};

/// Production clock: UTC wall time plus `tokio::time::sleep`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}

	fn sleep(&self, duration: Duration) -> ClockFuture<'_> {
		Box::pin(async move {
			// Conversion fails exactly when the duration is negative.
			let Ok(duration) = std::time::Duration::try_from(duration) else {
				return;
			};

			tokio::time::sleep(duration).await;
		})
	}
}
