//! Caller-side extension points (cancellation signals, advisory pacing).
//!
//! The gate core is a plain poll-and-sleep loop; these helpers let the calling
//! service plug its own shutdown wiring into waits and layer advisory
//! self-throttling on top of the window state without expanding the gate's
//! core surface.

pub mod cancel;
pub mod pacer;

pub use cancel::*;
pub use pacer::*;
