//! Quota-domain identifiers, call histories, policies, and status snapshots.

pub mod history;
pub mod id;
pub mod policy;
pub mod status;

pub use history::*;
pub use id::*;
pub use policy::*;
pub use status::*;
