//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming transload request:
//!     → headers.rs (pick destination-bound headers, drop edge-internal ones)
//!     → allowlist.rs (approve the copy source before any network call)
//!     → Pass to the relay engine
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any security check failure
//! - No trust in client input

pub mod allowlist;
pub mod headers;

pub use allowlist::is_allowed;
pub use headers::{partition, HeaderSet};
