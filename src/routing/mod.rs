//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → router.rs (endpoint lookup)
//!     → matcher.rs (evaluate path prefix)
//!     → Return: Transload, Version or Redirect
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - First match wins; unmatched paths fall through to the redirect

pub mod matcher;
pub mod router;

pub use router::{Dispatcher, Endpoint};
