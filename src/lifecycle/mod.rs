//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain in-flight transloads → Exit
//! ```
//!
//! # Design Decisions
//! - In-flight transloads are drained, not cut, so no destination write is left half done by us

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
