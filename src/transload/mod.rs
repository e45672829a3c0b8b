//! Transload subsystem.
//!
//! # Data Flow
//! ```text
//! RelayRequest
//!     → security::headers (destination-bound / source-bound split)
//!     → range.rs (x-gtr-source-range → Range + Content-Length)
//!     → security::allowlist (copy source approval)
//!     → relay.rs (GET source ──stream──▶ write destination)
//!     → destination.rs (path → pre-authorized destination URL)
//!     → RelayOutcome, or RelayError through error.rs
//! ```

pub mod destination;
pub mod error;
pub mod range;
pub mod relay;

pub use destination::{AzureBlobResolver, DestinationError, DestinationResolver};
pub use error::RelayError;
pub use range::{ByteRange, RangeError, RangeTranslation};
pub use relay::{Relay, RelayOutcome, RelayRequest};

/// Absolute URL of the bytes to transload.
pub const COPY_SOURCE_HEADER: &str = "x-gtr-copy-source";

/// Optional `bytes=<start>-<end>` span of the source to transload.
pub const SOURCE_RANGE_HEADER: &str = "x-gtr-source-range";
