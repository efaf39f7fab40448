//! `cardinality-sketch` estimates the number of distinct elements in a stream
//! of arbitrary byte values using a fixed-size register sketch instead of
//! storing the elements themselves.
//!
//! The sketch is an adaptive counting structure defined by a single runtime
//! parameter:
//! - `precision`: in [4..16] range, which defines the number of hash bits
//!   used for register indices; the sketch holds `m = 2^precision` one-byte
//!   registers and serializes to `m + 2` bytes.
//!
//! # Data-structure design rationale
//!
//! ## Constant-time estimates
//! - Number of zero registers and the sum of register values are stored and
//!   updated dynamically as more data is inserted, allowing both estimators
//!   to run without scanning the register array.
//!
//! ## Two estimators
//! - [`AdaptiveCounter::card`] uses linear counting while most registers are
//!   still empty and switches to the loglog estimate at the published
//!   crossover ratio, keeping relative error near `1.3/sqrt(m)` across the
//!   full cardinality range.
//! - [`AdaptiveCounter::card_loglog`] exposes the pure loglog estimate for
//!   direct comparison; it carries a known upward bias while the sketch is
//!   mostly empty.
//!   - Expected asymptotic error:
//!     precision = 10: 1.30 / sqrt(2^10) = 4.06%
//!     precision = 12: 1.30 / sqrt(2^12) = 2.03%
//!     precision = 16: 1.30 / sqrt(2^16) = 0.51%
//!
//! ## Mergeable
//! - Sketches built independently (other processes, other machines) combine
//!   by pointwise register maximum into the sketch of the union of the
//!   underlying sets, either from serialized bytes or in memory. Merge
//!   correctness requires all parties to use the same hasher; the default
//!   [`wyhash::WyHash`] is deterministic across processes.
//!
//! # Serialized data format
//! A sketch of precision `b` encodes to exactly `2^b + 2` bytes:
//! - byte 0       - format version tag
//! - byte 1       - precision
//! - bytes 2..    - register values in bucket order, one byte each
//!
//! Decoding validates the version, the precision range, the exact buffer
//! length, and that every register value is representable for the declared
//! precision; malformed buffers are rejected without partial effects.
//!
//! # Concurrency
//! No operation performs internal synchronization; mutation requires
//! `&mut self`, so sharing a sketch across threads requires external
//! mutual exclusion. All operations are synchronous and bounded.
pub mod counter;

mod alloc;
mod codec;
mod error;
mod estimator;
#[cfg(feature = "with_serde")]
mod serde;

pub use crate::alloc::{Allocator, Global};
pub use crate::codec::HEADER_LEN;
pub use crate::counter::{AdaptiveCounter, MAX_PRECISION, MIN_PRECISION};
pub use crate::error::{Error, Result};
