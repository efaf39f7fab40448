//! Adaptive counting sketch keyed by a pluggable 64-bit hasher.

use std::fmt::{self, Debug, Formatter};
use std::hash::{BuildHasher, BuildHasherDefault, Hasher};

use wyhash::WyHash;

use crate::alloc::{Allocator, Global};
use crate::codec;
use crate::error::{Error, Result};
use crate::estimator::{self, RegisterStats};

/// Smallest supported precision.
pub const MIN_PRECISION: u8 = 4;
/// Largest supported precision.
pub const MAX_PRECISION: u8 = 16;

/// Largest register value representable at the given precision: one plus the
/// width of the hash bits left after bucket selection.
#[inline]
pub(crate) fn max_rank(precision: u8) -> u8 {
    65 - precision
}

/// Distinct-count sketch over `2^precision` one-byte registers.
///
/// Each offered element is hashed once; the low `precision` bits select a
/// register and the rank of the remaining bits is folded in by maximum, so
/// the structure is insensitive to duplicates and to element order.
/// [`card`](Self::card) returns the adaptive estimate, and
/// [`card_loglog`](Self::card_loglog) the pure loglog estimate.
///
/// `H` is the hash function; it must be deterministic across processes for
/// sketches that will later be merged, which the default [`WyHash`]
/// satisfies. `A` supplies register storage and receives it back on drop.
///
/// No operation synchronizes internally: concurrent mutation of one sketch
/// requires external mutual exclusion. Per-register atomic maximum updates
/// are the upgrade path should internal concurrency ever be needed, since
/// registers are mutually independent.
pub struct AdaptiveCounter<H: Hasher + Default = WyHash, A: Allocator = Global> {
    /// log2 of the number of registers.
    precision: u8,
    /// Number of registers still at zero, maintained on every update.
    zero_registers: u32,
    /// Sum of all register values, maintained on every update.
    rank_sum: u64,
    /// One byte per bucket holding the maximum observed rank.
    registers: Box<[u8]>,
    /// Allocation strategy owning no data, only supplying and reclaiming it.
    alloc: A,
    /// Zero-sized build hasher.
    build_hasher: BuildHasherDefault<H>,
}

impl AdaptiveCounter {
    /// Create a sketch with the default hasher and the global allocator.
    pub fn new(precision: u8) -> Result<Self> {
        Self::with_allocator(precision, Global)
    }

    /// Reconstruct a sketch from bytes produced by
    /// [`to_bytes`](Self::to_bytes) or [`write_bytes`](Self::write_bytes).
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        Self::from_bytes_with_allocator(buf, Global)
    }
}

impl<H: Hasher + Default, A: Allocator> AdaptiveCounter<H, A> {
    /// Create a sketch using the supplied allocation strategy.
    pub fn with_allocator(precision: u8, alloc: A) -> Result<Self> {
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&precision) {
            return Err(Error::InvalidPrecision(precision));
        }
        let m = 1usize << precision;
        Ok(Self {
            precision,
            zero_registers: m as u32,
            rank_sum: 0,
            registers: alloc.alloc_zeroed(m),
            alloc,
            build_hasher: BuildHasherDefault::default(),
        })
    }

    /// Reconstruct a serialized sketch using the supplied allocation
    /// strategy. The buffer is fully validated before any state is built.
    pub fn from_bytes_with_allocator(buf: &[u8], alloc: A) -> Result<Self> {
        let frame = codec::decode(buf)?;
        let mut counter = Self::with_allocator(frame.precision, alloc)?;
        counter.registers.copy_from_slice(frame.registers);
        counter.rebuild_stats();
        Ok(counter)
    }

    /// log2 of the register count.
    #[inline]
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Number of registers.
    #[inline]
    pub fn num_registers(&self) -> usize {
        self.registers.len()
    }

    /// Register values in bucket order.
    #[inline]
    pub fn registers(&self) -> &[u8] {
        &self.registers
    }

    /// Whether no element has been offered since creation or the last reset.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.zero_registers as usize == self.registers.len()
    }

    /// Offer one element to the sketch.
    ///
    /// Offering the same bytes again never changes the register state.
    #[inline]
    pub fn offer(&mut self, item: &[u8]) {
        let mut hasher = self.build_hasher.build_hasher();
        hasher.write(item);
        self.offer_hashed(hasher.finish());
    }

    /// Offer a pre-computed 64-bit hash.
    #[inline]
    pub fn offer_hashed(&mut self, hash: u64) {
        let bucket = (hash & (self.registers.len() as u64 - 1)) as usize;
        self.update_register(bucket, rank_of(hash, self.precision));
    }

    /// Cardinality estimate using the adaptive strategy.
    #[inline]
    pub fn card(&self) -> u64 {
        estimator::adaptive(self.stats())
    }

    /// Cardinality estimate using the pure loglog strategy.
    #[inline]
    pub fn card_loglog(&self) -> u64 {
        estimator::loglog(self.stats())
    }

    /// Zero every register in place, keeping precision, hasher and
    /// allocation strategy.
    pub fn reset(&mut self) {
        self.registers.fill(0);
        self.zero_registers = self.registers.len() as u32;
        self.rank_sum = 0;
    }

    /// Number of bytes [`write_bytes`](Self::write_bytes) produces.
    #[inline]
    pub fn serialized_len(&self) -> usize {
        codec::encoded_len(self.precision)
    }

    /// Encode the sketch into `dst`, returning the number of bytes written.
    ///
    /// Fails with [`Error::BufferTooSmall`] and no partial write when `dst`
    /// is shorter than [`serialized_len`](Self::serialized_len).
    pub fn write_bytes(&self, dst: &mut [u8]) -> Result<usize> {
        codec::encode_into(self.precision, &self.registers, dst)
    }

    /// Encode the sketch into a freshly allocated buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        codec::encode(self.precision, &self.registers)
    }

    /// Merge one or more serialized sketches into this one.
    ///
    /// Every input is decoded and checked against this sketch's precision
    /// before any register is modified; on error the sketch is unchanged.
    /// Afterwards each register holds the pointwise maximum across this
    /// sketch and all inputs, so the sketch describes the union of the
    /// underlying sets rather than a sum of counts.
    pub fn merge_bytes(&mut self, bufs: &[&[u8]]) -> Result<()> {
        let mut frames = Vec::with_capacity(bufs.len());
        for buf in bufs {
            let frame = codec::decode(buf)?;
            if frame.precision != self.precision {
                return Err(Error::PrecisionMismatch {
                    expected: self.precision,
                    actual: frame.precision,
                });
            }
            frames.push(frame);
        }
        for frame in frames {
            self.merge_registers(frame.registers);
        }
        Ok(())
    }

    /// Merge another sketch of the same precision into this one, with the
    /// same union semantics as [`merge_bytes`](Self::merge_bytes).
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        if other.precision != self.precision {
            return Err(Error::PrecisionMismatch {
                expected: self.precision,
                actual: other.precision,
            });
        }
        self.merge_registers(&other.registers);
        Ok(())
    }

    /// Raise `registers[bucket]` to `rank` if larger, keeping the
    /// zero-register count and rank sum in step. Registers never decrease
    /// outside of `reset`.
    #[inline]
    fn update_register(&mut self, bucket: usize, rank: u8) {
        let current = self.registers[bucket];
        if rank > current {
            self.zero_registers -= u32::from(current == 0);
            self.rank_sum += u64::from(rank - current);
            self.registers[bucket] = rank;
        }
    }

    fn merge_registers(&mut self, other: &[u8]) {
        for (bucket, &rank) in other.iter().enumerate() {
            self.update_register(bucket, rank);
        }
    }

    /// Recompute the maintained statistics from raw register contents.
    fn rebuild_stats(&mut self) {
        self.zero_registers = self.registers.iter().filter(|&&r| r == 0).count() as u32;
        self.rank_sum = self.registers.iter().map(|&r| u64::from(r)).sum();
    }

    fn stats(&self) -> RegisterStats {
        RegisterStats {
            precision: self.precision,
            zero_registers: self.zero_registers,
            rank_sum: self.rank_sum,
        }
    }
}

impl<H: Hasher + Default, A: Allocator + Clone> Clone for AdaptiveCounter<H, A> {
    fn clone(&self) -> Self {
        let mut registers = self.alloc.alloc_zeroed(self.registers.len());
        registers.copy_from_slice(&self.registers);
        Self {
            precision: self.precision,
            zero_registers: self.zero_registers,
            rank_sum: self.rank_sum,
            registers,
            alloc: self.alloc.clone(),
            build_hasher: BuildHasherDefault::default(),
        }
    }
}

impl<H: Hasher + Default, A: Allocator> PartialEq for AdaptiveCounter<H, A> {
    /// Sketches compare equal when precision and every register match.
    fn eq(&self, rhs: &Self) -> bool {
        self.precision == rhs.precision && self.registers == rhs.registers
    }
}

impl<H: Hasher + Default, A: Allocator> Debug for AdaptiveCounter<H, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ precision: {}, estimate: {} }}",
            self.precision,
            self.card()
        )
    }
}

impl<H: Hasher + Default, A: Allocator> Drop for AdaptiveCounter<H, A> {
    /// Return register storage to the allocation strategy.
    fn drop(&mut self) {
        self.alloc.release(std::mem::take(&mut self.registers));
    }
}

/// Rank of a hash at the given precision: one plus the number of leading
/// zeros among the bits left after bucket selection, clamped to the
/// representable maximum when those bits are all zero.
#[inline]
fn rank_of(hash: u64, precision: u8) -> u8 {
    let remaining = hash >> precision;
    if remaining == 0 {
        max_rank(precision)
    } else {
        (remaining.leading_zeros() - u32::from(precision) + 1) as u8
    }
}
