//! # Serde module for AdaptiveCounter
//!
//! A sketch serializes as its wire-format byte sequence (see the crate docs
//! for the layout), so the serde representation is identical to
//! [`AdaptiveCounter::to_bytes`] and deserialization runs through the same
//! validation as [`AdaptiveCounter::from_bytes`]: malformed input is
//! rejected without constructing a sketch.

use std::hash::Hasher;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::alloc::Allocator;
use crate::counter::AdaptiveCounter;

impl<H: Hasher + Default, A: Allocator> Serialize for AdaptiveCounter<H, A> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_bytes().serialize(serializer)
    }
}

impl<'de, H: Hasher + Default, A: Allocator + Default> Deserialize<'de> for AdaptiveCounter<H, A> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes = Vec::<u8>::deserialize(deserializer)?;
        Self::from_bytes_with_allocator(&bytes, A::default()).map_err(D::Error::custom)
    }
}
