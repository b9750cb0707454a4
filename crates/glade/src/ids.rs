//! # Identifiers — Process-Unique 64-bit Ids
//!
//! Every object in the graph (assets and nodes alike) carries a [`Uuid`],
//! drawn from one shared identifier space. Ids are random, not sequential:
//! callers must never rely on ordering or monotonicity, only on two ids
//! comparing equal meaning "the same object".
//!
//! `Uuid(0)` is reserved as the "no reference" sentinel — it is never handed
//! out by [`new_uuid`] and serialized reference fields use it for "unset".

use std::fmt;

use rand::Rng as _;
use serde::{Deserialize, Serialize};

/// Lower bound of the allocation range (inclusive).
const UUID_MIN: u64 = 1 << 61;
/// Upper bound of the allocation range (exclusive).
const UUID_MAX: u64 = 1 << 62;

/// A 64-bit identifier shared by assets and scene nodes.
///
/// Serializes as a plain JSON number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uuid(pub u64);

impl Uuid {
    /// The "no reference" sentinel.
    pub const NONE: Uuid = Uuid(0);

    /// True if this is the sentinel value.
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// True if this refers to something (but not necessarily something alive).
    pub fn is_some(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Allocate a fresh identifier from process-wide RNG state.
///
/// Ids are drawn uniformly from `[2^61, 2^62)`. Uniqueness holds only by
/// chance — there is no re-validation against already-issued values. At
/// single-session editing scales a collision is vanishingly unlikely, but
/// this is a known limitation, not a proof; merging ids from many projects
/// raises the odds.
pub fn new_uuid() -> Uuid {
    Uuid(rand::rng().random_range(UUID_MIN..UUID_MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_pairwise_distinct() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(new_uuid()));
        }
    }

    #[test]
    fn ids_stay_in_range_and_avoid_sentinel() {
        for _ in 0..1_000 {
            let id = new_uuid();
            assert!(id.0 >= UUID_MIN && id.0 < UUID_MAX);
            assert!(id.is_some());
        }
    }

    #[test]
    fn sentinel_is_none() {
        assert!(Uuid::NONE.is_none());
        assert!(!Uuid::NONE.is_some());
        assert_eq!(Uuid::default(), Uuid::NONE);
    }

    #[test]
    fn serializes_as_number() {
        let id = Uuid(42);
        assert_eq!(serde_json::to_value(id).unwrap(), serde_json::json!(42));
        let back: Uuid = serde_json::from_value(serde_json::json!(42)).unwrap();
        assert_eq!(back, id);
    }
}
