use serde::{Deserialize, Serialize};
use std::fmt;

/// An inclusive key range `[min_key, max_key]` owned by exactly one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Partition {
    pub index: usize,
    pub min_key: i64,
    pub max_key: i64,
}

impl Partition {
    pub fn new(index: usize, min_key: i64, max_key: i64) -> Self {
        Partition {
            index,
            min_key,
            max_key,
        }
    }

    /// The single partition of an unpartitioned step: every key.
    pub fn unbounded() -> Self {
        Partition::new(0, i64::MIN, i64::MAX)
    }

    pub fn contains(&self, key: i64) -> bool {
        key >= self.min_key && key <= self.max_key
    }

    /// Number of keys in the range.
    pub fn span(&self) -> u128 {
        (self.max_key as i128 - self.min_key as i128 + 1) as u128
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "partition {} [{}, {}]", self.index, self.min_key, self.max_key)
    }
}
