// Copyright (c) The ios-shard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Support for partitioning test classes across several machines.
//!
//! Classes are balanced by their number of test methods using the longest-processing-time-first
//! rule: sort classes by method count, largest first, and hand each one to the shard with the
//! fewest methods so far. This doesn't find the best possible partition, but the largest shard is
//! never more than `4/3 - 1/(3 * total_shards)` times larger than it would be in the best one.
//!
//! Every shard worker computes the full partition independently and keeps only its own shard, so
//! the result depends only on the inventory (including its discovery order) and the shard count.

use crate::{
    errors::{InvalidShardCount, SelectShardError, ShardIndexOutOfRange, ShardSelectorParseError},
    inventory::TestInventory,
};
use serde::Serialize;
use std::str::FromStr;

/// The test classes assigned to one shard.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Shard {
    test_classes: Vec<String>,
    size: usize,
}

impl Shard {
    /// The test classes in this shard, in the order they were assigned.
    pub fn test_classes(&self) -> &[String] {
        &self.test_classes
    }

    /// Consumes the shard, returning its test classes.
    pub fn into_test_classes(self) -> Vec<String> {
        self.test_classes
    }

    /// The total number of test methods in this shard.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns true if no test classes were assigned to this shard.
    pub fn is_empty(&self) -> bool {
        self.test_classes.is_empty()
    }

    fn push(&mut self, class_name: &str, count: usize) {
        self.test_classes.push(class_name.to_owned());
        self.size += count;
    }
}

/// A partition of an inventory's test classes into a fixed number of shards.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ShardSet {
    shards: Vec<Shard>,
}

impl ShardSet {
    /// Returns the number of shards. This is always at least 1.
    pub fn len(&self) -> usize {
        self.shards.len()
    }

    /// Always false: a shard set has at least one shard, though that shard may be empty.
    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }

    /// Returns the shards, indexed from 0.
    pub fn shards(&self) -> &[Shard] {
        &self.shards
    }

    /// Returns the shard at `shard_index`.
    pub fn shard(&self, shard_index: usize) -> Result<&Shard, ShardIndexOutOfRange> {
        self.shards
            .get(shard_index)
            .ok_or_else(|| ShardIndexOutOfRange::new(shard_index, self.shards.len()))
    }

    /// Consumes the set, returning the shard at `shard_index`.
    pub fn into_shard(mut self, shard_index: usize) -> Result<Shard, ShardIndexOutOfRange> {
        if shard_index >= self.shards.len() {
            return Err(ShardIndexOutOfRange::new(shard_index, self.shards.len()));
        }
        Ok(self.shards.swap_remove(shard_index))
    }

    /// Returns the size of the largest shard.
    pub fn max_size(&self) -> usize {
        self.shards.iter().map(Shard::size).max().unwrap_or(0)
    }
}

/// Balances an inventory's test classes into a fixed number of shards.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ShardBalancer {
    total_shards: usize,
}

impl ShardBalancer {
    /// Creates a new balancer, returning an error if `total_shards` is 0.
    pub fn new(total_shards: usize) -> Result<Self, InvalidShardCount> {
        if total_shards == 0 {
            return Err(InvalidShardCount::new(total_shards));
        }
        Ok(Self { total_shards })
    }

    /// The number of shards this balancer produces.
    pub fn total_shards(&self) -> usize {
        self.total_shards
    }

    /// Partitions `inventory` into `total_shards` shards.
    pub fn balance(&self, inventory: &TestInventory) -> ShardSet {
        let mut shards = vec![Shard::default(); self.total_shards];

        for (class_name, count) in inventory.by_count_descending() {
            // Ties go to the lowest index.
            let mut min_index = 0;
            for (index, shard) in shards.iter().enumerate().skip(1) {
                if shard.size < shards[min_index].size {
                    min_index = index;
                }
            }
            shards[min_index].push(class_name, count);
        }

        let shard_set = ShardSet { shards };
        tracing::debug!(
            "balanced {} test classes ({} methods) into {} shards, largest shard has {} methods",
            inventory.len(),
            inventory.total_count(),
            self.total_shards,
            shard_set.max_size(),
        );
        shard_set
    }
}

/// Partitions `inventory` into `total_shards` shards.
///
/// Returns an error if `total_shards` is 0.
pub fn partition(
    inventory: &TestInventory,
    total_shards: usize,
) -> Result<ShardSet, InvalidShardCount> {
    Ok(ShardBalancer::new(total_shards)?.balance(inventory))
}

/// Identifies one shard out of a total, with a 0-based index.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ShardSelector {
    shard_index: usize,
    total_shards: usize,
}

impl ShardSelector {
    /// Creates a new selector, validating that `shard_index` is within `total_shards`.
    pub fn new(shard_index: usize, total_shards: usize) -> Result<Self, SelectShardError> {
        if total_shards == 0 {
            return Err(InvalidShardCount::new(total_shards).into());
        }
        if shard_index >= total_shards {
            return Err(ShardIndexOutOfRange::new(shard_index, total_shards).into());
        }
        Ok(Self {
            shard_index,
            total_shards,
        })
    }

    /// The 0-based index of the selected shard.
    pub fn shard_index(&self) -> usize {
        self.shard_index
    }

    /// The total number of shards.
    pub fn total_shards(&self) -> usize {
        self.total_shards
    }

    /// Balances `inventory` and returns the test classes in the selected shard.
    pub fn select(&self, inventory: &TestInventory) -> Vec<String> {
        let shard_set = ShardBalancer {
            total_shards: self.total_shards,
        }
        .balance(inventory);
        shard_set
            .into_shard(self.shard_index)
            .map(Shard::into_test_classes)
            .expect("shard index was validated on construction")
    }
}

impl FromStr for ShardSelector {
    type Err = ShardSelectorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The input looks like "<shard_index>/<total_shards>".
        let Some((index_str, total_str)) = s.split_once('/') else {
            return Err(ShardSelectorParseError::new(format!(
                "expected input '{s}' to be in the format M/N"
            )));
        };

        let shard_index: usize = index_str.parse().map_err(|err| {
            ShardSelectorParseError::new(format!(
                "failed to parse shard index '{index_str}' as an integer: {err}"
            ))
        })?;
        let total_shards: usize = total_str.parse().map_err(|err| {
            ShardSelectorParseError::new(format!(
                "failed to parse total shards '{total_str}' as an integer: {err}"
            ))
        })?;

        Self::new(shard_index, total_shards)
            .map_err(|err| ShardSelectorParseError::new(err.to_string()))
    }
}
