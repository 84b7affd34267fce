// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Longest increasing subsequence, used to pick the children that stay put.

use alloc::vec;
use alloc::vec::Vec;

/// Marks one longest strictly increasing subsequence of `seq`.
///
/// Returns a flag per element. Runs in O(n log n) (patience sorting). Among
/// subsequences of equal length, the one ending at the latest position wins,
/// and each element links back to the tail it extended when it was placed, so
/// the choice is deterministic for a given input.
pub(crate) fn longest_increasing(seq: &[usize]) -> Vec<bool> {
    // `tails[k]` is the position of the smallest tail of any increasing run of
    // length k + 1 seen so far.
    let mut tails: Vec<usize> = Vec::new();
    let mut prev: Vec<Option<usize>> = vec![None; seq.len()];

    for (pos, &value) in seq.iter().enumerate() {
        let slot = tails.partition_point(|&t| seq[t] < value);
        if slot > 0 {
            prev[pos] = Some(tails[slot - 1]);
        }
        if slot == tails.len() {
            tails.push(pos);
        } else {
            tails[slot] = pos;
        }
    }

    let mut keep = vec![false; seq.len()];
    let mut cursor = tails.last().copied();
    while let Some(pos) = cursor {
        keep[pos] = true;
        cursor = prev[pos];
    }
    keep
}
