//! Contact id allocation.
//!
//! Priority order:
//! 1. the smallest freed id (ids released by `remove`)
//! 2. the first structural gap in the used set, counting from 0
//! 3. `max(used) + 1`
//!
//! Freed ids win even when a lower structural gap exists (for example ids
//! dropped as duplicates while hydrating never enter the free set).

use std::collections::BTreeSet;

/// Produce the next id and take it out of `free` if it came from there.
///
/// Does not insert the id into `used`; the caller owns that step.
pub fn next_id(used: &BTreeSet<u32>, free: &mut BTreeSet<u32>) -> u32 {
    if let Some(id) = free.pop_first() {
        return id;
    }

    let mut expected = 0u32;
    for &id in used {
        if id != expected {
            return expected;
        }
        expected = id.saturating_add(1);
    }
    expected
}
