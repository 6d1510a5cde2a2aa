//! Ordered grouping of flat reading lists.
//!
//! Grouping is a pure fold: each key maps to the items that carried it, and
//! keys come out in the order they were first seen. That ordering is part of
//! the contract, since group summaries list devices in first-seen order and
//! ties in the severity sort fall back to it.

use std::collections::HashMap;
use std::hash::Hash;

use crate::model::Reading;

/// Groups `items` by `key`, preserving first-seen key order and the relative
/// order of items within each group.
///
/// Empty input yields an empty result.
pub fn group_by_key<K, V, I, F>(items: I, key: F) -> Vec<(K, Vec<V>)>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = V>,
    F: Fn(&V) -> K,
{
    let (groups, _index) = items.into_iter().fold(
        (Vec::<(K, Vec<V>)>::new(), HashMap::<K, usize>::new()),
        |(mut groups, mut index), item| {
            let k = key(&item);
            match index.get(&k) {
                Some(&slot) => groups[slot].1.push(item),
                None => {
                    index.insert(k.clone(), groups.len());
                    groups.push((k, vec![item]));
                }
            }
            (groups, index)
        },
    );
    groups
}

/// Partitions readings by device identifier.
pub fn group_by_device<'a>(readings: &'a [Reading]) -> Vec<(&'a str, Vec<&'a Reading>)> {
    group_by_key(readings.iter(), |r: &&'a Reading| r.device_id.as_str())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
