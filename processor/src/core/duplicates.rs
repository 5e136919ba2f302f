//! Duplicate detection over ordered sequences
//!
//! Two reporting contracts are offered. [`find_duplicates`] is the primary
//! one: every repeated value is reported exactly once. [`find_duplicate_pairs`]
//! reports a value once per equal pair, so a value seen `k` times appears
//! `k * (k - 1) / 2` times. Both run in linear expected time and need
//! `Eq + Hash` values.
//!
//! Values that only implement `PartialEq`, such as `f64`, go through
//! [`find_duplicates_by_eq`] and [`find_duplicate_pairs_by_eq`], which compare
//! pairwise in quadratic time. `NaN` never equals anything there, itself
//! included, so it is never reported.

use std::collections::HashMap;
use std::hash::Hash;

/// Values occurring more than once, each reported once
///
/// Order follows the position of each value's second occurrence.
pub fn find_duplicates<T>(items: &[T]) -> Vec<T>
where
    T: Eq + Hash + Clone,
{
    let mut seen: HashMap<&T, usize> = HashMap::with_capacity(items.len());
    let mut duplicates = Vec::new();

    for item in items {
        let count = seen.entry(item).or_insert(0);
        *count += 1;
        if *count == 2 {
            duplicates.push(item.clone());
        }
    }

    duplicates
}

/// Values reported once per equal pair
///
/// Each occurrence emits one copy for every earlier occurrence of the same
/// value.
pub fn find_duplicate_pairs<T>(items: &[T]) -> Vec<T>
where
    T: Eq + Hash + Clone,
{
    let mut earlier: HashMap<&T, usize> = HashMap::with_capacity(items.len());
    let mut pairs = Vec::new();

    for item in items {
        let count = earlier.entry(item).or_insert(0);
        for _ in 0..*count {
            pairs.push(item.clone());
        }
        *count += 1;
    }

    pairs
}

/// Each repeated value with its total number of occurrences
///
/// Order follows each value's first occurrence.
pub fn duplicate_counts<T>(items: &[T]) -> Vec<(T, usize)>
where
    T: Eq + Hash + Clone,
{
    let mut order: Vec<&T> = Vec::new();
    let mut counts: HashMap<&T, usize> = HashMap::with_capacity(items.len());

    for item in items {
        let count = counts.entry(item).or_insert(0);
        if *count == 0 {
            order.push(item);
        }
        *count += 1;
    }

    order
        .into_iter()
        .filter_map(|item| match counts.get(item) {
            Some(&count) if count > 1 => Some((item.clone(), count)),
            _ => None,
        })
        .collect()
}

/// [`find_duplicates`] for values without `Eq + Hash`
pub fn find_duplicates_by_eq<T>(items: &[T]) -> Vec<T>
where
    T: PartialEq + Clone,
{
    let mut duplicates: Vec<T> = Vec::new();

    for (position, item) in items.iter().enumerate() {
        let seen_before = items[..position].iter().any(|earlier| earlier == item);
        if seen_before && !duplicates.iter().any(|reported| reported == item) {
            duplicates.push(item.clone());
        }
    }

    duplicates
}

/// [`find_duplicate_pairs`] for values without `Eq + Hash`
pub fn find_duplicate_pairs_by_eq<T>(items: &[T]) -> Vec<T>
where
    T: PartialEq + Clone,
{
    let mut pairs = Vec::new();

    for (position, item) in items.iter().enumerate() {
        for earlier in &items[..position] {
            if earlier == item {
                pairs.push(item.clone());
            }
        }
    }

    pairs
}
