//! # Row Identifiers
//!
//! Numeric ids for line items and custom fields.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ids present          next_id                                           │
//! │  ───────────          ───────                                           │
//! │  (none)          ───► 1                                                 │
//! │  1, 2, 5         ───► 6          (max + 1)                              │
//! │  1, MAX_ID       ───► 2          (smallest free id once max is taken)   │
//! │                                                                         │
//! │  repair: 0, repeats and ids above MAX_ID are renumbered in place        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeSet;

/// Largest id a row may carry: the frontend reads ids as JavaScript numbers,
/// which are exact only up to 2^53 - 1.
pub const MAX_ID: u64 = (1 << 53) - 1;

fn is_valid(id: u64) -> bool {
    id != 0 && id <= MAX_ID
}

/// Next id given the ids already in use.
pub fn next_id<I>(ids: I) -> u64
where
    I: IntoIterator<Item = u64>,
{
    let used: BTreeSet<u64> = ids.into_iter().filter(|id| is_valid(*id)).collect();
    next_free(&used)
}

fn next_free(used: &BTreeSet<u64>) -> u64 {
    match used.last() {
        None => 1,
        Some(&max) if max < MAX_ID => max + 1,
        Some(_) => (1..MAX_ID).find(|id| !used.contains(id)).unwrap_or(MAX_ID),
    }
}

/// Renumbers ids that are 0, above [`MAX_ID`], or repeat an earlier id.
/// Valid first occurrences keep their id.
pub fn repair<'a, I>(ids: I)
where
    I: IntoIterator<Item = &'a mut u64>,
{
    let mut used = BTreeSet::new();
    let mut broken = Vec::new();

    for id in ids {
        if !is_valid(*id) || !used.insert(*id) {
            broken.push(id);
        }
    }

    for id in broken {
        *id = next_free(&used);
        used.insert(*id);
    }
}
