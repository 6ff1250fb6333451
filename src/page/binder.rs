// src/page/binder.rs
// =============================================================================
// The element binder: pairs template clones with fetched records.
//
// How it works:
// 1. Take the next card and the next record together
// 2. Build the card's content from the record and populate the card
// 3. Stop as soon as either list runs out
// 4. Cards that never got a record are removed from the section
//
// For N cards and M records exactly min(N, M) cards are populated, in order,
// and N - min(N, M) are removed. Nothing is ever left half-filled.
// =============================================================================

use super::card::{CardContent, CardElement};
use super::section::Section;

/// Result of walking two sequences in lockstep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lockstep<O, E> {
    /// One output per (element, record) pair, in order
    pub applied: Vec<O>,
    /// Elements left over once the records ran out
    pub unused: Vec<E>,
}

/// Walks `elements` and `records` together, calling `apply` on each pair,
/// until either runs out.
pub fn lockstep<E, T, O>(
    elements: Vec<E>,
    records: impl IntoIterator<Item = T>,
    mut apply: impl FnMut(E, T) -> O,
) -> Lockstep<O, E> {
    let mut elements = elements.into_iter();
    let mut applied = Vec::new();

    for record in records {
        let Some(element) = elements.next() else {
            break;
        };
        applied.push(apply(element, record));
    }

    Lockstep {
        applied,
        unused: elements.collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillReport {
    pub populated: usize,
    pub removed: usize,
}

/// Populates a section's cards from `records` using the pure `populate`
/// function, and drops the cards that are left over.
pub fn fill_cards<T>(
    section: &mut Section,
    records: &[T],
    populate: impl Fn(&T) -> CardContent,
) -> FillReport {
    let result = lockstep(section.take_cards(), records, |card: CardElement, record| {
        card.populate(populate(record))
    });

    let report = FillReport {
        populated: result.applied.len(),
        removed: result.unused.len(),
    };

    section.set_cards(result.applied);
    report
}
