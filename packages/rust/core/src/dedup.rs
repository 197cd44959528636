//! Title-based deduplication and id maintenance.
//!
//! Titles are the dedup key: exact, case-sensitive, no normalization. They are
//! held in a hash set so admitting M candidates against N stored records is
//! O(N + M).

use std::collections::HashSet;

use regwatch_shared::RegulationRecord;

/// Every title seen so far in a run: stored records plus admitted candidates.
#[derive(Debug, Clone, Default)]
pub struct TitleIndex {
    titles: HashSet<String>,
}

impl TitleIndex {
    pub fn from_records(records: &[RegulationRecord]) -> Self {
        Self {
            titles: records.iter().map(|r| r.title.clone()).collect(),
        }
    }

    pub fn contains(&self, title: &str) -> bool {
        self.titles.contains(title)
    }

    /// Record `title`; returns `false` if it was already present.
    pub fn insert(&mut self, title: &str) -> bool {
        if self.titles.contains(title) {
            return false;
        }
        self.titles.insert(title.to_string())
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

/// Candidates that survived deduplication, plus how many were dropped.
#[derive(Debug, Clone, Default)]
pub struct Admitted {
    pub records: Vec<RegulationRecord>,
    pub duplicates: usize,
}

/// Keep candidates whose title is not yet in `index`, first occurrence wins.
/// Admitted titles are added to the index, so later candidates in the same
/// run are checked against them too.
pub fn admit(index: &mut TitleIndex, candidates: Vec<RegulationRecord>) -> Admitted {
    let mut admitted = Admitted::default();
    for candidate in candidates {
        if index.insert(&candidate.title) {
            admitted.records.push(candidate);
        } else {
            admitted.duplicates += 1;
        }
    }
    admitted
}

/// Clear `isNew` on every record.
pub fn reset_new_flags(records: &mut [RegulationRecord]) {
    for record in records {
        record.is_new = false;
    }
}

/// Reassign ids 1..=N in collection order.
pub fn renumber(records: &mut [RegulationRecord]) {
    for (record, id) in records.iter_mut().zip(1u64..) {
        record.id = id;
    }
}
