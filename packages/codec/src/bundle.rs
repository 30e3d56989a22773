//! Index Bundler: scattered row positions -> consecutive runs.

use std::collections::BTreeSet;

/// A closed interval `[start, end]` of consecutive positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IndexRun {
    start: usize,
    end: usize,
}

impl IndexRun {
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of positions in the run. Never zero.
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index <= self.end
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> {
        self.start..=self.end
    }
}

/// Group positions into maximal runs of consecutive values.
///
/// Duplicates collapse. Runs come back ascending by start, are pairwise
/// disjoint, and together hold exactly the input positions.
///
/// # Examples
///
/// ```rust
/// use structsheet_codec::bundle;
///
/// let runs = bundle([1, 2, 3, 10, 11]);
/// assert_eq!(runs.len(), 2);
/// assert_eq!((runs[1].start(), runs[1].end()), (10, 11));
/// ```
pub fn bundle(indices: impl IntoIterator<Item = usize>) -> Vec<IndexRun> {
    let sorted: BTreeSet<usize> = indices.into_iter().collect();

    let mut runs: Vec<IndexRun> = Vec::new();
    for index in sorted {
        match runs.last_mut() {
            Some(run) if run.end + 1 == index => run.end = index,
            _ => runs.push(IndexRun {
                start: index,
                end: index,
            }),
        }
    }
    runs
}
