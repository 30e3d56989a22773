//! Header sets: the ordered column layout of a table.

use std::ops::Index;

use crate::error::{Error, Result};

/// Ordered, unique column keys.
///
/// Column positions are stable: a header set only ever grows at the end, so
/// rows written under an older snapshot stay valid at their original
/// offsets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderSet {
    headers: Vec<String>,
}

impl HeaderSet {
    pub const fn new() -> Self {
        HeaderSet {
            headers: Vec::new(),
        }
    }

    /// Take a header row exactly as stored, one key per column.
    ///
    /// Unlike `From<Vec<String>>` this keeps repeated keys (typically the
    /// blank cells of unused columns) so the set stays as wide as the rows
    /// written under it.
    pub fn from_cells(cells: Vec<String>) -> Self {
        HeaderSet { headers: cells }
    }

    /// Check if this is the single blank column of a table that has never
    /// had headers written.
    pub fn is_placeholder(&self) -> bool {
        self.headers.len() == 1 && self.headers[0].is_empty()
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.headers.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.headers
    }

    pub fn contains(&self, header: &str) -> bool {
        self.headers.iter().any(|h| h == header)
    }

    /// Zero-based column offset of a header.
    pub fn position(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Zero-based column offset of a header, or `ColumnNotFound`.
    pub fn require(&self, header: &str) -> Result<usize> {
        self.position(header).ok_or_else(|| Error::ColumnNotFound {
            header: header.to_string(),
        })
    }

    /// Check if `other` keeps every column of `self` at the same offset.
    ///
    /// The placeholder set is extended by anything.
    pub fn is_extended_by(&self, other: &HeaderSet) -> bool {
        if self.is_placeholder() {
            return true;
        }
        other.len() >= self.len() && other.headers[..self.len()] == self.headers[..]
    }

    pub fn into_vec(self) -> Vec<String> {
        self.headers
    }
}

/// Build a header set, keeping the first occurrence of duplicate keys.
impl From<Vec<String>> for HeaderSet {
    fn from(headers: Vec<String>) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(headers.len());
        for header in headers {
            if !unique.contains(&header) {
                unique.push(header);
            }
        }
        HeaderSet { headers: unique }
    }
}

impl From<Vec<&str>> for HeaderSet {
    fn from(headers: Vec<&str>) -> Self {
        HeaderSet::from(headers.into_iter().map(String::from).collect::<Vec<_>>())
    }
}

impl Index<usize> for HeaderSet {
    type Output = String;

    fn index(&self, i: usize) -> &Self::Output {
        &self.headers[i]
    }
}

impl<'a> IntoIterator for &'a HeaderSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.headers.iter()
    }
}

/// Combine the current headers with headers needed for new values.
///
/// The result is `existing` unchanged, followed by every header of `incoming`
/// that isn't already present, in `incoming`'s order. A placeholder
/// `existing` set counts as empty.
///
/// # Examples
///
/// ```rust
/// use structsheet_codec::{append_merge, HeaderSet};
///
/// let merged = append_merge(
///     &HeaderSet::from(vec!["e5", "e2", "e3"]),
///     &HeaderSet::from(vec!["e2", "e5", "n1", "n2"]),
/// );
/// assert_eq!(merged.as_slice(), ["e5", "e2", "e3", "n1", "n2"]);
/// ```
pub fn append_merge(existing: &HeaderSet, incoming: &HeaderSet) -> HeaderSet {
    let mut headers = if existing.is_placeholder() {
        Vec::new()
    } else {
        existing.headers.clone()
    };

    for header in incoming {
        if !headers.contains(header) {
            headers.push(header.clone());
        }
    }

    HeaderSet { headers }
}

/// Check that `requested` can replace `current` without moving or removing a
/// column.
pub fn check_extension(current: &HeaderSet, requested: &HeaderSet) -> Result<()> {
    if current.is_extended_by(requested) {
        Ok(())
    } else {
        Err(Error::HeaderReductionUnsupported {
            current: current.len(),
            requested: requested.len(),
        })
    }
}
