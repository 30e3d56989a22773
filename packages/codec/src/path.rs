//! Column paths and the key-joining convention.
//!
//! A column header is the text form of a [`Path`]: segments joined with `.`.
//! Inside a segment every literal `.` is written `/.`, and a literal `/` is
//! written `//` whenever it is followed by `.` or `/` or ends the segment.
//! Any other `/` is written as-is. This keeps the joined text injective while
//! staying byte-identical to the older `/.`-only form for every name that
//! doesn't end in `/` or contain `//` or `/.`.

use std::fmt;

/// Separates segments in a joined key.
pub const DELIMITER: char = '.';

/// Introduces a two-character escape inside a segment.
pub const ESCAPE: char = '/';

/// An unescaped location inside a structured value.
///
/// Segments are mapping member names or decimal sequence indices. The empty
/// path is the root.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Path {
    pub segments: Vec<String>,
}

impl Path {
    /// The root path.
    pub fn root() -> Self {
        Path {
            segments: Vec::new(),
        }
    }

    pub fn new(segments: Vec<String>) -> Self {
        Path { segments }
    }

    /// Split a joined key into unescaped segments.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use structsheet_codec::Path;
    ///
    /// let path = Path::from_key("3/.2.0");
    /// assert_eq!(path.segments, vec!["3.2", "0"]);
    /// assert_eq!(Path::from_key(""), Path::root());
    /// ```
    pub fn from_key(key: &str) -> Self {
        if key.is_empty() {
            return Path::root();
        }

        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = key.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                ESCAPE => match chars.peek() {
                    Some(&next) if next == DELIMITER || next == ESCAPE => {
                        current.push(next);
                        chars.next();
                    }
                    _ => current.push(ESCAPE),
                },
                DELIMITER => segments.push(std::mem::take(&mut current)),
                c => current.push(c),
            }
        }
        segments.push(current);

        Path { segments }
    }

    /// Join the escaped segments into a key.
    pub fn to_key(&self) -> String {
        let mut key = String::new();
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                key.push(DELIMITER);
            }
            escape_into(&mut key, segment);
        }
        key
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.segments.iter()
    }

    /// The last segment, if any.
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// A new path with `segment` appended.
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Path {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Path { segments }
    }

    /// The path without its last segment. The root's parent is `None`.
    #[must_use]
    pub fn parent(&self) -> Option<Path> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Path {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }
}

/// Escape a single segment.
pub fn escape_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    escape_into(&mut out, segment);
    out
}

fn escape_into(out: &mut String, segment: &str) {
    let mut chars = segment.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            DELIMITER => {
                out.push(ESCAPE);
                out.push(DELIMITER);
            }
            ESCAPE => match chars.peek() {
                None => {
                    out.push(ESCAPE);
                    out.push(ESCAPE);
                }
                Some(&next) if next == DELIMITER || next == ESCAPE => {
                    out.push(ESCAPE);
                    out.push(ESCAPE);
                }
                Some(_) => out.push(ESCAPE),
            },
            c => out.push(c),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_key())
    }
}

impl From<&str> for Path {
    fn from(key: &str) -> Self {
        Path::from_key(key)
    }
}
