//! Property path parsing and data-graph navigation
//!
//! Paths use dotted/indexed syntax (`order.lines[2].amount`). Assignment
//! creates intermediate records and lists on demand; the current target is
//! always passed explicitly, so no navigation state survives between calls.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::data::DataValue;

/// Errors raised while parsing a path or navigating a data graph
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathError {
    /// Path string is empty
    #[error("empty property path")]
    Empty,

    /// A dotted segment has no characters
    #[error("empty segment in path '{0}'")]
    EmptySegment(String),

    /// An index bracket is never closed
    #[error("unclosed index bracket in path '{0}'")]
    UnclosedIndex(String),

    /// Index brackets hold something other than a number
    #[error("invalid index '{index}' in path '{path}'")]
    InvalidIndex {
        /// Full path text
        path: String,
        /// Offending bracket contents
        index: String,
    },

    /// Character where a separator was expected
    #[error("unexpected character '{ch}' at byte {at} in path '{path}'")]
    UnexpectedChar {
        /// Full path text
        path: String,
        /// Offending character
        ch: char,
        /// Byte offset
        at: usize,
    },

    /// A segment landed on an existing value of the wrong shape
    #[error("segment '{segment}' of '{path}' expects a {expected}, found {found}")]
    IncompatibleSegment {
        /// Full path text
        path: String,
        /// Segment that failed to navigate
        segment: String,
        /// Container shape the segment requires
        expected: &'static str,
        /// Shape actually present
        found: &'static str,
    },
}

/// One step of a property path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Record field access
    Field(String),
    /// List element access
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Field(name) => write!(f, "{}", name),
            Segment::Index(i) => write!(f, "[{}]", i),
        }
    }
}

/// A parsed dotted/indexed property path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPath {
    raw: String,
    segments: Vec<Segment>,
}

impl PropertyPath {
    /// Parse a path from its text form
    pub fn parse(s: &str) -> Result<Self, PathError> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        let bytes = s.as_bytes();
        let mut pos = 0;

        while pos < bytes.len() {
            match bytes[pos] {
                b'[' => {
                    let close = s[pos..]
                        .find(']')
                        .map(|off| pos + off)
                        .ok_or_else(|| PathError::UnclosedIndex(s.to_string()))?;
                    let digits = &s[pos + 1..close];
                    let index: usize =
                        digits
                            .parse()
                            .map_err(|_| PathError::InvalidIndex {
                                path: s.to_string(),
                                index: digits.to_string(),
                            })?;
                    segments.push(Segment::Index(index));
                    pos = close + 1;

                    // After a bracket, only '.', another bracket, or the end.
                    if pos < bytes.len() && bytes[pos] == b'.' {
                        pos += 1;
                        if pos == bytes.len() {
                            return Err(PathError::EmptySegment(s.to_string()));
                        }
                    } else if pos < bytes.len() && bytes[pos] != b'[' {
                        return Err(PathError::UnexpectedChar {
                            path: s.to_string(),
                            ch: s[pos..].chars().next().unwrap_or('?'),
                            at: pos,
                        });
                    }
                }
                b'.' => return Err(PathError::EmptySegment(s.to_string())),
                _ => {
                    let start = pos;
                    while pos < bytes.len() && bytes[pos] != b'.' && bytes[pos] != b'[' {
                        if bytes[pos] == b']' {
                            return Err(PathError::UnexpectedChar {
                                path: s.to_string(),
                                ch: ']',
                                at: pos,
                            });
                        }
                        pos += 1;
                    }
                    segments.push(Segment::Field(s[start..pos].to_string()));
                    if pos < bytes.len() && bytes[pos] == b'.' {
                        pos += 1;
                        if pos == bytes.len() {
                            return Err(PathError::EmptySegment(s.to_string()));
                        }
                    }
                }
            }
        }

        Ok(Self {
            raw: s.to_string(),
            segments,
        })
    }

    /// The original text form
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The parsed segments
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl FromStr for PropertyPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Descend one segment, creating the container the segment requires when the
/// slot is still null.
fn descend<'a>(
    current: &'a mut DataValue,
    segment: &Segment,
    path: &PropertyPath,
) -> Result<&'a mut DataValue, PathError> {
    if current.is_null() {
        *current = match segment {
            Segment::Field(_) => DataValue::record(),
            Segment::Index(_) => DataValue::list(),
        };
    }

    match (current, segment) {
        (DataValue::Record(map), Segment::Field(name)) => {
            Ok(map.entry(name.clone()).or_insert(DataValue::Null))
        }
        (DataValue::List(items), Segment::Index(i)) => {
            while items.len() <= *i {
                items.push(DataValue::Null);
            }
            Ok(&mut items[*i])
        }
        (other, segment) => Err(PathError::IncompatibleSegment {
            path: path.as_str().to_string(),
            segment: segment.to_string(),
            expected: match segment {
                Segment::Field(_) => "record",
                Segment::Index(_) => "list",
            },
            found: other.type_name(),
        }),
    }
}

/// Assign `value` at `path` inside `root`, creating intermediate records and
/// lists as needed. Lists are padded with nulls up to the written index.
pub fn set_path(
    root: &mut DataValue,
    path: &PropertyPath,
    value: DataValue,
) -> Result<(), PathError> {
    let mut current = root;
    for segment in path.segments() {
        current = descend(current, segment, path)?;
    }
    *current = value;
    Ok(())
}

/// Read the value at `path` inside `root`. Missing or shape-mismatched
/// segments yield `None`.
pub fn get_path<'a>(root: &'a DataValue, path: &PropertyPath) -> Option<&'a DataValue> {
    let mut current = root;
    for segment in path.segments() {
        current = match (current, segment) {
            (DataValue::Record(map), Segment::Field(name)) => map.get(name)?,
            (DataValue::List(items), Segment::Index(i)) => items.get(*i)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Mutable counterpart of [`get_path`]
pub fn get_path_mut<'a>(
    root: &'a mut DataValue,
    path: &PropertyPath,
) -> Option<&'a mut DataValue> {
    let mut current = root;
    for segment in path.segments() {
        current = match (current, segment) {
            (DataValue::Record(map), Segment::Field(name)) => map.get_mut(name)?,
            (DataValue::List(items), Segment::Index(i)) => items.get_mut(*i)?,
            _ => return None,
        };
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn path(s: &str) -> PropertyPath {
        PropertyPath::parse(s).unwrap()
    }

    #[test]
    fn test_parse_simple() {
        assert_eq!(
            path("id").segments(),
            &[Segment::Field("id".to_string())]
        );
        assert_eq!(
            path("order.total").segments(),
            &[
                Segment::Field("order".to_string()),
                Segment::Field("total".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_indexed() {
        assert_eq!(
            path("lines[2].amount").segments(),
            &[
                Segment::Field("lines".to_string()),
                Segment::Index(2),
                Segment::Field("amount".to_string()),
            ]
        );
        assert_eq!(
            path("grid[1][2]").segments(),
            &[
                Segment::Field("grid".to_string()),
                Segment::Index(1),
                Segment::Index(2),
            ]
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(PropertyPath::parse(""), Err(PathError::Empty));
        assert!(matches!(
            PropertyPath::parse("a..b"),
            Err(PathError::EmptySegment(_))
        ));
        assert!(matches!(
            PropertyPath::parse("a."),
            Err(PathError::EmptySegment(_))
        ));
        assert!(matches!(
            PropertyPath::parse("a[1"),
            Err(PathError::UnclosedIndex(_))
        ));
        assert!(matches!(
            PropertyPath::parse("a[x]"),
            Err(PathError::InvalidIndex { .. })
        ));
        assert!(matches!(
            PropertyPath::parse("a[1]b"),
            Err(PathError::UnexpectedChar { .. })
        ));
    }

    #[test]
    fn test_set_creates_intermediates() {
        let mut root = DataValue::record();
        set_path(&mut root, &path("order.lines[1].amount"), DataValue::from(9)).unwrap();

        let lines = root.get("order").unwrap().get("lines").unwrap();
        let lines = lines.as_list().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], DataValue::Null);
        assert_eq!(lines[1].get("amount"), Some(&DataValue::Int(9)));
    }

    #[test]
    fn test_set_overwrites() {
        let mut root = DataValue::record();
        set_path(&mut root, &path("x"), DataValue::from(1)).unwrap();
        set_path(&mut root, &path("x"), DataValue::from(2)).unwrap();
        assert_eq!(root.get("x"), Some(&DataValue::Int(2)));
    }

    #[test]
    fn test_set_incompatible_segment() {
        let mut root = DataValue::record();
        set_path(&mut root, &path("x"), DataValue::from("text")).unwrap();

        let err = set_path(&mut root, &path("x.y"), DataValue::from(1)).unwrap_err();
        assert!(matches!(err, PathError::IncompatibleSegment { found: "text", .. }));
    }

    #[test]
    fn test_get_path() {
        let mut root = DataValue::record();
        set_path(&mut root, &path("a.b[0]"), DataValue::from(7)).unwrap();

        assert_eq!(get_path(&root, &path("a.b[0]")), Some(&DataValue::Int(7)));
        assert_eq!(get_path(&root, &path("a.b[1]")), None);
        assert_eq!(get_path(&root, &path("a.missing")), None);
        assert_eq!(get_path(&root, &path("a.b[0].deeper")), None);
    }
}
