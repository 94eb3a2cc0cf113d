//! Dotted paths addressing locations in a JSON tree.
//!
//! A path is a sequence of segments separated by `.`. A segment written `[N]`
//! (non-negative integer) is an array index, and may follow a key directly:
//! `servers[0].host`. A backslash makes the next character literal, so `\.` and
//! `\[` put a dot or bracket inside a key. An empty segment (as in `a..b`) is the
//! empty-string key.
//! Indices above [`MAX_INDEX`] are not indices: `a[99999999]` is the key
//! `a[99999999]`.
//!
//! ```rust
//! use jsonbind::path::{parse, Segment};
//!
//! assert_eq!(
//!     parse(r"a\.b.list[2]"),
//!     vec![
//!         Segment::Key("a.b".to_string()),
//!         Segment::Key("list".to_string()),
//!         Segment::Index(2),
//!     ]
//! );
//! ```
//!
//! [`flatten`] goes the other way, turning a value into the leaf paths a
//! [`crate::Builder`] would need to rebuild it.

use crate::Value;
use indexmap::IndexMap;
use std::fmt;

/// Largest index a `[N]` segment may carry.
///
/// Arrays are materialized densely, so this bounds the allocation a single
/// assignment can cause.
pub const MAX_INDEX: usize = 65_535;

/// One step of a path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(&escape(key)),
            Segment::Index(index) => write!(f, "[{}]", index),
        }
    }
}

/// Splits a path into segments.
///
/// A `[` that does not open a well-formed `[N]` index is kept as part of the key.
pub fn parse(path: &str) -> Vec<Segment> {
    let chars: Vec<char> = path.chars().collect();
    let mut segments = Vec::new();
    let mut key = String::new();
    // Whether a key segment is open; false right after a closing `]`.
    let mut in_key = true;
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' => {
                in_key = true;
                match chars.get(i + 1) {
                    Some(&next) => {
                        key.push(next);
                        i += 1;
                    }
                    None => key.push('\\'),
                }
            }
            '.' => {
                if in_key {
                    segments.push(Segment::Key(std::mem::take(&mut key)));
                }
                in_key = true;
            }
            '[' => match read_index(&chars[i + 1..]) {
                Some((index, used)) => {
                    if !key.is_empty() {
                        segments.push(Segment::Key(std::mem::take(&mut key)));
                    }
                    segments.push(Segment::Index(index));
                    in_key = false;
                    i += used;
                }
                None => {
                    in_key = true;
                    key.push('[');
                }
            },
            ch => {
                in_key = true;
                key.push(ch);
            }
        }
        i += 1;
    }

    if in_key {
        segments.push(Segment::Key(key));
    }
    segments
}

/// Reads `N]` after an opening bracket, returning the index and characters used.
fn read_index(rest: &[char]) -> Option<(usize, usize)> {
    let digits = rest.iter().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 || rest.get(digits) != Some(&']') {
        return None;
    }
    let text: String = rest[..digits].iter().collect();
    text.parse()
        .ok()
        .filter(|index| *index <= MAX_INDEX)
        .map(|index| (index, digits + 1))
}

/// Escapes a key so it reads back as a single segment.
///
/// # Examples
///
/// ```rust
/// use jsonbind::path::escape;
///
/// assert_eq!(escape("plain"), "plain");
/// assert_eq!(escape("a.b[0]"), r"a\.b\[0]");
/// ```
pub fn escape(key: &str) -> String {
    let mut escaped = String::with_capacity(key.len());
    for ch in key.chars() {
        if matches!(ch, '.' | '[' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Joins segments back into path text.
pub fn join(segments: &[Segment]) -> String {
    let mut path = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 && matches!(segment, Segment::Key(_)) {
            path.push('.');
        }
        path.push_str(&segment.to_string());
    }
    path
}

/// Flattens a value into `path -> text` pairs, one per scalar leaf.
///
/// Strings are kept verbatim; other scalars use their canonical text. Empty arrays
/// and objects have no leaves and disappear.
///
/// # Examples
///
/// ```rust
/// use jsonbind::{parse, path::flatten};
///
/// let value = parse(r#"{"my":{"number":42,"array":["one",3]}}"#).unwrap();
/// let flat = flatten(&value);
/// assert_eq!(flat["my.number"], "42");
/// assert_eq!(flat["my.array[0]"], "one");
/// assert_eq!(flat["my.array[1]"], "3");
/// ```
pub fn flatten(value: &Value) -> IndexMap<String, String> {
    let mut leaves = IndexMap::new();
    let mut segments = Vec::new();
    flatten_into(value, &mut segments, &mut leaves);
    leaves
}

fn flatten_into(value: &Value, segments: &mut Vec<Segment>, leaves: &mut IndexMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, member) in map.iter() {
                segments.push(Segment::Key(key.clone()));
                flatten_into(member, segments, leaves);
                segments.pop();
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                segments.push(Segment::Index(index));
                flatten_into(item, segments, leaves);
                segments.pop();
            }
        }
        Value::String(s) => {
            leaves.insert(join(segments), s.clone());
        }
        scalar => {
            leaves.insert(join(segments), scalar.to_string());
        }
    }
}
