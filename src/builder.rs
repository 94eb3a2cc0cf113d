//! Path-addressed incremental construction of JSON values.
//!
//! A [`Builder`] collects `(path, value)` assignments and resolves them into one
//! [`Value`] on [`Builder::build`]. Paths use the syntax described in
//! [`crate::path`].
//!
//! ## Resolution
//!
//! - A node assigned directly resolves to the assigned value.
//! - A node with no children resolves to `Null`.
//! - A node whose children are all `[N]` indices resolves to an array of length
//!   `max(N) + 1`; unassigned slots are `Null`. An index above
//!   [`path::MAX_INDEX`](crate::path::MAX_INDEX) makes the node an object
//!   instead, with `[N]` as the key.
//! - Any other node resolves to an object with keys in first-seen order.
//!
//! ```rust
//! use jsonbind::{Builder, Value};
//!
//! let mut builder = Builder::new();
//! builder.set("a[0]", "x").set("a[2]", "y").set("b.y", 1).set("b.x", 2);
//! assert_eq!(builder.build().to_string(), r#"{"a":["x",null,"y"],"b":{"y":1,"x":2}}"#);
//! ```
//!
//! Assigning a path replaces everything previously at or below it, and assigning
//! below a scalar turns that scalar into a container:
//!
//! ```rust
//! use jsonbind::Builder;
//!
//! let mut builder = Builder::new();
//! builder.set("a.b", 1).set("a", 2);
//! assert_eq!(builder.build().to_string(), r#"{"a":2}"#);
//!
//! builder.set("a.c", 3);
//! assert_eq!(builder.build().to_string(), r#"{"a":{"c":3}}"#);
//! ```

use crate::path::{self, Segment};
use crate::{Map, Value};
use indexmap::IndexMap;

/// Tree node: either a directly assigned value or children, never both.
#[derive(Clone, Debug, Default)]
struct Node {
    value: Option<Value>,
    children: IndexMap<Segment, Node>,
}

impl Node {
    fn child(&mut self, segment: &Segment) -> &mut Node {
        self.value = None;
        self.children.entry(segment.clone()).or_default()
    }

    fn assign(&mut self, value: Value) {
        self.children.clear();
        self.value = Some(value);
    }

    fn resolve(&self) -> Value {
        if let Some(value) = &self.value {
            return value.clone();
        }
        if self.children.is_empty() {
            return Value::Null;
        }

        let indices: Option<Vec<usize>> = self
            .children
            .keys()
            .map(|segment| match segment {
                Segment::Index(index) if *index <= path::MAX_INDEX => Some(*index),
                _ => None,
            })
            .collect();

        match indices {
            Some(indices) => {
                let len = indices
                    .iter()
                    .max()
                    .and_then(|max| max.checked_add(1))
                    .unwrap_or(0);
                let mut items = vec![Value::Null; len];
                for (index, child) in indices.into_iter().zip(self.children.values()) {
                    if let Some(slot) = items.get_mut(index) {
                        *slot = child.resolve();
                    }
                }
                Value::Array(items)
            }
            None => {
                let mut members = Map::with_capacity(self.children.len());
                for (segment, child) in &self.children {
                    let key = match segment {
                        Segment::Key(key) => key.clone(),
                        Segment::Index(index) => format!("[{}]", index),
                    };
                    members.insert(key, child.resolve());
                }
                Value::Object(members)
            }
        }
    }
}

/// A mutable tree that resolves into a [`Value`].
///
/// Intended for a single writer; `build` may be called any number of times and
/// always reflects the assignments made so far.
///
/// # Examples
///
/// ```rust
/// use jsonbind::Builder;
///
/// let mut builder = Builder::new();
/// builder.set(r"a\.b", 1);
/// builder.set("a.b", 1);
/// assert_eq!(builder.build().to_string(), r#"{"a.b":1,"a":{"b":1}}"#);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Builder {
    root: Node,
}

impl Builder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `value` at `path`, replacing anything at or below it.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> &mut Self {
        self.set_segments(&path::parse(path), value.into())
    }

    /// Installs `value` at an already split path.
    ///
    /// An empty slice addresses the root.
    pub fn set_segments(&mut self, segments: &[Segment], value: Value) -> &mut Self {
        let mut node = &mut self.root;
        for segment in segments {
            node = node.child(segment);
        }
        node.assign(value);
        self
    }

    /// Resolves the current tree into a value.
    #[must_use]
    pub fn build(&self) -> Value {
        self.root.resolve()
    }

    /// Returns `true` if nothing has been assigned since creation or [`Builder::clear`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.value.is_none() && self.root.children.is_empty()
    }

    pub fn clear(&mut self) {
        self.root = Node::default();
    }
}

impl<P: AsRef<str>, V: Into<Value>> FromIterator<(P, V)> for Builder {
    fn from_iter<T: IntoIterator<Item = (P, V)>>(iter: T) -> Self {
        let mut builder = Builder::new();
        builder.extend(iter);
        builder
    }
}

impl<P: AsRef<str>, V: Into<Value>> Extend<(P, V)> for Builder {
    fn extend<T: IntoIterator<Item = (P, V)>>(&mut self, iter: T) {
        for (path, value) in iter {
            self.set(path.as_ref(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_builder_is_null() {
        let builder = Builder::new();
        assert!(builder.is_empty());
        assert_eq!(builder.build(), Value::Null);
    }

    #[test]
    fn test_root_assignment() {
        let mut builder = Builder::new();
        builder.set_segments(&[], Value::Int(5));
        assert_eq!(builder.build(), Value::Int(5));
        assert!(!builder.is_empty());
    }

    #[test]
    fn test_root_array() {
        let mut builder = Builder::new();
        builder.set("[1]", true);
        assert_eq!(builder.build().to_string(), "[null,true]");
    }

    #[test]
    fn test_mixed_children_resolve_to_object() {
        let mut builder = Builder::new();
        builder.set("a[1]", 1).set("a.x", 2);
        assert_eq!(builder.build().to_string(), r#"{"a":{"[1]":1,"x":2}}"#);
    }

    #[test]
    fn test_container_overwritten_by_index() {
        let mut builder = Builder::new();
        builder.set("a.b.c", 1).set("a.b[0]", 2);
        assert_eq!(builder.build().to_string(), r#"{"a":{"b":{"c":1,"[0]":2}}}"#);
    }

    #[test]
    fn test_empty_key_segment() {
        let mut builder = Builder::new();
        builder.set("a..b", 1);
        assert_eq!(builder.build().to_string(), r#"{"a":{"":{"b":1}}}"#);
    }

    #[test]
    fn test_clear_and_reuse() {
        let mut builder: Builder = [("x", 1), ("y", 2)].into_iter().collect();
        assert_eq!(builder.build().to_string(), r#"{"x":1,"y":2}"#);
        builder.clear();
        assert!(builder.is_empty());
        builder.set("z", "s");
        assert_eq!(builder.build().to_string(), r#"{"z":"s"}"#);
    }
}
