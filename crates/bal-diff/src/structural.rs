//! Structural diff: where two value trees disagree.
//!
//! The result records keys only. Leaf values are re-read from the two trees
//! by the classifier.

use bal_types::{parse_number_token, Table, Value};

/// Recursive set of keys whose values differ between two tables.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StructuralDiff {
    entries: Vec<(String, DiffNode)>,
}

/// How a single key differs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffNode {
    /// The value differs and at least one side is not a table.
    Changed,
    /// At least one side is a table; holds the difference beneath it.
    Nested(StructuralDiff),
}

impl StructuralDiff {
    /// Create an empty diff.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the two sides are deep-equal.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of differing keys at this level.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, key: &str) -> Option<&DiffNode> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, n)| n)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DiffNode)> {
        self.entries.iter().map(|(k, n)| (k.as_str(), n))
    }

    /// A diff whose first key reads as a number came from two positional
    /// lists and is reported as one leaf change rather than recursed into.
    /// Keys are read with [`parse_number_token`], so `""` and `"Infinity"`
    /// count as numeric.
    pub fn is_array_shaped(&self) -> bool {
        self.entries
            .first()
            .is_some_and(|(k, _)| !parse_number_token(k).is_nan())
    }

    /// Total number of `Changed` leaves in the whole diff.
    pub fn leaf_count(&self) -> usize {
        self.entries
            .iter()
            .map(|(_, node)| match node {
                DiffNode::Changed => 1,
                DiffNode::Nested(sub) => sub.leaf_count(),
            })
            .sum()
    }

    fn push(&mut self, key: &str, node: DiffNode) {
        self.entries.push((key.to_string(), node));
    }
}

impl FromIterator<(String, DiffNode)> for StructuralDiff {
    fn from_iter<I: IntoIterator<Item = (String, DiffNode)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Compute the structural difference between two optional trees.
///
/// A side that is absent or not a table contributes no keys. Keys only in
/// `previous` come first, in `previous` order, followed by the differing keys
/// of `current` in `current` order.
pub fn diff(previous: Option<&Value>, current: Option<&Value>) -> StructuralDiff {
    diff_tables(
        previous.and_then(Value::as_table),
        current.and_then(Value::as_table),
    )
}

fn diff_tables(previous: Option<&Table>, current: Option<&Table>) -> StructuralDiff {
    let mut result = StructuralDiff::new();

    if let Some(prev) = previous {
        for (key, old) in prev.iter() {
            if current.is_some_and(|cur| cur.contains_key(key)) {
                continue;
            }
            result.push(key, node(Some(old), None));
        }
    }

    if let Some(cur) = current {
        for (key, new) in cur.iter() {
            let old = previous.and_then(|prev| prev.get(key));
            if old.is_some_and(|old| old.deep_eq(new)) {
                continue;
            }
            result.push(key, node(old, Some(new)));
        }
    }

    result
}

fn node(old: Option<&Value>, new: Option<&Value>) -> DiffNode {
    if old.is_some_and(Value::is_object) || new.is_some_and(Value::is_object) {
        DiffNode::Nested(diff(old, new))
    } else {
        DiffNode::Changed
    }
}
