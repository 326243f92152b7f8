//! Classified change records.
//!
//! A change tree mirrors the shape of the structural difference between two
//! value trees: [`ObjectChange`] nodes for nested tables and [`ValueChange`]
//! leaves for primitives and arrays.

use std::fmt;

use serde::Serialize;

use crate::value::Value;

/// One classified difference.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChangeRecord {
    /// A nested table that changed.
    Object(ObjectChange),
    /// A leaf value that changed.
    Value(ValueChange),
}

impl ChangeRecord {
    /// The property identifier as it appears in source.
    pub fn property_id(&self) -> &str {
        match self {
            Self::Object(c) => &c.property_id,
            Self::Value(c) => &c.property_id,
        }
    }

    /// The display name chosen for the property.
    pub fn property_name(&self) -> &str {
        match self {
            Self::Object(c) => &c.property_name,
            Self::Value(c) => &c.property_name,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectChange> {
        match self {
            Self::Object(c) => Some(c),
            Self::Value(_) => None,
        }
    }

    pub fn as_value(&self) -> Option<&ValueChange> {
        match self {
            Self::Value(c) => Some(c),
            Self::Object(_) => None,
        }
    }

    /// Number of leaf changes in this subtree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Object(c) => c.changes.iter().map(ChangeRecord::leaf_count).sum(),
            Self::Value(_) => 1,
        }
    }
}

/// How a nested table changed as a whole.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ObjectChangeKind {
    Added,
    Removed,
    Modified,
}

impl fmt::Display for ObjectChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "Added"),
            Self::Removed => write!(f, "Removed"),
            Self::Modified => write!(f, "Modified"),
        }
    }
}

/// How a leaf value changed.
///
/// `Buff` and `Nerf` are only produced when the property has a comparison
/// rule and both sides are numbers or both are booleans.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ValueChangeKind {
    Added,
    Removed,
    Buff,
    Nerf,
    Unknown,
}

impl fmt::Display for ValueChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "Added"),
            Self::Removed => write!(f, "Removed"),
            Self::Buff => write!(f, "Buff"),
            Self::Nerf => write!(f, "Nerf"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// A nested table with at least one classified change beneath it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectChange {
    pub property_id: String,
    pub property_name: String,
    #[serde(rename = "changeType")]
    pub kind: ObjectChangeKind,
    pub changes: Vec<ChangeRecord>,
    /// Set when the subtree belongs to a variant unit population.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub variant: bool,
}

impl ObjectChange {
    /// Find a direct child by property identifier.
    pub fn child(&self, property_id: &str) -> Option<&ChangeRecord> {
        self.changes.iter().find(|c| c.property_id() == property_id)
    }
}

/// A leaf difference between two values.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueChange {
    pub property_id: String,
    pub property_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
    #[serde(rename = "changeType")]
    pub kind: ValueChangeKind,
    /// `(new - prev) / prev`, set only when both sides are numbers. A zero
    /// `prev` yields a non-finite value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_change: Option<f64>,
    /// Set-difference of two arrays, set only when both sides are arrays.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub array_change: Option<ArrayDelta>,
}

/// Membership-based difference between two arrays.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ArrayDelta {
    /// Elements of the new array absent from the previous one.
    pub added: Vec<Value>,
    /// Elements of the previous array absent from the new one.
    pub removed: Vec<Value>,
}

impl ArrayDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
