use serde::{Deserialize, Serialize};

use crate::rule::BuffRule;

/// Declared shape of a property's value.
///
/// Only the array shapes change decoding: a string literal under a
/// `StringArray` or `NumberArray` property is split on single spaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueShape {
    String,
    StringArray,
    Number,
    NumberArray,
    Boolean,
    NumberMap,
    AnyMap,
    UnitDefObject,
}

impl ValueShape {
    /// Returns `true` for shapes that are stored as space-separated strings.
    pub fn is_split_string(self) -> bool {
        matches!(self, Self::StringArray | Self::NumberArray)
    }
}

/// Catalog entry for one property identifier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDef {
    /// Human-readable name used in change records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<ValueShape>,
    /// Comparison rule used to classify buffs and nerfs.
    #[serde(default, rename = "buff", skip_serializing_if = "Option::is_none")]
    pub buff_rule: Option<BuffRule>,
    /// `Some(false)` excludes the property from change records entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_change: Option<bool>,
}

impl PropertyDef {
    /// Entry with only a display name.
    pub fn named(friendly_name: impl Into<String>) -> Self {
        Self {
            friendly_name: Some(friendly_name.into()),
            ..Default::default()
        }
    }

    pub fn with_shape(mut self, shape: ValueShape) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn with_rule(mut self, rule: BuffRule) -> Self {
        self.buff_rule = Some(rule);
        self
    }

    pub fn with_balance_change(mut self, relevant: bool) -> Self {
        self.balance_change = Some(relevant);
        self
    }

    /// Properties are relevant unless explicitly marked otherwise.
    pub fn is_balance_relevant(&self) -> bool {
        self.balance_change != Some(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undeclared_relevance_counts_as_relevant() {
        assert!(PropertyDef::default().is_balance_relevant());
        assert!(PropertyDef::named("Range").with_balance_change(true).is_balance_relevant());
        assert!(!PropertyDef::named("Model").with_balance_change(false).is_balance_relevant());
    }

    #[test]
    fn only_array_shapes_split_strings() {
        assert!(ValueShape::StringArray.is_split_string());
        assert!(ValueShape::NumberArray.is_split_string());
        assert!(!ValueShape::String.is_split_string());
        assert!(!ValueShape::AnyMap.is_split_string());
    }
}
