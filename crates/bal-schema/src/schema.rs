use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::catalog;
use crate::error::{SchemaError, SchemaResult};
use crate::property::{PropertyDef, ValueShape};
use crate::rule::BuffRule;

/// On-disk layout of a schema file.
///
/// ```toml
/// [properties.maxdamage]
/// friendly_name = "Base HP"
/// shape = "number"
/// buff = "higher-is-better"
/// balance_change = true
/// ```
#[derive(Debug, Default, Deserialize)]
struct SchemaFile {
    #[serde(default)]
    properties: BTreeMap<String, PropertyDef>,
}

/// Immutable property catalog consulted by the decoder and the classifier.
///
/// A schema is built once and passed by reference; nothing in the workspace
/// holds one globally.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropertySchema {
    properties: HashMap<String, PropertyDef>,
}

impl PropertySchema {
    /// Create an empty schema. Every lookup misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in catalog for Spring-engine unit definitions.
    pub fn builtin() -> Self {
        catalog::entries()
            .map(|(id, def)| (id.to_string(), def))
            .collect()
    }

    /// Parse a schema from TOML text.
    pub fn from_toml_str(text: &str) -> SchemaResult<Self> {
        let file: SchemaFile = toml::from_str(text)?;
        Ok(file.properties.into_iter().collect())
    }

    /// Load a schema from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let schema = Self::from_toml_str(&text)?;
        debug!(path = %path.display(), properties = schema.len(), "loaded property schema");
        Ok(schema)
    }

    /// Overlay `other` onto this schema. Entries in `other` replace entries
    /// with the same identifier.
    pub fn merge(mut self, other: PropertySchema) -> Self {
        self.properties.extend(other.properties);
        self
    }

    pub fn insert(&mut self, id: impl Into<String>, def: PropertyDef) -> Option<PropertyDef> {
        self.properties.insert(id.into(), def)
    }

    /// Look up a property by identifier, falling back to its lower-cased
    /// form. A miss is not an error: callers apply defaults.
    pub fn lookup(&self, id: &str) -> Option<&PropertyDef> {
        self.properties.get(id).or_else(|| {
            let lower = id.to_lowercase();
            if lower == id {
                None
            } else {
                self.properties.get(&lower)
            }
        })
    }

    pub fn shape_of(&self, id: &str) -> Option<ValueShape> {
        self.lookup(id).and_then(|def| def.shape)
    }

    /// Shape declared under exactly `id`, with no case folding. Decoding
    /// splits list-shaped strings only on an exact key match.
    pub fn exact_shape_of(&self, id: &str) -> Option<ValueShape> {
        self.properties.get(id).and_then(|def| def.shape)
    }

    pub fn rule_of(&self, id: &str) -> Option<BuffRule> {
        self.lookup(id).and_then(|def| def.buff_rule)
    }

    pub fn friendly_name(&self, id: &str) -> Option<&str> {
        self.lookup(id).and_then(|def| def.friendly_name.as_deref())
    }

    /// `false` only when the entry explicitly marks the property irrelevant.
    pub fn is_balance_relevant(&self, id: &str) -> bool {
        self.lookup(id).map_or(true, PropertyDef::is_balance_relevant)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, PropertyDef)> for PropertySchema {
    fn from_iter<I: IntoIterator<Item = (K, PropertyDef)>>(iter: I) -> Self {
        Self {
            properties: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_catalog_has_core_entries() {
        let schema = PropertySchema::builtin();
        assert_eq!(schema.friendly_name("maxdamage"), Some("Base HP"));
        assert_eq!(schema.rule_of("maxdamage"), Some(BuffRule::HigherIsBetter));
        assert_eq!(schema.rule_of("reloadtime"), Some(BuffRule::LowerIsBetter));
        assert_eq!(schema.shape_of("category"), Some(ValueShape::StringArray));
        assert_eq!(schema.shape_of("collisionvolumescales"), Some(ValueShape::NumberArray));
        assert!(!schema.is_balance_relevant("objectname"));
        assert!(schema.is_balance_relevant("explodeas"));
    }

    #[test]
    fn lookup_falls_back_to_lowercase() {
        let schema = PropertySchema::builtin();
        assert_eq!(schema.friendly_name("maxDamage"), Some("Base HP"));
        assert_eq!(schema.friendly_name("MAXDAMAGE"), Some("Base HP"));
    }

    #[test]
    fn exact_shape_ignores_case_fallback() {
        let schema = PropertySchema::builtin();
        assert_eq!(schema.exact_shape_of("category"), Some(ValueShape::StringArray));
        assert_eq!(schema.exact_shape_of("Category"), None);
        assert_eq!(schema.shape_of("Category"), Some(ValueShape::StringArray));
    }

    #[test]
    fn miss_defaults_to_relevant_without_rule() {
        let schema = PropertySchema::builtin();
        assert!(schema.lookup("not_a_property").is_none());
        assert!(schema.is_balance_relevant("not_a_property"));
        assert_eq!(schema.rule_of("not_a_property"), None);
    }

    #[test]
    fn parses_toml_schema() {
        let schema = PropertySchema::from_toml_str(
            r#"
            [properties.maxdamage]
            friendly_name = "Health"
            shape = "number"
            buff = "higher-is-better"

            [properties.objectname]
            balance_change = false
            "#,
        )
        .unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.friendly_name("maxdamage"), Some("Health"));
        assert!(!schema.is_balance_relevant("objectname"));
    }

    #[test]
    fn rejects_unknown_shape() {
        let err = PropertySchema::from_toml_str(
            r#"
            [properties.x]
            shape = "matrix"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::Parse(_)));
    }

    #[test]
    fn merge_overlays_entries() {
        let overlay = PropertySchema::from_toml_str(
            r#"
            [properties.maxdamage]
            friendly_name = "Health"
            "#,
        )
        .unwrap();
        let schema = PropertySchema::builtin().merge(overlay);
        assert_eq!(schema.friendly_name("maxdamage"), Some("Health"));
        assert_eq!(schema.rule_of("maxdamage"), None, "entries are replaced, not combined");
        assert_eq!(schema.friendly_name("range"), Some("Range"));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[properties.range]\nbuff = \"lower-is-better\"").unwrap();
        let schema = PropertySchema::from_toml_file(file.path()).unwrap();
        assert_eq!(schema.rule_of("range"), Some(BuffRule::LowerIsBetter));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = PropertySchema::from_toml_file("/nonexistent/schema.toml").unwrap_err();
        assert!(matches!(err, SchemaError::Io { .. }));
    }
}
