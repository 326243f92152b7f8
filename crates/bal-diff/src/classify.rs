//! Change classification: turn a [`StructuralDiff`] into change records.

use bal_schema::{BuffRule, PropertyDef, PropertySchema, UnitNames};
use bal_types::{
    ArrayDelta, ChangeRecord, ObjectChange, ObjectChangeKind, Value, ValueChange, ValueChangeKind,
};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::structural::{diff, DiffNode, StructuralDiff};

/// Keys with special meaning to the classifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// The only key reported from inside a custom-parameters table.
    pub balance_custom_key: String,
    /// Key of the free-form custom-parameters table.
    pub custom_params_key: String,
    /// Children of this table are always compared higher-is-better.
    pub damage_key: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            balance_custom_key: "paralyzemultiplier".into(),
            custom_params_key: "customparams".into(),
            damage_key: "damage".into(),
        }
    }
}

/// Context in which a table's keys are classified.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClassifyMode {
    #[default]
    Normal,
    /// Inside a custom-parameters table: only the balance custom key counts.
    CustomParams,
}

/// Classifies structural differences using a property schema and a table
/// of unit display names.
#[derive(Clone, Debug)]
pub struct Classifier<'a> {
    schema: &'a PropertySchema,
    names: &'a UnitNames,
    config: ClassifierConfig,
}

impl<'a> Classifier<'a> {
    pub fn new(schema: &'a PropertySchema, names: &'a UnitNames) -> Self {
        Self {
            schema,
            names,
            config: ClassifierConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ClassifierConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify every key of `diff`, in diff order.
    pub fn classify(
        &self,
        previous: Option<&Value>,
        current: Option<&Value>,
        diff: &StructuralDiff,
    ) -> Vec<ChangeRecord> {
        self.classify_in(previous, current, diff, ClassifyMode::Normal)
    }

    /// Classify with an explicit context.
    pub fn classify_in(
        &self,
        previous: Option<&Value>,
        current: Option<&Value>,
        diff: &StructuralDiff,
        mode: ClassifyMode,
    ) -> Vec<ChangeRecord> {
        self.walk(previous, current, diff, mode, None)
    }

    /// Diff and classify a decoded file, returning the change for the unit
    /// it defines.
    ///
    /// `bound_name` is the file's declared name, used as a display name
    /// when nothing better is known.
    pub fn classify_unit(
        &self,
        previous: Option<&Value>,
        current: Option<&Value>,
        bound_name: Option<&str>,
    ) -> Option<ObjectChange> {
        let diff = diff(previous, current);
        let records = self.walk(previous, current, &diff, ClassifyMode::Normal, bound_name);
        match records.into_iter().next()? {
            ChangeRecord::Object(unit) => Some(unit),
            ChangeRecord::Value(_) => None,
        }
    }

    fn walk(
        &self,
        previous: Option<&Value>,
        current: Option<&Value>,
        diff: &StructuralDiff,
        mode: ClassifyMode,
        bound_name: Option<&str>,
    ) -> Vec<ChangeRecord> {
        let own_name = first_entry_name(current).or_else(|| first_entry_name(previous));
        let mut records = Vec::new();

        for (key, node) in diff.iter() {
            let def = self.schema.lookup(key);
            if def.is_some_and(|d| !d.is_balance_relevant()) {
                trace!(key, "skipping property not relevant to balance");
                continue;
            }
            if mode == ClassifyMode::CustomParams && key != self.config.balance_custom_key {
                continue;
            }

            let name = self.display_name(key, def, own_name.or(bound_name));
            let old = child(previous, key);
            let new = child(current, key);

            match node {
                DiffNode::Nested(sub) if !sub.is_array_shaped() => {
                    let kind = match (old, new) {
                        (None, _) => ObjectChangeKind::Added,
                        (_, None) => ObjectChangeKind::Removed,
                        _ => ObjectChangeKind::Modified,
                    };
                    let sub_mode = if key == self.config.custom_params_key {
                        ClassifyMode::CustomParams
                    } else {
                        ClassifyMode::Normal
                    };
                    let mut changes = self.walk(old, new, sub, sub_mode, None);
                    if key == self.config.damage_key {
                        apply_damage_rule(&mut changes);
                    }
                    if !changes.is_empty() {
                        records.push(ChangeRecord::Object(ObjectChange {
                            property_id: key.to_string(),
                            property_name: name,
                            kind,
                            changes,
                            variant: false,
                        }));
                    }
                }
                _ => {
                    let rule = def.and_then(|d| d.buff_rule);
                    records.push(ChangeRecord::Value(value_change(key, name, old, new, rule)));
                }
            }
        }

        records
    }

    /// Friendly name, then unit name, then the enclosing fallback name,
    /// then the capitalised key.
    fn display_name(&self, key: &str, def: Option<&PropertyDef>, fallback: Option<&str>) -> String {
        def.and_then(|d| d.friendly_name.as_deref())
            .or_else(|| self.names.get(key))
            .or(fallback)
            .map_or_else(|| capitalise(key), str::to_string)
    }
}

fn child<'v>(parent: Option<&'v Value>, key: &str) -> Option<&'v Value> {
    parent.and_then(Value::as_table).and_then(|t| t.get(key))
}

/// The `name` of the first entry of a table, when it is a string.
fn first_entry_name(value: Option<&Value>) -> Option<&str> {
    let (_, first) = value?.as_table()?.first()?;
    first.as_table()?.get("name")?.as_str()
}

/// Damage sub-fields carry no rules of their own: reclassify every direct
/// leaf as higher-is-better.
fn apply_damage_rule(changes: &mut [ChangeRecord]) {
    for change in changes {
        if let ChangeRecord::Value(leaf) = change {
            leaf.property_name = capitalise(&leaf.property_name);
            leaf.kind = value_kind(
                leaf.prev_value.as_ref(),
                leaf.new_value.as_ref(),
                Some(BuffRule::HigherIsBetter),
            );
        }
    }
}

fn value_change(
    key: &str,
    name: String,
    old: Option<&Value>,
    new: Option<&Value>,
    rule: Option<BuffRule>,
) -> ValueChange {
    let (percent_change, array_change) = match (old, new) {
        (Some(old), Some(new)) => (percent_change(old, new), array_delta(old, new)),
        _ => (None, None),
    };
    ValueChange {
        property_id: key.to_string(),
        property_name: name,
        prev_value: old.cloned(),
        new_value: new.cloned(),
        kind: value_kind(old, new, rule),
        percent_change,
        array_change,
    }
}

/// Added / Removed by presence; otherwise Buff or Nerf when the rule
/// applies to both values, else Unknown.
pub fn value_kind(old: Option<&Value>, new: Option<&Value>, rule: Option<BuffRule>) -> ValueChangeKind {
    let (old, new) = match (old, new) {
        (None, _) => return ValueChangeKind::Added,
        (_, None) => return ValueChangeKind::Removed,
        (Some(old), Some(new)) => (old, new),
    };
    match rule.and_then(|r| r.is_buff(old, new)) {
        Some(true) => ValueChangeKind::Buff,
        Some(false) => ValueChangeKind::Nerf,
        None => ValueChangeKind::Unknown,
    }
}

/// `(new - old) / old` for two numbers. A zero `old` gives a non-finite
/// result.
pub fn percent_change(old: &Value, new: &Value) -> Option<f64> {
    match (old, new) {
        (Value::Number(o), Value::Number(n)) => Some((n - o) / o),
        _ => None,
    }
}

/// Membership difference of two arrays: what `new` gained and what it lost.
pub fn array_delta(old: &Value, new: &Value) -> Option<ArrayDelta> {
    let (old, new) = (old.as_array()?, new.as_array()?);
    let missing_from = |haystack: &[Value], needle: &Value| !haystack.iter().any(|v| v.deep_eq(needle));
    Some(ArrayDelta {
        added: new.iter().filter(|v| missing_from(old, *v)).cloned().collect(),
        removed: old.iter().filter(|v| missing_from(new, *v)).cloned().collect(),
    })
}

/// Upper-case the first character.
pub fn capitalise(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
