//! Shape corrections applied to decoded unit definitions before diffing.

use std::fmt;

use bal_types::{Table, Value};
use tracing::{debug, warn};

const WEAPONS_KEY: &str = "weapons";
const WEAPON_DEFS_KEY: &str = "weapondefs";

/// A normalized value tree plus anything that had to be dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub value: Value,
    pub warnings: Vec<NormalizeWarning>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeWarning {
    /// `weapons` had more entries than `weapondefs` has keys.
    UnmatchedWeapons { unit: String, dropped: usize },
}

impl fmt::Display for NormalizeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnmatchedWeapons { unit, dropped } => write!(
                f,
                "{unit}: dropped {dropped} weapon entries with no matching weapon definition"
            ),
        }
    }
}

/// Normalize a decoded file: the root table and every unit table directly
/// beneath it.
pub fn normalize(mut value: Value) -> Normalized {
    let mut warnings = Vec::new();
    if let Value::Object(root) = &mut value {
        warnings.extend(normalize_unit("", root));
        for (id, child) in root.iter_mut() {
            if let Value::Object(unit) = child {
                warnings.extend(normalize_unit(id, unit));
            }
        }
    }
    Normalized { value, warnings }
}

/// Rekey a positional `weapons` list by the keys of `weapondefs`, in order.
///
/// Does nothing unless `weapons` is a non-empty array and `weapondefs` is a
/// table.
pub fn normalize_unit(id: &str, unit: &mut Table) -> Vec<NormalizeWarning> {
    let def_keys: Vec<String> = match unit.get(WEAPON_DEFS_KEY) {
        Some(Value::Object(defs)) => defs.keys().map(str::to_string).collect(),
        _ => return Vec::new(),
    };
    let weapons = match unit.get_mut(WEAPONS_KEY) {
        Some(Value::Array(weapons)) if !weapons.is_empty() => std::mem::take(weapons),
        _ => return Vec::new(),
    };

    let total = weapons.len();
    let remapped: Table = def_keys.into_iter().zip(weapons).collect();
    let dropped = total - remapped.len();
    debug!(unit = id, weapons = remapped.len(), "remapped weapons by weapon definition");
    unit.insert(WEAPONS_KEY, Value::Object(remapped));

    if dropped == 0 {
        return Vec::new();
    }
    warn!(unit = id, dropped, "weapons outnumber weapon definitions");
    vec![NormalizeWarning::UnmatchedWeapons {
        unit: id.to_string(),
        dropped,
    }]
}
