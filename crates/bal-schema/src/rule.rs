use std::fmt;

use bal_types::Value;
use serde::{Deserialize, Serialize};

/// Which side of a modification counts as favorable to the unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuffRule {
    HigherIsBetter,
    LowerIsBetter,
    TrueIsBetter,
    FalseIsBetter,
}

impl BuffRule {
    /// Decide whether moving from `prev` to `new` is a buff.
    ///
    /// Returns `None` unless both values are numbers or both are booleans.
    /// Booleans order `false < true` for the ordering rules. The boolean
    /// rules only look at `new`, so applied to numbers they always report
    /// a nerf.
    pub fn is_buff(self, prev: &Value, new: &Value) -> Option<bool> {
        let (p, n) = match (prev, new) {
            (Value::Number(p), Value::Number(n)) => (*p, *n),
            (Value::Bool(p), Value::Bool(n)) => (f64::from(u8::from(*p)), f64::from(u8::from(*n))),
            _ => return None,
        };
        let buff = match self {
            Self::HigherIsBetter => n > p,
            Self::LowerIsBetter => n < p,
            Self::TrueIsBetter => matches!(new, Value::Bool(true)),
            Self::FalseIsBetter => matches!(new, Value::Bool(false)),
        };
        Some(buff)
    }
}

impl fmt::Display for BuffRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HigherIsBetter => write!(f, "higher is better"),
            Self::LowerIsBetter => write!(f, "lower is better"),
            Self::TrueIsBetter => write!(f, "true is better"),
            Self::FalseIsBetter => write!(f, "false is better"),
        }
    }
}
