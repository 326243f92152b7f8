//! Property schema for balance-log.
//!
//! Static reference data describing how each unit-definition property is
//! named, shaped, and compared. The schema drives two decisions and nothing
//! else: whether a string literal is split into an array at decode time, and
//! how a modified value is classified.
//!
//! # Key Types
//!
//! - [`PropertySchema`] -- Identifier → [`PropertyDef`] lookup with lower-case fallback
//! - [`BuffRule`] -- "Which side is better" comparison
//! - [`ValueShape`] -- Declared value shape
//! - [`UnitNames`] -- Unit identifier → display name table

mod catalog;
pub mod error;
pub mod names;
pub mod property;
pub mod rule;
pub mod schema;

pub use error::{SchemaError, SchemaResult};
pub use names::UnitNames;
pub use property::{PropertyDef, ValueShape};
pub use rule::BuffRule;
pub use schema::PropertySchema;
