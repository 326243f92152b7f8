//! Foundation types for balance-log.
//!
//! Every other crate in the workspace depends on `bal-types`.
//!
//! # Key Types
//!
//! - [`Value`] / [`Table`] -- Decoded table-literal value tree
//! - [`ChangeRecord`] -- Classified difference: [`ObjectChange`] or [`ValueChange`]
//! - [`ValueChangeKind`] -- Added / Removed / Buff / Nerf / Unknown
//! - [`BalanceChange`] -- All unit changes of one commit

pub mod change;
pub mod commit;
pub mod value;

pub use change::{
    ArrayDelta, ChangeRecord, ObjectChange, ObjectChangeKind, ValueChange, ValueChangeKind,
};
pub use commit::{Author, BalanceChange};
pub use value::{parse_number_token, Table, Value};
