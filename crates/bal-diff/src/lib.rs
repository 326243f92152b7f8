//! Diff engine for balance-log.
//!
//! Compares two decoded unit definitions and classifies what changed.
//!
//! # Key Types
//!
//! - [`StructuralDiff`] / [`DiffNode`] -- Keys whose values differ, recursively
//! - [`Classifier`] -- Turns a structural diff into [`ChangeRecord`](bal_types::ChangeRecord)s
//! - [`ClassifierConfig`] / [`ClassifyMode`] -- Special keys and classification context

pub mod classify;
pub mod structural;

pub use classify::{
    array_delta, capitalise, percent_change, value_kind, Classifier, ClassifierConfig, ClassifyMode,
};
pub use structural::{diff, DiffNode, StructuralDiff};
