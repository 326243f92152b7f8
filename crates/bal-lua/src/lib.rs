//! Table-literal decoder for balance-log.
//!
//! Unit definitions are Lua files that return a nested table constructor.
//! This crate turns their raw bytes into a [`Value`](bal_types::Value) tree
//! without running any Lua: a byte-clean lexer, an expression parser, and a
//! reducer that folds constants and resolves `local` bindings.
//!
//! # Key Types
//!
//! - [`Decoder`] -- Schema-aware decoding to a [`DecodedSource`]
//! - [`normalize`] -- Weapon-list rekeying on decoded unit definitions
//! - [`parse_unit_names`] -- Display names from a language file
//! - [`DecodeError`] -- Malformed source

pub mod ast;
pub mod decode;
pub mod error;
pub mod lexer;
pub mod names;
pub mod normalize;
pub mod parser;

pub use decode::{DecodeWarning, DecodedSource, Decoder};
pub use error::{DecodeError, DecodeResult};
pub use names::parse_unit_names;
pub use normalize::{normalize, normalize_unit, NormalizeWarning, Normalized};
pub use parser::parse_source;
