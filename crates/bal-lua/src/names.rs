//! Extraction of the unit display-name table from a language file.
//!
//! Language files nest the table a few levels deep, either returned
//! directly or passed to a loader call:
//!
//! ```lua
//! return { en = { units = { names = { armpw = "Pawn" } } } }
//! ```

use bal_schema::{PropertySchema, UnitNames};
use bal_types::{Table, Value};
use tracing::{debug, warn};

use crate::ast::{Chunk, Expr, Stmt};
use crate::decode::Decoder;
use crate::error::DecodeResult;
use crate::parser;

const NAMES_KEY: &str = "names";

/// Parse a language file into an `id -> display name` table.
///
/// Descends through first entries until it reaches a table with a `names`
/// child. A file without one yields an empty table.
pub fn parse_unit_names(src: &[u8]) -> DecodeResult<UnitNames> {
    let mut chunk = parser::parse_source(src)?;
    if !chunk.body.iter().any(|s| matches!(s, Stmt::Return { .. })) {
        if let Some(ret) = loader_call_as_return(&chunk) {
            chunk = Chunk { body: vec![ret] };
        }
    }

    let schema = PropertySchema::new();
    let decoded = Decoder::new(&schema).decode_chunk(&chunk)?;

    let Some(names) = find_names(&decoded.root) else {
        warn!("language file has no names table");
        return Ok(UnitNames::new());
    };
    let names: UnitNames = names
        .iter()
        .filter_map(|(id, name)| name.as_str().map(|n| (id, n)))
        .collect();
    debug!(count = names.len(), "loaded unit names");
    Ok(names)
}

/// Turn `Loader.load({ ... })` into `return { ... }`.
fn loader_call_as_return(chunk: &Chunk) -> Option<Stmt> {
    chunk.body.iter().find_map(|stmt| match stmt {
        Stmt::Call {
            call: Expr::Call { args, .. } | Expr::Method { args, .. },
            line,
        } => args
            .iter()
            .find(|a| matches!(a, Expr::Table(_)))
            .map(|table| Stmt::Return {
                values: vec![table.clone()],
                line: *line,
            }),
        _ => None,
    })
}

fn find_names(root: &Value) -> Option<&Table> {
    let mut current = root.as_table()?;
    loop {
        if let Some(Value::Object(names)) = current.get(NAMES_KEY) {
            return Some(names);
        }
        current = current.first()?.1.as_table()?;
    }
}
