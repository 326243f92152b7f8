//! Reduction of a parsed chunk to a [`Value`] tree.
//!
//! The decoder walks top-level statements in order, tracking `local`
//! bindings and assignments, and reduces the first `return` value. Constant
//! expressions are folded; anything that would need a running interpreter
//! (calls, globals the file does not define) is dropped with a warning.

use std::collections::HashMap;
use std::fmt;

use bal_schema::{PropertySchema, ValueShape};
use bal_types::{parse_number_token, Table, Value};
use tracing::{debug, warn};

use crate::ast::{BinOp, Chunk, Expr, Field, Stmt, UnOp};
use crate::error::{DecodeError, DecodeResult};
use crate::parser;

/// Result of decoding one source file.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSource {
    /// The reduced return value. Always a table (`Object` or `Array`).
    pub root: Value,
    /// Last string literal bound by a `local` before the return statement.
    pub bound_name: Option<String>,
    pub warnings: Vec<DecodeWarning>,
}

/// Data the decoder could not represent and left out of the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeWarning {
    /// A table mixed keyed and positional fields; the positional ones were dropped.
    DroppedPositional { path: String, count: usize },
    /// A field value or key did not reduce to a constant.
    UnsupportedValue { path: String, line: u32 },
    /// A function declaration or control-flow statement was not executed.
    SkippedStatement { construct: &'static str, line: u32 },
}

impl fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DroppedPositional { path, count } => write!(
                f,
                "{}: dropped {count} positional entries from a keyed table",
                display_path(path)
            ),
            Self::UnsupportedValue { path, line } => write!(
                f,
                "{}: value at line {line} is not a constant and was skipped",
                display_path(path)
            ),
            Self::SkippedStatement { construct, line } => {
                write!(f, "line {line}: '{construct}' statement was not executed")
            }
        }
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "<root>"
    } else {
        path
    }
}

fn child_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

/// Table-literal decoder bound to a property schema.
///
/// The schema decides which string fields are really space-separated lists.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'s> {
    schema: &'s PropertySchema,
}

impl<'s> Decoder<'s> {
    pub fn new(schema: &'s PropertySchema) -> Self {
        Self { schema }
    }

    /// Decode one source file.
    ///
    /// Bytes are never interpreted as UTF-8; see [`crate::lexer`].
    pub fn decode(&self, src: &[u8]) -> DecodeResult<DecodedSource> {
        let chunk = parser::parse_source(src)?;
        let decoded = self.decode_chunk(&chunk)?;
        debug!(
            bytes = src.len(),
            warnings = decoded.warnings.len(),
            bound_name = ?decoded.bound_name,
            "decoded table literal"
        );
        Ok(decoded)
    }

    pub(crate) fn decode_chunk(&self, chunk: &Chunk) -> DecodeResult<DecodedSource> {
        let mut eval = Eval {
            schema: self.schema,
            scopes: vec![HashMap::new()],
            warnings: Vec::new(),
            bound_name: None,
        };
        let (root, line) = eval.exec_block(&chunk.body)?.ok_or(DecodeError::MissingReturn)?;
        let root = match root {
            Reduced::Value(v @ (Value::Object(_) | Value::Array(_))) => v,
            Reduced::Value(other) => {
                return Err(DecodeError::NotATable {
                    line,
                    found: other.type_name().to_string(),
                });
            }
            Reduced::Nil => {
                return Err(DecodeError::NotATable {
                    line,
                    found: "nil".to_string(),
                });
            }
            Reduced::Opaque(what) => {
                return Err(DecodeError::NotATable {
                    line,
                    found: what.to_string(),
                });
            }
        };
        Ok(DecodedSource {
            root,
            bound_name: eval.bound_name,
            warnings: eval.warnings,
        })
    }

    /// Decode and return only the value tree.
    pub fn decode_value(&self, src: &[u8]) -> DecodeResult<Value> {
        self.decode(src).map(|d| d.root)
    }
}

/// Outcome of reducing one expression.
#[derive(Debug, Clone)]
enum Reduced {
    Value(Value),
    Nil,
    /// Not reducible to a constant; carries a short description.
    Opaque(&'static str),
}

impl Reduced {
    fn truthy(&self) -> Option<bool> {
        match self {
            Self::Nil | Self::Value(Value::Bool(false)) => Some(false),
            Self::Value(_) => Some(true),
            Self::Opaque(_) => None,
        }
    }
}

struct Eval<'s> {
    schema: &'s PropertySchema,
    scopes: Vec<HashMap<String, Reduced>>,
    warnings: Vec<DecodeWarning>,
    bound_name: Option<String>,
}

impl<'s> Eval<'s> {
    // ── Statements ──────────────────────────────

    /// Run statements until a `return`, yielding its first value and line.
    fn exec_block(&mut self, body: &[Stmt]) -> DecodeResult<Option<(Reduced, u32)>> {
        for stmt in body {
            match stmt {
                Stmt::Local { names, values, .. } => {
                    let reduced = self.reduce_list(values, names);
                    if let Some(name) = values.iter().rev().find_map(|v| match v {
                        Expr::Str(s) => Some(s),
                        _ => None,
                    }) {
                        self.bound_name = Some(name.clone());
                    }
                    let scope = self.scopes.last_mut();
                    if let Some(scope) = scope {
                        for (name, value) in names.iter().zip(reduced) {
                            scope.insert(name.clone(), value);
                        }
                    }
                }
                Stmt::Assign {
                    targets,
                    values,
                    line,
                } => {
                    let names: Vec<String> = targets.iter().map(target_path).collect();
                    let reduced = self.reduce_list(values, &names);
                    for ((target, path), value) in targets.iter().zip(&names).zip(reduced) {
                        self.assign(target, path, value, *line);
                    }
                }
                Stmt::Call { line, .. } => {
                    debug!(line, "skipping call statement");
                }
                &Stmt::Opaque { construct, line } => {
                    debug!(construct, line, "skipping statement");
                    self.warnings.push(DecodeWarning::SkippedStatement { construct, line });
                }
                Stmt::Do { body, .. } => {
                    self.scopes.push(HashMap::new());
                    let result = self.exec_block(body);
                    self.scopes.pop();
                    if let Some(ret) = result? {
                        return Ok(Some(ret));
                    }
                }
                Stmt::Return { values, line } => {
                    let value = match values.first() {
                        Some(expr) => self.reduce(expr, ""),
                        None => Reduced::Nil,
                    };
                    return Ok(Some((value, *line)));
                }
            }
        }
        Ok(None)
    }

    /// Reduce an expression list for a multiple assignment. Missing values
    /// are `nil`; the result always has one entry per target.
    fn reduce_list<S: AsRef<str>>(&mut self, values: &[Expr], targets: &[S]) -> Vec<Reduced> {
        let mut reduced: Vec<Reduced> = values
            .iter()
            .enumerate()
            .map(|(i, expr)| {
                let path = targets.get(i).map_or("", |t| t.as_ref());
                self.reduce(expr, path)
            })
            .collect();
        reduced.resize(targets.len(), Reduced::Nil);
        reduced
    }

    fn assign(&mut self, target: &Expr, path: &str, value: Reduced, line: u32) {
        match target {
            Expr::Name(name) => {
                let slot = self
                    .scopes
                    .iter_mut()
                    .rev()
                    .find_map(|scope| scope.get_mut(name));
                match slot {
                    Some(slot) => *slot = value,
                    None => {
                        if let Some(globals) = self.scopes.first_mut() {
                            globals.insert(name.clone(), value);
                        }
                    }
                }
            }
            Expr::Index { target, key } => {
                let key = self.reduce(key, path);
                let key_name = match &key {
                    Reduced::Value(Value::String(s)) => Some(s.clone()),
                    _ => None,
                };
                let value = match (value, key_name.as_deref()) {
                    (Reduced::Value(v), Some(k)) => Reduced::Value(self.apply_shape(k, v)),
                    (other, _) => other,
                };
                let stored = self
                    .place_mut(target)
                    .map(|container| store(container, key, value))
                    .unwrap_or(false);
                if !stored {
                    self.unsupported(path, line);
                }
            }
            _ => self.unsupported(path, line),
        }
    }

    /// Resolve an lvalue chain (`a.b[c]`) to the table it names.
    fn place_mut(&mut self, expr: &Expr) -> Option<&mut Value> {
        let mut keys = Vec::new();
        let mut cursor = expr;
        let root = loop {
            match cursor {
                Expr::Name(name) => break name,
                Expr::Index { target, key } => {
                    keys.push(self.reduce(key, ""));
                    cursor = target;
                }
                Expr::Paren(inner) => cursor = inner,
                _ => return None,
            }
        };
        let slot = self
            .scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(root))?;
        let mut current = match slot {
            Reduced::Value(v) => v,
            _ => return None,
        };
        for key in keys.into_iter().rev() {
            current = match (current, key) {
                (Value::Object(table), Reduced::Value(Value::String(k))) => table.get_mut(&k)?,
                (Value::Array(items), Reduced::Value(Value::Number(n))) => {
                    items.get_mut(array_index(n)?)?
                }
                _ => return None,
            };
        }
        Some(current)
    }

    fn unsupported(&mut self, path: &str, line: u32) {
        debug!(path, line, "skipping non-constant value");
        self.warnings.push(DecodeWarning::UnsupportedValue {
            path: path.to_string(),
            line,
        });
    }

    // ── Expressions ─────────────────────────────

    fn reduce(&mut self, expr: &Expr, path: &str) -> Reduced {
        match expr {
            Expr::Nil => Reduced::Nil,
            Expr::Bool(b) => Reduced::Value(Value::Bool(*b)),
            Expr::Number(n) => Reduced::Value(Value::Number(*n)),
            Expr::Str(s) => Reduced::Value(Value::String(s.clone())),
            Expr::Table(fields) => Reduced::Value(self.table(fields, path)),
            Expr::Name(name) => self
                .scopes
                .iter()
                .rev()
                .find_map(|scope| scope.get(name))
                .cloned()
                .unwrap_or(Reduced::Opaque("unresolved name")),
            Expr::Paren(inner) => self.reduce(inner, path),
            Expr::Index { target, key } => {
                let target = self.reduce(target, path);
                let key = self.reduce(key, path);
                index(target, key)
            }
            Expr::Unary { op, operand } => {
                let operand = self.reduce(operand, path);
                unary(*op, operand)
            }
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.reduce(lhs, path);
                // Short-circuit operators only evaluate the right side when needed.
                match (op, lhs.truthy()) {
                    (BinOp::And, Some(false)) | (BinOp::Or, Some(true)) => return lhs,
                    (BinOp::And | BinOp::Or, Some(_)) => return self.reduce(rhs, path),
                    (BinOp::And | BinOp::Or, None) => return lhs,
                    _ => {}
                }
                let rhs = self.reduce(rhs, path);
                binary(*op, lhs, rhs)
            }
            Expr::Vararg => Reduced::Opaque("vararg"),
            Expr::Call { .. } | Expr::Method { .. } => Reduced::Opaque("function call"),
            Expr::Function { .. } => Reduced::Opaque("function"),
        }
    }

    fn table(&mut self, fields: &[Field], path: &str) -> Value {
        let mut table = Table::new();
        let mut positional = Vec::new();

        for field in fields {
            match field {
                Field::Named { name, value, line } => {
                    self.keyed(&mut table, name, value, *line, path);
                }
                Field::Keyed { key, value, line } => match self.reduce(key, path) {
                    Reduced::Value(Value::String(name)) => {
                        self.keyed(&mut table, &name, value, *line, path);
                    }
                    Reduced::Value(Value::Number(_)) => {
                        let item_path = format!("{path}[{}]", positional.len() + 1);
                        self.positional(&mut positional, value, *line, &item_path);
                    }
                    _ => self.unsupported(path, *line),
                },
                Field::Positional { value, line } => {
                    let item_path = format!("{path}[{}]", positional.len() + 1);
                    self.positional(&mut positional, value, *line, &item_path);
                }
            }
        }

        match (table.is_empty(), positional.is_empty()) {
            (_, true) => Value::Object(table),
            (true, false) => Value::Array(positional),
            (false, false) => {
                warn!(
                    path = display_path(path),
                    dropped = positional.len(),
                    "table mixes keyed and positional fields, dropping positional entries"
                );
                self.warnings.push(DecodeWarning::DroppedPositional {
                    path: path.to_string(),
                    count: positional.len(),
                });
                Value::Object(table)
            }
        }
    }

    fn keyed(&mut self, table: &mut Table, key: &str, value: &Expr, line: u32, path: &str) {
        let field_path = child_path(path, key);
        match self.reduce(value, &field_path) {
            Reduced::Value(v) => {
                let v = self.apply_shape(key, v);
                table.insert(key, v);
            }
            Reduced::Nil => {
                table.remove(key);
            }
            Reduced::Opaque(_) => self.unsupported(&field_path, line),
        }
    }

    fn positional(&mut self, items: &mut Vec<Value>, value: &Expr, line: u32, path: &str) {
        match self.reduce(value, path) {
            Reduced::Value(v) => items.push(v),
            Reduced::Nil => {}
            Reduced::Opaque(_) => self.unsupported(path, line),
        }
    }

    /// Split string values stored under list-shaped keys.
    fn apply_shape(&self, key: &str, value: Value) -> Value {
        match (value, self.schema.exact_shape_of(key)) {
            (Value::String(s), Some(ValueShape::StringArray)) => Value::Array(
                s.split(' ')
                    .map(|token| Value::String(token.to_string()))
                    .collect(),
            ),
            (Value::String(s), Some(ValueShape::NumberArray)) => Value::Array(
                s.split(' ')
                    .map(|token| Value::Number(parse_number_token(token)))
                    .collect(),
            ),
            (value, _) => value,
        }
    }
}

/// The lvalue text of an assignment target, used for warning paths.
fn target_path(expr: &Expr) -> String {
    match expr {
        Expr::Name(name) => name.clone(),
        Expr::Index { target, key } => match key.as_ref() {
            Expr::Str(k) => child_path(&target_path(target), k),
            Expr::Number(n) => format!("{}[{}]", target_path(target), number_to_string(*n)),
            _ => format!("{}[?]", target_path(target)),
        },
        Expr::Paren(inner) => target_path(inner),
        _ => String::new(),
    }
}

fn array_index(n: f64) -> Option<usize> {
    if n >= 1.0 && n.fract() == 0.0 && n <= usize::MAX as f64 {
        Some(n as usize - 1)
    } else {
        None
    }
}

/// Write `value` into `container[key]`. Returns `false` when the container
/// cannot hold the key.
fn store(container: &mut Value, key: Reduced, value: Reduced) -> bool {
    match (container, key) {
        (Value::Object(table), Reduced::Value(Value::String(k))) => {
            match value {
                Reduced::Value(v) => {
                    table.insert(k, v);
                }
                Reduced::Nil => {
                    table.remove(&k);
                }
                Reduced::Opaque(_) => return false,
            }
            true
        }
        (Value::Array(items), Reduced::Value(Value::Number(n))) => {
            let Some(idx) = array_index(n) else {
                return false;
            };
            match value {
                Reduced::Value(v) if idx < items.len() => items[idx] = v,
                Reduced::Value(v) if idx == items.len() => items.push(v),
                Reduced::Nil if idx + 1 == items.len() => {
                    items.pop();
                }
                _ => return false,
            }
            true
        }
        _ => false,
    }
}

fn index(target: Reduced, key: Reduced) -> Reduced {
    match (target, key) {
        (Reduced::Value(Value::Object(table)), Reduced::Value(Value::String(k))) => table
            .get(&k)
            .cloned()
            .map_or(Reduced::Nil, Reduced::Value),
        (Reduced::Value(Value::Array(items)), Reduced::Value(Value::Number(n))) => array_index(n)
            .and_then(|i| items.get(i).cloned())
            .map_or(Reduced::Nil, Reduced::Value),
        (Reduced::Value(Value::Object(_) | Value::Array(_)), Reduced::Value(_)) => Reduced::Nil,
        _ => Reduced::Opaque("index expression"),
    }
}

fn unary(op: UnOp, operand: Reduced) -> Reduced {
    if op == UnOp::Not {
        return match operand.truthy() {
            Some(t) => Reduced::Value(Value::Bool(!t)),
            None => operand,
        };
    }
    let value = match (op, &operand) {
        (UnOp::Neg, Reduced::Value(v)) => match arith_operand(v) {
            Some(n) => Value::Number(-n),
            None => return Reduced::Opaque("operator expression"),
        },
        (UnOp::Len, Reduced::Value(Value::String(s))) => Value::Number(s.chars().count() as f64),
        (UnOp::Len, Reduced::Value(Value::Array(items))) => Value::Number(items.len() as f64),
        (UnOp::Len, Reduced::Value(Value::Object(_))) => Value::Number(0.0),
        (UnOp::BitNot, Reduced::Value(v)) => match arith_operand(v).and_then(to_integer) {
            Some(i) => Value::Number(!i as f64),
            None => return Reduced::Opaque("operator expression"),
        },
        _ => return Reduced::Opaque("operator expression"),
    };
    Reduced::Value(value)
}

fn binary(op: BinOp, lhs: Reduced, rhs: Reduced) -> Reduced {
    let (Reduced::Value(a), Reduced::Value(b)) = (&lhs, &rhs) else {
        // `nil == nil` and friends still fold.
        return match (op, &lhs, &rhs) {
            (BinOp::Eq, Reduced::Nil, Reduced::Nil) => Reduced::Value(Value::Bool(true)),
            (BinOp::Ne, Reduced::Nil, Reduced::Nil) => Reduced::Value(Value::Bool(false)),
            (BinOp::Eq, Reduced::Nil, Reduced::Value(_))
            | (BinOp::Eq, Reduced::Value(_), Reduced::Nil) => Reduced::Value(Value::Bool(false)),
            (BinOp::Ne, Reduced::Nil, Reduced::Value(_))
            | (BinOp::Ne, Reduced::Value(_), Reduced::Nil) => Reduced::Value(Value::Bool(true)),
            _ => Reduced::Opaque("operator expression"),
        };
    };
    let folded = match op {
        BinOp::Concat => concat(a, b).map(Value::String),
        BinOp::Eq => primitive_eq(a, b).map(Value::Bool),
        BinOp::Ne => primitive_eq(a, b).map(|eq| Value::Bool(!eq)),
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => compare(op, a, b).map(Value::Bool),
        BinOp::BitOr | BinOp::BitXor | BinOp::BitAnd | BinOp::Shl | BinOp::Shr => {
            bitwise(op, a, b).map(Value::Number)
        }
        _ => arith(op, a, b).map(Value::Number),
    };
    folded.map_or(Reduced::Opaque("operator expression"), Reduced::Value)
}

/// Numbers, and strings that read as numbers, take part in arithmetic.
fn arith_operand(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => Some(*n),
        Value::String(s) if !s.trim().is_empty() => {
            Some(parse_number_token(s)).filter(|n| !n.is_nan())
        }
        _ => None,
    }
}

fn arith(op: BinOp, a: &Value, b: &Value) -> Option<f64> {
    let (x, y) = (arith_operand(a)?, arith_operand(b)?);
    let result = match op {
        BinOp::Add => x + y,
        BinOp::Sub => x - y,
        BinOp::Mul => x * y,
        BinOp::Div => x / y,
        BinOp::IDiv => (x / y).floor(),
        BinOp::Mod => {
            let m = x % y;
            if m != 0.0 && (m < 0.0) != (y < 0.0) {
                m + y
            } else {
                m
            }
        }
        BinOp::Pow => x.powf(y),
        _ => return None,
    };
    Some(result)
}

fn to_integer(n: f64) -> Option<i64> {
    (n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64).then_some(n as i64)
}

fn bitwise(op: BinOp, a: &Value, b: &Value) -> Option<f64> {
    let x = to_integer(arith_operand(a)?)?;
    let y = to_integer(arith_operand(b)?)?;
    let shift = |value: i64, by: i64| -> i64 {
        let bits = value as u64;
        let shifted = match by {
            by if by <= -64 || by >= 64 => 0,
            by if by >= 0 => bits << by,
            by => bits >> -by,
        };
        shifted as i64
    };
    let result = match op {
        BinOp::BitOr => x | y,
        BinOp::BitXor => x ^ y,
        BinOp::BitAnd => x & y,
        BinOp::Shl => shift(x, y),
        BinOp::Shr => shift(x, y.checked_neg()?),
        _ => return None,
    };
    Some(result as f64)
}

fn concat(a: &Value, b: &Value) -> Option<String> {
    let piece = |v: &Value| match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_to_string(*n)),
        _ => None,
    };
    Some(piece(a)? + &piece(b)?)
}

fn primitive_eq(a: &Value, b: &Value) -> Option<bool> {
    match (a, b) {
        (Value::Object(_) | Value::Array(_), _) | (_, Value::Object(_) | Value::Array(_)) => None,
        _ => Some(a == b),
    }
}

fn compare(op: BinOp, a: &Value, b: &Value) -> Option<bool> {
    let ordering = match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.partial_cmp(y),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => return None,
    };
    let Some(ordering) = ordering else {
        // NaN compares false with everything.
        return Some(false);
    };
    Some(match op {
        BinOp::Lt => ordering.is_lt(),
        BinOp::Le => ordering.is_le(),
        BinOp::Gt => ordering.is_gt(),
        BinOp::Ge => ordering.is_ge(),
        _ => return None,
    })
}

fn number_to_string(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else if n.is_nan() {
        "nan".to_string()
    } else {
        format!("{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bal_schema::PropertyDef;

    fn schema() -> PropertySchema {
        let mut schema = PropertySchema::new();
        schema.insert(
            "category",
            PropertyDef::named("Category").with_shape(ValueShape::StringArray),
        );
        schema.insert(
            "damagemodifiers",
            PropertyDef::named("Damage Modifiers").with_shape(ValueShape::NumberArray),
        );
        schema
    }

    fn decode(src: &str) -> DecodedSource {
        Decoder::new(&schema()).decode(src.as_bytes()).unwrap()
    }

    fn root(src: &str) -> Table {
        match decode(src).root {
            Value::Object(t) => t,
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn literals_decode_to_themselves() {
        let t = root(r#"return { a = 1.5, b = true, c = "text", d = false }"#);
        assert_eq!(t.get("a"), Some(&Value::Number(1.5)));
        assert_eq!(t.get("b"), Some(&Value::Bool(true)));
        assert_eq!(t.get("c"), Some(&Value::from("text")));
        assert_eq!(t.get("d"), Some(&Value::Bool(false)));
        assert_eq!(t.keys().collect::<Vec<_>>(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn negative_literal_is_a_number() {
        let t = root("return { x = -5, y = 2 * 3 + 1, z = 2 ^ -1 }");
        assert_eq!(t.get("x"), Some(&Value::Number(-5.0)));
        assert_eq!(t.get("y"), Some(&Value::Number(7.0)));
        assert_eq!(t.get("z"), Some(&Value::Number(0.5)));
    }

    #[test]
    fn list_shaped_strings_are_split() {
        let t = root(r#"return { category = "a b  c", damagemodifiers = "1 x 2.5", name = "a b" }"#);
        assert_eq!(
            t.get("category"),
            Some(&Value::Array(vec!["a".into(), "b".into(), "".into(), "c".into()]))
        );
        match t.get("damagemodifiers") {
            Some(Value::Array(items)) => {
                assert_eq!(items[0], Value::Number(1.0));
                assert!(items[1].as_number().is_some_and(f64::is_nan));
                assert_eq!(items[2], Value::Number(2.5));
            }
            other => panic!("expected number array, got {:?}", other),
        }
        assert_eq!(t.get("name"), Some(&Value::from("a b")));
    }

    #[test]
    fn shape_lookup_uses_exact_key() {
        let t = root(r#"return { Category = "x y", category = "x y" }"#);
        assert_eq!(t.get("Category"), Some(&Value::from("x y")));
        assert_eq!(t.get("category"), Some(&Value::Array(vec!["x".into(), "y".into()])));
    }

    #[test]
    fn positional_tables_are_arrays() {
        let t = root(r#"return { w = { "a", 2, [3] = true }, e = {} }"#);
        assert_eq!(
            t.get("w"),
            Some(&Value::Array(vec!["a".into(), 2.into(), true.into()]))
        );
        assert_eq!(t.get("e"), Some(&Value::Object(Table::new())));
    }

    #[test]
    fn bracket_string_keys_are_keys() {
        let t = root(r#"return { ["unitX"] = { maxdamage = 100 } }"#);
        assert!(t.get("unitX").is_some_and(Value::is_object));
    }

    #[test]
    fn mixed_table_drops_positional_with_warning() {
        let decoded = decode(r#"return { u = { "a", "b", key = 1 } }"#);
        let u = decoded.root.as_table().and_then(|t| t.get("u")).cloned();
        assert_eq!(u, Some(Value::Object([("key", Value::from(1))].into_iter().collect())));
        assert_eq!(
            decoded.warnings,
            vec![DecodeWarning::DroppedPositional {
                path: "u".into(),
                count: 2
            }]
        );
    }

    #[test]
    fn nil_fields_are_omitted() {
        let decoded = decode("return { a = nil, b = 1 }");
        let t = decoded.root.as_table().cloned().unwrap_or_default();
        assert!(!t.contains_key("a"));
        assert!(decoded.warnings.is_empty());
    }

    #[test]
    fn calls_are_skipped_with_warning() {
        let decoded = decode("return { u = { a = f(1), b = 2 } }");
        let u = decoded.root.as_table().and_then(|t| t.get("u")).cloned();
        assert_eq!(u, Some(Value::Object([("b", Value::from(2))].into_iter().collect())));
        assert!(matches!(
            decoded.warnings.as_slice(),
            [DecodeWarning::UnsupportedValue { path, line: 1 }] if path == "u.a"
        ));
    }

    #[test]
    fn locals_resolve_and_bind_name() {
        let decoded = decode(
            r#"
local cat = "a b"
local hp = 100
local unitName = "Pawn"
return { armpw = { name = unitName, maxdamage = hp * 2, category = cat } }
"#,
        );
        assert_eq!(decoded.bound_name.as_deref(), Some("Pawn"));
        let unit = decoded
            .root
            .as_table()
            .and_then(|t| t.get("armpw"))
            .and_then(Value::as_table)
            .cloned()
            .unwrap_or_default();
        assert_eq!(unit.get("name"), Some(&Value::from("Pawn")));
        assert_eq!(unit.get("maxdamage"), Some(&Value::Number(200.0)));
        assert_eq!(unit.get("category"), Some(&Value::Array(vec!["a".into(), "b".into()])));
    }

    #[test]
    fn bound_name_is_last_string_local() {
        let decoded = decode("local a = 'first'\nlocal b = 'second'\nlocal n = 3\nreturn {}");
        assert_eq!(decoded.bound_name.as_deref(), Some("second"));
        assert_eq!(decode("return {}").bound_name, None);
    }

    #[test]
    fn assignments_update_locals() {
        let t = root(
            r#"
local def = { maxdamage = 100, weapondefs = { gun = { range = 300 } } }
def.maxdamage = 150
def.weapondefs.gun.range = def.weapondefs.gun.range + 50
def["buildtime"] = 10
def.extra = nil
return { unit = def }
"#,
        );
        let unit = t.get("unit").and_then(Value::as_table).cloned().unwrap_or_default();
        assert_eq!(unit.get("maxdamage"), Some(&Value::Number(150.0)));
        assert_eq!(unit.get("buildtime"), Some(&Value::Number(10.0)));
        let range = unit
            .get("weapondefs")
            .and_then(Value::as_table)
            .and_then(|w| w.get("gun"))
            .and_then(Value::as_table)
            .and_then(|g| g.get("range"));
        assert_eq!(range, Some(&Value::Number(350.0)));
    }

    #[test]
    fn constant_folding() {
        let t = root(
            r#"
local base = 10
return {
    c = "v" .. 2 .. "x",
    m = -7 % 3,
    i = 7 // 2,
    b = 6 & 3,
    s = 1 << 4,
    n = not nil,
    o = nil or 4,
    a = false and 1,
    l = #"abc",
    cmp = base >= 10,
    p = (base),
}
"#,
        );
        assert_eq!(t.get("c"), Some(&Value::from("v2x")));
        assert_eq!(t.get("m"), Some(&Value::Number(2.0)));
        assert_eq!(t.get("i"), Some(&Value::Number(3.0)));
        assert_eq!(t.get("b"), Some(&Value::Number(2.0)));
        assert_eq!(t.get("s"), Some(&Value::Number(16.0)));
        assert_eq!(t.get("n"), Some(&Value::Bool(true)));
        assert_eq!(t.get("o"), Some(&Value::Number(4.0)));
        assert_eq!(t.get("a"), Some(&Value::Bool(false)));
        assert_eq!(t.get("l"), Some(&Value::Number(3.0)));
        assert_eq!(t.get("cmp"), Some(&Value::Bool(true)));
        assert_eq!(t.get("p"), Some(&Value::Number(10.0)));
    }

    #[test]
    fn do_block_scopes_and_return() {
        let t = root("local x = 1 do local x = 2 end return { x = x }");
        assert_eq!(t.get("x"), Some(&Value::Number(1.0)));
        let t = root("do return { y = 2 } end");
        assert_eq!(t.get("y"), Some(&Value::Number(2.0)));
    }

    #[test]
    fn missing_return_and_non_table() {
        let schema = schema();
        let decoder = Decoder::new(&schema);
        assert_eq!(decoder.decode(b"local x = 1"), Err(DecodeError::MissingReturn));
        match decoder.decode(b"\nreturn 5") {
            Err(DecodeError::NotATable { line, found }) => {
                assert_eq!(line, 2);
                assert_eq!(found, "number");
            }
            other => panic!("expected NotATable, got {:?}", other),
        }
        assert!(matches!(decoder.decode(b"return"), Err(DecodeError::NotATable { .. })));
        assert!(matches!(decoder.decode(b"return f()"), Err(DecodeError::NotATable { .. })));
    }

    #[test]
    fn functions_and_control_flow_are_skipped() {
        let decoded = decode(
            r#"
local function helper() return 1 end
for i = 1, 3 do end
if helper then x = 1 end
return { u = { maxdamage = 1, f = helper } }
"#,
        );
        let u = decoded.root.as_table().and_then(|t| t.get("u")).cloned();
        assert_eq!(u, Some(Value::Object([("maxdamage", Value::from(1))].into_iter().collect())));
        assert_eq!(
            decoded.warnings,
            vec![
                DecodeWarning::SkippedStatement { construct: "for", line: 3 },
                DecodeWarning::SkippedStatement { construct: "if", line: 4 },
                DecodeWarning::UnsupportedValue { path: "u.f".into(), line: 5 },
            ]
        );
    }

    #[test]
    fn local_function_before_return_decodes() {
        let t = root("local function f() end\nreturn { u = { maxdamage = 1 } }");
        let u = t.get("u").and_then(Value::as_table);
        assert_eq!(u.and_then(|u| u.get("maxdamage")), Some(&Value::Number(1.0)));
    }

    #[test]
    fn deeply_nested_source_is_a_parse_error() {
        let schema = schema();
        let n = 5_000;
        let src = format!("return {}{}", "{".repeat(n), "}".repeat(n));
        assert!(matches!(
            Decoder::new(&schema).decode(src.as_bytes()),
            Err(DecodeError::Parse { .. })
        ));
    }

    #[test]
    fn malformed_source_is_an_error() {
        let schema = schema();
        let decoder = Decoder::new(&schema);
        assert!(matches!(decoder.decode(b"return { a = "), Err(DecodeError::Parse { .. })));
        assert!(matches!(decoder.decode(b"return { a = \"x }"), Err(DecodeError::Lex { .. })));
    }

    #[test]
    fn high_bytes_survive_decoding() {
        let schema = schema();
        let decoded = Decoder::new(&schema)
            .decode(b"return { blob = \"\xc3\x28\xff\" }")
            .unwrap();
        let blob = decoded
            .root
            .as_table()
            .and_then(|t| t.get("blob"))
            .and_then(Value::as_str)
            .map(|s| s.chars().map(u32::from).collect::<Vec<_>>());
        assert_eq!(blob, Some(vec![0xc3, 0x28, 0xff]));
    }

    #[test]
    fn warnings_display_paths() {
        let w = DecodeWarning::DroppedPositional {
            path: String::new(),
            count: 3,
        };
        assert!(w.to_string().starts_with("<root>"));
        let w = DecodeWarning::UnsupportedValue {
            path: "u.a".into(),
            line: 4,
        };
        assert!(w.to_string().contains("line 4"));
    }

    mod determinism {
        use super::*;
        use proptest::prelude::*;

        fn literal() -> impl Strategy<Value = String> {
            prop_oneof![
                any::<i32>().prop_map(|n| n.to_string()),
                any::<bool>().prop_map(|b| b.to_string()),
                "[a-z ]{0,8}".prop_map(|s| format!("\"{s}\"")),
            ]
        }

        fn table_src() -> impl Strategy<Value = String> {
            let leaf = literal();
            leaf.prop_recursive(3, 24, 4, |inner| {
                prop_oneof![
                    prop::collection::vec(("k[a-z]{0,5}", inner.clone()), 0..4).prop_map(|fields| {
                        let body: Vec<String> =
                            fields.into_iter().map(|(k, v)| format!("{k} = {v}")).collect();
                        format!("{{ {} }}", body.join(", "))
                    }),
                    prop::collection::vec(inner, 1..4)
                        .prop_map(|items| format!("{{ {} }}", items.join(", "))),
                ]
            })
        }

        proptest! {
            #[test]
            fn identical_input_decodes_identically(
                body in prop::collection::vec(("k[a-z]{0,5}", table_src()), 0..4)
            ) {
                let fields: Vec<String> =
                    body.into_iter().map(|(k, v)| format!("{k} = {v}")).collect();
                let src = format!("return {{ {} }}", fields.join(", "));
                let schema = schema();
                let decoder = Decoder::new(&schema);
                let a = decoder.decode(src.as_bytes()).unwrap();
                let b = decoder.decode(src.as_bytes()).unwrap();
                prop_assert!(a.root.deep_eq(&b.root));
                prop_assert_eq!(a.root, b.root);
                prop_assert_eq!(a.warnings, b.warnings);
            }

            #[test]
            fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
                let schema = schema();
                let _ = Decoder::new(&schema).decode(&bytes);
            }
        }
    }
}
