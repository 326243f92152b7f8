//! Syntax tree for Lua definition files.
//!
//! Statements and table fields carry the line they start on. Nothing is
//! evaluated here; see [`crate::decode`] for reduction to values.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
    Len,
    BitNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Or,
    And,
    Lt,
    Gt,
    Le,
    Ge,
    Ne,
    Eq,
    BitOr,
    BitXor,
    BitAnd,
    Shl,
    Shr,
    Concat,
    Add,
    Sub,
    Mul,
    Div,
    IDiv,
    Mod,
    Pow,
}

impl BinOp {
    /// Left and right binding power, Lua 5.4 ordering.
    pub(crate) fn priority(self) -> (u8, u8) {
        match self {
            Self::Or => (1, 1),
            Self::And => (2, 2),
            Self::Lt | Self::Gt | Self::Le | Self::Ge | Self::Ne | Self::Eq => (3, 3),
            Self::BitOr => (4, 4),
            Self::BitXor => (5, 5),
            Self::BitAnd => (6, 6),
            Self::Shl | Self::Shr => (7, 7),
            Self::Concat => (9, 8),
            Self::Add | Self::Sub => (10, 10),
            Self::Mul | Self::Div | Self::IDiv | Self::Mod => (11, 11),
            Self::Pow => (14, 13),
        }
    }
}

/// Binding power of every unary operator.
pub(crate) const UNARY_PRIORITY: u8 = 12;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Nil,
    Bool(bool),
    Number(f64),
    Str(String),
    Vararg,
    Table(Vec<Field>),
    Name(String),
    /// `target[key]`, and `target.name` with a string key.
    Index {
        target: Box<Expr>,
        key: Box<Expr>,
    },
    Call {
        target: Box<Expr>,
        args: Vec<Expr>,
    },
    Method {
        target: Box<Expr>,
        name: String,
        args: Vec<Expr>,
    },
    Unary {
        op: UnOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Parenthesized expression, truncated to a single value.
    Paren(Box<Expr>),
    /// `function (...) ... end`. Only its position is kept.
    Function { line: u32 },
}

impl Expr {
    /// Short description used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::Vararg => "vararg",
            Self::Table(_) => "table",
            Self::Name(_) => "name",
            Self::Index { .. } => "index expression",
            Self::Call { .. } | Self::Method { .. } => "function call",
            Self::Unary { .. } | Self::Binary { .. } => "operator expression",
            Self::Paren(inner) => inner.describe(),
            Self::Function { .. } => "function",
        }
    }
}

/// One entry of a table constructor.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// `name = value`
    Named { name: String, value: Expr, line: u32 },
    /// `[key] = value`
    Keyed { key: Expr, value: Expr, line: u32 },
    /// `value`, keyed implicitly by position.
    Positional { value: Expr, line: u32 },
}

impl Field {
    pub fn line(&self) -> u32 {
        match self {
            Self::Named { line, .. } | Self::Keyed { line, .. } | Self::Positional { line, .. } => {
                *line
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Local {
        names: Vec<String>,
        values: Vec<Expr>,
        line: u32,
    },
    Assign {
        targets: Vec<Expr>,
        values: Vec<Expr>,
        line: u32,
    },
    Call {
        call: Expr,
        line: u32,
    },
    Return {
        values: Vec<Expr>,
        line: u32,
    },
    Do {
        body: Vec<Stmt>,
        line: u32,
    },
    /// Control flow or a function declaration, syntax-checked and skipped.
    Opaque {
        construct: &'static str,
        line: u32,
    },
}

/// A parsed source file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Chunk {
    pub body: Vec<Stmt>,
}
