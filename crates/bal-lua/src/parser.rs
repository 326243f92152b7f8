//! Recursive-descent parser producing [`Chunk`]s.
//!
//! The full Lua 5.4 grammar is accepted. Function bodies, loops and
//! conditionals are checked for syntax and kept only as opaque markers;
//! the decoder never looks inside them.

use crate::ast::{BinOp, Chunk, Expr, Field, Stmt, UnOp, UNARY_PRIORITY};
use crate::error::{DecodeError, DecodeResult};
use crate::lexer::{self, Keyword, Spanned, Token};

/// Tokenize and parse a source file.
pub fn parse_source(src: &[u8]) -> DecodeResult<Chunk> {
    let tokens = lexer::lex(src)?;
    parse(&tokens)
}

/// Parse a token stream ending in [`Token::Eof`].
pub fn parse(tokens: &[Spanned]) -> DecodeResult<Chunk> {
    if tokens.is_empty() {
        return Ok(Chunk::default());
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let body = parser.block()?;
    if parser.peek() != &Token::Eof {
        return Err(parser.err(format!("expected end of input, got {:?}", parser.peek())));
    }
    Ok(Chunk { body })
}

/// Deepest nesting of expressions, tables and blocks accepted.
const MAX_DEPTH: usize = 128;

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn cur(&self) -> &Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.cur().token
    }

    fn peek_ahead(&self, offset: usize) -> &Token {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].token
    }

    fn line(&self) -> u32 {
        self.cur().line
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token, what: &str) -> DecodeResult<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.err(format!("expected {what}, got {:?}", self.peek())))
        }
    }

    fn take_name(&mut self) -> DecodeResult<String> {
        match self.peek().clone() {
            Token::Name(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(self.err(format!("expected identifier, got {:?}", other))),
        }
    }

    fn err(&self, message: impl Into<String>) -> DecodeError {
        DecodeError::parse(self.line(), message)
    }

    /// Run `f` one nesting level down; the level is released afterwards.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> DecodeResult<T>) -> DecodeResult<T> {
        let base = self.depth;
        let result = f(self);
        self.depth = base;
        result
    }

    /// Count one more level of syntax nesting.
    fn descend(&mut self) -> DecodeResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.err("too many syntax levels"));
        }
        Ok(())
    }

    fn at_block_end(&self) -> bool {
        matches!(
            self.peek(),
            Token::Eof
                | Token::Keyword(Keyword::End | Keyword::Else | Keyword::Elseif | Keyword::Until)
        )
    }

    // ── Statements ──────────────────────────────

    fn block(&mut self) -> DecodeResult<Vec<Stmt>> {
        let mut body = Vec::new();
        while !self.at_block_end() {
            if self.eat(&Token::Semi) {
                continue;
            }
            if self.peek() == &Token::Keyword(Keyword::Return) {
                body.push(self.return_stmt()?);
                break;
            }
            body.push(self.statement()?);
        }
        Ok(body)
    }

    fn nested_block(&mut self) -> DecodeResult<Vec<Stmt>> {
        self.nested(|p| {
            p.descend()?;
            p.block()
        })
    }

    fn return_stmt(&mut self) -> DecodeResult<Stmt> {
        let line = self.line();
        self.advance();
        let values = if self.at_block_end() || self.peek() == &Token::Semi {
            Vec::new()
        } else {
            self.expr_list()?
        };
        self.eat(&Token::Semi);
        if !self.at_block_end() {
            return Err(self.err(format!("expected end of block after return, got {:?}", self.peek())));
        }
        Ok(Stmt::Return { values, line })
    }

    fn statement(&mut self) -> DecodeResult<Stmt> {
        let line = self.line();
        let construct = match self.peek() {
            Token::Keyword(Keyword::Local) => {
                self.advance();
                if !self.eat(&Token::Keyword(Keyword::Function)) {
                    return self.local(line);
                }
                let name = self.take_name()?;
                self.func_body()?;
                return Ok(Stmt::Local {
                    names: vec![name],
                    values: vec![Expr::Function { line }],
                    line,
                });
            }
            Token::Keyword(Keyword::Do) => {
                self.advance();
                let body = self.nested_block()?;
                self.expect(&Token::Keyword(Keyword::End), "'end'")?;
                return Ok(Stmt::Do { body, line });
            }
            Token::Keyword(Keyword::Function) => {
                self.advance();
                self.take_name()?;
                while self.eat(&Token::Dot) {
                    self.take_name()?;
                }
                if self.eat(&Token::Colon) {
                    self.take_name()?;
                }
                self.func_body()?;
                "function"
            }
            Token::Keyword(Keyword::If) => {
                self.advance();
                self.cond_then_block()?;
                while self.eat(&Token::Keyword(Keyword::Elseif)) {
                    self.cond_then_block()?;
                }
                if self.eat(&Token::Keyword(Keyword::Else)) {
                    self.nested_block()?;
                }
                self.expect(&Token::Keyword(Keyword::End), "'end'")?;
                "if"
            }
            Token::Keyword(Keyword::While) => {
                self.advance();
                self.expr()?;
                self.loop_body()?;
                "while"
            }
            Token::Keyword(Keyword::For) => {
                self.advance();
                self.take_name()?;
                if self.eat(&Token::Assign) {
                    self.expr()?;
                    self.expect(&Token::Comma, "','")?;
                    self.expr()?;
                    if self.eat(&Token::Comma) {
                        self.expr()?;
                    }
                } else {
                    while self.eat(&Token::Comma) {
                        self.take_name()?;
                    }
                    self.expect(&Token::Keyword(Keyword::In), "'in'")?;
                    self.expr_list()?;
                }
                self.loop_body()?;
                "for"
            }
            Token::Keyword(Keyword::Repeat) => {
                self.advance();
                self.nested_block()?;
                self.expect(&Token::Keyword(Keyword::Until), "'until'")?;
                self.expr()?;
                "repeat"
            }
            Token::Keyword(Keyword::Goto) => {
                self.advance();
                self.take_name()?;
                "goto"
            }
            Token::Keyword(Keyword::Break) => {
                self.advance();
                "break"
            }
            Token::DoubleColon => {
                self.advance();
                self.take_name()?;
                self.expect(&Token::DoubleColon, "'::'")?;
                "label"
            }
            _ => return self.expr_stat(line),
        };
        Ok(Stmt::Opaque { construct, line })
    }

    /// `cond then block`
    fn cond_then_block(&mut self) -> DecodeResult<()> {
        self.expr()?;
        self.expect(&Token::Keyword(Keyword::Then), "'then'")?;
        self.nested_block()?;
        Ok(())
    }

    /// `do block end`
    fn loop_body(&mut self) -> DecodeResult<()> {
        self.expect(&Token::Keyword(Keyword::Do), "'do'")?;
        self.nested_block()?;
        self.expect(&Token::Keyword(Keyword::End), "'end'")
    }

    /// `(params) block end`; the body is checked and discarded.
    fn func_body(&mut self) -> DecodeResult<()> {
        self.expect(&Token::LParen, "'('")?;
        if !self.eat(&Token::RParen) {
            loop {
                if self.eat(&Token::Ellipsis) {
                    break;
                }
                self.take_name()?;
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect(&Token::RParen, "')'")?;
        }
        self.nested_block()?;
        self.expect(&Token::Keyword(Keyword::End), "'end'")
    }

    fn local(&mut self, line: u32) -> DecodeResult<Stmt> {
        let mut names = vec![self.local_name()?];
        while self.eat(&Token::Comma) {
            names.push(self.local_name()?);
        }
        let values = if self.eat(&Token::Assign) {
            self.expr_list()?
        } else {
            Vec::new()
        };
        Ok(Stmt::Local {
            names,
            values,
            line,
        })
    }

    /// A local name with an optional `<const>`/`<close>` attribute.
    fn local_name(&mut self) -> DecodeResult<String> {
        let name = self.take_name()?;
        if self.eat(&Token::Lt) {
            self.take_name()?;
            self.expect(&Token::Gt, "'>'")?;
        }
        Ok(name)
    }

    fn expr_stat(&mut self, line: u32) -> DecodeResult<Stmt> {
        let first = self.suffixed_expr()?;
        if matches!(self.peek(), Token::Assign | Token::Comma) {
            let mut targets = vec![first];
            while self.eat(&Token::Comma) {
                targets.push(self.suffixed_expr()?);
            }
            self.expect(&Token::Assign, "'='")?;
            if let Some(bad) = targets
                .iter()
                .find(|t| !matches!(t, Expr::Name(_) | Expr::Index { .. }))
            {
                return Err(self.err(format!("cannot assign to {}", bad.describe())));
            }
            let values = self.expr_list()?;
            return Ok(Stmt::Assign {
                targets,
                values,
                line,
            });
        }
        match first {
            call @ (Expr::Call { .. } | Expr::Method { .. }) => Ok(Stmt::Call { call, line }),
            other => Err(DecodeError::parse(
                line,
                format!("syntax error: {} used as a statement", other.describe()),
            )),
        }
    }

    // ── Expressions ─────────────────────────────

    fn expr_list(&mut self) -> DecodeResult<Vec<Expr>> {
        let mut list = vec![self.expr()?];
        while self.eat(&Token::Comma) {
            list.push(self.expr()?);
        }
        Ok(list)
    }

    fn expr(&mut self) -> DecodeResult<Expr> {
        self.subexpr(0)
    }

    fn subexpr(&mut self, limit: u8) -> DecodeResult<Expr> {
        self.nested(|p| p.climb(limit))
    }

    /// Precedence climbing: consume operators binding tighter than `limit`.
    /// Every operator deepens the tree, so each one counts as a level.
    fn climb(&mut self, limit: u8) -> DecodeResult<Expr> {
        self.descend()?;
        let mut lhs = match unary_op(self.peek()) {
            Some(op) => {
                self.advance();
                let operand = self.subexpr(UNARY_PRIORITY)?;
                Expr::Unary {
                    op,
                    operand: Box::new(operand),
                }
            }
            None => self.simple_expr()?,
        };
        while let Some(op) = binary_op(self.peek()) {
            let (left, right) = op.priority();
            if left <= limit {
                break;
            }
            self.descend()?;
            self.advance();
            let rhs = self.subexpr(right)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn simple_expr(&mut self) -> DecodeResult<Expr> {
        let expr = match self.peek() {
            Token::Number(n) => Expr::Number(*n),
            Token::Str(s) => Expr::Str(s.clone()),
            Token::Keyword(Keyword::Nil) => Expr::Nil,
            Token::Keyword(Keyword::True) => Expr::Bool(true),
            Token::Keyword(Keyword::False) => Expr::Bool(false),
            Token::Ellipsis => Expr::Vararg,
            Token::LBrace => return self.table(),
            Token::Keyword(Keyword::Function) => {
                let line = self.line();
                self.advance();
                self.func_body()?;
                return Ok(Expr::Function { line });
            }
            _ => return self.suffixed_expr(),
        };
        self.advance();
        Ok(expr)
    }

    fn primary_expr(&mut self) -> DecodeResult<Expr> {
        match self.peek() {
            Token::Name(_) => Ok(Expr::Name(self.take_name()?)),
            Token::LParen => {
                self.advance();
                let inner = self.expr()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(Expr::Paren(Box::new(inner)))
            }
            other => Err(self.err(format!("unexpected symbol {:?}", other))),
        }
    }

    fn suffixed_expr(&mut self) -> DecodeResult<Expr> {
        self.nested(Self::suffixes)
    }

    fn suffixes(&mut self) -> DecodeResult<Expr> {
        let mut expr = self.primary_expr()?;
        loop {
            if matches!(
                self.peek(),
                Token::Dot | Token::LBracket | Token::Colon | Token::LParen | Token::LBrace | Token::Str(_)
            ) {
                self.descend()?;
            }
            match self.peek() {
                Token::Dot => {
                    self.advance();
                    let name = self.take_name()?;
                    expr = Expr::Index {
                        target: Box::new(expr),
                        key: Box::new(Expr::Str(name)),
                    };
                }
                Token::LBracket => {
                    self.advance();
                    let key = self.expr()?;
                    self.expect(&Token::RBracket, "']'")?;
                    expr = Expr::Index {
                        target: Box::new(expr),
                        key: Box::new(key),
                    };
                }
                Token::Colon => {
                    self.advance();
                    let name = self.take_name()?;
                    let args = self.call_args()?;
                    expr = Expr::Method {
                        target: Box::new(expr),
                        name,
                        args,
                    };
                }
                Token::LParen | Token::LBrace | Token::Str(_) => {
                    let args = self.call_args()?;
                    expr = Expr::Call {
                        target: Box::new(expr),
                        args,
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    fn call_args(&mut self) -> DecodeResult<Vec<Expr>> {
        match self.peek() {
            Token::Str(s) => {
                let arg = Expr::Str(s.clone());
                self.advance();
                Ok(vec![arg])
            }
            Token::LBrace => Ok(vec![self.table()?]),
            Token::LParen => {
                self.advance();
                if self.eat(&Token::RParen) {
                    return Ok(Vec::new());
                }
                let args = self.expr_list()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(args)
            }
            other => Err(self.err(format!("expected function arguments, got {:?}", other))),
        }
    }

    fn table(&mut self) -> DecodeResult<Expr> {
        self.nested(|p| {
            p.descend()?;
            p.table_fields()
        })
    }

    fn table_fields(&mut self) -> DecodeResult<Expr> {
        self.expect(&Token::LBrace, "'{'")?;
        let mut fields = Vec::new();
        while self.peek() != &Token::RBrace {
            fields.push(self.field()?);
            if !self.eat(&Token::Comma) && !self.eat(&Token::Semi) {
                break;
            }
        }
        self.expect(&Token::RBrace, "'}'")?;
        Ok(Expr::Table(fields))
    }

    fn field(&mut self) -> DecodeResult<Field> {
        let line = self.line();
        match self.peek() {
            Token::Name(_) if self.peek_ahead(1) == &Token::Assign => {
                let name = self.take_name()?;
                self.advance();
                let value = self.expr()?;
                Ok(Field::Named { name, value, line })
            }
            Token::LBracket => {
                self.advance();
                let key = self.expr()?;
                self.expect(&Token::RBracket, "']'")?;
                self.expect(&Token::Assign, "'='")?;
                let value = self.expr()?;
                Ok(Field::Keyed { key, value, line })
            }
            _ => Ok(Field::Positional {
                value: self.expr()?,
                line,
            }),
        }
    }
}

fn unary_op(token: &Token) -> Option<UnOp> {
    match token {
        Token::Minus => Some(UnOp::Neg),
        Token::Keyword(Keyword::Not) => Some(UnOp::Not),
        Token::Hash => Some(UnOp::Len),
        Token::Tilde => Some(UnOp::BitNot),
        _ => None,
    }
}

fn binary_op(token: &Token) -> Option<BinOp> {
    let op = match token {
        Token::Keyword(Keyword::Or) => BinOp::Or,
        Token::Keyword(Keyword::And) => BinOp::And,
        Token::Lt => BinOp::Lt,
        Token::Gt => BinOp::Gt,
        Token::Lte => BinOp::Le,
        Token::Gte => BinOp::Ge,
        Token::Neq => BinOp::Ne,
        Token::Eq => BinOp::Eq,
        Token::Pipe => BinOp::BitOr,
        Token::Tilde => BinOp::BitXor,
        Token::Amp => BinOp::BitAnd,
        Token::Shl => BinOp::Shl,
        Token::Shr => BinOp::Shr,
        Token::Concat => BinOp::Concat,
        Token::Plus => BinOp::Add,
        Token::Minus => BinOp::Sub,
        Token::Star => BinOp::Mul,
        Token::Slash => BinOp::Div,
        Token::DoubleSlash => BinOp::IDiv,
        Token::Percent => BinOp::Mod,
        Token::Caret => BinOp::Pow,
        _ => return None,
    };
    Some(op)
}
