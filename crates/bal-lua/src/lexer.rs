//! Byte-level tokenizer for Lua table-literal files.
//!
//! Input is treated as an undecoded 8-bit stream. Inside string literals each
//! source byte becomes exactly one `char` with the same value (Latin-1), so
//! payloads that are not valid UTF-8 survive unchanged and two files with the
//! same bytes always produce the same strings.

use crate::error::{DecodeError, DecodeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    And,
    Break,
    Do,
    Else,
    Elseif,
    End,
    False,
    For,
    Function,
    Goto,
    If,
    In,
    Local,
    Nil,
    Not,
    Or,
    Repeat,
    Return,
    Then,
    True,
    Until,
    While,
}

impl Keyword {
    fn from_word(word: &[u8]) -> Option<Self> {
        let kw = match word {
            b"and" => Self::And,
            b"break" => Self::Break,
            b"do" => Self::Do,
            b"else" => Self::Else,
            b"elseif" => Self::Elseif,
            b"end" => Self::End,
            b"false" => Self::False,
            b"for" => Self::For,
            b"function" => Self::Function,
            b"goto" => Self::Goto,
            b"if" => Self::If,
            b"in" => Self::In,
            b"local" => Self::Local,
            b"nil" => Self::Nil,
            b"not" => Self::Not,
            b"or" => Self::Or,
            b"repeat" => Self::Repeat,
            b"return" => Self::Return,
            b"then" => Self::Then,
            b"true" => Self::True,
            b"until" => Self::Until,
            b"while" => Self::While,
            _ => return None,
        };
        Some(kw)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Break => "break",
            Self::Do => "do",
            Self::Else => "else",
            Self::Elseif => "elseif",
            Self::End => "end",
            Self::False => "false",
            Self::For => "for",
            Self::Function => "function",
            Self::Goto => "goto",
            Self::If => "if",
            Self::In => "in",
            Self::Local => "local",
            Self::Nil => "nil",
            Self::Not => "not",
            Self::Or => "or",
            Self::Repeat => "repeat",
            Self::Return => "return",
            Self::Then => "then",
            Self::True => "true",
            Self::Until => "until",
            Self::While => "while",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Name(String),
    Keyword(Keyword),
    /// String literal with escapes resolved, one `char` per byte.
    Str(String),
    Number(f64),
    // Punctuation
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
    Semi,
    Dot,
    Colon,
    DoubleColon,
    Concat,
    Ellipsis,
    Assign,
    // Comparison operators
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    // Arithmetic and bitwise operators
    Plus,
    Minus,
    Star,
    Slash,
    DoubleSlash,
    Percent,
    Caret,
    Hash,
    Amp,
    Pipe,
    Tilde,
    Shl,
    Shr,
    // End of input
    Eof,
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub line: u32,
}

/// Tokenize a whole chunk. The last token is always [`Token::Eof`].
pub fn lex(src: &[u8]) -> DecodeResult<Vec<Spanned>> {
    let mut lexer = Lexer {
        src,
        pos: 0,
        line: 1,
    };
    lexer.skip_shebang();

    let mut tokens = Vec::new();
    loop {
        lexer.skip_trivia()?;
        let line = lexer.line;
        let Some(c) = lexer.peek() else {
            tokens.push(Spanned {
                token: Token::Eof,
                line,
            });
            break;
        };
        let token = match c {
            b'"' | b'\'' => Token::Str(lexer.short_string(c)?),
            b'[' if lexer.long_bracket_level().is_some() => Token::Str(lexer.long_string()?),
            b'0'..=b'9' => Token::Number(lexer.number()?),
            b'.' if lexer.peek_at(1).is_some_and(|d| d.is_ascii_digit()) => {
                Token::Number(lexer.number()?)
            }
            c if is_name_start(c) => lexer.word(),
            _ => lexer.punct()?,
        };
        tokens.push(Spanned { token, line });
    }
    Ok(tokens)
}

fn is_name_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\r' | b'\n' | 0x0b | 0x0c)
}

fn push_byte(out: &mut String, b: u8) {
    out.push(char::from(b));
}

struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
    line: u32,
}

impl<'a> Lexer<'a> {
    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
        }
        Some(b)
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn err(&self, message: impl Into<String>) -> DecodeError {
        DecodeError::lex(self.line, message)
    }

    fn skip_shebang(&mut self) {
        if self.src.starts_with(b"#") {
            while let Some(b) = self.peek() {
                if b == b'\n' {
                    break;
                }
                self.bump();
            }
        }
    }

    fn skip_trivia(&mut self) -> DecodeResult<()> {
        loop {
            match self.peek() {
                Some(c) if is_space(c) => {
                    self.bump();
                }
                Some(b'-') if self.peek_at(1) == Some(b'-') => {
                    self.pos += 2;
                    if self.peek() == Some(b'[') && self.long_bracket_level().is_some() {
                        self.long_string()
                            .map_err(|_| self.err("unterminated block comment"))?;
                    } else {
                        while let Some(b) = self.peek() {
                            if b == b'\n' {
                                break;
                            }
                            self.bump();
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// If the input at the cursor opens a long bracket (`[[`, `[==[`),
    /// return its level without consuming anything.
    fn long_bracket_level(&self) -> Option<usize> {
        if self.peek() != Some(b'[') {
            return None;
        }
        let mut level = 0;
        while self.peek_at(1 + level) == Some(b'=') {
            level += 1;
        }
        (self.peek_at(1 + level) == Some(b'[')).then_some(level)
    }

    fn long_string(&mut self) -> DecodeResult<String> {
        let start_line = self.line;
        let level = self
            .long_bracket_level()
            .ok_or_else(|| self.err("expected long bracket"))?;
        self.pos += level + 2;

        // A newline directly after the opening bracket is not part of the string.
        if self.eat(b'\r') {
            self.eat(b'\n');
        } else if self.eat(b'\n') {
            self.eat(b'\r');
        }

        let mut out = String::new();
        loop {
            let Some(b) = self.bump() else {
                return Err(DecodeError::lex(start_line, "unterminated long string"));
            };
            if b == b']' {
                let closes = (0..level).all(|i| self.peek_at(i) == Some(b'='))
                    && self.peek_at(level) == Some(b']');
                if closes {
                    self.pos += level + 1;
                    return Ok(out);
                }
            }
            push_byte(&mut out, b);
        }
    }

    fn short_string(&mut self, quote: u8) -> DecodeResult<String> {
        let start_line = self.line;
        self.bump();
        let mut out = String::new();
        loop {
            let Some(b) = self.bump() else {
                return Err(DecodeError::lex(start_line, "unterminated string literal"));
            };
            match b {
                _ if b == quote => return Ok(out),
                b'\n' => {
                    return Err(DecodeError::lex(start_line, "unterminated string literal"));
                }
                b'\\' => self.escape(&mut out)?,
                _ => push_byte(&mut out, b),
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> DecodeResult<()> {
        let Some(b) = self.bump() else {
            return Err(self.err("unterminated escape sequence"));
        };
        match b {
            b'n' => out.push('\n'),
            b't' => out.push('\t'),
            b'r' => out.push('\r'),
            b'a' => out.push('\u{7}'),
            b'b' => out.push('\u{8}'),
            b'f' => out.push('\u{c}'),
            b'v' => out.push('\u{b}'),
            b'\\' | b'"' | b'\'' => push_byte(out, b),
            b'\n' => {
                out.push('\n');
                self.eat(b'\r');
            }
            b'\r' => {
                out.push('\n');
                self.eat(b'\n');
            }
            b'z' => {
                while self.peek().is_some_and(is_space) {
                    self.bump();
                }
            }
            b'x' => {
                let hi = self.hex_digit()?;
                let lo = self.hex_digit()?;
                push_byte(out, (hi << 4) | lo);
            }
            b'u' => {
                if !self.eat(b'{') {
                    return Err(self.err("missing '{' in \\u{xxxx}"));
                }
                let mut code: u32 = 0;
                let mut digits = 0;
                while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                    let d = self.hex_digit()?;
                    code = code
                        .checked_mul(16)
                        .and_then(|c| c.checked_add(u32::from(d)))
                        .filter(|c| *c <= 0x7FFF_FFFF)
                        .ok_or_else(|| self.err("UTF-8 value too large"))?;
                    digits += 1;
                }
                if digits == 0 || !self.eat(b'}') {
                    return Err(self.err("malformed \\u{xxxx} escape"));
                }
                let ch = char::from_u32(code).ok_or_else(|| self.err("invalid code point"))?;
                let mut buf = [0u8; 4];
                for byte in ch.encode_utf8(&mut buf).bytes() {
                    push_byte(out, byte);
                }
            }
            b'0'..=b'9' => {
                let mut value = u32::from(b - b'0');
                for _ in 0..2 {
                    match self.peek() {
                        Some(d @ b'0'..=b'9') => {
                            value = value * 10 + u32::from(d - b'0');
                            self.bump();
                        }
                        _ => break,
                    }
                }
                let byte = u8::try_from(value).map_err(|_| self.err("decimal escape too large"))?;
                push_byte(out, byte);
            }
            other => {
                return Err(self.err(format!("invalid escape sequence '\\{}'", char::from(other))));
            }
        }
        Ok(())
    }

    fn hex_digit(&mut self) -> DecodeResult<u8> {
        match self.peek() {
            Some(c) if c.is_ascii_hexdigit() => {
                self.bump();
                // to_digit cannot fail on an ASCII hex digit
                Ok(char::from(c).to_digit(16).unwrap_or(0) as u8)
            }
            _ => Err(self.err("hexadecimal digit expected")),
        }
    }

    fn number(&mut self) -> DecodeResult<f64> {
        let start = self.pos;
        let is_hex = self.peek() == Some(b'0') && matches!(self.peek_at(1), Some(b'x' | b'X'));
        let value = if is_hex {
            self.pos += 2;
            self.hex_number()?
        } else {
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
            if self.peek() == Some(b'.') {
                self.pos += 1;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
            }
            if matches!(self.peek(), Some(b'e' | b'E')) {
                self.pos += 1;
                if matches!(self.peek(), Some(b'+' | b'-')) {
                    self.pos += 1;
                }
                if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    return Err(self.err("malformed number"));
                }
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
            }
            let text = std::str::from_utf8(&self.src[start..self.pos])
                .map_err(|_| self.err("malformed number"))?;
            text.parse::<f64>()
                .map_err(|_| self.err(format!("malformed number '{text}'")))?
        };
        if self.peek().is_some_and(is_name_char) {
            return Err(self.err("malformed number"));
        }
        Ok(value)
    }

    fn hex_number(&mut self) -> DecodeResult<f64> {
        let mut mantissa = 0f64;
        let mut exponent: i32 = 0;
        let mut any_digit = false;
        while let Some(d) = self.peek().and_then(|c| char::from(c).to_digit(16)) {
            mantissa = mantissa * 16.0 + f64::from(d);
            any_digit = true;
            self.pos += 1;
        }
        if self.peek() == Some(b'.') {
            self.pos += 1;
            while let Some(d) = self.peek().and_then(|c| char::from(c).to_digit(16)) {
                mantissa = mantissa * 16.0 + f64::from(d);
                exponent -= 4;
                any_digit = true;
                self.pos += 1;
            }
        }
        if !any_digit {
            return Err(self.err("malformed number"));
        }
        if matches!(self.peek(), Some(b'p' | b'P')) {
            self.pos += 1;
            let negative = match self.peek() {
                Some(b'-') => {
                    self.pos += 1;
                    true
                }
                Some(b'+') => {
                    self.pos += 1;
                    false
                }
                _ => false,
            };
            let mut exp: i32 = 0;
            let mut any_exp = false;
            while let Some(d @ b'0'..=b'9') = self.peek() {
                exp = exp.saturating_mul(10).saturating_add(i32::from(d - b'0'));
                any_exp = true;
                self.pos += 1;
            }
            if !any_exp {
                return Err(self.err("malformed number"));
            }
            exponent = exponent.saturating_add(if negative { -exp } else { exp });
        }
        Ok(mantissa * 2f64.powi(exponent))
    }

    fn word(&mut self) -> Token {
        let start = self.pos;
        while self.peek().is_some_and(is_name_char) {
            self.pos += 1;
        }
        let word = &self.src[start..self.pos];
        match Keyword::from_word(word) {
            Some(kw) => Token::Keyword(kw),
            // Name characters are ASCII, so this is lossless.
            None => Token::Name(word.iter().copied().map(char::from).collect()),
        }
    }

    fn punct(&mut self) -> DecodeResult<Token> {
        let Some(c) = self.bump() else {
            return Err(self.err("unexpected end of input"));
        };
        let token = match c {
            b'{' => Token::LBrace,
            b'}' => Token::RBrace,
            b'[' => Token::LBracket,
            b']' => Token::RBracket,
            b'(' => Token::LParen,
            b')' => Token::RParen,
            b',' => Token::Comma,
            b';' => Token::Semi,
            b'+' => Token::Plus,
            b'-' => Token::Minus,
            b'*' => Token::Star,
            b'%' => Token::Percent,
            b'^' => Token::Caret,
            b'#' => Token::Hash,
            b'&' => Token::Amp,
            b'|' => Token::Pipe,
            b':' if self.eat(b':') => Token::DoubleColon,
            b':' => Token::Colon,
            b'/' if self.eat(b'/') => Token::DoubleSlash,
            b'/' => Token::Slash,
            b'=' if self.eat(b'=') => Token::Eq,
            b'=' => Token::Assign,
            b'~' if self.eat(b'=') => Token::Neq,
            b'~' => Token::Tilde,
            b'<' if self.eat(b'=') => Token::Lte,
            b'<' if self.eat(b'<') => Token::Shl,
            b'<' => Token::Lt,
            b'>' if self.eat(b'=') => Token::Gte,
            b'>' if self.eat(b'>') => Token::Shr,
            b'>' => Token::Gt,
            b'.' if self.peek() == Some(b'.') && self.peek_at(1) == Some(b'.') => {
                self.pos += 2;
                Token::Ellipsis
            }
            b'.' if self.eat(b'.') => Token::Concat,
            b'.' => Token::Dot,
            other => {
                return Err(self.err(format!("unexpected character 0x{other:02x}")));
            }
        };
        Ok(token)
    }
}
