//! Scanner (tokenizer) for MicroJava source text
//!
//! Converts raw source text into [`Token`]s, one per [`Scanner::next`] call.
//! The scanner never fails: an unrecognized character becomes a token of kind
//! [`TokenKind::None`], which the parser turns into an ordinary "X expected"
//! diagnostic at the point the token fails to match a production.  Line
//! comments are skipped and never become tokens.

use crate::diagnostics::Diagnostics;
use rustc_hash::FxHashMap;
use std::fmt;

/// All token kinds produced by the scanner.
///
/// `None` doubles as the soft lexical-error kind: a lone `!` or an
/// unrecognized character yields it, and the parser recovers from it like
/// from any other unexpected token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TokenKind {
    None = 0,
    Ident,
    Number,
    CharCon,

    // Operators
    Plus,   // +
    Minus,  // -
    Times,  // *
    Slash,  // /
    Rem,    // %
    Eql,    // ==
    Neq,    // !=
    Lss,    // <
    Leq,    // <=
    Gtr,    // >
    Geq,    // >=
    Assign, // =

    // Delimiters
    Semicolon, // ;
    Comma,     // ,
    Period,    // .
    Lpar,      // (
    Rpar,      // )
    Lbrack,    // [
    Rbrack,    // ]
    Lbrace,    // {
    Rbrace,    // }

    // Keywords
    Class,
    Else,
    Final,
    If,
    New,
    Print,
    Program,
    Read,
    Return,
    Void,
    While,

    // End of input
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::None => "none",
            TokenKind::Ident => "identifier",
            TokenKind::Number => "number",
            TokenKind::CharCon => "char constant",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Times => "*",
            TokenKind::Slash => "/",
            TokenKind::Rem => "%",
            TokenKind::Eql => "==",
            TokenKind::Neq => "!=",
            TokenKind::Lss => "<",
            TokenKind::Leq => "<=",
            TokenKind::Gtr => ">",
            TokenKind::Geq => ">=",
            TokenKind::Assign => "=",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::Period => ".",
            TokenKind::Lpar => "(",
            TokenKind::Rpar => ")",
            TokenKind::Lbrack => "[",
            TokenKind::Rbrack => "]",
            TokenKind::Lbrace => "{",
            TokenKind::Rbrace => "}",
            TokenKind::Class => "class",
            TokenKind::Else => "else",
            TokenKind::Final => "final",
            TokenKind::If => "if",
            TokenKind::New => "new",
            TokenKind::Print => "print",
            TokenKind::Program => "program",
            TokenKind::Read => "read",
            TokenKind::Return => "return",
            TokenKind::Void => "void",
            TokenKind::While => "while",
            TokenKind::Eof => "end of file",
        };
        write!(f, "{}", name)
    }
}

/// One scanned token.
///
/// `line` is 1-based; `col` counts characters from the start of the line and
/// resets on every newline.  `val` carries number and char-constant payloads,
/// `text` carries identifier spellings; both stay at their defaults for every
/// other kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub col: usize,
    pub val: i32,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize, col: usize) -> Self {
        Self {
            kind,
            line,
            col,
            val: 0,
            text: String::new(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Ident => write!(f, "identifier '{}'", self.text),
            TokenKind::Number => write!(f, "number {}", self.val),
            TokenKind::CharCon => write!(f, "char constant {}", self.val),
            kind => write!(f, "'{}'", kind),
        }
    }
}

/// A constant set of token kinds, used for first and synchronization sets.
#[derive(Debug, Clone, Copy)]
pub struct TokenSet(u64);

impl TokenSet {
    pub const fn of(kinds: &[TokenKind]) -> Self {
        let mut bits = 0u64;
        let mut i = 0;
        while i < kinds.len() {
            bits |= 1 << kinds[i] as u64;
            i += 1;
        }
        Self(bits)
    }

    pub const fn contains(self, kind: TokenKind) -> bool {
        self.0 & (1 << kind as u64) != 0
    }
}

const KEYWORDS: &[(&str, TokenKind)] = &[
    ("class", TokenKind::Class),
    ("else", TokenKind::Else),
    ("final", TokenKind::Final),
    ("if", TokenKind::If),
    ("new", TokenKind::New),
    ("print", TokenKind::Print),
    ("program", TokenKind::Program),
    ("read", TokenKind::Read),
    ("return", TokenKind::Return),
    ("void", TokenKind::Void),
    ("while", TokenKind::While),
];

/// Scanner for MicroJava source text.
pub struct Scanner {
    input: Vec<char>,
    position: usize,
    line: usize,
    col: usize,
    keywords: FxHashMap<&'static str, TokenKind>,
}

impl Scanner {
    /// Create a new scanner for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            col: 0,
            keywords: KEYWORDS.iter().copied().collect(),
        }
    }

    /// Return the next token.
    ///
    /// Lexical problems (integer overflow, malformed character constants) are
    /// reported through `diags` and still yield a token, so the caller can
    /// keep scanning.  Once the input is exhausted this returns an end-of-file
    /// token on every call.
    pub fn next(&mut self, diags: &mut Diagnostics) -> Token {
        // Everything at or below the space character counts as whitespace.
        while let Some(ch) = self.peek() {
            if ch <= ' ' {
                self.advance();
            } else {
                break;
            }
        }

        let ch = match self.advance() {
            Some(ch) => ch,
            None => return Token::new(TokenKind::Eof, self.line, self.col),
        };
        let line = self.line;
        let col = self.col;

        match ch {
            'a'..='z' | 'A'..='Z' => self.read_name(ch, line, col),
            '0'..='9' => self.read_number(ch, line, col, diags),
            '\'' => self.read_char_con(line, col, diags),

            ';' => Token::new(TokenKind::Semicolon, line, col),
            ',' => Token::new(TokenKind::Comma, line, col),
            '.' => Token::new(TokenKind::Period, line, col),
            '+' => Token::new(TokenKind::Plus, line, col),
            '-' => Token::new(TokenKind::Minus, line, col),
            '*' => Token::new(TokenKind::Times, line, col),
            '%' => Token::new(TokenKind::Rem, line, col),
            '(' => Token::new(TokenKind::Lpar, line, col),
            ')' => Token::new(TokenKind::Rpar, line, col),
            '[' => Token::new(TokenKind::Lbrack, line, col),
            ']' => Token::new(TokenKind::Rbrack, line, col),
            '{' => Token::new(TokenKind::Lbrace, line, col),
            '}' => Token::new(TokenKind::Rbrace, line, col),

            '=' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Token::new(TokenKind::Eql, line, col)
                } else {
                    Token::new(TokenKind::Assign, line, col)
                }
            }
            '<' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Token::new(TokenKind::Leq, line, col)
                } else {
                    Token::new(TokenKind::Lss, line, col)
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Token::new(TokenKind::Geq, line, col)
                } else {
                    Token::new(TokenKind::Gtr, line, col)
                }
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Token::new(TokenKind::Neq, line, col)
                } else {
                    // A lone '!' is not an operator in this language.
                    Token::new(TokenKind::None, line, col)
                }
            }
            '/' => {
                if self.peek() == Some('/') {
                    // Line comment: discard up to, but not including, the end
                    // of the line, then scan the next real token.  A comment
                    // on the last line ends at end of input instead.
                    while let Some(ch) = self.peek() {
                        if ch == '\n' {
                            break;
                        }
                        self.advance();
                    }
                    self.next(diags)
                } else {
                    Token::new(TokenKind::Slash, line, col)
                }
            }

            _ => Token::new(TokenKind::None, line, col),
        }
    }

    /// Read an identifier or keyword (maximal munch of letters and digits).
    fn read_name(&mut self, first: char, line: usize, col: usize) -> Token {
        let mut name = String::new();
        name.push(first);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let mut token = Token::new(TokenKind::Ident, line, col);
        match self.keywords.get(name.as_str()) {
            Some(&kind) => token.kind = kind,
            None => token.text = name,
        }
        token
    }

    /// Read a decimal integer literal (maximal munch of digits).
    fn read_number(
        &mut self,
        first: char,
        line: usize,
        col: usize,
        diags: &mut Diagnostics,
    ) -> Token {
        let mut digits = String::new();
        digits.push(first);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let mut token = Token::new(TokenKind::Number, line, col);
        match digits.parse::<i32>() {
            Ok(val) => token.val = val,
            // Out of the 32-bit signed range: report and keep scanning.
            Err(_) => diags.report(line, col, "integer constant too large"),
        }
        token
    }

    /// Read a character constant (the opening quote is already consumed).
    ///
    /// Accepts exactly one plain or escaped character followed by the closing
    /// quote.  Anything else is reported as "not a valid character constant",
    /// and the scanner resynchronizes on the closing quote if one is still on
    /// the current line.  A token is produced in every case.
    fn read_char_con(&mut self, line: usize, col: usize, diags: &mut Diagnostics) -> Token {
        let mut token = Token::new(TokenKind::CharCon, line, col);
        let mut valid = true;

        match self.peek() {
            Some('\\') => {
                self.advance();
                match self.peek() {
                    Some('n') => token.val = '\n' as i32,
                    Some('r') => token.val = '\r' as i32,
                    Some('t') => token.val = '\t' as i32,
                    Some('\\') => token.val = '\\' as i32,
                    Some('\'') => token.val = '\'' as i32,
                    Some('0') => token.val = 0,
                    _ => valid = false,
                }
                if valid {
                    self.advance();
                }
            }
            Some('\'') | Some('\n') | None => valid = false,
            Some(ch) => {
                token.val = ch as i32;
                self.advance();
            }
        }

        if valid && self.peek() == Some('\'') {
            self.advance();
        } else {
            valid = false;
            while let Some(ch) = self.peek() {
                if ch == '\n' {
                    break;
                }
                self.advance();
                if ch == '\'' {
                    break;
                }
            }
        }

        if !valid {
            diags.report(line, col, "not a valid character constant");
            token.val = 0;
        }
        token
    }

    /// Peek at the next character without consuming it.
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Consume the next character, keeping the line and column counters in
    /// step.  The column counter resets to zero on every newline.
    fn advance(&mut self) -> Option<char> {
        let ch = self.input.get(self.position).copied()?;
        self.position += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 0;
        } else {
            self.col += 1;
        }
        Some(ch)
    }
}
