//! Lexer for Ghost built on logos, with string interning.
//!
//! Identifiers and string literals are interned; string literals are
//! unescaped before interning. Newlines are consumed as trivia while a line
//! counter in the lexer extras advances, so every token carries a 1-based
//! line number for the `[<line>]` prefix of runtime errors.

use logos::{Logos, Skip};

use super::{Span, Token, TokenKind};
use crate::errors::DiagnosticBag;
use crate::intern::StringInterner;

/// Line counter threaded through the raw lexer.
#[derive(Clone, Copy)]
pub struct LineTracker {
    pub line: u32,
}

impl Default for LineTracker {
    fn default() -> Self {
        LineTracker { line: 1 }
    }
}

fn newline(lex: &mut logos::Lexer<RawToken>) -> Skip {
    lex.extras.line += 1;
    Skip
}

/// Raw token from logos (before interning).
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(extras = LineTracker)]
#[logos(skip r"[ \t\r\f]+")] // Skip horizontal whitespace
#[logos(skip r"//[^\n]*")] // Skip line comments
enum RawToken {
    #[token("\n", newline)]
    Newline,

    // === Keywords ===
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("for")]
    For,
    #[token("in")]
    In,
    #[token("function")]
    Function,
    #[token("return")]
    Return,
    #[token("import")]
    Import,
    #[token("and")]
    And,
    #[token("or")]
    Or,

    // === Literals ===
    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    Str,

    // === Identifiers ===
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    // === Symbols ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("..")]
    DotDot,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,

    // === Operators ===
    #[token(":=")]
    ColonEq,
    #[token("=")]
    Eq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
}

/// Tokens produced by a full lex of one source unit, plus any diagnostics.
#[derive(Debug)]
pub struct TokenList {
    pub tokens: Vec<Token>,
    pub diagnostics: DiagnosticBag,
}

/// Lexer over a source string.
pub struct Lexer<'src, 'i> {
    source: &'src str,
    interner: &'i StringInterner,
}

impl<'src, 'i> Lexer<'src, 'i> {
    pub fn new(source: &'src str, interner: &'i StringInterner) -> Self {
        Lexer { source, interner }
    }

    /// Lex the entire source, appending a trailing Eof token.
    pub fn lex_all(self) -> TokenList {
        let mut raw = RawToken::lexer(self.source);
        let mut tokens = Vec::new();
        let mut diagnostics = DiagnosticBag::new();

        while let Some(result) = raw.next() {
            let range = raw.span();
            let span = Span::new(range.start as u32, range.end as u32, raw.extras.line);
            match result {
                Ok(token) => {
                    let kind = self.convert(token, raw.slice());
                    tokens.push(Token::new(kind, span));
                }
                Err(()) => {
                    diagnostics.error(format!("unexpected character {:?}", raw.slice()), span);
                    tokens.push(Token::new(TokenKind::Error, span));
                }
            }
        }

        let end = self.source.len() as u32;
        tokens.push(Token::new(
            TokenKind::Eof,
            Span::new(end, end, raw.extras.line),
        ));

        TokenList {
            tokens,
            diagnostics,
        }
    }

    fn convert(&self, raw: RawToken, slice: &str) -> TokenKind {
        match raw {
            RawToken::Newline => unreachable!("newlines are skipped"),
            RawToken::True => TokenKind::True,
            RawToken::False => TokenKind::False,
            RawToken::Null => TokenKind::Null,
            RawToken::If => TokenKind::If,
            RawToken::Else => TokenKind::Else,
            RawToken::While => TokenKind::While,
            RawToken::For => TokenKind::For,
            RawToken::In => TokenKind::In,
            RawToken::Function => TokenKind::Function,
            RawToken::Return => TokenKind::Return,
            RawToken::Import => TokenKind::Import,
            RawToken::And => TokenKind::And,
            RawToken::Or => TokenKind::Or,
            RawToken::Number => TokenKind::Number(self.interner.intern(slice)),
            RawToken::Str => {
                let unescaped = unescape(&slice[1..slice.len() - 1]);
                TokenKind::Str(self.interner.intern(&unescaped))
            }
            RawToken::Ident => TokenKind::Ident(self.interner.intern(slice)),
            RawToken::LParen => TokenKind::LParen,
            RawToken::RParen => TokenKind::RParen,
            RawToken::LBrace => TokenKind::LBrace,
            RawToken::RBrace => TokenKind::RBrace,
            RawToken::LBracket => TokenKind::LBracket,
            RawToken::RBracket => TokenKind::RBracket,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Dot => TokenKind::Dot,
            RawToken::DotDot => TokenKind::DotDot,
            RawToken::Colon => TokenKind::Colon,
            RawToken::Semicolon => TokenKind::Semicolon,
            RawToken::ColonEq => TokenKind::ColonEq,
            RawToken::Eq => TokenKind::Eq,
            RawToken::EqEq => TokenKind::EqEq,
            RawToken::NotEq => TokenKind::NotEq,
            RawToken::Lt => TokenKind::Lt,
            RawToken::LtEq => TokenKind::LtEq,
            RawToken::Gt => TokenKind::Gt,
            RawToken::GtEq => TokenKind::GtEq,
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Star => TokenKind::Star,
            RawToken::Slash => TokenKind::Slash,
            RawToken::Percent => TokenKind::Percent,
            RawToken::Bang => TokenKind::Bang,
            RawToken::PlusPlus => TokenKind::PlusPlus,
            RawToken::MinusMinus => TokenKind::MinusMinus,
            RawToken::PlusEq => TokenKind::PlusEq,
            RawToken::MinusEq => TokenKind::MinusEq,
            RawToken::StarEq => TokenKind::StarEq,
            RawToken::SlashEq => TokenKind::SlashEq,
        }
    }
}

/// Resolve backslash escapes inside a string literal body.
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            // Unknown escape: keep the character as written
            Some(other) => out.push(other),
            None => break,
        }
    }
    out
}
