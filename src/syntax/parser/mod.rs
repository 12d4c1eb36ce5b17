//! Parser for Ghost.
//!
//! Recursive descent, split by responsibility:
//! - `mod.rs` - parser state, statements, blocks, recovery
//! - `expr.rs` - expression parsing with binding powers

mod expr;

use super::ast::{Block, FunctionLiteral, Program, Stmt, StmtKind};
use super::lexer::TokenList;
use super::{Span, Token, TokenKind};
use crate::errors::{Diagnostic, DiagnosticBag};
use crate::intern::{Name, StringInterner};
use std::rc::Rc;

/// Result of parsing one source unit.
#[derive(Debug)]
pub struct ParseResult {
    pub program: Program,
    pub diagnostics: DiagnosticBag,
}

/// Parser state.
pub struct Parser<'src, 'i> {
    /// Token list from the lexer.
    pub(crate) tokens: &'src [Token],
    /// String interner.
    pub(crate) interner: &'i StringInterner,
    /// Current token index.
    pub(crate) pos: usize,
    /// Collected diagnostics (seeded with the lexer's).
    pub(crate) diagnostics: DiagnosticBag,
}

impl<'src, 'i> Parser<'src, 'i> {
    /// Create a new parser over a lexed token list.
    pub fn new(tokens: &'src TokenList, interner: &'i StringInterner) -> Self {
        Parser {
            tokens: &tokens.tokens,
            interner,
            pos: 0,
            diagnostics: tokens.diagnostics.clone(),
        }
    }

    /// Parse a complete program.
    pub fn parse_program(mut self) -> ParseResult {
        let mut statements = Vec::new();

        self.skip_separators();
        while !self.at_end() {
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(diag) => {
                    self.diagnostics.push(diag);
                    self.recover_to_next_statement();
                }
            }
            self.skip_separators();
        }

        ParseResult {
            program: Program { statements },
            diagnostics: self.diagnostics,
        }
    }

    // ===== Statements =====

    pub(crate) fn parse_statement(&mut self) -> Result<Stmt, Diagnostic> {
        let line = self.current_line();
        match self.current_kind() {
            TokenKind::Return => {
                self.advance();
                let value = if self.current_kind().can_start_expr() {
                    Some(self.parse_expression()?)
                } else {
                    None
                };
                self.eat(&TokenKind::Semicolon);
                Ok(Stmt {
                    kind: StmtKind::Return(value),
                    line,
                })
            }
            // `function name(...) { ... }` is a named function statement;
            // `function(...) { ... }` is an expression.
            TokenKind::Function if matches!(self.peek(1), TokenKind::Ident(_)) => {
                self.advance();
                let name = self.expect_ident("expected function name")?;
                let function = self.parse_function_rest(line)?;
                Ok(Stmt {
                    kind: StmtKind::Function {
                        name,
                        function: Rc::new(function),
                    },
                    line,
                })
            }
            _ => {
                let expr = self.parse_expression()?;
                self.eat(&TokenKind::Semicolon);
                Ok(Stmt {
                    kind: StmtKind::Expr(expr),
                    line,
                })
            }
        }
    }

    /// Parse the parameter list and body of a function, after the name (if
    /// any) has been consumed.
    pub(crate) fn parse_function_rest(&mut self, line: u32) -> Result<FunctionLiteral, Diagnostic> {
        self.consume(&TokenKind::LParen, "expected '(' after 'function'")?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                params.push(self.expect_ident("expected parameter name")?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(&TokenKind::RParen, "expected ')' after parameters")?;
        let body = self.parse_block()?;
        Ok(FunctionLiteral { params, body, line })
    }

    /// Parse a braced block.
    pub(crate) fn parse_block(&mut self) -> Result<Block, Diagnostic> {
        let line = self.current_line();
        self.consume(&TokenKind::LBrace, "expected '{'")?;
        let mut statements = Vec::new();
        self.skip_separators();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            statements.push(self.parse_statement()?);
            self.skip_separators();
        }
        self.consume(&TokenKind::RBrace, "expected '}'")?;
        Ok(Block { statements, line })
    }

    // ===== Token access =====

    pub(crate) fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub(crate) fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    pub(crate) fn current_span(&self) -> Span {
        self.current().span
    }

    pub(crate) fn current_line(&self) -> u32 {
        self.current().line()
    }

    pub(crate) fn at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    pub(crate) fn peek(&self, offset: usize) -> &TokenKind {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.at_end() {
            self.pos += 1;
        }
        &self.tokens[self.pos.saturating_sub(1)]
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    /// Consume the token if it matches, returning whether it did.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn consume(&mut self, kind: &TokenKind, msg: &str) -> Result<&Token, Diagnostic> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(msg))
        }
    }

    pub(crate) fn expect_ident(&mut self, msg: &str) -> Result<Name, Diagnostic> {
        match *self.current_kind() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.error(msg)),
        }
    }

    pub(crate) fn error(&self, msg: &str) -> Diagnostic {
        Diagnostic::error(
            format!("{}, found '{}'", msg, self.current_kind().display_name()),
            self.current_span(),
        )
    }

    pub(crate) fn skip_separators(&mut self) {
        while self.check(&TokenKind::Semicolon) {
            self.advance();
        }
    }

    /// After a parse error, skip forward past the next statement separator.
    /// Always makes progress, so a stray token cannot wedge the parser.
    fn recover_to_next_statement(&mut self) {
        while !self.at_end() {
            if self.eat(&TokenKind::Semicolon) {
                return;
            }
            self.advance();
        }
    }
}
