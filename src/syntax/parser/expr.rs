//! Expression parsing.
//!
//! Precedence climbing over `BinaryOp::precedence`, with assignment handled
//! at the entry point (loosest, right-associative) and calls, indexing, dot
//! access, and postfix increment handled as suffixes.

use super::Parser;
use crate::errors::Diagnostic;
use crate::syntax::ast::{Block, Expr, ExprKind};
use crate::syntax::operators::{AssignOp, BinaryOp, PostfixOp, UnaryOp};
use crate::syntax::TokenKind;
use bigdecimal::BigDecimal;
use std::rc::Rc;

impl<'src, 'i> Parser<'src, 'i> {
    /// Parse a full expression, including assignment forms.
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, Diagnostic> {
        let lhs = self.parse_binary(0)?;

        let op = match self.current_kind() {
            TokenKind::ColonEq => Some(AssignOp::Declare),
            TokenKind::Eq => Some(AssignOp::Assign),
            TokenKind::PlusEq => Some(AssignOp::AddAssign),
            TokenKind::MinusEq => Some(AssignOp::SubAssign),
            TokenKind::StarEq => Some(AssignOp::MulAssign),
            TokenKind::SlashEq => Some(AssignOp::DivAssign),
            _ => None,
        };

        let Some(op) = op else {
            return Ok(lhs);
        };

        if !matches!(lhs.kind, ExprKind::Ident(_) | ExprKind::Index { .. }) {
            return Err(self.error("invalid assignment target"));
        }

        let line = lhs.line;
        self.advance();
        // Right-associative: a := b := c is a := (b := c)
        let value = self.parse_expression()?;
        Ok(Expr::new(
            ExprKind::Assign {
                op,
                target: Box::new(lhs),
                value: Box::new(value),
            },
            line,
        ))
    }

    fn current_binary_op(&self) -> Option<BinaryOp> {
        match self.current_kind() {
            TokenKind::Plus => Some(BinaryOp::Add),
            TokenKind::Minus => Some(BinaryOp::Sub),
            TokenKind::Star => Some(BinaryOp::Mul),
            TokenKind::Slash => Some(BinaryOp::Div),
            TokenKind::Percent => Some(BinaryOp::Mod),
            TokenKind::EqEq => Some(BinaryOp::Eq),
            TokenKind::NotEq => Some(BinaryOp::Ne),
            TokenKind::Lt => Some(BinaryOp::Lt),
            TokenKind::LtEq => Some(BinaryOp::Le),
            TokenKind::Gt => Some(BinaryOp::Gt),
            TokenKind::GtEq => Some(BinaryOp::Ge),
            TokenKind::And => Some(BinaryOp::And),
            TokenKind::Or => Some(BinaryOp::Or),
            TokenKind::DotDot => Some(BinaryOp::Range),
            _ => None,
        }
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr, Diagnostic> {
        let mut left = self.parse_unary()?;

        while let Some(op) = self.current_binary_op() {
            let prec = op.precedence();
            if prec <= min_prec {
                break;
            }
            self.advance();
            let right = self.parse_binary(prec)?;
            let line = left.line;
            left = Expr::new(
                ExprKind::Infix {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                line,
            );
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, Diagnostic> {
        let line = self.current_line();
        // `--x` lexes as a single decrement token; in prefix position it is
        // a double negation.
        if matches!(self.current_kind(), TokenKind::MinusMinus) {
            self.advance();
            let operand = self.parse_unary()?;
            let inner = Expr::new(
                ExprKind::Prefix {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                },
                line,
            );
            return Ok(Expr::new(
                ExprKind::Prefix {
                    op: UnaryOp::Neg,
                    operand: Box::new(inner),
                },
                line,
            ));
        }
        let op = match self.current_kind() {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::new(
                ExprKind::Prefix {
                    op,
                    operand: Box::new(operand),
                },
                line,
            ));
        }
        self.parse_suffixed()
    }

    /// Parse a primary expression followed by any number of call, index,
    /// dot, and postfix suffixes.
    fn parse_suffixed(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.current_kind() {
                TokenKind::LParen => {
                    let line = expr.line;
                    self.advance();
                    let args = self.parse_call_args()?;
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        line,
                    );
                }
                TokenKind::LBracket => {
                    let line = expr.line;
                    self.advance();
                    let index = self.parse_expression()?;
                    self.consume(&TokenKind::RBracket, "expected ']' after index")?;
                    expr = Expr::new(
                        ExprKind::Index {
                            receiver: Box::new(expr),
                            index: Box::new(index),
                        },
                        line,
                    );
                }
                TokenKind::Dot => {
                    let line = expr.line;
                    self.advance();
                    let name = self.expect_ident("expected property name after '.'")?;
                    expr = Expr::new(
                        ExprKind::Property {
                            receiver: Box::new(expr),
                            name,
                        },
                        line,
                    );
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let op = if matches!(self.current_kind(), TokenKind::PlusPlus) {
                        PostfixOp::Increment
                    } else {
                        PostfixOp::Decrement
                    };
                    if !matches!(expr.kind, ExprKind::Ident(_)) {
                        return Err(self.error("invalid increment target"));
                    }
                    let line = expr.line;
                    self.advance();
                    expr = Expr::new(
                        ExprKind::Postfix {
                            op,
                            target: Box::new(expr),
                        },
                        line,
                    );
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_call_args(&mut self) -> Result<Vec<Expr>, Diagnostic> {
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(&TokenKind::RParen, "expected ')' after arguments")?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr, Diagnostic> {
        let line = self.current_line();
        match self.current_kind().clone() {
            TokenKind::Number(name) => {
                self.advance();
                let text = self.interner.lookup(name);
                let value: BigDecimal = text
                    .parse()
                    .map_err(|_| self.error("invalid number literal"))?;
                Ok(Expr::new(ExprKind::Number(value), line))
            }
            TokenKind::Str(name) => {
                self.advance();
                Ok(Expr::new(ExprKind::Str(name), line))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::new(ExprKind::Boolean(true), line))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::new(ExprKind::Boolean(false), line))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expr::new(ExprKind::Null, line))
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Expr::new(ExprKind::Ident(name), line))
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.consume(&TokenKind::RParen, "expected ')'")?;
                Ok(expr)
            }
            TokenKind::LBracket => self.parse_list_literal(line),
            TokenKind::LBrace => self.parse_map_literal(line),
            TokenKind::If => self.parse_if(line),
            TokenKind::While => self.parse_while(line),
            TokenKind::For => self.parse_for(line),
            TokenKind::Function => {
                self.advance();
                if matches!(self.current_kind(), TokenKind::Ident(_)) {
                    return Err(
                        self.error("named functions are only allowed in statement position")
                    );
                }
                let function = self.parse_function_rest(line)?;
                Ok(Expr::new(ExprKind::Function(Rc::new(function)), line))
            }
            TokenKind::Import => {
                self.advance();
                self.consume(&TokenKind::LParen, "expected '(' after 'import'")?;
                let path = self.parse_expression()?;
                self.consume(&TokenKind::RParen, "expected ')' after import path")?;
                Ok(Expr::new(ExprKind::Import(Box::new(path)), line))
            }
            _ => Err(self.error("expected expression")),
        }
    }

    fn parse_list_literal(&mut self, line: u32) -> Result<Expr, Diagnostic> {
        self.consume(&TokenKind::LBracket, "expected '['")?;
        let mut items = Vec::new();
        if !self.check(&TokenKind::RBracket) {
            loop {
                items.push(self.parse_expression()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(&TokenKind::RBracket, "expected ']' after list elements")?;
        Ok(Expr::new(ExprKind::List(items), line))
    }

    fn parse_map_literal(&mut self, line: u32) -> Result<Expr, Diagnostic> {
        self.consume(&TokenKind::LBrace, "expected '{'")?;
        let mut pairs = Vec::new();
        if !self.check(&TokenKind::RBrace) {
            loop {
                let key = self.parse_expression()?;
                self.consume(&TokenKind::Colon, "expected ':' after map key")?;
                let value = self.parse_expression()?;
                pairs.push((key, value));
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(&TokenKind::RBrace, "expected '}' after map entries")?;
        Ok(Expr::new(ExprKind::Map(pairs), line))
    }

    fn parse_if(&mut self, line: u32) -> Result<Expr, Diagnostic> {
        self.consume(&TokenKind::If, "expected 'if'")?;
        let mut branches = vec![self.parse_condition_and_block()?];
        let mut alternative = None;

        while self.eat(&TokenKind::Else) {
            if self.eat(&TokenKind::If) {
                branches.push(self.parse_condition_and_block()?);
            } else {
                alternative = Some(self.parse_block()?);
                break;
            }
        }

        Ok(Expr::new(
            ExprKind::If {
                branches,
                alternative,
            },
            line,
        ))
    }

    fn parse_condition_and_block(&mut self) -> Result<(Expr, Block), Diagnostic> {
        self.consume(&TokenKind::LParen, "expected '(' after 'if'")?;
        let condition = self.parse_expression()?;
        self.consume(&TokenKind::RParen, "expected ')' after condition")?;
        let block = self.parse_block()?;
        Ok((condition, block))
    }

    fn parse_while(&mut self, line: u32) -> Result<Expr, Diagnostic> {
        self.consume(&TokenKind::While, "expected 'while'")?;
        self.consume(&TokenKind::LParen, "expected '(' after 'while'")?;
        let condition = self.parse_expression()?;
        self.consume(&TokenKind::RParen, "expected ')' after condition")?;
        let body = self.parse_block()?;
        Ok(Expr::new(
            ExprKind::While {
                condition: Box::new(condition),
                body,
            },
            line,
        ))
    }

    fn parse_for(&mut self, line: u32) -> Result<Expr, Diagnostic> {
        self.consume(&TokenKind::For, "expected 'for'")?;
        self.consume(&TokenKind::LParen, "expected '(' after 'for'")?;

        // `for (x in iter)` vs `for (init; cond; step)`
        if matches!(self.current_kind(), TokenKind::Ident(_))
            && matches!(self.peek(1), TokenKind::In)
        {
            let binding = self.expect_ident("expected loop variable")?;
            self.advance(); // in
            let iterable = self.parse_expression()?;
            self.consume(&TokenKind::RParen, "expected ')' after loop header")?;
            let body = self.parse_block()?;
            return Ok(Expr::new(
                ExprKind::ForIn {
                    binding,
                    iterable: Box::new(iterable),
                    body,
                },
                line,
            ));
        }

        let init = self.parse_expression()?;
        self.consume(&TokenKind::Semicolon, "expected ';' after loop initializer")?;
        let condition = self.parse_expression()?;
        self.consume(&TokenKind::Semicolon, "expected ';' after loop condition")?;
        let step = self.parse_expression()?;
        self.consume(&TokenKind::RParen, "expected ')' after loop header")?;
        let body = self.parse_block()?;
        Ok(Expr::new(
            ExprKind::For {
                init: Box::new(init),
                condition: Box::new(condition),
                step: Box::new(step),
                body,
            },
            line,
        ))
    }
}
