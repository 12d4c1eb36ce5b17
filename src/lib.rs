//! Ghost Interpreter
//!
//! A tree-walking interpreter for the Ghost scripting language: lexer,
//! parser, and a recursive evaluator over a dynamically typed value model
//! with arbitrary-precision decimal arithmetic.

pub mod errors;
pub mod eval;
pub mod intern;
pub mod syntax;
pub mod tracing_setup;

// Re-exports
pub use errors::{Diagnostic, DiagnosticBag, Severity};
pub use eval::{Builtin, BuiltinRegistry, Environment, EnvRef, Evaluator, MapKey, ModuleLoader, Value};
pub use intern::{Name, StringInterner};
pub use syntax::{Lexer, ParseResult, Parser, Span, Token, TokenKind, TokenList};
