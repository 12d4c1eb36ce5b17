//! Tree-walking evaluation for Ghost.
//!
//! This module provides runtime evaluation of parsed Ghost programs:
//! - `value` - the closed runtime value universe
//! - `environment` - lexically nested binding frames
//! - `builtins` - the host function registry and `Math` namespace
//! - `loader` - `import` path resolution and module caching
//! - `evaluator` - the recursive walker
//!
//! ## Design
//!
//! Runtime errors are in-band `Value::Error` values rather than `Err`
//! results: any step receiving one returns it unchanged, and an error at
//! the program's top level becomes the program's result. `return` produces
//! a transient `Value::Return` envelope that nested blocks pass through
//! untouched; function application and the top-level driver unwrap exactly
//! one layer, which is what makes an inner `return` exit the enclosing
//! function rather than its block.

mod builtins;
mod environment;
mod evaluator;
mod loader;
mod value;

pub use builtins::{Builtin, BuiltinFn, BuiltinRegistry};
pub use environment::{EnvRef, Environment};
pub use evaluator::Evaluator;
pub use loader::{ModuleLoader, SOURCE_SUFFIX};
pub use value::{FunctionValue, MapKey, MapPair, ModuleValue, Value};
