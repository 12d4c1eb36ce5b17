//! String interning for identifiers and literals.

mod strings;

pub use strings::{Name, StringInterner};
