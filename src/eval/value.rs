//! Runtime values for the Ghost interpreter.
//!
//! The value universe is a closed sum. Errors and return envelopes are
//! in-band values: an `Error` propagates unchanged through every enclosing
//! evaluation step, and a `Return` envelope is unwrapped exactly once, at
//! function application or at the top level of a program.

use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::builtins::Builtin;
use super::environment::EnvRef;
use crate::intern::StringInterner;
use crate::syntax::FunctionLiteral;

/// A runtime value.
///
/// Lists and maps have reference semantics: assigning one to a new binding
/// aliases the same underlying container.
#[derive(Clone, Debug)]
pub enum Value {
    Number(BigDecimal),
    Boolean(bool),
    Str(Rc<String>),
    Null,
    List(Rc<RefCell<Vec<Value>>>),
    Map(Rc<RefCell<IndexMap<MapKey, MapPair>>>),
    Function(Rc<FunctionValue>),
    Builtin(Rc<Builtin>),
    Module(Rc<ModuleValue>),
    /// Transient wrapper produced by `return`; never escapes the evaluator.
    Return(Rc<Value>),
    /// In-band runtime error. Evaluator-origin messages carry a `[<line>]`
    /// prefix; host (builtin) messages do not.
    Error(Rc<String>),
}

/// A user-defined function: its literal plus the captured environment.
#[derive(Clone)]
pub struct FunctionValue {
    pub literal: Rc<FunctionLiteral>,
    pub env: EnvRef,
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionValue({} params)", self.literal.params.len())
    }
}

/// A namespace produced by `import` (or the built-in `Math` module).
#[derive(Clone, Debug)]
pub struct ModuleValue {
    pub name: String,
    pub members: IndexMap<String, Value>,
}

impl ModuleValue {
    pub fn get(&self, name: &str) -> Option<Value> {
        self.members.get(name).cloned()
    }
}

/// Derived key for map storage.
///
/// Only numbers, booleans, and strings are usable as map keys. Numbers are
/// keyed by their normalized decimal text so key equality is decimal-exact
/// (`4` and `4.0` collide).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MapKey {
    Number(String),
    Boolean(bool),
    Str(String),
}

/// A stored map entry: the original key value (for display) plus the value.
#[derive(Clone, Debug)]
pub struct MapPair {
    pub key: Value,
    pub value: Value,
}

impl Value {
    /// Build an in-band error with no line prefix (host origin).
    pub fn error(message: impl Into<String>) -> Value {
        Value::Error(Rc::new(message.into()))
    }

    /// Build an in-band error with the `[<line>]` prefix (evaluator origin).
    pub fn error_at(line: u32, message: impl fmt::Display) -> Value {
        Value::Error(Rc::new(format!("[{}] {}", line, message)))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// The type tag used in error messages and dispatch.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "NUMBER",
            Value::Boolean(_) => "BOOLEAN",
            Value::Str(_) => "STRING",
            Value::Null => "NULL",
            Value::List(_) => "LIST",
            Value::Map(_) => "MAP",
            Value::Function(_) => "FUNCTION",
            Value::Builtin(_) => "BUILTIN",
            Value::Module(_) => "MODULE",
            Value::Return(_) => "RETURN_VALUE",
            Value::Error(_) => "ERROR",
        }
    }

    /// Truthiness: `false` and `null` are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Boolean(false) | Value::Null)
    }

    /// Derive a map key, if this value is usable as one.
    pub fn map_key(&self) -> Option<MapKey> {
        match self {
            Value::Number(n) => Some(MapKey::Number(n.normalized().to_string())),
            Value::Boolean(b) => Some(MapKey::Boolean(*b)),
            Value::Str(s) => Some(MapKey::Str(s.as_ref().clone())),
            _ => None,
        }
    }

    /// Value equality for the `==` operator.
    ///
    /// Same-variant pairs compare by value (numbers decimal-exact, strings
    /// by bytes); lists, maps, functions, and modules compare by identity.
    /// Cross-variant comparison is always false.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => Rc::ptr_eq(a, b),
            (Value::Module(a), Value::Module(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Canonical display form.
    ///
    /// Numbers display without trailing zeros; strings display verbatim;
    /// lists as `[e1, e2]`; maps as `{k: v}` in insertion order.
    pub fn inspect(&self, interner: &StringInterner) -> String {
        match self {
            Value::Number(n) => n.normalized().to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Str(s) => s.as_ref().clone(),
            Value::Null => "null".to_string(),
            Value::List(items) => {
                let items: Vec<_> = items.borrow().iter().map(|v| v.inspect(interner)).collect();
                format!("[{}]", items.join(", "))
            }
            Value::Map(pairs) => {
                let pairs: Vec<_> = pairs
                    .borrow()
                    .values()
                    .map(|pair| {
                        format!(
                            "{}: {}",
                            pair.key.inspect(interner),
                            pair.value.inspect(interner)
                        )
                    })
                    .collect();
                format!("{{{}}}", pairs.join(", "))
            }
            Value::Function(f) => f.literal.to_code(interner),
            Value::Builtin(_) => "builtin function".to_string(),
            Value::Module(m) => format!("module({})", m.name),
            Value::Return(inner) => inner.inspect(interner),
            Value::Error(message) => format!("ERROR: {}", message),
        }
    }

    /// Wrap a native list in a Value.
    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(items)))
    }

    /// Wrap a native string in a Value.
    pub fn string(s: impl Into<String>) -> Value {
        Value::Str(Rc::new(s.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn num(text: &str) -> Value {
        Value::Number(BigDecimal::from_str(text).unwrap())
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Boolean(false).is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(Value::Boolean(true).is_truthy());
        assert!(num("0").is_truthy());
        assert!(Value::string("").is_truthy());
        assert!(Value::list(vec![]).is_truthy());
    }

    #[test]
    fn test_number_display_without_trailing_zeros() {
        let interner = StringInterner::new();
        assert_eq!(num("5.500").inspect(&interner), "5.5");
        assert_eq!(num("10").inspect(&interner), "10");
        assert_eq!(num("-0.25").inspect(&interner), "-0.25");
    }

    #[test]
    fn test_map_key_decimal_exact() {
        assert_eq!(num("4").map_key(), num("4.0").map_key());
        assert_ne!(num("4").map_key(), num("5").map_key());
        assert_eq!(
            Value::string("four").map_key(),
            Value::string("four").map_key()
        );
        assert!(Value::Null.map_key().is_none());
        assert!(Value::list(vec![]).map_key().is_none());
    }

    #[test]
    fn test_equality() {
        assert!(num("1.50").equals(&num("1.5")));
        assert!(!num("1").equals(&Value::Boolean(true)));
        assert!(Value::Null.equals(&Value::Null));

        let a = Value::list(vec![num("1")]);
        let b = a.clone();
        let c = Value::list(vec![num("1")]);
        assert!(a.equals(&b));
        assert!(!a.equals(&c));
    }

    #[test]
    fn test_list_display() {
        let interner = StringInterner::new();
        let list = Value::list(vec![num("1"), Value::string("two"), Value::Boolean(true)]);
        assert_eq!(list.inspect(&interner), "[1, two, true]");
    }
}
