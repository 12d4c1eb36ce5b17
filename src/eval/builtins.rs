//! Built-in function registry.
//!
//! Built-ins are host-implemented callables indexed by name, plus the
//! `Math` namespace exposed as a module of dotted built-ins. Identifier
//! resolution consults the environment first, then this registry.
//!
//! Host errors carry no `[<line>]` prefix: the host has no node.

use bigdecimal::{BigDecimal, RoundingMode};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::fmt;
use std::rc::Rc;

use super::value::{ModuleValue, Value};
use crate::intern::StringInterner;

/// Host function signature. The interner is threaded through for display
/// forms (`print` needs it to render function values).
pub type BuiltinFn = fn(&StringInterner, &[Value]) -> Value;

/// A host-implemented callable: name, arity contract, function pointer.
#[derive(Clone)]
pub struct Builtin {
    /// Registered name, possibly dotted (`Math.abs`).
    pub name: &'static str,
    /// Expected argument count; `None` means variadic.
    pub arity: Option<usize>,
    pub func: BuiltinFn,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

/// Name-indexed table of built-ins and namespaced modules.
pub struct BuiltinRegistry {
    table: FxHashMap<&'static str, Value>,
}

impl BuiltinRegistry {
    pub fn new() -> Self {
        let mut registry = BuiltinRegistry {
            table: FxHashMap::default(),
        };

        registry.register("length", Some(1), builtin_length);
        registry.register("push", Some(2), builtin_push);
        registry.register("pop", Some(1), builtin_pop);
        registry.register("first", Some(1), builtin_first);
        registry.register("last", Some(1), builtin_last);
        registry.register("rest", Some(1), builtin_rest);
        registry.register("keys", Some(1), builtin_keys);
        registry.register("values", Some(1), builtin_values);
        registry.register("type", Some(1), builtin_type);
        registry.register("print", None, builtin_print);

        registry.register_namespace(
            "Math",
            &[
                ("abs", "Math.abs", Some(1), math_abs as BuiltinFn),
                ("ceil", "Math.ceil", Some(1), math_ceil),
                ("floor", "Math.floor", Some(1), math_floor),
                ("round", "Math.round", Some(1), math_round),
                ("sqrt", "Math.sqrt", Some(1), math_sqrt),
                ("min", "Math.min", Some(2), math_min),
                ("max", "Math.max", Some(2), math_max),
            ],
        );

        registry
    }

    fn register(&mut self, name: &'static str, arity: Option<usize>, func: BuiltinFn) {
        self.table
            .insert(name, Value::Builtin(Rc::new(Builtin { name, arity, func })));
    }

    /// Register a namespace of dotted built-ins as a module value.
    fn register_namespace(
        &mut self,
        name: &'static str,
        members: &[(&'static str, &'static str, Option<usize>, BuiltinFn)],
    ) {
        let members: IndexMap<String, Value> = members
            .iter()
            .map(|(member, dotted, arity, func)| {
                (
                    member.to_string(),
                    Value::Builtin(Rc::new(Builtin {
                        name: dotted,
                        arity: *arity,
                        func: *func,
                    })),
                )
            })
            .collect();
        self.table.insert(
            name,
            Value::Module(Rc::new(ModuleValue {
                name: name.to_string(),
                members,
            })),
        );
    }

    /// Look up a built-in or namespace by name.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.table.get(name).cloned()
    }
}

impl Default for BuiltinRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// Built-in function implementations

fn builtin_length(_interner: &StringInterner, args: &[Value]) -> Value {
    match &args[0] {
        Value::Str(s) => Value::Number(BigDecimal::from(s.chars().count() as i64)),
        Value::List(items) => Value::Number(BigDecimal::from(items.borrow().len() as i64)),
        Value::Map(pairs) => Value::Number(BigDecimal::from(pairs.borrow().len() as i64)),
        other => Value::error(format!(
            "argument to `length` not supported, got {}",
            other.type_name()
        )),
    }
}

fn builtin_push(_interner: &StringInterner, args: &[Value]) -> Value {
    match &args[0] {
        Value::List(items) => {
            items.borrow_mut().push(args[1].clone());
            args[0].clone()
        }
        other => Value::error(format!(
            "argument to `push` must be LIST, got {}",
            other.type_name()
        )),
    }
}

fn builtin_pop(_interner: &StringInterner, args: &[Value]) -> Value {
    match &args[0] {
        Value::List(items) => items.borrow_mut().pop().unwrap_or(Value::Null),
        other => Value::error(format!(
            "argument to `pop` must be LIST, got {}",
            other.type_name()
        )),
    }
}

fn builtin_first(_interner: &StringInterner, args: &[Value]) -> Value {
    match &args[0] {
        Value::List(items) => items.borrow().first().cloned().unwrap_or(Value::Null),
        other => Value::error(format!(
            "argument to `first` must be LIST, got {}",
            other.type_name()
        )),
    }
}

fn builtin_last(_interner: &StringInterner, args: &[Value]) -> Value {
    match &args[0] {
        Value::List(items) => items.borrow().last().cloned().unwrap_or(Value::Null),
        other => Value::error(format!(
            "argument to `last` must be LIST, got {}",
            other.type_name()
        )),
    }
}

fn builtin_rest(_interner: &StringInterner, args: &[Value]) -> Value {
    match &args[0] {
        Value::List(items) => {
            let items = items.borrow();
            if items.is_empty() {
                Value::Null
            } else {
                Value::list(items[1..].to_vec())
            }
        }
        other => Value::error(format!(
            "argument to `rest` must be LIST, got {}",
            other.type_name()
        )),
    }
}

fn builtin_keys(_interner: &StringInterner, args: &[Value]) -> Value {
    match &args[0] {
        Value::Map(pairs) => {
            Value::list(pairs.borrow().values().map(|p| p.key.clone()).collect())
        }
        other => Value::error(format!(
            "argument to `keys` must be MAP, got {}",
            other.type_name()
        )),
    }
}

fn builtin_values(_interner: &StringInterner, args: &[Value]) -> Value {
    match &args[0] {
        Value::Map(pairs) => {
            Value::list(pairs.borrow().values().map(|p| p.value.clone()).collect())
        }
        other => Value::error(format!(
            "argument to `values` must be MAP, got {}",
            other.type_name()
        )),
    }
}

fn builtin_type(_interner: &StringInterner, args: &[Value]) -> Value {
    Value::string(args[0].type_name())
}

fn builtin_print(interner: &StringInterner, args: &[Value]) -> Value {
    let parts: Vec<_> = args.iter().map(|v| v.inspect(interner)).collect();
    println!("{}", parts.join(" "));
    Value::Null
}

// Math namespace

fn math_number<'a>(name: &str, args: &'a [Value]) -> Result<&'a BigDecimal, Value> {
    match &args[0] {
        Value::Number(n) => Ok(n),
        other => Err(Value::error(format!(
            "argument to `{}` must be NUMBER, got {}",
            name,
            other.type_name()
        ))),
    }
}

fn math_abs(_interner: &StringInterner, args: &[Value]) -> Value {
    match math_number("Math.abs", args) {
        Ok(n) => Value::Number(n.abs()),
        Err(e) => e,
    }
}

fn math_ceil(_interner: &StringInterner, args: &[Value]) -> Value {
    match math_number("Math.ceil", args) {
        Ok(n) => Value::Number(n.with_scale_round(0, RoundingMode::Ceiling)),
        Err(e) => e,
    }
}

fn math_floor(_interner: &StringInterner, args: &[Value]) -> Value {
    match math_number("Math.floor", args) {
        Ok(n) => Value::Number(n.with_scale_round(0, RoundingMode::Floor)),
        Err(e) => e,
    }
}

fn math_round(_interner: &StringInterner, args: &[Value]) -> Value {
    match math_number("Math.round", args) {
        Ok(n) => Value::Number(n.with_scale_round(0, RoundingMode::HalfUp)),
        Err(e) => e,
    }
}

fn math_sqrt(_interner: &StringInterner, args: &[Value]) -> Value {
    match math_number("Math.sqrt", args) {
        Ok(n) => match n.sqrt() {
            Some(root) => Value::Number(root),
            None => Value::error("cannot take the square root of a negative number"),
        },
        Err(e) => e,
    }
}

fn math_min(_interner: &StringInterner, args: &[Value]) -> Value {
    let a = match math_number("Math.min", args) {
        Ok(n) => n,
        Err(e) => return e,
    };
    let b = match &args[1] {
        Value::Number(n) => n,
        other => {
            return Value::error(format!(
                "argument to `Math.min` must be NUMBER, got {}",
                other.type_name()
            ))
        }
    };
    Value::Number(if a <= b { a.clone() } else { b.clone() })
}

fn math_max(_interner: &StringInterner, args: &[Value]) -> Value {
    let a = match math_number("Math.max", args) {
        Ok(n) => n,
        Err(e) => return e,
    };
    let b = match &args[1] {
        Value::Number(n) => n,
        other => {
            return Value::error(format!(
                "argument to `Math.max` must be NUMBER, got {}",
                other.type_name()
            ))
        }
    };
    Value::Number(if a >= b { a.clone() } else { b.clone() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        let registry = BuiltinRegistry::new();
        assert!(matches!(registry.lookup("length"), Some(Value::Builtin(_))));
        assert!(matches!(registry.lookup("Math"), Some(Value::Module(_))));
        assert!(registry.lookup("missing").is_none());
    }

    #[test]
    fn test_math_namespace_members() {
        let registry = BuiltinRegistry::new();
        let Some(Value::Module(math)) = registry.lookup("Math") else {
            panic!("Math namespace not registered");
        };
        let Some(Value::Builtin(abs)) = math.get("abs") else {
            panic!("Math.abs not registered");
        };
        assert_eq!(abs.name, "Math.abs");
        assert_eq!(abs.arity, Some(1));
    }

    #[test]
    fn test_length_type_error_message() {
        let interner = StringInterner::new();
        let result = builtin_length(&interner, &[Value::Number(BigDecimal::from(1))]);
        match result {
            Value::Error(message) => {
                assert_eq!(&*message, "argument to `length` not supported, got NUMBER")
            }
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[test]
    fn test_push_aliases_list() {
        let interner = StringInterner::new();
        let list = Value::list(vec![]);
        builtin_push(&interner, &[list.clone(), Value::Boolean(true)]);
        match &list {
            Value::List(items) => assert_eq!(items.borrow().len(), 1),
            other => panic!("expected list, got {:?}", other),
        }
    }
}
