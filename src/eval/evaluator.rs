//! Tree-walking evaluator for Ghost.
//!
//! A single recursive dispatch over the AST, threading an environment.
//! Two contracts apply uniformly:
//!
//! - **Error short-circuit**: after every subevaluation whose result might
//!   be an `Error`, the caller tests and propagates immediately. No
//!   arithmetic, comparison, index, call, or assignment is attempted when
//!   any operand is an `Error`.
//! - **Return envelopes**: `return` wraps its value; the envelope bubbles
//!   through nested blocks unchanged and is unwrapped exactly one layer at
//!   function application and at the top level of a program, so an inner
//!   `return` exits the enclosing function, not merely the block.

use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use num_traits::{One, ToPrimitive, Zero};
use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use super::builtins::BuiltinRegistry;
use super::environment::{EnvRef, Environment};
use super::loader::ModuleLoader;
use super::value::{FunctionValue, MapKey, MapPair, ModuleValue, Value};
use crate::errors::DiagnosticBag;
use crate::intern::{Name, StringInterner};
use crate::syntax::{
    AssignOp, BinaryOp, Block, Expr, ExprKind, Lexer, Parser, PostfixOp, Program, Stmt, StmtKind,
    UnaryOp,
};

/// The evaluator: interner, built-in registry, and module loader.
///
/// Evaluation itself is stateless; the environment is threaded through
/// every call so closures can capture frames by reference.
pub struct Evaluator {
    interner: Rc<StringInterner>,
    builtins: BuiltinRegistry,
    loader: ModuleLoader,
}

impl Evaluator {
    pub fn new(interner: Rc<StringInterner>) -> Self {
        Evaluator {
            interner,
            builtins: BuiltinRegistry::new(),
            loader: ModuleLoader::new(),
        }
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// Append a module search path (the `AddPath` operation).
    pub fn add_search_path(&self, path: impl Into<std::path::PathBuf>) {
        self.loader.add_search_path(path);
    }

    /// Lex, parse, and evaluate a source string in the given environment.
    ///
    /// Front-end problems are returned as diagnostics; runtime problems are
    /// the in-band `Value::Error` result.
    pub fn eval_source(&self, source: &str, env: &EnvRef) -> Result<Value, DiagnosticBag> {
        let tokens = Lexer::new(source, &self.interner).lex_all();
        let parsed = Parser::new(&tokens, &self.interner).parse_program();
        if parsed.diagnostics.has_errors() {
            return Err(parsed.diagnostics);
        }
        Ok(self.eval_program(&parsed.program, env))
    }

    /// Evaluate a program, unwrapping one return envelope at the top level.
    pub fn eval_program(&self, program: &Program, env: &EnvRef) -> Value {
        let mut result = Value::Null;
        for stmt in &program.statements {
            result = self.eval_statement(stmt, env);
            match result {
                Value::Return(inner) => return (*inner).clone(),
                Value::Error(_) => return result,
                _ => {}
            }
        }
        result
    }

    fn eval_statement(&self, stmt: &Stmt, env: &EnvRef) -> Value {
        match &stmt.kind {
            StmtKind::Expr(expr) => self.eval_expression(expr, env),
            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval_expression(expr, env),
                    None => Value::Null,
                };
                if value.is_error() {
                    return value;
                }
                Value::Return(Rc::new(value))
            }
            StmtKind::Function { name, function } => {
                let function = Value::Function(Rc::new(FunctionValue {
                    literal: Rc::clone(function),
                    env: Rc::clone(env),
                }));
                env.borrow_mut().set(*name, function);
                Value::Null
            }
        }
    }

    /// Evaluate a block. Return envelopes and errors bubble out unchanged;
    /// the block's value is otherwise the value of its last statement.
    fn eval_block(&self, block: &Block, env: &EnvRef) -> Value {
        let mut result = Value::Null;
        for stmt in &block.statements {
            result = self.eval_statement(stmt, env);
            if matches!(result, Value::Return(_) | Value::Error(_)) {
                return result;
            }
        }
        result
    }

    fn eval_expression(&self, expr: &Expr, env: &EnvRef) -> Value {
        match &expr.kind {
            ExprKind::Number(n) => Value::Number(n.clone()),
            ExprKind::Str(name) => Value::string(self.interner.lookup(*name)),
            ExprKind::Boolean(b) => Value::Boolean(*b),
            ExprKind::Null => Value::Null,

            ExprKind::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    let value = self.eval_expression(item, env);
                    if value.is_error() {
                        return value;
                    }
                    values.push(value);
                }
                Value::list(values)
            }

            ExprKind::Map(entries) => {
                let mut pairs = IndexMap::new();
                for (key_expr, value_expr) in entries {
                    let key = self.eval_expression(key_expr, env);
                    if key.is_error() {
                        return key;
                    }
                    let Some(map_key) = key.map_key() else {
                        return Value::error_at(
                            key_expr.line,
                            format!("Unusable as map key: {}", key.type_name()),
                        );
                    };
                    let value = self.eval_expression(value_expr, env);
                    if value.is_error() {
                        return value;
                    }
                    pairs.insert(map_key, MapPair { key, value });
                }
                Value::Map(Rc::new(RefCell::new(pairs)))
            }

            ExprKind::Ident(name) => {
                if let Some(value) = env.borrow().get(*name) {
                    return value;
                }
                let text = self.interner.lookup(*name);
                if let Some(value) = self.builtins.lookup(text) {
                    return value;
                }
                Value::error_at(expr.line, format!("Identifier not found: {}", text))
            }

            ExprKind::Prefix { op, operand } => {
                let operand = self.eval_expression(operand, env);
                if operand.is_error() {
                    return operand;
                }
                match op {
                    UnaryOp::Not => Value::Boolean(!operand.is_truthy()),
                    UnaryOp::Neg => match operand {
                        Value::Number(n) => Value::Number(-n),
                        other => Value::error_at(
                            expr.line,
                            format!("Unknown operator: -{}", other.type_name()),
                        ),
                    },
                }
            }

            ExprKind::Infix { op, left, right } => {
                let left = self.eval_expression(left, env);
                if left.is_error() {
                    return left;
                }
                // `and`/`or` short-circuit on the left operand's truthiness
                // and return the last operand evaluated.
                match op {
                    BinaryOp::And => {
                        if !left.is_truthy() {
                            return left;
                        }
                        self.eval_expression(right, env)
                    }
                    BinaryOp::Or => {
                        if left.is_truthy() {
                            return left;
                        }
                        self.eval_expression(right, env)
                    }
                    _ => {
                        let right = self.eval_expression(right, env);
                        if right.is_error() {
                            return right;
                        }
                        self.eval_infix(*op, left, right, expr.line)
                    }
                }
            }

            ExprKind::Assign { op, target, value } => {
                self.eval_assign(*op, target, value, env, expr.line)
            }

            ExprKind::Postfix { op, target } => self.eval_postfix(*op, target, env, expr.line),

            ExprKind::Index { receiver, index } => {
                let receiver = self.eval_expression(receiver, env);
                if receiver.is_error() {
                    return receiver;
                }
                let index = self.eval_expression(index, env);
                if index.is_error() {
                    return index;
                }
                self.index_read(&receiver, &index, expr.line)
            }

            ExprKind::Property { receiver, name } => {
                let receiver = self.eval_expression(receiver, env);
                if receiver.is_error() {
                    return receiver;
                }
                self.property_read(&receiver, *name, expr.line)
            }

            ExprKind::If {
                branches,
                alternative,
            } => {
                for (condition, block) in branches {
                    let condition = self.eval_expression(condition, env);
                    if condition.is_error() {
                        return condition;
                    }
                    if condition.is_truthy() {
                        return self.eval_block(block, env);
                    }
                }
                match alternative {
                    Some(block) => self.eval_block(block, env),
                    None => Value::Null,
                }
            }

            ExprKind::While { condition, body } => {
                loop {
                    let condition = self.eval_expression(condition, env);
                    if condition.is_error() {
                        return condition;
                    }
                    if !condition.is_truthy() {
                        break;
                    }
                    let result = self.eval_block(body, env);
                    if matches!(result, Value::Return(_) | Value::Error(_)) {
                        return result;
                    }
                }
                Value::Null
            }

            ExprKind::For {
                init,
                condition,
                step,
                body,
            } => {
                // The whole header and body live in a fresh enclosed scope;
                // outer bindings of the same names are untouched.
                let loop_env = Environment::new_enclosed(env);
                let init = self.eval_expression(init, &loop_env);
                if init.is_error() {
                    return init;
                }
                loop {
                    let condition = self.eval_expression(condition, &loop_env);
                    if condition.is_error() {
                        return condition;
                    }
                    if !condition.is_truthy() {
                        break;
                    }
                    let result = self.eval_block(body, &loop_env);
                    if matches!(result, Value::Return(_) | Value::Error(_)) {
                        return result;
                    }
                    let step = self.eval_expression(step, &loop_env);
                    if step.is_error() {
                        return step;
                    }
                }
                Value::Null
            }

            ExprKind::ForIn {
                binding,
                iterable,
                body,
            } => {
                let iterable = self.eval_expression(iterable, env);
                if iterable.is_error() {
                    return iterable;
                }
                let Value::List(items) = &iterable else {
                    return Value::error_at(
                        expr.line,
                        format!(
                            "argument to `for..in` must be LIST, got {}",
                            iterable.type_name()
                        ),
                    );
                };
                let snapshot: Vec<Value> = items.borrow().clone();
                for item in snapshot {
                    // The loop variable is bound in a fresh scope each
                    // iteration; writes to it do not leak outward.
                    let iter_env = Environment::new_enclosed(env);
                    iter_env.borrow_mut().set(*binding, item);
                    let result = self.eval_block(body, &iter_env);
                    if matches!(result, Value::Return(_) | Value::Error(_)) {
                        return result;
                    }
                }
                Value::Null
            }

            ExprKind::Function(literal) => Value::Function(Rc::new(FunctionValue {
                literal: Rc::clone(literal),
                env: Rc::clone(env),
            })),

            ExprKind::Call { callee, args } => {
                let callee = self.eval_expression(callee, env);
                if callee.is_error() {
                    return callee;
                }
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    let value = self.eval_expression(arg, env);
                    if value.is_error() {
                        return value;
                    }
                    values.push(value);
                }
                self.eval_call(callee, values, expr.line)
            }

            ExprKind::Import(path) => {
                let path = self.eval_expression(path, env);
                if path.is_error() {
                    return path;
                }
                let Value::Str(path) = &path else {
                    return Value::error_at(
                        expr.line,
                        format!("argument to `import` must be STRING, got {}", path.type_name()),
                    );
                };
                self.eval_import(path, expr.line)
            }
        }
    }

    // ===== Operators =====

    fn eval_infix(&self, op: BinaryOp, left: Value, right: Value, line: u32) -> Value {
        match (&left, &right) {
            (Value::Number(a), Value::Number(b)) => self.eval_number_infix(op, a, b, line),

            (Value::Str(a), Value::Str(b)) => match op {
                BinaryOp::Add => Value::string(format!("{}{}", a, b)),
                BinaryOp::Eq => Value::Boolean(a == b),
                BinaryOp::Ne => Value::Boolean(a != b),
                _ => Value::error_at(line, format!("Unknown operator: STRING {} STRING", op)),
            },

            _ if left.type_name() == right.type_name() => match op {
                BinaryOp::Eq => Value::Boolean(left.equals(&right)),
                BinaryOp::Ne => Value::Boolean(!left.equals(&right)),
                _ => Value::error_at(
                    line,
                    format!(
                        "Unknown operator: {} {} {}",
                        left.type_name(),
                        op,
                        right.type_name()
                    ),
                ),
            },

            _ => match op {
                BinaryOp::Eq => Value::Boolean(false),
                BinaryOp::Ne => Value::Boolean(true),
                _ => Value::error_at(
                    line,
                    format!(
                        "Type mismatch: {} {} {}",
                        left.type_name(),
                        op,
                        right.type_name()
                    ),
                ),
            },
        }
    }

    fn eval_number_infix(&self, op: BinaryOp, a: &BigDecimal, b: &BigDecimal, line: u32) -> Value {
        match op {
            BinaryOp::Add => Value::Number(a + b),
            BinaryOp::Sub => Value::Number(a - b),
            BinaryOp::Mul => Value::Number(a * b),
            BinaryOp::Div => {
                if b.is_zero() {
                    Value::error_at(line, "division by zero")
                } else {
                    Value::Number(a / b)
                }
            }
            BinaryOp::Mod => {
                if b.is_zero() {
                    Value::error_at(line, "modulo by zero")
                } else {
                    Value::Number(a % b)
                }
            }
            BinaryOp::Lt => Value::Boolean(a < b),
            BinaryOp::Le => Value::Boolean(a <= b),
            BinaryOp::Gt => Value::Boolean(a > b),
            BinaryOp::Ge => Value::Boolean(a >= b),
            BinaryOp::Eq => Value::Boolean(a == b),
            BinaryOp::Ne => Value::Boolean(a != b),
            BinaryOp::Range => eval_range(a, b),
            BinaryOp::And | BinaryOp::Or => {
                Value::error_at(line, format!("Unknown operator: NUMBER {} NUMBER", op))
            }
        }
    }

    // ===== Assignment =====

    fn eval_assign(
        &self,
        op: AssignOp,
        target: &Expr,
        value_expr: &Expr,
        env: &EnvRef,
        line: u32,
    ) -> Value {
        match &target.kind {
            ExprKind::Ident(name) => self.eval_ident_assign(op, *name, value_expr, env, line),
            ExprKind::Index { receiver, index } => {
                self.eval_index_assign(op, receiver, index, value_expr, env, line)
            }
            _ => Value::error_at(line, "invalid assignment target"),
        }
    }

    fn eval_ident_assign(
        &self,
        op: AssignOp,
        name: Name,
        value_expr: &Expr,
        env: &EnvRef,
        line: u32,
    ) -> Value {
        match op.base_op() {
            None => {
                let value = self.eval_expression(value_expr, env);
                if value.is_error() {
                    return value;
                }
                match op {
                    AssignOp::Declare => {
                        env.borrow_mut().set(name, value.clone());
                        value
                    }
                    _ => {
                        if env.borrow_mut().assign(name, value.clone()) {
                            value
                        } else {
                            Value::error_at(
                                line,
                                format!("Identifier not found: {}", self.interner.lookup(name)),
                            )
                        }
                    }
                }
            }
            Some(base) => {
                let Some(current) = env.borrow().get(name) else {
                    return Value::error_at(
                        line,
                        format!("Identifier not found: {}", self.interner.lookup(name)),
                    );
                };
                let value = self.eval_expression(value_expr, env);
                if value.is_error() {
                    return value;
                }
                let combined = self.eval_infix(base, current, value, line);
                if combined.is_error() {
                    return combined;
                }
                env.borrow_mut().assign(name, combined.clone());
                combined
            }
        }
    }

    fn eval_index_assign(
        &self,
        op: AssignOp,
        receiver_expr: &Expr,
        index_expr: &Expr,
        value_expr: &Expr,
        env: &EnvRef,
        line: u32,
    ) -> Value {
        let index = self.eval_expression(index_expr, env);
        if index.is_error() {
            return index;
        }

        // A `:=` through an unbound base identifier creates the container
        // first, inferring its kind from the key: numeric keys make a list,
        // anything else a map.
        let receiver = match (&receiver_expr.kind, op) {
            (ExprKind::Ident(name), AssignOp::Declare) => match env.borrow().get(*name) {
                Some(value) => value,
                None => {
                    let container = match index {
                        Value::Number(_) => Value::list(Vec::new()),
                        _ => Value::Map(Rc::new(RefCell::new(IndexMap::new()))),
                    };
                    env.borrow_mut().set(*name, container.clone());
                    container
                }
            },
            _ => {
                let receiver = self.eval_expression(receiver_expr, env);
                if receiver.is_error() {
                    return receiver;
                }
                receiver
            }
        };

        let value = self.eval_expression(value_expr, env);
        if value.is_error() {
            return value;
        }

        let value = match op.base_op() {
            None => value,
            Some(base) => {
                let current = self.index_read(&receiver, &index, line);
                if current.is_error() {
                    return current;
                }
                let combined = self.eval_infix(base, current, value, line);
                if combined.is_error() {
                    return combined;
                }
                combined
            }
        };

        match &receiver {
            Value::List(items) => {
                let Value::Number(n) = &index else {
                    return Value::error_at(line, "Index operator not supported: LIST");
                };
                let mut items = items.borrow_mut();
                match number_to_index(n) {
                    // Writing one past the end extends the list by one;
                    // anything further is a gap.
                    Some(i) if i < items.len() => items[i] = value.clone(),
                    Some(i) if i == items.len() => items.push(value.clone()),
                    _ => return Value::error_at(line, "index out of range"),
                }
                value
            }
            Value::Map(pairs) => {
                let Some(key) = index.map_key() else {
                    return Value::error_at(
                        line,
                        format!("Unusable as map key: {}", index.type_name()),
                    );
                };
                pairs.borrow_mut().insert(
                    key,
                    MapPair {
                        key: index,
                        value: value.clone(),
                    },
                );
                value
            }
            other => Value::error_at(
                line,
                format!("Index operator not supported: {}", other.type_name()),
            ),
        }
    }

    fn eval_postfix(&self, op: PostfixOp, target: &Expr, env: &EnvRef, line: u32) -> Value {
        let ExprKind::Ident(name) = &target.kind else {
            return Value::error_at(line, "invalid increment target");
        };
        let name = *name;
        let Some(current) = env.borrow().get(name) else {
            return Value::error_at(
                line,
                format!("Identifier not found: {}", self.interner.lookup(name)),
            );
        };
        match current {
            Value::Number(n) => {
                let one = BigDecimal::one();
                let next = match op {
                    PostfixOp::Increment => &n + &one,
                    PostfixOp::Decrement => &n - &one,
                };
                let value = Value::Number(next);
                env.borrow_mut().assign(name, value.clone());
                value
            }
            other => {
                Value::error_at(line, format!("Unknown operator: {}{}", other.type_name(), op))
            }
        }
    }

    // ===== Indexing and dot access =====

    fn index_read(&self, receiver: &Value, index: &Value, line: u32) -> Value {
        match receiver {
            Value::List(items) => match index {
                // Out-of-range, negative, and fractional indices read null.
                Value::Number(n) => match number_to_index(n) {
                    Some(i) => items.borrow().get(i).cloned().unwrap_or(Value::Null),
                    None => Value::Null,
                },
                _ => Value::error_at(line, "Index operator not supported: LIST"),
            },
            Value::Map(pairs) => {
                let Some(key) = index.map_key() else {
                    return Value::error_at(
                        line,
                        format!("Unusable as map key: {}", index.type_name()),
                    );
                };
                pairs
                    .borrow()
                    .get(&key)
                    .map(|pair| pair.value.clone())
                    .unwrap_or(Value::Null)
            }
            Value::Module(module) => match index {
                Value::Str(name) => module.get(name).unwrap_or(Value::Null),
                _ => Value::error_at(line, "Index operator not supported: MODULE"),
            },
            other => Value::error_at(
                line,
                format!("Index operator not supported: {}", other.type_name()),
            ),
        }
    }

    /// Dot access: sugar for `receiver["name"]` on maps and modules.
    fn property_read(&self, receiver: &Value, name: Name, line: u32) -> Value {
        let text = self.interner.lookup(name);
        match receiver {
            Value::Map(pairs) => pairs
                .borrow()
                .get(&MapKey::Str(text.to_string()))
                .map(|pair| pair.value.clone())
                .unwrap_or(Value::Null),
            Value::Module(module) => module.get(text).unwrap_or(Value::Null),
            other => Value::error_at(
                line,
                format!("Index operator not supported: {}", other.type_name()),
            ),
        }
    }

    // ===== Calls =====

    #[tracing::instrument(level = "trace", skip_all)]
    fn eval_call(&self, callee: Value, args: Vec<Value>, line: u32) -> Value {
        match callee {
            Value::Function(function) => {
                let expected = function.literal.params.len();
                if args.len() != expected {
                    return Value::error_at(
                        line,
                        format!(
                            "wrong number of arguments. got={}, expected={}",
                            args.len(),
                            expected
                        ),
                    );
                }
                // The call frame's outer pointer is the closure's captured
                // environment, not the caller's.
                let call_env = Environment::new_enclosed(&function.env);
                {
                    let mut frame = call_env.borrow_mut();
                    for (param, arg) in function.literal.params.iter().zip(args) {
                        frame.set(*param, arg);
                    }
                }
                match self.eval_block(&function.literal.body, &call_env) {
                    Value::Return(inner) => (*inner).clone(),
                    other => other,
                }
            }
            Value::Builtin(builtin) => {
                if let Some(expected) = builtin.arity {
                    if args.len() != expected {
                        return Value::error(format!(
                            "wrong number of arguments. got={}, expected={}",
                            args.len(),
                            expected
                        ));
                    }
                }
                (builtin.func)(&self.interner, &args)
            }
            other => Value::error_at(line, format!("not a function: {}", other.type_name())),
        }
    }

    // ===== Imports =====

    fn eval_import(&self, path: &str, line: u32) -> Value {
        let Some(resolved) = self.loader.resolve(path) else {
            return Value::error_at(line, format!("Module not found: {}", path));
        };
        if let Some(module) = self.loader.cached(&resolved) {
            return module;
        }
        if !self.loader.begin_loading(&resolved) {
            return Value::error_at(line, format!("Import cycle detected: {}", path));
        }
        let result = self.load_module(&resolved, path, line);
        self.loader.finish_loading(&resolved);
        if !result.is_error() {
            self.loader.store(resolved, result.clone());
        }
        result
    }

    fn load_module(&self, resolved: &Path, path: &str, line: u32) -> Value {
        tracing::debug!(path, resolved = %resolved.display(), "loading module");
        let source = match fs::read_to_string(resolved) {
            Ok(source) => source,
            Err(_) => return Value::error_at(line, format!("Module not found: {}", path)),
        };

        let tokens = Lexer::new(&source, &self.interner).lex_all();
        let parsed = Parser::new(&tokens, &self.interner).parse_program();
        if parsed.diagnostics.has_errors() {
            let first = parsed
                .diagnostics
                .iter()
                .find(|d| d.is_error())
                .map(|d| d.message.clone())
                .unwrap_or_default();
            return Value::error_at(line, format!("Parse error in module {}: {}", path, first));
        }

        // Modules evaluate in a fresh top-level environment; their bindings
        // become the namespace.
        let module_env = Environment::new();
        let result = self.eval_program(&parsed.program, &module_env);
        if result.is_error() {
            return result;
        }

        let mut members: Vec<(String, Value)> = module_env
            .borrow()
            .bindings()
            .into_iter()
            .map(|(name, value)| (self.interner.lookup(name).to_string(), value))
            .collect();
        members.sort_by(|a, b| a.0.cmp(&b.0));

        let name = resolved
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string());

        Value::Module(Rc::new(ModuleValue {
            name,
            members: members.into_iter().collect(),
        }))
    }
}

/// `a .. b` builds an inclusive ascending list; a descending range is empty.
fn eval_range(a: &BigDecimal, b: &BigDecimal) -> Value {
    let mut items = Vec::new();
    let one = BigDecimal::one();
    let mut current = a.clone();
    while current <= *b {
        items.push(Value::Number(current.clone()));
        current = &current + &one;
    }
    Value::list(items)
}

/// Convert a decimal to a list index: non-negative and integral, or None.
fn number_to_index(n: &BigDecimal) -> Option<usize> {
    let i = n.to_i64()?;
    if i < 0 || BigDecimal::from(i) != *n {
        return None;
    }
    Some(i as usize)
}
