//! Abstract syntax tree for Ghost.
//!
//! Every node records the line of its first token; the evaluator uses it
//! for the `[<line>]` prefix on runtime errors. Nodes render back to
//! canonical source text via `to_code`, which the function display form and
//! tests rely on.

use bigdecimal::BigDecimal;
use std::rc::Rc;

use super::operators::{AssignOp, BinaryOp, PostfixOp, UnaryOp};
use crate::intern::{Name, StringInterner};

/// A parsed program: a sequence of top-level statements.
#[derive(Clone, Debug, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl Program {
    pub fn to_code(&self, interner: &StringInterner) -> String {
        self.statements
            .iter()
            .map(|s| s.to_code(interner))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A braced statement sequence.
#[derive(Clone, Debug)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub line: u32,
}

impl Block {
    pub fn to_code(&self, interner: &StringInterner) -> String {
        self.statements
            .iter()
            .map(|s| s.to_code(interner))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A statement with its source line.
#[derive(Clone, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: u32,
}

#[derive(Clone, Debug)]
pub enum StmtKind {
    /// An expression in statement position.
    Expr(Expr),
    /// `return` with an optional value.
    Return(Option<Expr>),
    /// Named function statement: `function name(params) { ... }`.
    /// Equivalent to `name := function(params) { ... }`.
    Function {
        name: Name,
        function: Rc<FunctionLiteral>,
    },
}

impl Stmt {
    pub fn to_code(&self, interner: &StringInterner) -> String {
        match &self.kind {
            StmtKind::Expr(expr) => expr.to_code(interner),
            StmtKind::Return(None) => "return;".to_string(),
            StmtKind::Return(Some(expr)) => format!("return {};", expr.to_code(interner)),
            StmtKind::Function { name, function } => format!(
                "function {}({}) {{\n{}\n}}",
                interner.lookup(*name),
                function.params_code(interner),
                function.body.to_code(interner)
            ),
        }
    }
}

/// An expression with its source line.
#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: u32,
}

impl Expr {
    pub fn new(kind: ExprKind, line: u32) -> Self {
        Expr { kind, line }
    }
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    // Literals
    Number(BigDecimal),
    Str(Name),
    Boolean(bool),
    Null,
    /// `[e1, e2, ...]`
    List(Vec<Expr>),
    /// `{k1: v1, k2: v2, ...}` in source order.
    Map(Vec<(Expr, Expr)>),

    Ident(Name),

    Prefix {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Infix {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `target := value`, `target = value`, `target op= value`.
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    /// `x++` / `x--`.
    Postfix {
        op: PostfixOp,
        target: Box<Expr>,
    },
    Index {
        receiver: Box<Expr>,
        index: Box<Expr>,
    },
    /// Dot access: `receiver.name`.
    Property {
        receiver: Box<Expr>,
        name: Name,
    },
    /// `if` / `else if` chain with an optional final `else`.
    If {
        branches: Vec<(Expr, Block)>,
        alternative: Option<Block>,
    },
    While {
        condition: Box<Expr>,
        body: Block,
    },
    /// C-style loop; header and body run in their own enclosed scope.
    For {
        init: Box<Expr>,
        condition: Box<Expr>,
        step: Box<Expr>,
        body: Block,
    },
    ForIn {
        binding: Name,
        iterable: Box<Expr>,
        body: Block,
    },
    Function(Rc<FunctionLiteral>),
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Import(Box<Expr>),
}

impl Expr {
    pub fn to_code(&self, interner: &StringInterner) -> String {
        match &self.kind {
            ExprKind::Number(n) => n.normalized().to_string(),
            ExprKind::Str(name) => format!("\"{}\"", interner.lookup(*name)),
            ExprKind::Boolean(b) => b.to_string(),
            ExprKind::Null => "null".to_string(),
            ExprKind::List(items) => {
                let items: Vec<_> = items.iter().map(|e| e.to_code(interner)).collect();
                format!("[{}]", items.join(", "))
            }
            ExprKind::Map(pairs) => {
                let pairs: Vec<_> = pairs
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k.to_code(interner), v.to_code(interner)))
                    .collect();
                format!("{{{}}}", pairs.join(", "))
            }
            ExprKind::Ident(name) => interner.lookup(*name).to_string(),
            ExprKind::Prefix { op, operand } => {
                format!("({}{})", op, operand.to_code(interner))
            }
            ExprKind::Infix { op, left, right } => format!(
                "({} {} {})",
                left.to_code(interner),
                op,
                right.to_code(interner)
            ),
            ExprKind::Assign { op, target, value } => format!(
                "{} {} {}",
                target.to_code(interner),
                op,
                value.to_code(interner)
            ),
            ExprKind::Postfix { op, target } => format!("({}{})", target.to_code(interner), op),
            ExprKind::Index { receiver, index } => format!(
                "({}[{}])",
                receiver.to_code(interner),
                index.to_code(interner)
            ),
            ExprKind::Property { receiver, name } => format!(
                "({}.{})",
                receiver.to_code(interner),
                interner.lookup(*name)
            ),
            ExprKind::If {
                branches,
                alternative,
            } => {
                let mut out = String::new();
                for (i, (condition, block)) in branches.iter().enumerate() {
                    if i > 0 {
                        out.push_str(" else ");
                    }
                    out.push_str(&format!(
                        "if ({}) {{ {} }}",
                        condition.to_code(interner),
                        block.to_code(interner)
                    ));
                }
                if let Some(alternative) = alternative {
                    out.push_str(&format!(" else {{ {} }}", alternative.to_code(interner)));
                }
                out
            }
            ExprKind::While { condition, body } => format!(
                "while ({}) {{ {} }}",
                condition.to_code(interner),
                body.to_code(interner)
            ),
            ExprKind::For {
                init,
                condition,
                step,
                body,
            } => format!(
                "for ({}; {}; {}) {{ {} }}",
                init.to_code(interner),
                condition.to_code(interner),
                step.to_code(interner),
                body.to_code(interner)
            ),
            ExprKind::ForIn {
                binding,
                iterable,
                body,
            } => format!(
                "for ({} in {}) {{ {} }}",
                interner.lookup(*binding),
                iterable.to_code(interner),
                body.to_code(interner)
            ),
            ExprKind::Function(function) => function.to_code(interner),
            ExprKind::Call { callee, args } => {
                let args: Vec<_> = args.iter().map(|a| a.to_code(interner)).collect();
                format!("{}({})", callee.to_code(interner), args.join(", "))
            }
            ExprKind::Import(path) => format!("import({})", path.to_code(interner)),
        }
    }
}

/// A function literal: parameter names and a body block.
///
/// Shared via `Rc` so closures and named functions can outlive the parse
/// that produced them.
#[derive(Clone, Debug)]
pub struct FunctionLiteral {
    pub params: Vec<Name>,
    pub body: Block,
    pub line: u32,
}

impl FunctionLiteral {
    pub fn params_code(&self, interner: &StringInterner) -> String {
        self.params
            .iter()
            .map(|p| interner.lookup(*p).to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn to_code(&self, interner: &StringInterner) -> String {
        format!(
            "function({}) {{\n{}\n}}",
            self.params_code(interner),
            self.body.to_code(interner)
        )
    }
}
