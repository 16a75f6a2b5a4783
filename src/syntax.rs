//! Closed syntax model of the Go sources under analysis.
//!
//! The [`parser`](crate::parser) lowers the tree-sitter concrete syntax tree into these
//! types. Every expression and every declared parameter carries a program-unique
//! [`NodeId`], which is the key the [`TypeOracle`](crate::oracle::TypeOracle) answers for.
//!
//! Node kinds the analysis has no use for are kept as [`ExprKind::Other`] /
//! [`Stmt::Other`] together with their sub-expressions, so a call nested anywhere in a
//! function body is still reachable by the visitors.

use std::fmt;
use std::path::PathBuf;

/// Program-unique identity of an expression or parameter node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// All source files of one analysis run.
#[derive(Debug, Default)]
pub struct Program {
    pub files: Vec<SourceFile>,
}

/// A parsed Go source file.
#[derive(Debug)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Name from the `package` clause
    pub package: String,
    pub imports: Vec<Import>,
    pub decls: Vec<Decl>,
}

impl SourceFile {
    /// Function and method declarations in source order.
    pub fn functions(&self) -> impl Iterator<Item = &FuncDecl> {
        self.decls.iter().filter_map(|decl| match decl {
            Decl::Func(func) => Some(func),
            _ => None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Import {
    /// Explicit import name (`commonResp "x/response"`), including `_` and `.`
    pub alias: Option<String>,
    pub path: String,
}

/// Top-level declarations.
#[derive(Debug)]
pub enum Decl {
    Func(FuncDecl),
    Type(Vec<TypeSpec>),
    /// `var` and `const` declarations
    Var(Vec<VarSpec>),
}

#[derive(Debug)]
pub struct FuncDecl {
    pub name: String,
    pub receiver: Option<Receiver>,
    pub params: Vec<Param>,
    pub results: Vec<TypeExpr>,
    pub body: Option<Block>,
    /// Raw text of the comment group immediately preceding the declaration
    pub doc: Vec<String>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start_byte: usize,
    /// Byte offset of the start of the line holding `start_byte`
    pub line_start_byte: usize,
    /// 1-based line number
    pub line: usize,
}

#[derive(Debug, Clone)]
pub struct Receiver {
    pub name: Option<String>,
    /// Bare receiver type name, without pointer or type arguments
    pub type_name: String,
    pub pointer: bool,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub id: NodeId,
    pub name: Option<String>,
    pub ty: TypeExpr,
}

#[derive(Debug)]
pub struct TypeSpec {
    pub name: String,
    pub ty: TypeExpr,
    /// `type A = B`
    pub alias: bool,
}

#[derive(Debug)]
pub struct VarSpec {
    pub names: Vec<String>,
    pub ty: Option<TypeExpr>,
    pub values: Vec<Expr>,
}

/// Type as written in source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Name(String),
    Qualified { package: String, name: String },
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    Array { len: String, elem: Box<TypeExpr> },
    Map { key: Box<TypeExpr>, value: Box<TypeExpr> },
    Struct(Vec<FieldSpec>),
    Func { params: Vec<TypeExpr>, results: Vec<TypeExpr> },
    Other(String),
}

impl TypeExpr {
    /// Name of a (possibly qualified) named type.
    pub fn base_name(&self) -> Option<&str> {
        match self {
            TypeExpr::Name(name) | TypeExpr::Qualified { name, .. } => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Name(name) => write!(f, "{}", name),
            TypeExpr::Qualified { package, name } => write!(f, "{}.{}", package, name),
            TypeExpr::Pointer(inner) => write!(f, "*{}", inner),
            TypeExpr::Slice(elem) => write!(f, "[]{}", elem),
            TypeExpr::Array { len, elem } => write!(f, "[{}]{}", len, elem),
            TypeExpr::Map { key, value } => write!(f, "map[{}]{}", key, value),
            TypeExpr::Struct(_) => write!(f, "struct{{...}}"),
            TypeExpr::Func { params, results } => {
                write!(f, "func({})", join(params))?;
                match results.len() {
                    0 => Ok(()),
                    1 => write!(f, " {}", results[0]),
                    _ => write!(f, " ({})", join(results)),
                }
            }
            TypeExpr::Other(text) => write!(f, "{}", text),
        }
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Struct field; embedded fields are named after their type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub ty: TypeExpr,
}

pub type Block = Vec<Stmt>;

#[derive(Debug)]
pub enum Stmt {
    Expr(Expr),
    /// `=`, op-assignments and `:=` (`define`)
    Assign { lhs: Vec<Expr>, rhs: Vec<Expr>, define: bool },
    Var(Vec<VarSpec>),
    If {
        init: Option<Box<Stmt>>,
        cond: Expr,
        then: Block,
        /// Either a `Stmt::Block` or a chained `Stmt::If`
        els: Option<Box<Stmt>>,
    },
    For { header: Vec<Stmt>, cond: Option<Expr>, body: Block },
    Range { lhs: Vec<Expr>, define: bool, value: Expr },
    Switch { init: Option<Box<Stmt>>, tag: Option<Expr>, cases: Vec<Case> },
    Return(Vec<Expr>),
    Go(Expr),
    Defer(Expr),
    Block(Block),
    Other(Vec<Expr>),
}

#[derive(Debug)]
pub struct Case {
    pub values: Vec<Expr>,
    pub body: Block,
}

#[derive(Debug)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    Imaginary,
    Rune,
}

#[derive(Debug)]
pub enum ExprKind {
    Ident(String),
    Selector { operand: Box<Expr>, field: String },
    Call { func: Box<Expr>, args: Vec<Expr> },
    /// String literal with its quotes removed
    StringLit(String),
    BasicLit { kind: LitKind, text: String },
    Unary { op: String, operand: Box<Expr> },
    Binary { op: String, left: Box<Expr>, right: Box<Expr> },
    CompositeLit { ty: Option<TypeExpr>, elements: Vec<Expr> },
    FuncLit { params: Vec<Param>, results: Vec<TypeExpr>, body: Block },
    Index { operand: Box<Expr>, index: Box<Expr> },
    Paren(Box<Expr>),
    TypeAssert { operand: Box<Expr>, ty: TypeExpr },
    Conversion { ty: TypeExpr, operand: Box<Expr> },
    /// A type in expression position, e.g. the argument of `new`
    TypeArg(TypeExpr),
    Other(Vec<Expr>),
}

impl Expr {
    pub fn as_ident(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// `operand.field`
    pub fn as_selector(&self) -> Option<(&Expr, &str)> {
        match &self.kind {
            ExprKind::Selector { operand, field } => Some((operand, field)),
            _ => None,
        }
    }

    pub fn as_call(&self) -> Option<(&Expr, &[Expr])> {
        match &self.kind {
            ExprKind::Call { func, args } => Some((func, args)),
            _ => None,
        }
    }

    pub fn as_string_lit(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::StringLit(value) => Some(value),
            _ => None,
        }
    }

    /// `receiver.method(args...)`
    pub fn as_method_call(&self) -> Option<(&Expr, &str, &[Expr])> {
        let (func, args) = self.as_call()?;
        let (receiver, method) = func.as_selector()?;
        Some((receiver, method, args))
    }
}

/// Read-only traversal in source order, in the manner of `syn::visit`.
///
/// Override the `visit_*` methods and call the matching `walk_*` function to keep
/// descending.
pub trait Visit {
    fn visit_block(&mut self, block: &[Stmt]) {
        walk_block(self, block);
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }
}

pub fn walk_block<V: Visit + ?Sized>(visitor: &mut V, block: &[Stmt]) {
    for stmt in block {
        visitor.visit_stmt(stmt);
    }
}

pub fn walk_stmt<V: Visit + ?Sized>(visitor: &mut V, stmt: &Stmt) {
    match stmt {
        Stmt::Expr(expr) | Stmt::Go(expr) | Stmt::Defer(expr) => visitor.visit_expr(expr),
        Stmt::Assign { lhs, rhs, .. } => {
            for expr in lhs.iter().chain(rhs) {
                visitor.visit_expr(expr);
            }
        }
        Stmt::Var(specs) => {
            for value in specs.iter().flat_map(|spec| &spec.values) {
                visitor.visit_expr(value);
            }
        }
        Stmt::If { init, cond, then, els } => {
            if let Some(init) = init {
                visitor.visit_stmt(init);
            }
            visitor.visit_expr(cond);
            visitor.visit_block(then);
            if let Some(els) = els {
                visitor.visit_stmt(els);
            }
        }
        Stmt::For { header, cond, body } => {
            for stmt in header {
                visitor.visit_stmt(stmt);
            }
            if let Some(cond) = cond {
                visitor.visit_expr(cond);
            }
            visitor.visit_block(body);
        }
        Stmt::Range { lhs, value, .. } => {
            for expr in lhs {
                visitor.visit_expr(expr);
            }
            visitor.visit_expr(value);
        }
        Stmt::Switch { init, tag, cases } => {
            if let Some(init) = init {
                visitor.visit_stmt(init);
            }
            if let Some(tag) = tag {
                visitor.visit_expr(tag);
            }
            for case in cases {
                for value in &case.values {
                    visitor.visit_expr(value);
                }
                visitor.visit_block(&case.body);
            }
        }
        Stmt::Return(exprs) | Stmt::Other(exprs) => {
            for expr in exprs {
                visitor.visit_expr(expr);
            }
        }
        Stmt::Block(block) => visitor.visit_block(block),
    }
}

pub fn walk_expr<V: Visit + ?Sized>(visitor: &mut V, expr: &Expr) {
    match &expr.kind {
        ExprKind::Ident(_)
        | ExprKind::StringLit(_)
        | ExprKind::BasicLit { .. }
        | ExprKind::TypeArg(_) => {}
        ExprKind::Selector { operand, .. }
        | ExprKind::Unary { operand, .. }
        | ExprKind::TypeAssert { operand, .. }
        | ExprKind::Conversion { operand, .. } => visitor.visit_expr(operand),
        ExprKind::Paren(inner) => visitor.visit_expr(inner),
        ExprKind::Call { func, args } => {
            visitor.visit_expr(func);
            for arg in args {
                visitor.visit_expr(arg);
            }
        }
        ExprKind::Binary { left, right, .. } => {
            visitor.visit_expr(left);
            visitor.visit_expr(right);
        }
        ExprKind::Index { operand, index } => {
            visitor.visit_expr(operand);
            visitor.visit_expr(index);
        }
        ExprKind::CompositeLit { elements, .. } | ExprKind::Other(elements) => {
            for element in elements {
                visitor.visit_expr(element);
            }
        }
        ExprKind::FuncLit { body, .. } => visitor.visit_block(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(id: u32, name: &str) -> Expr {
        Expr {
            id: NodeId(id),
            kind: ExprKind::Ident(name.to_string()),
        }
    }

    fn call(id: u32, receiver: Expr, method: &str, args: Vec<Expr>) -> Expr {
        Expr {
            id: NodeId(id),
            kind: ExprKind::Call {
                func: Box::new(Expr {
                    id: NodeId(id + 100),
                    kind: ExprKind::Selector {
                        operand: Box::new(receiver),
                        field: method.to_string(),
                    },
                }),
                args,
            },
        }
    }

    struct CallNames(Vec<String>);

    impl Visit for CallNames {
        fn visit_expr(&mut self, expr: &Expr) {
            if let Some((_, method, _)) = expr.as_method_call() {
                self.0.push(method.to_string());
            }
            walk_expr(self, expr);
        }
    }

    #[test]
    fn test_visit_reaches_calls_in_source_order() {
        // if err := c.First(); err != nil { c.Second(c.Third()) }
        let body = vec![Stmt::If {
            init: Some(Box::new(Stmt::Assign {
                lhs: vec![ident(1, "err")],
                rhs: vec![call(2, ident(3, "c"), "First", vec![])],
                define: true,
            })),
            cond: ident(4, "err"),
            then: vec![Stmt::Expr(call(
                5,
                ident(6, "c"),
                "Second",
                vec![call(7, ident(8, "c"), "Third", vec![])],
            ))],
            els: None,
        }];

        let mut names = CallNames(Vec::new());
        names.visit_block(&body);

        assert_eq!(names.0, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_type_expr_display() {
        let ty = TypeExpr::Map {
            key: Box::new(TypeExpr::Name("string".to_string())),
            value: Box::new(TypeExpr::Slice(Box::new(TypeExpr::Pointer(Box::new(
                TypeExpr::Qualified {
                    package: "model".to_string(),
                    name: "User".to_string(),
                },
            ))))),
        };
        assert_eq!(ty.to_string(), "map[string][]*model.User");
    }

    #[test]
    fn test_method_call_accessor() {
        let expr = call(1, ident(2, "c"), "ShouldBindJSON", vec![ident(3, "req")]);
        let (receiver, method, args) = expr.as_method_call().unwrap();
        assert_eq!(receiver.as_ident(), Some("c"));
        assert_eq!(method, "ShouldBindJSON");
        assert_eq!(args.len(), 1);
    }
}
