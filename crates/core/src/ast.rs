//! The AST contract the code generator consumes (spec §6).
//!
//! This module defines the *shape* of the tree a parser would hand to
//! [`crate::compile`] — it does not implement a parser. Tests in this crate
//! build `Program` values directly, the same way a parser's output would
//! look, to exercise the code generator end to end without a lexer/grammar.
//!
//! The C source represents a block as a linked list of nodes via an
//! intrusive `next` pointer; the idiomatic Rust rendition used throughout
//! this module is `Vec<Stmt>`, which carries the same "compound of
//! statements" meaning (the `COMP` node kind in spec §6) without a
//! hand-rolled list.

/// A byte-offset span into the original source text, carried on every node
/// for diagnostics (spec §4.4 "Source spans").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodeRange {
    /// Byte offset of the first byte of the node's source text.
    pub offset: u32,
    /// Length in bytes of the node's source text.
    pub length: u32,
}

impl CodeRange {
    /// A span with no meaningful source location, used for synthetic nodes
    /// (e.g. the program-level tail `RETURN 0`) and as a placeholder for
    /// errors constructed outside of a specific AST node.
    pub const ZERO: Self = Self { offset: 0, length: 0 };

    #[must_use]
    pub fn new(offset: u32, length: u32) -> Self {
        Self { offset, length }
    }
}

/// The root of a compiled unit: a top-level compound of statements, plus a
/// handle on the source text it was parsed from (spec §3 "Executable": "an
/// owned reference to the source text for diagnostics"; spec §6.1: "a
/// parsed AST with a source handle").
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub source: std::rc::Rc<str>,
    pub body: Vec<Stmt>,
}

impl Program {
    #[must_use]
    pub fn new(source: impl Into<std::rc::Rc<str>>, body: Vec<Stmt>) -> Self {
        Self { source: source.into(), body }
    }
}

/// A statement-level AST node. Corresponds to the `EXPR`, `IFELSE`, `WHILE`,
/// `DOWHILE`, `RETURN`, `FUNC`, and `BREAK` node kinds of spec §6; a `COMP`
/// (block) is simply a `Vec<Stmt>` wherever one is expected.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub range: CodeRange,
}

impl Stmt {
    #[must_use]
    pub fn new(kind: StmtKind, range: CodeRange) -> Self {
        Self { kind, range }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// An expression evaluated for effect; its value is discarded (spec's
    /// "Compound (block)" trailing-`POP 1` rule).
    Expr(Expr),
    /// `if cond: then [else else_]`.
    If {
        cond: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
    },
    /// `while cond: body`.
    While { cond: Expr, body: Vec<Stmt> },
    /// `do body while cond`.
    DoWhile { body: Vec<Stmt>, cond: Expr },
    /// `return e0, e1, ...;` — an empty vec is a bare `return;`.
    Return(Vec<Expr>),
    /// `fun name(p0, ..., pk) body`.
    FuncDef {
        name: String,
        params: Vec<String>,
        body: Vec<Stmt>,
    },
    /// `break;`.
    Break,
}

/// An expression-level AST node, covering every `EXPR` subkind in spec §4.4.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub range: CodeRange,
}

impl Expr {
    #[must_use]
    pub fn new(kind: ExprKind, range: CodeRange) -> Self {
        Self { kind, range }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Pos,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eql,
    Nql,
    Lss,
    Leq,
    Grt,
    Geq,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    None,
    True,
    False,
    /// `[e0, e1, ...]`.
    List(Vec<Expr>),
    /// `{k0: v0, ...}`.
    Map(Vec<(Expr, Expr)>),
    /// `base[index]`.
    Index { base: Box<Expr>, index: Box<Expr> },
    /// `callee(args...)`. `returns` is filled in by the code generator
    /// (1 for ordinary expression use, `m` when lowered as the RHS of an
    /// `m`-target destructuring assignment) — a parser never sets it.
    Call { callee: Box<Expr>, args: Vec<Expr> },
    Unary { op: UnaryOp, expr: Box<Expr> },
    Binary { op: BinaryOp, lhs: Box<Expr>, rhs: Box<Expr> },
    /// `lhs = rhs`. `lhs` may be an [`ExprKind::Pair`] tree for tuple
    /// destructuring (`a, b = f(x)`); see spec §4.4 "Assignment".
    Assign { lhs: Box<Expr>, rhs: Box<Expr> },
    /// A comma pair used only on the left-hand side of an assignment to
    /// represent a tuple-destructuring target tree, e.g. `a, b, c = ...`
    /// parses as `Pair(a, Pair(b, c))`.
    Pair(Box<Expr>, Box<Expr>),
}
