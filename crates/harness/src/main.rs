//! Compiles a handful of literal, hand-built ASTs and dumps their bytecode.
//!
//! There is no lexer or parser in this workspace (see `scriptcore::ast`'s
//! module docs) — this binary exists to exercise `scriptcore::compile`
//! end to end and to give a human something to read when checking a change
//! to the code generator, the same role `scriptcore-dump` plays against a
//! real program elsewhere.

use std::process::ExitCode;

use scriptcore::ast::{BinaryOp, CodeRange, Expr, ExprKind, Program, Stmt, StmtKind, UnaryOp};
use scriptcore::{compile, CompilerConfig, Executable};

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    for (name, program) in samples() {
        println!("=== {name} ===");
        println!("source: {:?}", program.source);
        match compile(&program, CompilerConfig::default()) {
            Ok(exe) => dump(&exe),
            Err(err) => {
                eprintln!("compile error: {err}");
                return ExitCode::FAILURE;
            }
        }
        println!();
    }
    ExitCode::SUCCESS
}

fn dump(exe: &Executable) {
    for (index, instr) in exe.instructions().iter().enumerate() {
        let operands: Vec<String> = instr.operands.iter().map(|op| format!("{op:?}")).collect();
        println!("{index:>4}  {:?} {}", instr.opcode, operands.join(" "));
    }
}

fn e(kind: ExprKind) -> Expr {
    Expr::new(kind, CodeRange::ZERO)
}

fn s(kind: StmtKind) -> Stmt {
    Stmt::new(kind, CodeRange::ZERO)
}

fn ident(name: &str) -> Expr {
    e(ExprKind::Ident(name.to_string()))
}

fn int(i: i64) -> Expr {
    e(ExprKind::Int(i))
}

/// `if n < 0: return -n; return n;` — the absolute-value snippet from
/// spec.md's worked examples.
fn abs_sample() -> Program {
    Program::new(
        "if n < 0: return -n; return n;",
        vec![
            s(StmtKind::If {
                cond: e(ExprKind::Binary {
                    op: BinaryOp::Lss,
                    lhs: Box::new(ident("n")),
                    rhs: Box::new(int(0)),
                }),
                then_branch: vec![s(StmtKind::Return(vec![e(ExprKind::Unary {
                    op: UnaryOp::Neg,
                    expr: Box::new(ident("n")),
                })]))],
                else_branch: None,
            }),
            s(StmtKind::Return(vec![ident("n")])),
        ],
    )
}

/// `while n > 0: n = n - 1;` — the countdown loop from spec.md's worked
/// examples.
fn countdown_sample() -> Program {
    Program::new(
        "while n > 0: n = n - 1;",
        vec![s(StmtKind::While {
            cond: e(ExprKind::Binary {
                op: BinaryOp::Grt,
                lhs: Box::new(ident("n")),
                rhs: Box::new(int(0)),
            }),
            body: vec![s(StmtKind::Expr(e(ExprKind::Assign {
                lhs: Box::new(ident("n")),
                rhs: Box::new(e(ExprKind::Binary {
                    op: BinaryOp::Sub,
                    lhs: Box::new(ident("n")),
                    rhs: Box::new(int(1)),
                })),
            })))],
        })],
    )
}

/// `fun add(a, b) return a + b; add(1, 2);`
fn add_and_call_sample() -> Program {
    let body = vec![s(StmtKind::Return(vec![e(ExprKind::Binary {
        op: BinaryOp::Add,
        lhs: Box::new(ident("a")),
        rhs: Box::new(ident("b")),
    })]))];
    Program::new(
        "fun add(a, b) return a + b; add(1, 2);",
        vec![
            s(StmtKind::FuncDef { name: "add".to_string(), params: vec!["a".to_string(), "b".to_string()], body }),
            s(StmtKind::Expr(e(ExprKind::Call {
                callee: Box::new(ident("add")),
                args: vec![int(1), int(2)],
            }))),
        ],
    )
}

fn samples() -> Vec<(&'static str, Program)> {
    vec![("abs", abs_sample()), ("countdown", countdown_sample()), ("add_and_call", add_and_call_sample())]
}
