//! End-to-end scenarios asserting the exact emitted instruction sequence
//! for literal, hand-built ASTs (no parser ships in this crate).

use scriptcore::ast::{BinaryOp, CodeRange, Expr, ExprKind, Program, Stmt, StmtKind, UnaryOp};
use scriptcore::types::Map;
use scriptcore::{compile, CompilerConfig, Instruction, Opcode, Operand, Value};

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

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    e(ExprKind::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) })
}

fn ins(opcode: Opcode, operands: Vec<Operand>) -> Instruction {
    Instruction { opcode, operands: operands.into_iter().collect(), range: CodeRange::ZERO }
}

fn program(body: Vec<Stmt>) -> Program {
    Program::new("", body)
}

#[test]
fn scenario_1_return_literal() {
    let ast = program(vec![s(StmtKind::Return(vec![int(1)]))]);
    let exe = compile(&ast, CompilerConfig::default()).unwrap();

    let expected = vec![
        ins(Opcode::PushInt, vec![Operand::Int(1)]),
        ins(Opcode::Return, vec![Operand::Int(1)]),
        ins(Opcode::Return, vec![Operand::Int(0)]),
    ];
    assert_eq!(exe.instructions(), expected.as_slice());
}

#[test]
fn scenario_2_if_without_else() {
    let ast = program(vec![
        s(StmtKind::If {
            cond: binary(BinaryOp::Lss, ident("x"), int(0)),
            then_branch: vec![s(StmtKind::Return(vec![e(ExprKind::Unary {
                op: UnaryOp::Neg,
                expr: Box::new(ident("x")),
            })]))],
            else_branch: None,
        }),
        s(StmtKind::Return(vec![ident("x")])),
    ]);
    let exe = compile(&ast, CompilerConfig::default()).unwrap();

    let expected = vec![
        ins(Opcode::PushVar, vec![Operand::Str("x".into())]),
        ins(Opcode::PushInt, vec![Operand::Int(0)]),
        ins(Opcode::Lss, vec![]),
        ins(Opcode::JumpIfNotAndPop, vec![Operand::Int(7)]),
        ins(Opcode::PushVar, vec![Operand::Str("x".into())]),
        ins(Opcode::Neg, vec![]),
        ins(Opcode::Return, vec![Operand::Int(1)]),
        ins(Opcode::PushVar, vec![Operand::Str("x".into())]),
        ins(Opcode::Return, vec![Operand::Int(1)]),
        ins(Opcode::Return, vec![Operand::Int(0)]),
    ];
    assert_eq!(exe.instructions(), expected.as_slice());
}

#[test]
fn scenario_3_while_loop() {
    let assign = e(ExprKind::Assign {
        lhs: Box::new(ident("n")),
        rhs: Box::new(binary(BinaryOp::Sub, ident("n"), int(1))),
    });
    let ast = program(vec![s(StmtKind::While {
        cond: binary(BinaryOp::Grt, ident("n"), int(0)),
        body: vec![s(StmtKind::Expr(assign))],
    })]);
    let exe = compile(&ast, CompilerConfig::default()).unwrap();

    let expected = vec![
        ins(Opcode::PushVar, vec![Operand::Str("n".into())]),
        ins(Opcode::PushInt, vec![Operand::Int(0)]),
        ins(Opcode::Grt, vec![]),
        ins(Opcode::JumpIfNotAndPop, vec![Operand::Int(10)]),
        ins(Opcode::PushVar, vec![Operand::Str("n".into())]),
        ins(Opcode::PushInt, vec![Operand::Int(1)]),
        ins(Opcode::Sub, vec![]),
        ins(Opcode::Ass, vec![Operand::Str("n".into())]),
        ins(Opcode::Pop, vec![Operand::Int(1)]),
        ins(Opcode::Jump, vec![Operand::Int(0)]),
        ins(Opcode::Return, vec![Operand::Int(0)]),
    ];
    assert_eq!(exe.instructions(), expected.as_slice());
}

/// Matches spec.md's worked example save for one detail: the worked example
/// omits the trailing `POP 1` that the compound-statement lowering rule
/// ("if the statement's node is an expression, emit a trailing `POP 1`")
/// requires for *every* expression statement, assignment included — compare
/// scenario 5 below, where a call-as-statement does get its trailing pop.
/// This implementation follows the stated rule over the abbreviated example;
/// see DESIGN.md.
#[test]
fn scenario_4_tuple_destructuring_assignment() {
    let call = e(ExprKind::Call { callee: Box::new(ident("f")), args: vec![ident("x")] });
    let assign = e(ExprKind::Assign {
        lhs: Box::new(e(ExprKind::Pair(Box::new(ident("a")), Box::new(ident("b"))))),
        rhs: Box::new(call),
    });
    let ast = program(vec![s(StmtKind::Expr(assign))]);
    let exe = compile(&ast, CompilerConfig::default()).unwrap();

    let expected = vec![
        ins(Opcode::PushVar, vec![Operand::Str("x".into())]),
        ins(Opcode::PushVar, vec![Operand::Str("f".into())]),
        ins(Opcode::Call, vec![Operand::Int(1), Operand::Int(2)]),
        ins(Opcode::Ass, vec![Operand::Str("b".into())]),
        ins(Opcode::Pop, vec![Operand::Int(1)]),
        ins(Opcode::Ass, vec![Operand::Str("a".into())]),
        ins(Opcode::Pop, vec![Operand::Int(1)]),
        ins(Opcode::Return, vec![Operand::Int(0)]),
    ];
    assert_eq!(exe.instructions(), expected.as_slice());
}

#[test]
fn scenario_5_function_definition_and_call() {
    let body = vec![s(StmtKind::Return(vec![binary(BinaryOp::Add, ident("x"), int(1))]))];
    let func = s(StmtKind::FuncDef { name: "g".to_string(), params: vec!["x".to_string()], body });
    let call_stmt = s(StmtKind::Expr(e(ExprKind::Call {
        callee: Box::new(ident("g")),
        args: vec![int(2)],
    })));
    let ast = program(vec![func, call_stmt]);
    let exe = compile(&ast, CompilerConfig::default()).unwrap();

    let expected = vec![
        ins(Opcode::PushFun, vec![Operand::Int(4), Operand::Int(1)]),
        ins(Opcode::Ass, vec![Operand::Str("g".into())]),
        ins(Opcode::Pop, vec![Operand::Int(1)]),
        ins(Opcode::Jump, vec![Operand::Int(11)]),
        ins(Opcode::Ass, vec![Operand::Str("x".into())]),
        ins(Opcode::Pop, vec![Operand::Int(1)]),
        ins(Opcode::PushVar, vec![Operand::Str("x".into())]),
        ins(Opcode::PushInt, vec![Operand::Int(1)]),
        ins(Opcode::Add, vec![]),
        ins(Opcode::Return, vec![Operand::Int(1)]),
        ins(Opcode::Return, vec![Operand::Int(0)]),
        ins(Opcode::PushInt, vec![Operand::Int(2)]),
        ins(Opcode::PushVar, vec![Operand::Str("g".into())]),
        ins(Opcode::Call, vec![Operand::Int(1), Operand::Int(1)]),
        ins(Opcode::Pop, vec![Operand::Int(1)]),
        ins(Opcode::Return, vec![Operand::Int(0)]),
    ];
    assert_eq!(exe.instructions(), expected.as_slice());
}

#[test]
fn scenario_6_sixth_distinct_key_triggers_map_growth() {
    let mut map = Map::new(0);
    for i in 0..6 {
        map.insert(Value::Int(i), Value::Int(i)).unwrap();
    }
    assert_eq!(map.count(), 6);
    for i in 0..6 {
        assert!(matches!(map.select(&Value::Int(i)).unwrap(), Some(Value::Int(v)) if v == i));
    }
}

#[test]
fn empty_program_compiles_to_a_single_return() {
    let ast = program(vec![]);
    let exe = compile(&ast, CompilerConfig::default()).unwrap();
    assert_eq!(exe.instructions(), &[ins(Opcode::Return, vec![Operand::Int(0)])]);
}

#[test]
fn break_outside_a_loop_is_rejected() {
    let ast = program(vec![s(StmtKind::Break)]);
    let err = compile(&ast, CompilerConfig::default()).unwrap_err();
    assert!(matches!(err, scriptcore::CompileError::BreakOutsideLoop { .. }));
}

#[test]
fn tuple_arity_mismatch_when_rhs_is_not_a_call() {
    let assign = e(ExprKind::Assign {
        lhs: Box::new(e(ExprKind::Pair(Box::new(ident("a")), Box::new(ident("b"))))),
        rhs: Box::new(int(1)),
    });
    let ast = program(vec![s(StmtKind::Expr(assign))]);
    let err = compile(&ast, CompilerConfig::default()).unwrap_err();
    assert!(matches!(err, scriptcore::CompileError::TupleArityMismatch { lhs_count: 2, .. }));
}

/// A prelude-shaped snippet (mirroring the standard-library style the
/// compiler is also driven across) compiles with no special-cased path.
#[test]
fn prelude_shaped_function_compiles_like_any_other_input() {
    let abs_body = vec![s(StmtKind::If {
        cond: binary(BinaryOp::Lss, ident("n"), int(0)),
        then_branch: vec![s(StmtKind::Return(vec![e(ExprKind::Unary {
            op: UnaryOp::Neg,
            expr: Box::new(ident("n")),
        })]))],
        else_branch: Some(vec![s(StmtKind::Return(vec![ident("n")]))]),
    })];
    let ast = program(vec![s(StmtKind::FuncDef {
        name: "abs".to_string(),
        params: vec!["n".to_string()],
        body: abs_body,
    })]);
    assert!(compile(&ast, CompilerConfig::default()).is_ok());
}
