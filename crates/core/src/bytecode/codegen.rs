//! The code generator (spec §4.4): lowers an [`crate::ast::Program`] into an
//! [`Executable`], the recursive tree walk at the heart of this crate.

use smallvec::SmallVec;

use crate::arena::Scratch;
use crate::ast::{BinaryOp, CodeRange, Expr, ExprKind, Program, Stmt, StmtKind, UnaryOp};
use crate::bytecode::builder::ExeBuilder;
use crate::bytecode::code::Executable;
use crate::bytecode::op::Opcode;
use crate::bytecode::promise::Promise;
use crate::config::CompilerConfig;
use crate::error::{CompileError, CompileResult};

/// The source's own static bound (spec §9 "Tuple arity bound"); arities at
/// or under this never grow the `SmallVec` onto the heap during flattening.
const MAX_TUPLE_ARITY: usize = 32;

/// Lowers `ast` into a finalized [`Executable`] (spec §4.4.1): the body is
/// compiled exactly as a top-level compound, then a trailing `RETURN 0` is
/// appended unconditionally — the only instruction `compile` emits that the
/// AST did not ask for.
pub fn compile(ast: &Program, config: CompilerConfig) -> CompileResult<Executable> {
    let _span = tracing::debug_span!("compile", statements = ast.body.len()).entered();

    let scratch = if config.scratch_capacity_hint > 0 {
        Scratch::with_capacity(config.scratch_capacity_hint)
    } else {
        Scratch::new()
    };
    let mut builder = ExeBuilder::new(&scratch, config.retain_spans, ast.source.clone());

    compile_block(&ast.body, &mut builder, None)?;
    builder.emit_return(0, CodeRange::ZERO);

    let executable = builder.finalize()?;
    tracing::debug!(instructions = executable.len(), "compile finished");
    Ok(executable)
}

fn binary_opcode(op: BinaryOp) -> Opcode {
    match op {
        BinaryOp::Add => Opcode::Add,
        BinaryOp::Sub => Opcode::Sub,
        BinaryOp::Mul => Opcode::Mul,
        BinaryOp::Div => Opcode::Div,
        BinaryOp::Eql => Opcode::Eql,
        BinaryOp::Nql => Opcode::Nql,
        BinaryOp::Lss => Opcode::Lss,
        BinaryOp::Leq => Opcode::Leq,
        BinaryOp::Grt => Opcode::Grt,
        BinaryOp::Geq => Opcode::Geq,
        BinaryOp::And => Opcode::And,
        BinaryOp::Or => Opcode::Or,
    }
}

fn compile_block(stmts: &[Stmt], builder: &mut ExeBuilder, break_dest: Option<&Promise>) -> CompileResult<()> {
    for stmt in stmts {
        compile_stmt(stmt, builder, break_dest)?;
    }
    Ok(())
}

fn compile_stmt(stmt: &Stmt, builder: &mut ExeBuilder, break_dest: Option<&Promise>) -> CompileResult<()> {
    match &stmt.kind {
        StmtKind::Expr(expr) => {
            compile_expr(expr, builder)?;
            builder.emit_pop(1, stmt.range);
        }
        StmtKind::If { cond, then_branch, else_branch } => {
            compile_expr(cond, builder)?;
            let else_promise = builder.new_promise();
            builder.emit_jump_if_not_and_pop(else_promise, stmt.range);
            compile_block(then_branch, builder, break_dest)?;
            match else_branch {
                Some(else_body) => {
                    let done_promise = builder.new_promise();
                    builder.emit_jump(done_promise, stmt.range);
                    builder.patch_here(else_promise)?;
                    compile_block(else_body, builder, break_dest)?;
                    builder.patch_here(done_promise)?;
                }
                None => builder.patch_here(else_promise)?,
            }
        }
        StmtKind::While { cond, body } => {
            let start = builder.len();
            compile_expr(cond, builder)?;
            let end_promise = builder.new_promise();
            builder.emit_jump_if_not_and_pop(end_promise, stmt.range);
            compile_block(body, builder, Some(end_promise))?;
            builder.emit_jump_to(start, stmt.range);
            builder.patch_here(end_promise)?;
        }
        StmtKind::DoWhile { body, cond } => {
            let start = builder.len();
            let end_promise = builder.new_promise();
            compile_block(body, builder, Some(end_promise))?;
            compile_expr(cond, builder)?;
            builder.emit_jump_if_and_pop_to(start, stmt.range);
            builder.patch_here(end_promise)?;
        }
        StmtKind::Return(values) => {
            for value in values {
                compile_expr(value, builder)?;
            }
            builder.emit_return(values.len() as i64, stmt.range);
        }
        StmtKind::FuncDef { name, params, body } => {
            let func_index = builder.new_promise();
            let after = builder.new_promise();
            builder.emit_push_fun(func_index, params.len() as i64, stmt.range);
            builder.emit_ass(name, stmt.range);
            builder.emit_pop(1, stmt.range);
            builder.emit_jump(after, stmt.range);
            builder.patch_here(func_index)?;
            for param in params {
                builder.emit_ass(param, stmt.range);
                builder.emit_pop(1, stmt.range);
            }
            // `break` never crosses a function boundary.
            compile_block(body, builder, None)?;
            builder.emit_return(0, stmt.range);
            builder.patch_here(after)?;
        }
        StmtKind::Break => match break_dest {
            Some(dest) => {
                builder.emit_jump(dest, stmt.range);
            }
            None => return Err(CompileError::BreakOutsideLoop { at: stmt.range }),
        },
    }
    Ok(())
}

fn compile_expr(expr: &Expr, builder: &mut ExeBuilder) -> CompileResult<()> {
    match &expr.kind {
        ExprKind::Int(i) => {
            builder.emit_push_int(*i, expr.range);
        }
        ExprKind::Float(f) => {
            builder.emit_push_flt(*f, expr.range);
        }
        ExprKind::Str(s) => {
            builder.emit_push_str(s, expr.range);
        }
        ExprKind::Ident(name) => {
            builder.emit_push_var(name, expr.range);
        }
        ExprKind::None => {
            builder.emit_push_none(expr.range);
        }
        ExprKind::True => {
            builder.emit_push_true(expr.range);
        }
        ExprKind::False => {
            builder.emit_push_false(expr.range);
        }
        ExprKind::List(items) => {
            builder.emit_push_lst(items.len() as i64, expr.range);
            for (i, item) in items.iter().enumerate() {
                builder.emit_push_int(i as i64, item.range);
                compile_expr(item, builder)?;
                builder.emit_insert(item.range);
            }
        }
        ExprKind::Map(pairs) => {
            builder.emit_push_map(pairs.len() as i64, expr.range);
            for (key, value) in pairs {
                compile_expr(key, builder)?;
                compile_expr(value, builder)?;
                builder.emit_insert(expr.range);
            }
        }
        ExprKind::Index { base, index } => {
            compile_expr(base, builder)?;
            compile_expr(index, builder)?;
            builder.emit_select(expr.range);
        }
        ExprKind::Call { callee, args } => {
            compile_call(callee, args, 1, builder, expr.range)?;
        }
        ExprKind::Unary { op, expr: inner } => {
            compile_expr(inner, builder)?;
            match op {
                UnaryOp::Not => builder.emit_not(expr.range),
                UnaryOp::Pos => builder.emit_pos(expr.range),
                UnaryOp::Neg => builder.emit_neg(expr.range),
            };
        }
        ExprKind::Binary { op, lhs, rhs } => {
            compile_expr(lhs, builder)?;
            compile_expr(rhs, builder)?;
            builder.emit_binary(binary_opcode(*op), expr.range);
        }
        ExprKind::Assign { lhs, rhs } => {
            compile_assignment(lhs, rhs, expr.range, builder)?;
        }
        ExprKind::Pair(..) => {
            // A comma-pair only ever has meaning as an assignment target
            // tree; encountering one anywhere else means an expression
            // position was given a tuple where a single value belongs.
            return Err(CompileError::InvalidAssignmentTarget { at: expr.range });
        }
    }
    Ok(())
}

fn compile_call(
    callee: &Expr,
    args: &[Expr],
    returns: i64,
    builder: &mut ExeBuilder,
    range: CodeRange,
) -> CompileResult<()> {
    for arg in args {
        compile_expr(arg, builder)?;
    }
    compile_expr(callee, builder)?;
    builder.emit_call(args.len() as i64, returns, range);
    Ok(())
}

/// Flattens a comma-paired LHS tree (`Pair(a, Pair(b, c))`) into its leaf
/// target expressions, left to right.
fn flatten_lhs<'e>(expr: &'e Expr, out: &mut SmallVec<[&'e Expr; MAX_TUPLE_ARITY]>) {
    match &expr.kind {
        ExprKind::Pair(a, b) => {
            flatten_lhs(a, out);
            flatten_lhs(b, out);
        }
        _ => out.push(expr),
    }
}

fn compile_assignment(lhs: &Expr, rhs: &Expr, range: CodeRange, builder: &mut ExeBuilder) -> CompileResult<()> {
    let mut targets: SmallVec<[&Expr; MAX_TUPLE_ARITY]> = SmallVec::new();
    flatten_lhs(lhs, &mut targets);
    let arity = targets.len();

    if arity > MAX_TUPLE_ARITY {
        return Err(CompileError::TuplePairTooLarge { found: arity, max: MAX_TUPLE_ARITY, at: range });
    }

    if arity == 1 {
        compile_expr(rhs, builder)?;
    } else {
        match &rhs.kind {
            ExprKind::Call { callee, args } => {
                compile_call(callee, args, arity as i64, builder, rhs.range)?;
            }
            _ => return Err(CompileError::TupleArityMismatch { lhs_count: arity, at: range }),
        }
    }

    for idx in (0..arity).rev() {
        let target = targets[idx];
        match &target.kind {
            ExprKind::Ident(name) => {
                builder.emit_ass(name, target.range);
            }
            ExprKind::Index { base, index } => {
                compile_expr(base, builder)?;
                compile_expr(index, builder)?;
                builder.emit_insert2(target.range);
            }
            _ => return Err(CompileError::InvalidAssignmentTarget { at: target.range }),
        }
        if idx != 0 {
            builder.emit_pop(1, target.range);
        }
    }
    Ok(())
}
