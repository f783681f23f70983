//! Semantic actions shared by both calculator parsers.
//!
//! Every action is a reduction on the attribute stack: it reads the cells of
//! the right-hand side at fixed offsets from the top and leaves the cells of
//! the left-hand side. An expression always occupies two cells, its value
//! (`Number`) below its fully parenthesized infix text (`Text`). Postfix
//! notation is accumulated in [`CalcCtx::postfix`] while actions run, which
//! is the order postfix notation is written in.

use crate::{CalcError, LexSymbol, SymTab};
use gramrt::{Assoc, AttrStack, Value};
use smartstring::alias::String;
use std::fmt::{self, Write};

/// Priority of completing `Start = Expression` against any operator.
pub const COMPLETE_PRIORITY: i32 = -99;

/// Priority of completing `Start = Identifier "=" Expression`.
pub const ASSIGNMENT_PRIORITY: i32 = -91;

/// Data the semantic actions write to.
#[derive(Debug, Clone, Default)]
pub struct CalcCtx {
    pub names: SymTab,
    /// Postfix notation of the statement being parsed.
    pub postfix: String,
}

impl CalcCtx {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A successfully parsed line.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expression {
        value: f64,
        infix: String,
        postfix: String,
    },
    Assignment {
        name: String,
        value: f64,
        infix: String,
        postfix: String,
        /// The name was defined before.
        reassigned: bool,
    },
}

impl Statement {
    pub fn value(&self) -> f64 {
        match self {
            Statement::Expression { value, .. } | Statement::Assignment { value, .. } => *value,
        }
    }

    pub fn infix(&self) -> &str {
        match self {
            Statement::Expression { infix, .. } | Statement::Assignment { infix, .. } => {
                infix.as_str()
            }
        }
    }

    pub fn postfix(&self) -> &str {
        match self {
            Statement::Expression { postfix, .. } | Statement::Assignment { postfix, .. } => {
                postfix.as_str()
            }
        }
    }
}

fn render(args: fmt::Arguments<'_>) -> String {
    let mut s = String::new();
    let _ = s.write_fmt(args);
    s
}

/// Leaves `value` and its infix text (the bare number) in the two cells at
/// `-1` and `0`.
fn primary(a: &mut AttrStack<Value>, ctx: &mut CalcCtx, value: f64) -> Result<(), CalcError> {
    let _ = write!(ctx.postfix, " {value}");
    a.set(-1, Value::Number(value))?;
    a.set(0, Value::Text(render(format_args!("{value}"))))?;
    Ok(())
}

/// Primary = Number(value)
pub fn number_primary(a: &mut AttrStack<Value>, ctx: &mut CalcCtx) -> Result<(), CalcError> {
    a.reduce(1, 2, |a| {
        let value = a.number(-1)?;
        primary(a, ctx, value)
    })
}

/// Primary = Identifier(name). An undefined name evaluates to NaN.
pub fn identifier_primary(a: &mut AttrStack<Value>, ctx: &mut CalcCtx) -> Result<(), CalcError> {
    a.reduce(1, 2, |a| {
        let name = a.take_text(-1)?;
        let value = match ctx.names.get(&name) {
            Some(v) => v,
            None => {
                log::debug!("undefined name {:?}", name);
                f64::NAN
            }
        };
        primary(a, ctx, value)
    })
}

/// Primary = "(" Expression ")"
pub fn parenthesize(a: &mut AttrStack<Value>) -> Result<(), CalcError> {
    let inner = a.take_text(0)?;
    a.set(0, Value::Text(render(format_args!(" ({inner}) "))))?;
    Ok(())
}

/// Expression = ("+" | "-") Primary
pub fn unary(a: &mut AttrStack<Value>, ctx: &mut CalcCtx) -> Result<(), CalcError> {
    a.reduce(3, 2, |a| {
        let op = a.char(-2)?;
        let operand = a.number(-1)?;
        let value = match op {
            '+' => operand,
            '-' => -operand,
            other => return Err(CalcError::UnknownOperator(other)),
        };
        let infix = a.take_text(0)?;
        a.set(-2, Value::Number(value))?;
        a.set(-1, Value::Text(render(format_args!(" ({op}{infix}) "))))?;
        let _ = write!(ctx.postfix, " u{op}");
        Ok(())
    })
}

/// Expression = Expression ... op Expression
///
/// `rhs` is the number of cells of the right-hand side: 5 for the static
/// parser, 6 for the dynamic one, whose `OperatorPriority` cell sits below
/// the operator.
pub fn binary(a: &mut AttrStack<Value>, ctx: &mut CalcCtx, rhs: usize) -> Result<(), CalcError> {
    let left = -(rhs as isize - 1);
    a.reduce(rhs, 2, |a| {
        let v1 = a.number(left)?;
        let op = a.char(-2)?;
        let v2 = a.number(-1)?;
        let value = match op {
            '+' => v1 + v2,
            '-' => v1 - v2,
            '*' => v1 * v2,
            '/' => v1 / v2,
            '^' => v1.powf(v2),
            other => return Err(CalcError::UnknownOperator(other)),
        };
        let s1 = a.take_text(left + 1)?;
        let s2 = a.take_text(0)?;
        a.set(left, Value::Number(value))?;
        a.set(left + 1, Value::Text(render(format_args!(" ({s1}{op}{s2}) "))))?;
        let _ = write!(ctx.postfix, " {op}");
        Ok(())
    })
}

/// Start = Expression
pub fn finish_expression(
    a: &mut AttrStack<Value>,
    ctx: &mut CalcCtx,
) -> Result<Statement, CalcError> {
    a.reduce(2, 0, |a| {
        Ok(Statement::Expression {
            value: a.number(-1)?,
            infix: a.take_text(0)?,
            postfix: std::mem::take(&mut ctx.postfix),
        })
    })
}

/// Start = Identifier "=" Expression
pub fn finish_assignment(
    a: &mut AttrStack<Value>,
    ctx: &mut CalcCtx,
) -> Result<Statement, CalcError> {
    a.reduce(3, 0, |a| {
        let name = a.take_text(-2)?;
        let value = a.number(-1)?;
        let reassigned = ctx.names.define(&name, value);
        log::debug!(
            "{} {} = {}",
            if reassigned { "reassigned" } else { "assigned" },
            name,
            value
        );
        Ok(Statement::Assignment {
            name,
            value,
            infix: a.take_text(0)?,
            postfix: std::mem::take(&mut ctx.postfix),
            reassigned,
        })
    })
}

/// Binding power of a lookahead operator.
pub fn binding_power(symbol: LexSymbol) -> Result<i32, CalcError> {
    match symbol {
        LexSymbol::AddOp | LexSymbol::SubOp => Ok(10),
        LexSymbol::MultOp | LexSymbol::DivOp => Ok(20),
        LexSymbol::PowOp => Ok(30),
        other => Err(CalcError::NotAnOperator(other)),
    }
}

/// Priority of reducing `e1 op e2` whose operator was shifted at binding
/// power `power`. `^` is right associative, everything else left.
pub fn binary_expression_priority(power: i32, op: char) -> i32 {
    let assoc = if op == '^' { Assoc::Right } else { Assoc::Left };
    assoc.reduce_priority(power)
}
