use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A minimal symbolic cost algebra: variables, constants, addition and
/// multiplication, plus substitution. A full CAS is not needed here — tree
/// depth never exceeds recipe depth, and no simplification beyond literal
/// substitution is required for evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Const(Decimal),
    Var(String),
    Add(Box<Expression>, Box<Expression>),
    Mul(Box<Expression>, Box<Expression>),
}

impl Expression {
    pub fn konst(value: impl Into<Decimal>) -> Self {
        Expression::Const(value.into())
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expression::Var(name.into())
    }

    pub fn add(self, other: Expression) -> Self {
        Expression::Add(Box::new(self), Box::new(other))
    }

    pub fn mul(self, other: Expression) -> Self {
        Expression::Mul(Box::new(self), Box::new(other))
    }

    /// Returns a copy of `self` with every occurrence of variable `name`
    /// replaced by `replacement`.
    pub fn subst(&self, name: &str, replacement: &Expression) -> Expression {
        match self {
            Expression::Const(_) => self.clone(),
            Expression::Var(v) if v == name => replacement.clone(),
            Expression::Var(_) => self.clone(),
            Expression::Add(a, b) => Expression::Add(
                Box::new(a.subst(name, replacement)),
                Box::new(b.subst(name, replacement)),
            ),
            Expression::Mul(a, b) => Expression::Mul(
                Box::new(a.subst(name, replacement)),
                Box::new(b.subst(name, replacement)),
            ),
        }
    }

    /// Numerically evaluates the expression, resolving every free variable
    /// through `bindings`. Errors on the first unbound variable encountered.
    pub fn eval(&self, bindings: &HashMap<String, Decimal>) -> Result<Decimal, EvalError> {
        match self {
            Expression::Const(c) => Ok(*c),
            Expression::Var(v) => bindings
                .get(v)
                .copied()
                .ok_or_else(|| EvalError::UnboundVariable(v.clone())),
            Expression::Add(a, b) => Ok(a.eval(bindings)? + b.eval(bindings)?),
            Expression::Mul(a, b) => Ok(a.eval(bindings)? * b.eval(bindings)?),
        }
    }

    /// Every variable name appearing anywhere in the expression.
    pub fn free_vars(&self, into: &mut std::collections::BTreeSet<String>) {
        match self {
            Expression::Const(_) => {}
            Expression::Var(v) => {
                into.insert(v.clone());
            }
            Expression::Add(a, b) | Expression::Mul(a, b) => {
                a.free_vars(into);
                b.free_vars(into);
            }
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum EvalError {
    #[error("unbound variable '{0}'")]
    UnboundVariable(String),
}
