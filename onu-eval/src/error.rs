use onu_parser::ast::{InfixOp, PrefixOp};
use onu_value::Value;

/// A runtime error. The first one raised stops the whole evaluation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    #[error("undefined identifier {0}")]
    UndefinedIdentifier(String),
    #[error("unknown operator: {op}{operand}")]
    UnknownPrefixOperator {
        op: PrefixOp,
        operand: &'static str,
    },
    #[error("unknown operator: {lhs} {op} {rhs}")]
    UnknownInfixOperator {
        lhs: &'static str,
        op: InfixOp,
        rhs: &'static str,
    },
    #[error("not a function {0}")]
    NotAFunction(&'static str),
    #[error("wrong number of arguments: expected {expected}, got {got}")]
    ArityMismatch { expected: usize, got: usize },
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow")]
    IntegerOverflow,
    #[error("maximum call depth of {0} exceeded")]
    CallDepthExceeded(usize),
}

/// Why evaluation of a node stopped before producing a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Unwind {
    /// A `return` statement is unwinding to the enclosing call.
    Return(Value),
    Error(RuntimeError),
}

impl From<RuntimeError> for Unwind {
    fn from(error: RuntimeError) -> Self {
        Unwind::Error(error)
    }
}

/// Result of evaluating a node.
pub type Flow = Result<Value, Unwind>;
