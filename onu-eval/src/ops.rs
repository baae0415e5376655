//! Operator semantics.

use crate::error::RuntimeError;
use onu_parser::ast::{InfixOp, PrefixOp};
use onu_value::Value;

/// Generate the comparison arms shared by integer and float operands.
macro_rules! gen_comparison {
    ($op: expr, $a: expr, $b: expr) => {
        match $op {
            InfixOp::Eq => Some($a == $b),
            InfixOp::NotEq => Some($a != $b),
            InfixOp::Lt => Some($a < $b),
            InfixOp::LtEq => Some($a <= $b),
            InfixOp::Gt => Some($a > $b),
            InfixOp::GtEq => Some($a >= $b),
            _ => None,
        }
    };
}

pub fn eval_prefix(op: PrefixOp, operand: Value) -> Result<Value, RuntimeError> {
    match (op, operand) {
        (PrefixOp::Not, operand) => Ok(Value::Bool(!operand.is_truthy())),
        (PrefixOp::Neg, Value::Integer(val)) => val
            .checked_neg()
            .map(Value::Integer)
            .ok_or(RuntimeError::IntegerOverflow),
        (PrefixOp::Neg, Value::Float(val)) => Ok(Value::Float(-val)),
        (PrefixOp::Neg, operand) => Err(RuntimeError::UnknownPrefixOperator {
            op,
            operand: operand.type_name(),
        }),
    }
}

/// Applies a binary operator. Mixed integer and float operands promote the integer to a float.
pub fn eval_infix(op: InfixOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    match (lhs, rhs) {
        (Value::Integer(a), Value::Integer(b)) => integer_infix(op, a, b),
        (Value::Float(a), Value::Float(b)) => Ok(float_infix(op, a, b)),
        (Value::Integer(a), Value::Float(b)) => Ok(float_infix(op, a as f64, b)),
        (Value::Float(a), Value::Integer(b)) => Ok(float_infix(op, a, b as f64)),
        (Value::String(a), Value::String(b)) if op == InfixOp::Add => Ok(Value::String(a + &b)),
        (lhs, rhs) => Err(RuntimeError::UnknownInfixOperator {
            lhs: lhs.type_name(),
            op,
            rhs: rhs.type_name(),
        }),
    }
}

fn integer_infix(op: InfixOp, a: i64, b: i64) -> Result<Value, RuntimeError> {
    let checked = |result: Option<i64>| result.map(Value::Integer).ok_or(RuntimeError::IntegerOverflow);

    match op {
        InfixOp::Add => checked(a.checked_add(b)),
        InfixOp::Sub => checked(a.checked_sub(b)),
        InfixOp::Mul => checked(a.checked_mul(b)),
        // truncates toward zero
        InfixOp::Div if b == 0 => Err(RuntimeError::DivisionByZero),
        InfixOp::Div => checked(a.checked_div(b)),
        _ => match gen_comparison!(op, a, b) {
            Some(result) => Ok(Value::Bool(result)),
            None => Err(RuntimeError::UnknownInfixOperator {
                lhs: "INTEGER",
                op,
                rhs: "INTEGER",
            }),
        },
    }
}

fn float_infix(op: InfixOp, a: f64, b: f64) -> Value {
    match op {
        InfixOp::Add => Value::Float(a + b),
        InfixOp::Sub => Value::Float(a - b),
        InfixOp::Mul => Value::Float(a * b),
        InfixOp::Div => Value::Float(a / b),
        _ => Value::Bool(gen_comparison!(op, a, b).unwrap_or(false)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infix(op: InfixOp, lhs: impl Into<Value>, rhs: impl Into<Value>) -> Result<Value, RuntimeError> {
        eval_infix(op, lhs.into(), rhs.into())
    }

    #[test]
    fn test_integer_division_truncates() {
        for &(a, b) in &[(7, 2), (-7, 2), (7, -2), (-7, -2), (0, 5), (i64::MAX, 3)] {
            assert_eq!(infix(InfixOp::Div, a, b), Ok(Value::Integer(a / b)));
        }
    }

    #[test]
    fn test_numeric_promotion() {
        assert_eq!(infix(InfixOp::Add, 1, 2.5), Ok(Value::Float(3.5)));
        assert_eq!(infix(InfixOp::Mul, 1.5, 2), Ok(Value::Float(3.0)));
        assert_eq!(infix(InfixOp::Div, 1, 2.0), Ok(Value::Float(0.5)));
        assert_eq!(infix(InfixOp::Lt, 1, 1.5), Ok(Value::Bool(true)));
        assert_eq!(infix(InfixOp::Eq, 2, 2.0), Ok(Value::Bool(true)));
        assert_eq!(infix(InfixOp::Add, 1, 2), Ok(Value::Integer(3)));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(infix(InfixOp::LtEq, 2, 2), Ok(Value::Bool(true)));
        assert_eq!(infix(InfixOp::GtEq, 1, 2), Ok(Value::Bool(false)));
        assert_eq!(infix(InfixOp::Gt, 2.5, 2.0), Ok(Value::Bool(true)));
        assert_eq!(infix(InfixOp::NotEq, 1.0, 1.0), Ok(Value::Bool(false)));
    }

    #[test]
    fn test_string_concat_only() {
        assert_eq!(infix(InfixOp::Add, "ab", "cd"), Ok(Value::from("abcd")));
        assert_eq!(
            infix(InfixOp::Eq, "a", "a").unwrap_err().to_string(),
            "unknown operator: STRING == STRING"
        );
        assert_eq!(
            infix(InfixOp::Add, "a", 1).unwrap_err().to_string(),
            "unknown operator: STRING + INTEGER"
        );
        assert_eq!(
            infix(InfixOp::Eq, true, true).unwrap_err().to_string(),
            "unknown operator: BOOLEAN == BOOLEAN"
        );
    }

    #[test]
    fn test_integer_errors() {
        assert_eq!(infix(InfixOp::Div, 1, 0), Err(RuntimeError::DivisionByZero));
        assert_eq!(infix(InfixOp::Add, i64::MAX, 1), Err(RuntimeError::IntegerOverflow));
        assert_eq!(infix(InfixOp::Div, i64::MIN, -1), Err(RuntimeError::IntegerOverflow));
        assert_eq!(infix(InfixOp::Div, 1.0, 0), Ok(Value::Float(f64::INFINITY)));
    }

    #[test]
    fn test_prefix() {
        assert_eq!(eval_prefix(PrefixOp::Neg, Value::Integer(5)), Ok(Value::Integer(-5)));
        assert_eq!(eval_prefix(PrefixOp::Neg, Value::Float(1.5)), Ok(Value::Float(-1.5)));
        assert_eq!(eval_prefix(PrefixOp::Not, Value::Integer(0)), Ok(Value::Bool(true)));
        assert_eq!(eval_prefix(PrefixOp::Not, Value::from("x")), Ok(Value::Bool(false)));
        assert_eq!(
            eval_prefix(PrefixOp::Neg, Value::from("x")).unwrap_err().to_string(),
            "unknown operator: -STRING"
        );
        assert_eq!(
            eval_prefix(PrefixOp::Neg, Value::Integer(i64::MIN)),
            Err(RuntimeError::IntegerOverflow)
        );
    }
}
