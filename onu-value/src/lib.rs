//! Runtime values of the Onu language.

pub mod env;
pub mod function;

pub use env::Environment;
pub use function::Function;

use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Nil,
    /// A closure. Cloning the value shares the function.
    Function(Rc<Function>),
}

impl Value {
    /// The type tag used in runtime error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "INTEGER",
            Value::Float(_) => "FLOAT",
            Value::String(_) => "STRING",
            Value::Bool(_) => "BOOLEAN",
            Value::Nil => "NIL",
            Value::Function(_) => "FUNCTION",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Integer(val) => *val != 0,
            Value::Float(val) => *val != 0.0,
            Value::String(val) => !val.is_empty(),
            Value::Bool(val) => *val,
            Value::Nil => false,
            Value::Function(_) => true,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    /// Attempts to cast the `Value` into a `&str` or `None` if wrong type.
    pub fn cast_to_str(&self) -> Option<&str> {
        match self {
            Value::String(val) => Some(val),
            _ => None,
        }
    }

    /// Returns the numeric value as a float (integers are promoted) or `None` if not a number.
    pub fn cast_to_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(val) => Some(*val as f64),
            Value::Float(val) => Some(*val),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(val) => write!(f, "{}", val),
            Value::Float(val) => write!(f, "{}", val),
            Value::String(val) => write!(f, "{}", val),
            Value::Bool(val) => write!(f, "{}", val),
            Value::Nil => write!(f, "nil"),
            Value::Function(func) => write!(f, "{}", func),
        }
    }
}

impl From<i64> for Value {
    fn from(val: i64) -> Self {
        Value::Integer(val)
    }
}

impl From<f64> for Value {
    fn from(val: f64) -> Self {
        Value::Float(val)
    }
}

impl From<bool> for Value {
    fn from(val: bool) -> Self {
        Value::Bool(val)
    }
}

impl From<&str> for Value {
    fn from(val: &str) -> Self {
        Value::String(val.to_string())
    }
}

impl From<String> for Value {
    fn from(val: String) -> Self {
        Value::String(val)
    }
}
