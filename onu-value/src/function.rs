use crate::Environment;
use onu_parser::ast::Block;
use std::fmt;
use std::rc::Rc;

/// A function value: a function literal paired with the environment it was evaluated in.
pub struct Function {
    /// Name given in the literal (`fun name(...) { ... }`), if any.
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Rc<Block>,
    /// Captured by reference, so later bindings in it are visible to calls.
    pub env: Environment,
}

impl Function {
    /// Number of arguments that the function accepts.
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// Functions are only equal to themselves.
impl PartialEq for Function {
    fn eq(&self, other: &Function) -> bool {
        std::ptr::eq(self, other)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "<fn {}>", name),
            None => write!(f, "<fn>"),
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("env", &"...")
            .finish()
    }
}
