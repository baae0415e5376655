//! Tree-walking evaluator for Onu programs.

pub mod error;
pub mod ops;

pub use error::{Flow, RuntimeError, Unwind};

use onu_parser::ast::{Block, Expr, Program, Stmt};
use onu_value::{Environment, Function, Value};
use std::rc::Rc;
use tracing::{debug, trace};

/// Maximum nesting of function calls before evaluation is aborted.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Remaining stack below which evaluation switches to a freshly allocated segment.
const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_SEGMENT_SIZE: usize = 1024 * 1024;

/// Evaluates syntax trees against an [`Environment`].
#[derive(Debug)]
pub struct Evaluator {
    max_depth: usize,
    /// Number of calls currently being evaluated.
    depth: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth,
            depth: 0,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Evaluates every statement of `program` in `env` and returns the value of the last one.
    /// A top level `return` stops the program with the returned value.
    pub fn eval_program(&mut self, program: &Program, env: &Environment) -> Result<Value, RuntimeError> {
        self.depth = 0;
        match self.eval_statements(&program.statements, env) {
            Ok(value) | Err(Unwind::Return(value)) => Ok(value),
            Err(Unwind::Error(err)) => {
                debug!(%err, "runtime error");
                Err(err)
            }
        }
    }

    /// Evaluates a block in `env`. Blocks do not open a new scope.
    pub fn eval_block(&mut self, block: &Block, env: &Environment) -> Flow {
        self.eval_statements(&block.statements, env)
    }

    fn eval_statements(&mut self, statements: &[Stmt], env: &Environment) -> Flow {
        let mut result = Value::Nil;
        for stmt in statements {
            result = self.eval_stmt(stmt, env)?;
        }
        Ok(result)
    }

    pub fn eval_stmt(&mut self, stmt: &Stmt, env: &Environment) -> Flow {
        match stmt {
            Stmt::Var { name, value } => {
                let value = self.eval_expr(value, env)?;
                trace!(name = name.as_str(), %value, "binding");
                env.define(name.as_str(), value);
                Ok(Value::Nil)
            }
            Stmt::Return(expr) => {
                let value = self.eval_expr(expr, env)?;
                Err(Unwind::Return(value))
            }
            Stmt::Expr(expr) => self.eval_expr(expr, env),
            Stmt::Block(block) => self.eval_block(block, env),
        }
    }

    pub fn eval_expr(&mut self, expr: &Expr, env: &Environment) -> Flow {
        // every recursive path (blocks, calls, operands) goes through here
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT_SIZE, || self.eval_expr_inner(expr, env))
    }

    fn eval_expr_inner(&mut self, expr: &Expr, env: &Environment) -> Flow {
        match expr {
            Expr::Identifier(name) => env
                .get(name)
                .ok_or_else(|| RuntimeError::UndefinedIdentifier(name.clone()).into()),
            Expr::IntegerLit(val) => Ok(Value::Integer(*val)),
            Expr::FloatLit(val) => Ok(Value::Float(*val)),
            Expr::StringLit(val) => Ok(Value::String(val.clone())),
            Expr::BoolLit(val) => Ok(Value::Bool(*val)),
            Expr::NilLit => Ok(Value::Nil),
            Expr::Prefix { op, operand } => {
                let operand = self.eval_expr(operand, env)?;
                Ok(ops::eval_prefix(*op, operand)?)
            }
            Expr::Infix { lhs, op, rhs } => {
                let lhs = self.eval_expr(lhs, env)?;
                let rhs = self.eval_expr(rhs, env)?;
                Ok(ops::eval_infix(*op, lhs, rhs)?)
            }
            Expr::If {
                condition,
                then_block,
                else_block,
            } => {
                if self.eval_expr(condition, env)?.is_truthy() {
                    self.eval_block(then_block, env)
                } else if let Some(else_block) = else_block {
                    self.eval_block(else_block, env)
                } else {
                    Ok(Value::Nil)
                }
            }
            Expr::Function { name, params, body } => Ok(Value::Function(Rc::new(Function {
                name: name.clone(),
                params: params.clone(),
                body: Rc::clone(body),
                env: env.clone(),
            }))),
            Expr::Call { callee, args } => {
                let callee = self.eval_expr(callee, env)?;
                let args = args
                    .iter()
                    .map(|arg| self.eval_expr(arg, env))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(self.call(callee, args)?)
            }
        }
    }

    /// Calls `callee` with already evaluated arguments.
    pub fn call(&mut self, callee: Value, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let func = match callee {
            Value::Function(func) => func,
            other => return Err(RuntimeError::NotAFunction(other.type_name())),
        };
        if args.len() != func.arity() {
            return Err(RuntimeError::ArityMismatch {
                expected: func.arity(),
                got: args.len(),
            });
        }
        if self.depth >= self.max_depth {
            return Err(RuntimeError::CallDepthExceeded(self.max_depth));
        }

        let frame = Environment::new_enclosed(&func.env);
        if let Some(name) = &func.name {
            frame.define(name.as_str(), Value::Function(Rc::clone(&func)));
        }
        for (param, arg) in func.params.iter().zip(args) {
            frame.define(param.as_str(), arg);
        }

        trace!(function = %func, depth = self.depth, "call");
        self.depth += 1;
        let result = self.eval_block(&func.body, &frame);
        self.depth -= 1;

        match result {
            Ok(value) | Err(Unwind::Return(value)) => Ok(value),
            Err(Unwind::Error(err)) => Err(err),
        }
    }
}

/// Evaluates `program` in `env` with the default call depth limit.
pub fn eval_program(program: &Program, env: &Environment) -> Result<Value, RuntimeError> {
    Evaluator::new().eval_program(program, env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use onu_parser::{lexer::scan, parser::parse};

    fn eval_in(source: &str, env: &Environment) -> Result<Value, RuntimeError> {
        let (tokens, errors) = scan(source);
        assert!(errors.is_empty(), "{:?}", errors);
        let program = parse(tokens).unwrap();
        eval_program(&program, env)
    }

    fn eval(source: &str) -> Result<Value, RuntimeError> {
        eval_in(source, &Environment::new())
    }

    #[test]
    fn test_literals() {
        assert_eq!(eval("5"), Ok(Value::Integer(5)));
        assert_eq!(eval("2.5"), Ok(Value::Float(2.5)));
        assert_eq!(eval("\"hi\""), Ok(Value::from("hi")));
        assert_eq!(eval("true"), Ok(Value::Bool(true)));
        assert_eq!(eval("nil"), Ok(Value::Nil));
        assert_eq!(eval(""), Ok(Value::Nil));
    }

    #[test]
    fn test_var_yields_nil_and_binds() {
        let env = Environment::new();
        assert_eq!(eval_in("var a = 1 + 2", &env), Ok(Value::Nil));
        assert_eq!(env.get("a"), Some(Value::Integer(3)));
        assert_eq!(eval_in("a * 2", &env), Ok(Value::Integer(6)));
    }

    #[test]
    fn test_truthiness() {
        for (source, expected) in &[
            ("!0", true),
            ("!1", false),
            ("!0.0", true),
            ("!\"\"", true),
            ("!\"a\"", false),
            ("!nil", true),
            ("!false", true),
            ("!fun() { 1 }", false),
            ("!!5", true),
        ] {
            assert_eq!(eval(source), Ok(Value::Bool(*expected)), "{}", source);
        }
    }

    #[test]
    fn test_if_expression() {
        assert_eq!(eval("if (1 < 2) { 10 } else { 20 }"), Ok(Value::Integer(10)));
        assert_eq!(eval("if (0) { 10 } else { 20 }"), Ok(Value::Integer(20)));
        assert_eq!(eval("if (false) { 10 }"), Ok(Value::Nil));
        assert_eq!(eval("var x = if (1) { 3 }; x + 1"), Ok(Value::Integer(4)));
    }

    #[test]
    fn test_blocks_share_scope() {
        assert_eq!(eval("{ var a = 1 }; a"), Ok(Value::Integer(1)));
    }

    #[test]
    fn test_return_short_circuits() {
        assert_eq!(
            eval("var f = fun() { return 1; 2 }; f()"),
            Ok(Value::Integer(1))
        );
        assert_eq!(
            eval("var f = fun(x) { if (x) { return 1 }; 2 }; f(true) * 10 + f(false)"),
            Ok(Value::Integer(12))
        );
        assert_eq!(eval("var f = fun() { return }; f()"), Ok(Value::Nil));
        assert_eq!(eval("return 9; 10"), Ok(Value::Integer(9)));
    }

    #[test]
    fn test_return_inside_nested_call_only_exits_that_call() {
        assert_eq!(
            eval("var inner = fun() { return 1 }\nvar outer = fun() { inner(); 2 }\nouter()"),
            Ok(Value::Integer(2))
        );
    }

    #[test]
    fn test_closures_capture_live_environment() {
        assert_eq!(
            eval("var f = fun() { y }; var y = 7; f()"),
            Ok(Value::Integer(7))
        );
        assert_eq!(
            eval("var make = fun(x) { fun(y) { x + y } }; var add2 = make(2); add2(40)"),
            Ok(Value::Integer(42))
        );
    }

    #[test]
    fn test_named_function_recursion() {
        assert_eq!(
            eval("var f = fun fact(n) { if (n < 2) { 1 } else { n * fact(n - 1) } }; f(10)"),
            Ok(Value::Integer(3628800))
        );
        // the name is only bound inside calls
        assert_eq!(
            eval("fun g() { 1 }; g"),
            Err(RuntimeError::UndefinedIdentifier("g".to_string()))
        );
    }

    #[test]
    fn test_arguments_evaluated_in_order() {
        assert_eq!(
            eval("var pair = fun(a, b) { a + b }; pair(first, second)"),
            Err(RuntimeError::UndefinedIdentifier("first".to_string()))
        );
        // the callee is evaluated before its arguments
        assert_eq!(
            eval("callee(arg)"),
            Err(RuntimeError::UndefinedIdentifier("callee".to_string()))
        );
        assert_eq!(eval("5(arg)"), Err(RuntimeError::UndefinedIdentifier("arg".to_string())));
    }

    #[test]
    fn test_infix_left_operand_first() {
        assert_eq!(eval("a + b"), Err(RuntimeError::UndefinedIdentifier("a".to_string())));
        assert_eq!(
            eval("1 / 0 + missing"),
            Err(RuntimeError::DivisionByZero)
        );
        assert_eq!(
            eval("1 + missing * (1 / 0)"),
            Err(RuntimeError::UndefinedIdentifier("missing".to_string()))
        );
    }

    #[test]
    fn test_condition_error_propagates() {
        assert_eq!(
            eval("if (nope) { 1 } else { 2 }"),
            Err(RuntimeError::UndefinedIdentifier("nope".to_string()))
        );
        assert_eq!(eval("if (1 / 0) { 1 }"), Err(RuntimeError::DivisionByZero));
        assert_eq!(
            eval("var f = fun() { if (-\"x\") { return 1 }; 2 }; f()").unwrap_err().to_string(),
            "unknown operator: -STRING"
        );
    }

    #[test]
    fn test_runtime_errors() {
        let message = |source| eval(source).unwrap_err().to_string();

        assert_eq!(message("foo"), "undefined identifier foo");
        assert_eq!(message("-true"), "unknown operator: -BOOLEAN");
        assert_eq!(message("1 + \"a\""), "unknown operator: INTEGER + STRING");
        assert_eq!(message("5()"), "not a function INTEGER");
        assert_eq!(message("fun(a) { a }(1, 2)"), "wrong number of arguments: expected 1, got 2");
        assert_eq!(message("1 / 0"), "division by zero");
        assert_eq!(message("9223372036854775807 + 1"), "integer overflow");
    }

    #[test]
    fn test_first_error_stops_evaluation() {
        let env = Environment::new();
        assert!(eval_in("var a = 1; var b = nope; var c = 3", &env).is_err());
        assert_eq!(env.get("a"), Some(Value::Integer(1)));
        assert_eq!(env.get("b"), None);
        assert_eq!(env.get("c"), None);
    }

    #[test]
    fn test_call_depth_limit() {
        let (tokens, _) = scan("var f = fun loop(n) { loop(n + 1) }; f(0)");
        let program = parse(tokens).unwrap();
        let mut evaluator = Evaluator::with_max_depth(50);
        assert_eq!(
            evaluator.eval_program(&program, &Environment::new()),
            Err(RuntimeError::CallDepthExceeded(50))
        );

        // the counter is reset between programs
        let (tokens, _) = scan("var g = fun down(n) { if (n) { down(n - 1) } else { 0 } }; g(40)");
        let program = parse(tokens).unwrap();
        assert_eq!(
            evaluator.eval_program(&program, &Environment::new()),
            Ok(Value::Integer(0))
        );
    }
}
