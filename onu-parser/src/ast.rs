use std::fmt;
use std::rc::Rc;

/// The parse root.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// A variable binding (e.g. `var a = 1;`).
    Var { name: String, value: Expr },
    Return(Expr),
    /// An expression statement (e.g. `foo(1);`).
    Expr(Expr),
    Block(Block),
}

/// A braced sequence of statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// An identifier (e.g. `foo`).
    Identifier(String),
    IntegerLit(i64),
    FloatLit(f64),
    StringLit(String),
    BoolLit(bool),
    NilLit,
    /// A unary expression (e.g. `-1`).
    Prefix { op: PrefixOp, operand: Box<Expr> },
    /// A binary expression (e.g. `1+1`).
    Infix {
        lhs: Box<Expr>,
        op: InfixOp,
        rhs: Box<Expr>,
    },
    If {
        condition: Box<Expr>,
        then_block: Block,
        else_block: Option<Block>,
    },
    /// A function literal. The body is shared with every closure created from it.
    Function {
        name: Option<String>,
        params: Vec<String>,
        body: Rc<Block>,
    },
    Call { callee: Box<Expr>, args: Vec<Expr> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl fmt::Display for PrefixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PrefixOp::Neg => "-",
            PrefixOp::Not => "!",
        })
    }
}

impl fmt::Display for InfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InfixOp::Add => "+",
            InfixOp::Sub => "-",
            InfixOp::Mul => "*",
            InfixOp::Div => "/",
            InfixOp::Eq => "==",
            InfixOp::NotEq => "!=",
            InfixOp::Lt => "<",
            InfixOp::LtEq => "<=",
            InfixOp::Gt => ">",
            InfixOp::GtEq => ">=",
        })
    }
}

/// Writes `items` separated by `sep`.
fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list(f, &self.statements, "\n")
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{ ")?;
        for stmt in &self.statements {
            write!(f, "{} ", stmt)?;
        }
        f.write_str("}")
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Var { name, value } => write!(f, "var {} = {};", name, value),
            Stmt::Return(expr) => write!(f, "return {};", expr),
            Stmt::Expr(expr) => write!(f, "{};", expr),
            Stmt::Block(block) => write!(f, "{}", block),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Identifier(ident) => write!(f, "{}", ident),
            Expr::IntegerLit(val) => write!(f, "{}", val),
            Expr::FloatLit(val) => write!(f, "{:?}", val), // keeps the `.0` of `2.0`
            Expr::StringLit(val) => write!(f, "\"{}\"", val),
            Expr::BoolLit(val) => write!(f, "{}", val),
            Expr::NilLit => write!(f, "nil"),
            Expr::Prefix { op, operand } => write!(f, "({}{})", op, operand),
            Expr::Infix { lhs, op, rhs } => write!(f, "({} {} {})", lhs, op, rhs),
            Expr::If {
                condition,
                then_block,
                else_block,
            } => {
                write!(f, "if ({}) {}", condition, then_block)?;
                if let Some(else_block) = else_block {
                    write!(f, " else {}", else_block)?;
                }
                Ok(())
            }
            Expr::Function { name, params, body } => {
                f.write_str("fun")?;
                if let Some(name) = name {
                    write!(f, " {}", name)?;
                }
                f.write_str("(")?;
                write_list(f, params, ", ")?;
                write!(f, ") {}", body)
            }
            Expr::Call { callee, args } => {
                write!(f, "{}(", callee)?;
                write_list(f, args, ", ")?;
                f.write_str(")")
            }
        }
    }
}
