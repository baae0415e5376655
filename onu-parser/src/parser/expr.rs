use super::*;
use crate::ast::{InfixOp, PrefixOp};
use crate::token::Literal;
use std::rc::Rc;

impl Parser {
    /* Expressions */
    /// Parses any expression.
    /// This is equivalent to calling [`Self::parse_expr_bp`] with [`Precedence::Lowest`].
    pub fn parse_expr(&mut self) -> Option<Expr> {
        self.parse_expr_bp(Precedence::Lowest)
    }

    /// Parses an expression whose infix operators all bind tighter than `min`.
    /// To parse any expression use, [`Self::parse_expr`].
    pub fn parse_expr_bp(&mut self, min: Precedence) -> Option<Expr> {
        self.nested(|parser| parser.parse_expr_bp_inner(min))
    }

    fn parse_expr_bp_inner(&mut self, min: Precedence) -> Option<Expr> {
        let prefix = match self.prefix_fns.get(&self.current_kind()).copied() {
            Some(prefix) => prefix,
            None => {
                let message = format!("no prefix parse function for {}", self.current());
                self.error(message);
                return None;
            }
        };
        let mut lhs = prefix(self)?;

        loop {
            let kind = self.current_kind();
            if Precedence::of(kind) <= min {
                break; // not tighter than min, stop parsing
            }
            let infix = match self.infix_fns.get(&kind).copied() {
                Some(infix) => infix,
                None => break,
            };
            lhs = infix(self, lhs)?;
        }

        Some(lhs)
    }

    /* Expressions.Literals */
    pub(super) fn parse_literal_expr(&mut self) -> Option<Expr> {
        let token = self.current();
        let expr = match (token.kind, &token.literal) {
            (TokenKind::Integer, Literal::Int(val)) => Some(Expr::IntegerLit(*val)),
            (TokenKind::Float, Literal::Float(val)) => Some(Expr::FloatLit(*val)),
            (TokenKind::String, Literal::Str(val)) => Some(Expr::StringLit(val.clone())),
            (TokenKind::True, _) => Some(Expr::BoolLit(true)),
            (TokenKind::False, _) => Some(Expr::BoolLit(false)),
            (TokenKind::Nil, _) => Some(Expr::NilLit),
            _ => None,
        };
        match expr {
            Some(expr) => {
                self.next(); // eat parsed token
                Some(expr)
            }
            None => {
                self.expected("literal");
                None
            }
        }
    }

    /* Expressions.Identifier */
    pub(super) fn parse_identifier_expr(&mut self) -> Option<Expr> {
        self.expect_identifier().map(Expr::Identifier)
    }

    /* Expressions.Operators */
    pub(super) fn parse_prefix_expr(&mut self) -> Option<Expr> {
        let op = match self.current_kind() {
            TokenKind::Minus => PrefixOp::Neg,
            TokenKind::Bang => PrefixOp::Not,
            _ => {
                self.expected("'-' or '!'");
                return None;
            }
        };
        self.next();
        let operand = self.parse_expr_bp(Precedence::Prefix)?;
        Some(Expr::Prefix {
            op,
            operand: Box::new(operand),
        })
    }

    pub(super) fn parse_infix_expr(&mut self, lhs: Expr) -> Option<Expr> {
        let kind = self.current_kind();
        let op = match kind {
            TokenKind::Plus => InfixOp::Add,
            TokenKind::Minus => InfixOp::Sub,
            TokenKind::Star => InfixOp::Mul,
            TokenKind::Slash => InfixOp::Div,
            TokenKind::EqualEqual => InfixOp::Eq,
            TokenKind::NotEqual => InfixOp::NotEq,
            TokenKind::Less => InfixOp::Lt,
            TokenKind::LessEqual => InfixOp::LtEq,
            TokenKind::Greater => InfixOp::Gt,
            TokenKind::GreaterEqual => InfixOp::GtEq,
            _ => {
                self.expected("binary operator");
                return None;
            }
        };
        self.next();
        self.skip_line_breaks(); // operand may continue on the next line

        // recursing with the operator's own precedence makes it left associative
        let rhs = self.parse_expr_bp(Precedence::of(kind))?;
        Some(Expr::Infix {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
        })
    }

    pub(super) fn parse_grouped_expr(&mut self) -> Option<Expr> {
        self.expect(TokenKind::LeftParen, "'('")?;
        self.skip_line_breaks();
        let expr = self.parse_expr()?;
        self.skip_line_breaks();
        self.expect(TokenKind::RightParen, "')'")?;
        Some(expr)
    }

    /* Expressions.Control */
    pub(super) fn parse_if_expr(&mut self) -> Option<Expr> {
        self.expect(TokenKind::If, "'if'")?;
        self.expect(TokenKind::LeftParen, "'('")?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::RightParen, "')'")?;
        let then_block = self.parse_body("if expression")?;
        let else_block = if self.eat(TokenKind::Else) {
            Some(self.parse_body("else branch")?)
        } else {
            None
        };

        Some(Expr::If {
            condition: Box::new(condition),
            then_block,
            else_block,
        })
    }

    /* Expressions.Functions */
    pub(super) fn parse_function_expr(&mut self) -> Option<Expr> {
        self.expect(TokenKind::Fun, "'fun'")?;
        let name = if self.current_kind() == TokenKind::Identifier {
            Some(self.expect_identifier()?)
        } else {
            None
        };
        self.expect(TokenKind::LeftParen, "'('")?;
        let params = self.parse_paren_list(Parser::expect_identifier)?;
        let body = self.parse_body("function literal")?;

        Some(Expr::Function {
            name,
            params,
            body: Rc::new(body),
        })
    }

    pub(super) fn parse_call_expr(&mut self, callee: Expr) -> Option<Expr> {
        self.expect(TokenKind::LeftParen, "'('")?;
        let args = self.parse_paren_list(Parser::parse_expr)?;
        Some(Expr::Call {
            callee: Box::new(callee),
            args,
        })
    }

    /// Parses a comma separated list up to and including the closing `)`.
    /// The opening `(` must already be eaten. Line breaks between items are ignored.
    fn parse_paren_list<T>(
        &mut self,
        mut parse_item: impl FnMut(&mut Self) -> Option<T>,
    ) -> Option<Vec<T>> {
        let mut items = Vec::new();

        self.skip_line_breaks();
        if self.eat(TokenKind::RightParen) {
            return Some(items);
        }

        loop {
            self.skip_line_breaks();
            items.push(parse_item(self)?);
            self.skip_line_breaks();

            if self.eat(TokenKind::RightParen) {
                break;
            } else if !self.eat(TokenKind::Comma) {
                self.expected("',' or ')'");
                return None;
            }
        }

        Some(items)
    }
}
