use super::*;
use crate::ast::{Block, Stmt};

impl Parser {
    /// Parses the whole token stream.
    /// Errors are recorded (see [`Parser::errors`]) and the offending statements are left out.
    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();

        loop {
            self.skip_terminators();
            match self.current_kind() {
                TokenKind::Eof => break,
                TokenKind::RightBrace => {
                    self.expected("statement");
                    self.next(); // skip stray `}`
                }
                _ => {
                    if let Some(stmt) = self.parse_stmt() {
                        statements.push(stmt);
                    }
                }
            }
        }

        Program { statements }
    }

    /// Parses a statement.
    /// A statement ends at `;`, a line break, a closing `}` or the end of input.
    /// On error the rest of the statement is skipped.
    pub fn parse_stmt(&mut self) -> Option<Stmt> {
        let stmt = match self.current_kind() {
            TokenKind::Var => self.parse_var_stmt(),
            TokenKind::Return => self.parse_return_stmt(),
            TokenKind::LeftBrace => self.parse_block().map(Stmt::Block),
            _ => self.parse_expr().map(Stmt::Expr),
        };

        match stmt {
            Some(stmt) if self.at_stmt_end() => Some(stmt),
            Some(_) => {
                self.expected("';' or line break");
                self.synchronize();
                None
            }
            None => {
                self.synchronize();
                None
            }
        }
    }

    /// Parses `{ ... }`.
    pub fn parse_block(&mut self) -> Option<Block> {
        self.nested(Parser::parse_block_inner)
    }

    fn parse_block_inner(&mut self) -> Option<Block> {
        self.expect(TokenKind::LeftBrace, "'{'")?;

        let mut statements = Vec::new();
        loop {
            self.skip_terminators();
            match self.current_kind() {
                TokenKind::RightBrace => {
                    self.next();
                    break;
                }
                TokenKind::Eof => {
                    self.expected("'}'");
                    return None;
                }
                _ => {
                    if let Some(stmt) = self.parse_stmt() {
                        statements.push(stmt);
                    }
                }
            }
        }

        Some(Block { statements })
    }

    /// Parses the body of a conditional or function, which must not be empty.
    pub(super) fn parse_body(&mut self, context: &str) -> Option<Block> {
        let line = self.current().line;
        let errors = self.errors.len();
        let block = self.parse_block()?;
        // a body whose statements all failed to parse was already reported
        if block.statements.is_empty() && self.errors.len() == errors {
            self.error_at(line, format!("empty body in {}", context));
            return None;
        }
        Some(block)
    }

    fn parse_var_stmt(&mut self) -> Option<Stmt> {
        self.expect(TokenKind::Var, "'var'")?;
        let name = self.expect_identifier()?;
        self.expect(TokenKind::Equal, "'='")?;
        let value = self.parse_expr()?;
        Some(Stmt::Var { name, value })
    }

    fn parse_return_stmt(&mut self) -> Option<Stmt> {
        self.expect(TokenKind::Return, "'return'")?;
        // `return` on its own returns nil
        if self.at_stmt_end() {
            return Some(Stmt::Return(Expr::NilLit));
        }
        let expr = self.parse_expr()?;
        Some(Stmt::Return(expr))
    }

    fn at_stmt_end(&self) -> bool {
        let kind = self.current_kind();
        kind.is_terminator() || kind == TokenKind::RightBrace || kind == TokenKind::Eof
    }

    /// Skips tokens up to the next statement boundary.
    fn synchronize(&mut self) {
        while !self.at_stmt_end() {
            self.next();
        }
    }
}
