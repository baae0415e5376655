use crate::ast::{Expr, Program};
use crate::token::{Token, TokenKind};
use onu_source::{ParseError, ParseFailure};
use std::collections::HashMap;
use tracing::debug;

mod expr;
mod stmt;

/// Maximum nesting of expressions and blocks.
pub const MAX_NESTING: usize = 256;

type PrefixParseFn = fn(&mut Parser) -> Option<Expr>;
type InfixParseFn = fn(&mut Parser, Expr) -> Option<Expr>;

/// Binding strength of an operator, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    /// `==` `!=`
    Equals,
    /// `<` `<=` `>` `>=`
    Comparison,
    /// `+` `-`
    Sum,
    /// `*` `/`
    Product,
    /// `-x` `!x`
    Prefix,
    /// `f(x)`
    Call,
}

impl Precedence {
    /// Returns the infix precedence of `kind`, or [`Precedence::Lowest`] if it is not an infix operator.
    pub fn of(kind: TokenKind) -> Self {
        match kind {
            TokenKind::EqualEqual | TokenKind::NotEqual => Precedence::Equals,
            TokenKind::Less
            | TokenKind::LessEqual
            | TokenKind::Greater
            | TokenKind::GreaterEqual => Precedence::Comparison,
            TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
            TokenKind::Star | TokenKind::Slash => Precedence::Product,
            TokenKind::LeftParen => Precedence::Call,
            _ => Precedence::Lowest,
        }
    }
}

pub struct Parser {
    tokens: Vec<Token>,
    /// Index of the current token. Never moves past the trailing `Eof`.
    pos: usize,
    errors: Vec<ParseError>,
    /// Number of expressions and blocks currently being parsed.
    nesting: usize,
    prefix_fns: HashMap<TokenKind, PrefixParseFn>,
    infix_fns: HashMap<TokenKind, InfixParseFn>,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|token| token.kind) != Some(TokenKind::Eof) {
            let line = tokens.last().map_or(1, |token| token.line);
            tokens.push(Token::new(TokenKind::Eof, "", crate::token::Literal::None, line));
        }

        let mut parser = Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
            nesting: 0,
            prefix_fns: HashMap::new(),
            infix_fns: HashMap::new(),
        };

        parser.register_prefix(TokenKind::Identifier, Parser::parse_identifier_expr);
        parser.register_prefix(TokenKind::Integer, Parser::parse_literal_expr);
        parser.register_prefix(TokenKind::Float, Parser::parse_literal_expr);
        parser.register_prefix(TokenKind::String, Parser::parse_literal_expr);
        parser.register_prefix(TokenKind::True, Parser::parse_literal_expr);
        parser.register_prefix(TokenKind::False, Parser::parse_literal_expr);
        parser.register_prefix(TokenKind::Nil, Parser::parse_literal_expr);
        parser.register_prefix(TokenKind::Minus, Parser::parse_prefix_expr);
        parser.register_prefix(TokenKind::Bang, Parser::parse_prefix_expr);
        parser.register_prefix(TokenKind::LeftParen, Parser::parse_grouped_expr);
        parser.register_prefix(TokenKind::If, Parser::parse_if_expr);
        parser.register_prefix(TokenKind::Fun, Parser::parse_function_expr);

        for kind in [
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::EqualEqual,
            TokenKind::NotEqual,
            TokenKind::Less,
            TokenKind::LessEqual,
            TokenKind::Greater,
            TokenKind::GreaterEqual,
        ]
        .iter()
        {
            parser.register_infix(*kind, Parser::parse_infix_expr);
        }
        parser.register_infix(TokenKind::LeftParen, Parser::parse_call_expr);

        parser
    }

    fn register_prefix(&mut self, kind: TokenKind, f: PrefixParseFn) {
        self.prefix_fns.insert(kind, f);
    }

    fn register_infix(&mut self, kind: TokenKind, f: InfixParseFn) {
        self.infix_fns.insert(kind, f);
    }

    /// Errors recorded so far.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Consumes the parser, returning `program` only if no error was recorded.
    pub fn finish(self, program: Program) -> Result<Program, ParseFailure> {
        if self.errors.is_empty() {
            Ok(program)
        } else {
            Err(ParseFailure {
                errors: self.errors,
            })
        }
    }
}

/// Parses `tokens` into a [`Program`]. Fails if any syntax error was found.
pub fn parse(tokens: Vec<Token>) -> Result<Program, ParseFailure> {
    let mut parser = Parser::new(tokens);
    let program = parser.parse_program();
    parser.finish(program)
}

/// Parse utilities
impl Parser {
    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    fn next(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// Eats the current token if it has kind `kind`.
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.current_kind() == kind {
            self.next(); // eat token
            true
        } else {
            false
        }
    }

    /// Eats a token of kind `kind` or records an error mentioning `what`.
    fn expect(&mut self, kind: TokenKind, what: &str) -> Option<()> {
        if self.eat(kind) {
            Some(())
        } else {
            self.expected(what);
            None
        }
    }

    fn expect_identifier(&mut self) -> Option<String> {
        if self.current_kind() == TokenKind::Identifier {
            let ident = self.current().lexeme.clone();
            self.next();
            Some(ident)
        } else {
            self.expected("identifier");
            None
        }
    }

    /// Runs `parse` one nesting level deeper. Fails past [`MAX_NESTING`].
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        if self.nesting >= MAX_NESTING {
            self.error("expression nested too deeply".to_string());
            return None;
        }
        self.nesting += 1;
        let result = parse(self);
        self.nesting -= 1;
        result
    }

    fn skip_line_breaks(&mut self) {
        while self.current_kind() == TokenKind::LineBreak {
            self.next();
        }
    }

    fn skip_terminators(&mut self) {
        while self.current_kind().is_terminator() {
            self.next();
        }
    }

    /// Raises an `expected <what>, but got <current>` error.
    fn expected(&mut self, what: &str) {
        let message = format!("expected {}, but got {}", what, self.current());
        self.error(message);
    }

    fn error(&mut self, message: String) {
        self.error_at(self.current().line, message);
    }

    fn error_at(&mut self, line: usize, message: String) {
        let error = ParseError::new(line, message);
        debug!(%error, "parse error");
        self.errors.push(error);
    }
}
