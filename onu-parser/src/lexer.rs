//! Turns source text into a [`Token`] stream.

use crate::token::{Literal, Token, TokenKind};
use logos::Logos;
use onu_source::LexError;
use tracing::{debug, trace};

/// Scans `source` into tokens.
///
/// Lexical errors do not stop the scan: the offending text is skipped and
/// reported in the returned error list. The token list always ends with a
/// [`TokenKind::LineBreak`] followed by a [`TokenKind::Eof`].
pub fn scan(source: &str) -> (Vec<Token>, Vec<LexError>) {
    let mut lexer = TokenKind::lexer(source);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut line = 1;

    while let Some(kind) = lexer.next() {
        let lexeme = lexer.slice();

        match kind {
            TokenKind::Error if lexeme.starts_with('"') => {
                errors.push(LexError::new(line, "unterminated string"));
            }
            TokenKind::Error => {
                for c in lexeme.chars() {
                    errors.push(LexError::new(line, format!("unexpected character: {}", c)));
                }
            }
            _ => match literal(kind, lexeme) {
                Ok(literal) => tokens.push(Token::new(kind, lexeme, literal, line)),
                Err(message) => errors.push(LexError::new(line, message)),
            },
        }

        // line breaks and multi-line strings
        line += lexeme.matches('\n').count();
    }

    for error in &errors {
        debug!(%error, "lex error");
    }

    tokens.push(Token::new(TokenKind::LineBreak, "", Literal::None, line));
    tokens.push(Token::new(TokenKind::Eof, "", Literal::None, line));
    trace!(tokens = tokens.len(), errors = errors.len(), "scanned source");

    (tokens, errors)
}

/// Computes the literal payload for a token.
fn literal(kind: TokenKind, lexeme: &str) -> Result<Literal, String> {
    let malformed = || format!("malformed number: {}", lexeme);
    Ok(match kind {
        TokenKind::Integer => Literal::Int(lexeme.parse().map_err(|_| malformed())?),
        TokenKind::Float => Literal::Float(lexeme.parse().map_err(|_| malformed())?),
        TokenKind::String => Literal::Str(lexeme[1..lexeme.len() - 1].to_string()),
        TokenKind::True => Literal::Bool(true),
        TokenKind::False => Literal::Bool(false),
        _ => Literal::None,
    })
}
