//! Runs Onu source text through the whole pipeline: scanning, parsing and evaluation.

use onu_eval::{Evaluator, RuntimeError};
use onu_parser::{ast::Program, lexer::scan, parser::Parser};
use onu_source::{Source, SyntaxError};
use onu_value::{Environment, Value};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Lex and parse errors, in the order they were found. Nothing was evaluated.
    #[error("{}", render_lines(.0))]
    Syntax(Vec<SyntaxError>),
    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

fn render_lines(errors: &[SyntaxError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Scans and parses `content`. Every lex and parse error is reported, not only the first one.
pub fn compile(content: &str) -> Result<Program, Error> {
    let source = Source::new(content);

    let (tokens, lex_errors) = scan(source.content);
    source.errors.extend(lex_errors);

    let mut parser = Parser::new(tokens);
    let program = parser.parse_program();
    source.errors.extend(parser.errors().iter().cloned());

    if source.has_no_errors() {
        Ok(program)
    } else {
        debug!(count = source.errors.len(), "syntax errors");
        Err(Error::Syntax(source.errors.errors()))
    }
}

/// Runs `content` in `env` and returns the value of its last statement.
pub fn interpret(content: &str, env: &Environment) -> Result<Value, Error> {
    interpret_with(&mut Evaluator::new(), content, env)
}

/// Same as [`interpret`] with a configured [`Evaluator`].
pub fn interpret_with(evaluator: &mut Evaluator, content: &str, env: &Environment) -> Result<Value, Error> {
    let program = compile(content)?;
    debug!(statements = program.statements.len(), "evaluating");
    Ok(evaluator.eval_program(&program, env)?)
}
