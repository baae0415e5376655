//! Front end of the Onu language: tokens, lexer, syntax tree and parser.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;
