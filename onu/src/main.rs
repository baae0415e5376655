use clap::Parser;
use console::style;
use onu::Error;
use onu_eval::{Evaluator, DEFAULT_MAX_DEPTH};
use onu_parser::lexer::scan;
use onu_value::{Environment, Value};
use rustyline::error::ReadlineError;
use rustyline::Editor;
use std::{fs, io, path::PathBuf, process};
use tracing_subscriber::EnvFilter;

/// onu is a small expression oriented scripting language.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Script to run. Starts an interactive session when omitted.
    file: Option<PathBuf>,

    /// Prints the tokens of every input before running it.
    #[arg(long)]
    tokens: bool,

    /// Prints the syntax tree of every input before running it.
    #[arg(long)]
    ast: bool,

    /// Maximum number of nested function calls.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut evaluator = Evaluator::with_max_depth(args.max_depth);
    let env = Environment::new();

    match &args.file {
        Some(path) => {
            let content = fs::read_to_string(path).unwrap_or_else(|err| {
                eprintln!("Failed to read the input file '{}': {}", path.display(), err);
                process::exit(1);
            });
            match run(&args, &mut evaluator, &content, &env) {
                Ok(Value::Nil) => {}
                Ok(value) => println!("{}", value),
                Err(err) => {
                    report(&err);
                    process::exit(match err {
                        Error::Syntax(_) => 65,
                        Error::Runtime(_) => 70,
                    });
                }
            }
        }
        None => repl(&args, &mut evaluator, &env),
    }
}

fn run(args: &Args, evaluator: &mut Evaluator, content: &str, env: &Environment) -> Result<Value, Error> {
    if args.tokens {
        let (tokens, _) = scan(content);
        for token in &tokens {
            eprintln!("{:>4} {:?} {:?}", token.line, token.kind, token.lexeme);
        }
    }

    let program = onu::compile(content)?;
    if args.ast {
        eprintln!("{}", program);
    }
    Ok(evaluator.eval_program(&program, env)?)
}

fn report(err: &Error) {
    match err {
        Error::Syntax(errors) => {
            for error in errors {
                eprintln!(
                    "{}",
                    style(format!("ERROR: {} at line {}", error.message(), error.line())).red()
                );
            }
        }
        Error::Runtime(_) => eprintln!("{}", style(err).red()),
    }
}

fn repl(args: &Args, evaluator: &mut Evaluator, env: &Environment) {
    let mut rl = Editor::<()>::new();

    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "exit" {
                    break;
                }
                rl.add_history_entry(line);

                match run(args, evaluator, line, env) {
                    Ok(Value::Nil) => {}
                    Ok(value) => println!("{}", value),
                    Err(err) => report(&err),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}", style(format!("Error: {:?}", err)).red());
                break;
            }
        }
    }
}
