use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use minic::ast::Expr;
use minic::builtins::StdConsole;
use minic::config::{self, HISTORY_FILE, NO_MAIN_MESSAGE, PROMPT, WELCOME_MESSAGE, WELCOME_SUBTITLE};
use minic::env::Environment;
use minic::eval::Evaluator;
use minic::repl::ReplHelper;
use minic::value::{Flow, Value};

/// Interpreter for a statically typed, C-flavored toy language
#[derive(Parser, Debug)]
#[command(name = "minic")]
#[command(version = config::VERSION)]
#[command(about = "A statically typed, C-flavored toy language interpreter")]
#[command(long_about = "Runs a script file by calling its main() function, \
or starts an interactive session when no file is given")]
struct CliArgs {
    /// Script file to execute (optional - if not provided, starts REPL)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    match args.script {
        Some(path) => run_script(&path),
        None => run_repl(),
    }
}

/// Batch mode: parse the whole file, install its top-level statements,
/// then invoke a synthetic zero-argument `main()` call.
///
/// Parse errors and runtime errors are printed and leave the exit code at
/// zero; only startup failures (an unreadable file) are nonzero.
fn run_script(path: &Path) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: cannot read script file {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let mut parser = minic::parser::Parser::new(&source);
    let program = parser.parse_program();
    if !parser.errors().is_empty() {
        for err in parser.errors() {
            eprintln!("parse error: {}", err);
        }
        return ExitCode::SUCCESS;
    }

    let mut console = StdConsole;
    let mut env = Environment::new();
    let mut evaluator = Evaluator::new(&mut console);

    if let Err(err) = evaluator.eval_program(&program, &mut env) {
        eprintln!("{}", err);
        return ExitCode::SUCCESS;
    }

    if env.get("main").is_none() {
        println!("{}", NO_MAIN_MESSAGE);
        return ExitCode::SUCCESS;
    }

    let call_main = Expr::Call {
        callee: Box::new(Expr::Ident("main".into())),
        args: Vec::new(),
    };
    if let Err(err) = evaluator.eval_expr(&call_main, &mut env) {
        eprintln!("{}", err);
    }
    ExitCode::SUCCESS
}

/// Interactive mode: one brace-balanced chunk at a time against a
/// persistent environment. The [`ReplHelper`] keeps input open while a
/// `{` block is unclosed.
fn run_repl() -> ExitCode {
    let rl_config = Config::builder().auto_add_history(true).build();
    let mut rl: Editor<ReplHelper, DefaultHistory> = match Editor::with_config(rl_config) {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("Error: failed to initialize REPL: {}", e);
            return ExitCode::FAILURE;
        }
    };
    rl.set_helper(Some(ReplHelper::new()));
    let _ = rl.load_history(HISTORY_FILE);

    println!("{}", WELCOME_MESSAGE);
    println!("{}", WELCOME_SUBTITLE);

    let mut console = StdConsole;
    let mut env = Environment::new();
    let mut evaluator = Evaluator::new(&mut console);

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                evaluate_chunk(&line, &mut evaluator, &mut env);
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                eprintln!("Error: {}", err);
                break;
            }
        }
    }

    let _ = rl.save_history(HISTORY_FILE);
    ExitCode::SUCCESS
}

/// Parses and evaluates one balanced input chunk, printing non-null
/// results. A stray return marker at the top level is reported rather
/// than shown as a value.
fn evaluate_chunk(chunk: &str, evaluator: &mut Evaluator, env: &mut Environment) {
    let mut parser = minic::parser::Parser::new(chunk);
    let program = parser.parse_program();
    if !parser.errors().is_empty() {
        for err in parser.errors() {
            eprintln!("parse error: {}", err);
        }
        return;
    }

    match evaluator.eval_program(&program, env) {
        Ok(Flow::Value(Value::Null)) => {}
        Ok(Flow::Value(value)) => println!("=> {}", value),
        Ok(Flow::Results(values)) => {
            for value in values {
                if value != Value::Null {
                    println!("=> {}", value);
                }
            }
        }
        Ok(Flow::Return(_)) => eprintln!("Error: return outside function"),
        Err(err) => eprintln!("Error: {}", err),
    }
}
