use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use rlox::ast::Stmt;
use rlox::ast_printer::AstPrinter;
use rlox::interpreter::Interpreter;
use rlox::parser::Parser;
use rlox::token::Token;
use rlox::LoxError;

/// Exit status for lexical, syntax and resolution errors.
const EXIT_STATIC: i32 = 65;

/// Exit status for runtime errors.
const EXIT_RUNTIME: i32 = 70;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print the tokens as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file as a single expression and prints its AST
    Parse { filename: PathBuf },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: PathBuf },

    /// Runs input from a file as a Lox program, or starts a prompt
    Run { filename: Option<PathBuf> },
}

/// Reads the contents of a file into a String
fn read_file(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);

    let source = std::fs::read_to_string(filename)
        .with_context(|| format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", source.len(), filename);

    Ok(source)
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    // `[module:line] - message`, Debug unless RUST_LOG says otherwise
    Builder::new()
        .format(|buf, record| {
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("rlox::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

fn report(errors: &[LoxError]) {
    for e in errors {
        debug!("Reporting: {}", e);
        eprintln!("{}", e);
    }
}

/// Scans `source`, reporting lexical errors.  Returns the tokens only when
/// the scan was clean.
fn scan_clean(source: &str) -> Option<Vec<Token<'_>>> {
    let (tokens, errors) = rlox::scan(source);

    if errors.is_empty() {
        Some(tokens)
    } else {
        report(&errors);
        None
    }
}

fn tokenize(filename: &Path, json: bool) -> Result<()> {
    info!("Running Tokenize subcommand");

    let source = read_file(filename)?;
    let (tokens, errors) = rlox::scan(&source);

    // Diagnostics go to stderr; the tokens still print.
    report(&errors);

    if json {
        let rendered = serde_json::to_string_pretty(&tokens).context("Failed to encode tokens")?;
        println!("{}", rendered);
    } else {
        for token in &tokens {
            println!("{}", token);
        }
    }

    if !errors.is_empty() {
        debug!("Tokenization failed, exiting with code {}", EXIT_STATIC);
        std::process::exit(EXIT_STATIC);
    }

    info!("Tokenization completed successfully");
    Ok(())
}

fn parse(filename: &Path) -> Result<()> {
    info!("Running Parse subcommand");

    let source = read_file(filename)?;
    let Some(tokens) = scan_clean(&source) else {
        std::process::exit(EXIT_STATIC);
    };

    match Parser::new(&tokens).parse_expression() {
        Ok(expr) => {
            let ast_str = AstPrinter::print(&expr);

            debug!("AST: {}", ast_str);
            println!("{}", ast_str);
        }

        Err(errors) => {
            report(&errors);
            std::process::exit(EXIT_STATIC);
        }
    }

    info!("Parse subcommand completed");
    Ok(())
}

fn evaluate(filename: &Path) -> Result<()> {
    info!("Running Evaluate subcommand");

    let source = read_file(filename)?;
    let Some(tokens) = scan_clean(&source) else {
        std::process::exit(EXIT_STATIC);
    };

    let expr = match Parser::new(&tokens).parse_expression() {
        Ok(expr) => expr,
        Err(errors) => {
            report(&errors);
            std::process::exit(EXIT_STATIC);
        }
    };

    // Resolved as a one-statement program; the clone keeps the node ids.
    let locals = match rlox::resolve(&[Stmt::Expression(expr.clone())]) {
        Ok(locals) => locals,
        Err(errors) => {
            report(&errors);
            std::process::exit(EXIT_STATIC);
        }
    };

    let mut interpreter = Interpreter::new();
    interpreter.extend_locals(locals);

    match interpreter.evaluate(&expr) {
        Ok(value) => {
            debug!("Evaluated to: {}", value);
            println!("{}", value);
        }

        Err(e) => {
            debug!("Evaluation debug: {}", e);
            eprintln!("{}", e);
            std::process::exit(EXIT_RUNTIME);
        }
    }

    info!("Evaluate subcommand completed");
    Ok(())
}

fn run_file(filename: &Path) -> Result<()> {
    info!("Running Run subcommand");

    let source = read_file(filename)?;
    let Some(tokens) = scan_clean(&source) else {
        std::process::exit(EXIT_STATIC);
    };

    let statements = match Parser::new(&tokens).parse() {
        Ok(statements) => statements,
        Err(errors) => {
            report(&errors);
            std::process::exit(EXIT_STATIC);
        }
    };

    info!("Parsed {} statements", statements.len());

    let locals = match rlox::resolve(&statements) {
        Ok(locals) => locals,
        Err(errors) => {
            report(&errors);
            std::process::exit(EXIT_STATIC);
        }
    };

    let mut interpreter = Interpreter::new();
    interpreter.extend_locals(locals);

    if let Err(errors) = interpreter.interpret(&statements) {
        report(&errors);
        std::process::exit(EXIT_RUNTIME);
    }

    info!("Program executed successfully");
    Ok(())
}

/// Interactive prompt.  Each line is scanned, parsed and resolved on its own
/// and then run against one long‑lived interpreter, so globals persist.  The
/// line's source and syntax tree are leaked because the interpreter's
/// functions and classes keep pointing into them.
fn run_prompt() -> Result<()> {
    info!("Starting interactive prompt");

    let mut interpreter: Interpreter<'static> = Interpreter::new();
    let mut next_id = rlox::ast::ExprId(0);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read from stdin")?;

        let source: &'static str = Box::leak(line.into_boxed_str());

        let Some(tokens) = scan_clean(source) else {
            continue;
        };
        let tokens: &'static [Token<'static>] = Box::leak(tokens.into_boxed_slice());

        let mut parser = Parser::resume(tokens, next_id);
        let parsed = parser.parse();
        next_id = parser.next_expr_id();

        let statements: &'static [Stmt<'static>] = match parsed {
            Ok(statements) => Box::leak(statements.into_boxed_slice()),
            Err(errors) => {
                report(&errors);
                continue;
            }
        };

        match rlox::resolve(statements) {
            Ok(locals) => interpreter.extend_locals(locals),
            Err(errors) => {
                report(&errors);
                continue;
            }
        }

        if let Err(errors) = interpreter.interpret(statements) {
            report(&errors);
        }
    }

    println!();
    info!("Prompt closed");
    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match &args.commands {
        Commands::Tokenize { filename, json } => tokenize(filename, *json),
        Commands::Parse { filename } => parse(filename),
        Commands::Evaluate { filename } => evaluate(filename),
        Commands::Run {
            filename: Some(filename),
        } => run_file(filename),
        Commands::Run { filename: None } => run_prompt(),
    }
}
