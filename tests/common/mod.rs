#![allow(dead_code)]

use rlox::interpreter::Interpreter;
use rlox::{LoxError, Parser};

/// Runs `source` through every phase, capturing `print` output.  Stops at
/// the first phase that reports errors and returns them alongside whatever
/// was printed so far.
pub fn run(source: &str) -> (String, Vec<LoxError>) {
    let (tokens, errors) = rlox::scan(source);
    if !errors.is_empty() {
        return (String::new(), errors);
    }

    let statements = match Parser::new(&tokens).parse() {
        Ok(statements) => statements,
        Err(errors) => return (String::new(), errors),
    };

    let locals = match rlox::resolve(&statements) {
        Ok(locals) => locals,
        Err(errors) => return (String::new(), errors),
    };

    let mut interpreter = Interpreter::with_output(Vec::new());
    interpreter.extend_locals(locals);

    let result = interpreter.interpret(&statements);
    let output = String::from_utf8(interpreter.into_output()).expect("invalid UTF-8 in output");

    (output, result.err().unwrap_or_default())
}

/// Output of a program that must run cleanly.
pub fn run_ok(source: &str) -> String {
    let (output, errors) = run(source);

    assert!(
        errors.is_empty(),
        "unexpected errors: {:?}",
        errors.iter().map(ToString::to_string).collect::<Vec<_>>()
    );

    output
}

/// Rendered diagnostics of a program that must fail.
pub fn run_err(source: &str) -> Vec<String> {
    let (_, errors) = run(source);

    assert!(!errors.is_empty(), "expected at least one error");

    errors.iter().map(ToString::to_string).collect()
}
