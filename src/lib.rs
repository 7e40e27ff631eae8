pub mod ast;
pub mod ast_printer;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod object;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod token;
pub mod value;

pub use error::{LoxError, Result};
pub use interpreter::Interpreter;
pub use parser::{parse, Parser};
pub use resolver::{resolve, Locals, Resolver};
pub use scanner::{scan, Scanner};
pub use value::Value;
