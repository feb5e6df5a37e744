// MeowLang interpreter library
//
// Source text goes through the lexer, a Pratt parser and a tree-walking
// evaluator with closures. Diagnostics are rendered with ariadne.

pub mod ast;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod runner;
mod stack;
pub mod value;

pub use ast::{Block, Expr, Program, Stmt};
pub use environment::{Environment, SharedEnv};
pub use error::{ErrorKind, MeowError, Span};
pub use evaluator::{EvalResult, Evaluator, EvaluatorConfig, RuntimeError};
pub use lexer::{tokenize, Lexer, Token, TokenType};
pub use parser::{parse_program, Parser};
pub use runner::{run, run_to_string, RunReport};
pub use value::{Function, Value};
