//! Tokenizer and direct evaluator for the Keyframe scripting language.
//!
//! Source text is turned into a flat token sequence by [`tokenize`] and run by
//! [`execute`], which decodes one statement at a time from a stack of frames.
//! Nested blocks and function bodies are captured token spans executed in
//! frames of their own; no syntax tree is built for the program.

pub mod ast;
pub mod common;
pub mod config;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod value;

use std::sync::Once;

pub use common::{Diagnostic, Error, Line, ParseError, RuntimeError};
pub use config::Config;
pub use interpreter::{
    execute, Binding, Environment, Execution, ExecutionResult, FunctionDef, FunctionTable,
    OutputLine,
};
pub use lexer::tokenize;
pub use parser::{capture_block, check, BlockCapture};
pub use token::{classify_number, NumberClass, Token, TokenKind};
pub use value::{Value, ValueType};

/// Tokenizes and executes `source`.
pub fn run(source: &str, config: &Config) -> Execution {
    let tokens = tokenize(source);
    execute(&tokens, config)
}

static TRACING_INIT: Once = Once::new();

/// Installs the log subscriber. Does nothing unless `RUST_LOG` is set,
/// e.g. `RUST_LOG=keyframe=trace`. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
