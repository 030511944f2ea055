//! A compiler from a small interface definition language to Rust proxies and
//! stubs which talk over an abstract transport.

use std::{io, path::PathBuf};

/// The lexer takes the source input, mapping it into a sequence of tokens.
pub mod lexer;

/// The parser takes a sequence of tokens, mapping it into a document.
pub mod parser;

/// Lowers properties into methods and completes enums, once, before any
/// generator runs.
pub mod desugar;

/// Follows imports and answers how a referenced type must be spelled.
pub mod resolve;

/// Emits Rust source for every interface, enum and struct.
pub mod codegen;

/// Linked by the generated code.
pub mod runtime;

pub mod ast;
pub mod diagnostic;
pub mod driver;
pub mod ident;
pub mod protocol;
pub mod token;
pub mod types;

pub mod util {
    pub mod tree;
    #[cfg(test)]
    pub(crate) mod test_utils;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("{}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: parser::ParseError,
    },
    #[error(transparent)]
    Resolve(#[from] resolve::ResolveError),
    #[error(transparent)]
    Generate(#[from] codegen::GenerateError),
}
