use std::path::{Path, PathBuf};

use crate::{
    codegen::{self, Unit},
    desugar::{self, Desugared},
    diagnostic::Diagnostic,
    parser::{self, ParseOptions},
    resolve::{ImportGraph, SourceLoader, TypeScope},
    Error,
};

/// A diagnostic together with the file it was found in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileDiagnostic {
    pub path: PathBuf,
    pub diagnostic: Diagnostic,
}

impl std::fmt::Display for FileDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.diagnostic)
    }
}

#[derive(Debug)]
pub struct Compiled {
    pub output: codegen::Output,
    pub diagnostics: Vec<FileDiagnostic>,
}

/// Runs the whole pipeline over a set of input files: parse, resolve
/// imports, desugar and generate one bundle for all of them.
///
/// The first error aborts; warnings are collected per file.
pub fn compile<L: SourceLoader>(
    loader: L,
    inputs: &[PathBuf],
    parse_options: ParseOptions,
    options: &codegen::Options,
) -> Result<Compiled, Error> {
    let mut graph = ImportGraph::new(&loader, parse_options);
    let mut compiled = Vec::with_capacity(inputs.len());
    let mut diagnostics = Vec::new();

    for path in inputs {
        let (document, scope, found) = front_end(&loader, &mut graph, path, parse_options)?;
        diagnostics.extend(found.into_iter().map(|diagnostic| FileDiagnostic {
            path: path.clone(),
            diagnostic,
        }));
        compiled.push((document, scope));
    }

    let units: Vec<_> = compiled
        .iter()
        .map(|(document, scope)| Unit { document, scope })
        .collect();
    let output = codegen::generate(&units, options)?;
    Ok(Compiled {
        output,
        diagnostics,
    })
}

fn front_end<L: SourceLoader>(
    loader: &L,
    graph: &mut ImportGraph<&L>,
    path: &Path,
    parse_options: ParseOptions,
) -> Result<(Desugared, TypeScope, Vec<Diagnostic>), Error> {
    let src = loader.load(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document = parser::parse_document_with(&src, parse_options).map_err(|source| {
        Error::Parse {
            path: path.to_path_buf(),
            source,
        }
    })?;
    let mut diagnostics = Vec::new();
    let imports = graph.resolve(path, &document, &mut diagnostics)?;
    let document = desugar::lower(document, &mut diagnostics);
    let scope = TypeScope::new(&document, &imports);
    Ok((document, scope, diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::MemoryLoader;

    #[test]
    fn test_compile_reports_warnings_per_file() {
        let loader = MemoryLoader::default()
            .with("idl/a.idl", "namespace A { enum E { X } }")
            .with(
                "idl/b.idl",
                r#"import "a.idl"; import "missing.idl";
                namespace B { interface IThing { DasResult Take(A::E e); } }"#,
            );
        let compiled = compile(
            loader,
            &[PathBuf::from("idl/a.idl"), PathBuf::from("idl/b.idl")],
            ParseOptions::default(),
            &codegen::Options::default(),
        )
        .unwrap();
        let warnings: Vec<_> = compiled
            .diagnostics
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            warnings,
            [
                "idl/a.idl: line 1: warning: enum `E` has no member equal to 0x7FFFFFFF, inserted `E_FORCE_DWORD`",
                "idl/b.idl: line 1: warning: cannot import `idl/missing.idl`: no such file",
                "idl/b.idl: line 2: warning: interface `IThing` has no uuid, its identifier is derived from an empty string",
            ]
        );
        assert!(compiled
            .output
            .bundle
            .contains("fn take(&self, e: crate::a::E) -> rt::Status;"));
    }

    #[test]
    fn test_compile_names_the_failing_file() {
        let loader = MemoryLoader::default().with("bad.idl", "struct S { IFoo f; }");
        let error = compile(
            loader,
            &[PathBuf::from("bad.idl")],
            ParseOptions::default(),
            &codegen::Options::default(),
        )
        .unwrap_err();
        assert_eq!(
            error.to_string(),
            "bad.idl: line 1: struct `S` field `f` has type `IFoo` at line 1, \
             but struct fields must be primitive"
        );
    }
}
