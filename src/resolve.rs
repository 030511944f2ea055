use std::{
    collections::{HashMap, HashSet},
    io,
    path::{Component, Path, PathBuf},
    rc::Rc,
};

use crate::{
    ast::IdlDocument,
    diagnostic::{Diagnostic, DiagnosticKind},
    parser::{self, ParseError, ParseOptions},
    types::{self, TypeKind},
};

/// Reads imported sources.
pub trait SourceLoader {
    fn load(&self, path: &Path) -> io::Result<String>;
}

impl<L: SourceLoader + ?Sized> SourceLoader for &L {
    fn load(&self, path: &Path) -> io::Result<String> {
        (**self).load(path)
    }
}

/// Loads sources from the file system.
#[derive(Copy, Clone, Debug, Default)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn load(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Serves sources from memory, keyed by (normalized) path.
#[derive(Clone, Debug, Default)]
pub struct MemoryLoader {
    files: HashMap<PathBuf, String>,
}

impl MemoryLoader {
    pub fn with(mut self, path: impl AsRef<Path>, src: impl Into<String>) -> MemoryLoader {
        self.files.insert(normalize(path.as_ref()), src.into());
        self
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(&normalize(path))
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("{}: {source}", .path.display())]
    Parse { path: PathBuf, source: ParseError },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImportedDocument {
    pub path: PathBuf,
    pub document: IdlDocument,
}

/// The documents a file transitively imports, in discovery order.
#[derive(Clone, Debug, Default)]
pub struct Imports {
    pub documents: Vec<Rc<ImportedDocument>>,
}

enum Cached {
    Parsed(Rc<ImportedDocument>),
    Missing(String),
}

/// Walks `import` statements. Parsed files are cached, so a file imported by
/// many inputs is read and parsed once.
pub struct ImportGraph<L> {
    loader: L,
    options: ParseOptions,
    cache: HashMap<PathBuf, Cached>,
}

impl<L: SourceLoader> ImportGraph<L> {
    pub fn new(loader: L, options: ParseOptions) -> ImportGraph<L> {
        ImportGraph {
            loader,
            options,
            cache: HashMap::new(),
        }
    }

    /// Collects the imports reachable from `document`, located at `path`.
    ///
    /// Each file is visited once, so cycles terminate. Missing files are
    /// reported as warnings; files which fail to parse are fatal.
    pub fn resolve(
        &mut self,
        path: &Path,
        document: &IdlDocument,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Imports, ResolveError> {
        let root = normalize(path);
        let mut visited = HashSet::from([root.clone()]);
        let mut imports = Imports::default();
        self.walk(&root, document, &mut visited, &mut imports, diagnostics)?;
        Ok(imports)
    }

    fn walk(
        &mut self,
        importer: &Path,
        document: &IdlDocument,
        visited: &mut HashSet<PathBuf>,
        imports: &mut Imports,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<(), ResolveError> {
        let dir = importer.parent().unwrap_or(Path::new(""));
        for import in &document.imports {
            let path = normalize(&dir.join(&import.path));
            if !visited.insert(path.clone()) {
                continue;
            }
            match self.load(&path)? {
                Ok(imported) => {
                    imports.documents.push(Rc::clone(&imported));
                    self.walk(&path, &imported.document, visited, imports, diagnostics)?;
                }
                Err(reason) => diagnostics.push(Diagnostic::new(
                    import.line,
                    DiagnosticKind::UnresolvedImport { path, reason },
                )),
            }
        }
        Ok(())
    }

    fn load(&mut self, path: &Path) -> Result<Result<Rc<ImportedDocument>, String>, ResolveError> {
        if let Some(cached) = self.cache.get(path) {
            return Ok(match cached {
                Cached::Parsed(imported) => Ok(Rc::clone(imported)),
                Cached::Missing(reason) => Err(reason.clone()),
            });
        }
        let src = match self.loader.load(path) {
            Ok(src) => src,
            Err(error) => {
                let reason = error.to_string();
                self.cache
                    .insert(path.to_path_buf(), Cached::Missing(reason.clone()));
                return Ok(Err(reason));
            }
        };
        let document =
            parser::parse_document_with(&src, self.options).map_err(|source| ResolveError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let imported = Rc::new(ImportedDocument {
            path: path.to_path_buf(),
            document,
        });
        self.cache
            .insert(path.to_path_buf(), Cached::Parsed(Rc::clone(&imported)));
        Ok(Ok(imported))
    }
}

/// Lexically resolves `.` and `..` components.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// How a referenced type must be spelled from the referencing namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Qualification {
    /// Defined in the referencing namespace; the bare name suffices.
    SameNamespace,
    /// Defined in another namespace, which is carried.
    OtherNamespace(String),
    /// Defined at the top level while referenced from inside a namespace.
    NoNamespace,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedType {
    pub kind: TypeKind,
    pub qualification: Qualification,
}

#[derive(Clone, Debug)]
struct Definition {
    kind: TypeKind,
    namespace: String,
}

/// Definitions sharing a bare name, in registration order. A name is
/// registered once per namespace.
type Definitions = HashMap<String, Vec<Definition>>;

/// Two-tier name lookup: definitions of the current document first, then
/// those of imported documents.
///
/// A qualified name only matches a definition in exactly that namespace,
/// either absolute or nested in the referencing one. A bare name prefers the
/// referencing namespace, then the first definition registered.
#[derive(Clone, Debug, Default)]
pub struct TypeScope {
    local: Definitions,
    imported: Definitions,
}

impl TypeScope {
    pub fn new(document: &IdlDocument, imports: &Imports) -> TypeScope {
        let mut scope = TypeScope::default();
        register(&mut scope.local, document);
        for imported in &imports.documents {
            register(&mut scope.imported, &imported.document);
        }
        scope
    }

    /// Resolves a base type name, as seen from `from_namespace`.
    pub fn resolve(&self, base_type: &str, from_namespace: &str) -> ResolvedType {
        if let Some(primitive) = types::PRIMITIVES.get(base_type) {
            return ResolvedType {
                kind: TypeKind::Primitive(*primitive),
                qualification: Qualification::SameNamespace,
            };
        }

        let (explicit_namespace, name) = types::split_qualified(base_type);
        let found = match explicit_namespace {
            Some(explicit) => self.find_qualified(name, explicit, from_namespace),
            None => self.find_bare(name, from_namespace),
        };
        let (kind, namespace) = match found {
            Some(def) => (def.kind, def.namespace.as_str()),
            None => {
                let kind = if types::is_interface_name(name) {
                    TypeKind::Interface
                } else {
                    TypeKind::Unknown
                };
                (kind, explicit_namespace.unwrap_or(from_namespace))
            }
        };
        ResolvedType {
            kind,
            qualification: qualify(namespace, from_namespace),
        }
    }

    fn tiers(&self, name: &str) -> impl Iterator<Item = &[Definition]> {
        [&self.local, &self.imported]
            .map(|tier| tier.get(name).map(Vec::as_slice))
            .into_iter()
            .flatten()
    }

    fn find_bare(&self, name: &str, from_namespace: &str) -> Option<&Definition> {
        self.tiers(name)
            .find_map(|defs| defs.iter().find(|d| d.namespace == from_namespace))
            .or_else(|| self.tiers(name).find_map(|defs| defs.first()))
    }

    fn find_qualified(
        &self,
        name: &str,
        explicit: &str,
        from_namespace: &str,
    ) -> Option<&Definition> {
        let nested =
            (!from_namespace.is_empty()).then(|| format!("{from_namespace}::{explicit}"));
        let candidates = [Some(explicit), nested.as_deref()];
        let found = candidates.into_iter().flatten().find_map(|namespace| {
            self.tiers(name)
                .find_map(|defs| defs.iter().find(|d| d.namespace == namespace))
        });
        found
    }
}

fn register(map: &mut Definitions, document: &IdlDocument) {
    let definitions = document
        .interfaces
        .iter()
        .map(|d| (&d.name, TypeKind::Interface, &d.namespace))
        .chain(
            document
                .enums
                .iter()
                .map(|d| (&d.name, TypeKind::Enum, &d.namespace)),
        )
        .chain(
            document
                .structs
                .iter()
                .map(|d| (&d.name, TypeKind::Struct, &d.namespace)),
        );
    for (name, kind, namespace) in definitions {
        let defs = map.entry(name.clone()).or_default();
        if defs.iter().all(|d| d.namespace != *namespace) {
            defs.push(Definition {
                kind,
                namespace: namespace.clone(),
            });
        }
    }
}

/// Decides how a name defined in `defined_in` is spelled from `used_from`.
pub fn qualify(defined_in: &str, used_from: &str) -> Qualification {
    if defined_in == used_from {
        Qualification::SameNamespace
    } else if defined_in.is_empty() {
        Qualification::NoNamespace
    } else {
        Qualification::OtherNamespace(defined_in.to_string())
    }
}
