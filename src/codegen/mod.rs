//! Rust code generation.
//!
//! Every interface yields an implementer trait, a caller-facing client trait,
//! a proxy generic over its call strategy and a stub which dispatches encoded
//! requests. Proxy and stub are generated from the same [`InterfacePlan`], so
//! the order in which one writes values is the order in which the other reads
//! them.

use std::{
    collections::BTreeMap,
    fmt::{self, Write},
    path::PathBuf,
};

use crate::{
    ast::MethodOrigin,
    desugar::Desugared,
    protocol::TooManyMethods,
    resolve::TypeScope,
};

pub mod metadata;
mod naming;
mod proxy;
mod stub;
mod types;

pub use types::{InterfacePlan, MethodPlan, ParamPlan, Return, Shape, ValueType};

const DEFAULT_CODE_CAPACITY: usize = 4 * 1024; // 4 KiB

const HEADER: &str = "// Generated by rpcidl. Do not edit.\n";

#[derive(Clone, Debug)]
pub struct Options {
    /// The module path at which the generated bundle is included, used to
    /// reach types of other namespaces.
    pub root_path: String,
    /// The path of the runtime support module.
    pub runtime_path: String,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            root_path: "crate".to_string(),
            runtime_path: "::rpcidl::runtime".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("{interface}::{method} ({origin}, line {line}): unknown type `{ty}`")]
    UnknownType {
        interface: String,
        method: String,
        origin: MethodOrigin,
        line: u32,
        ty: String,
    },
    #[error("{interface}::{method} ({origin}, line {line}): type `{ty}` {reason}")]
    UnsupportedType {
        interface: String,
        method: String,
        origin: MethodOrigin,
        line: u32,
        ty: String,
        reason: &'static str,
    },
    #[error("interface `{interface}` has more than one method named `{name}`")]
    DuplicateMethod { interface: String, name: String },
    #[error(transparent)]
    TooManyMethods(#[from] TooManyMethods),
}

/// One compiled document together with the scope its names resolve in.
#[derive(Copy, Clone)]
pub struct Unit<'a> {
    pub document: &'a Desugared,
    pub scope: &'a TypeScope,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    /// Relative to the output directory.
    pub path: PathBuf,
    pub contents: String,
}

#[derive(Clone, Debug)]
pub struct Output {
    /// Every unit's definitions in one module tree, meant to be `include!`d
    /// at [`Options::root_path`].
    pub bundle: String,
    /// Standalone views of each interface's proxy and stub, and of the
    /// shared definitions.
    pub artifacts: Vec<Artifact>,
    pub interfaces: Vec<InterfacePlan>,
}

/// Generates code for all units at once. Definitions sharing a namespace end
/// up in the same module.
pub fn generate(units: &[Unit<'_>], options: &Options) -> Result<Output, GenerateError> {
    let mut root = ModuleTree::default();
    let mut artifacts = Vec::new();
    let mut shared = CodeGen::with_capacity();
    let mut interfaces = Vec::new();

    for unit in units {
        for def in &unit.document.enums {
            let code = types::enum_item(def);
            shared.emit(f!("{code}\n"));
            root.module(&naming::namespace_path(&def.namespace))
                .items
                .push(code);
        }
        for def in &unit.document.structs {
            let code = types::struct_item(def);
            shared.emit(f!("{code}\n"));
            root.module(&naming::namespace_path(&def.namespace))
                .items
                .push(code);
        }
        for interface in &unit.document.interfaces {
            let plan = InterfacePlan::new(interface, unit.scope, options)?;
            let module = root.module(&naming::namespace_path(&plan.namespace));
            module.items.push(interface_item(&plan, options));

            let implementer = types::implementer_trait(&plan);
            shared.emit(f!("{implementer}\n"));
            artifacts.push(Artifact {
                path: PathBuf::from(format!("proxy/{}_proxy.rs", plan.module)),
                contents: standalone(&plan, options, &proxy::generate(&plan)),
            });
            artifacts.push(Artifact {
                path: PathBuf::from(format!("stub/{}_stub.rs", plan.module)),
                contents: standalone(&plan, options, &stub::generate(&plan)),
            });
            interfaces.push(plan);
        }
    }

    let mut bundle = CodeGen::with_capacity();
    bundle.emit(f!("{HEADER}\n"));
    root.emit(&mut bundle, options);

    let mut types = CodeGen::with_capacity();
    types.emit(f!("{HEADER}\nuse {} as rt;\n\n", options.runtime_path));
    types.emit(f!("{}", shared.finish()));
    artifacts.push(Artifact {
        path: PathBuf::from("types.rs"),
        contents: types.finish(),
    });

    Ok(Output {
        bundle: bundle.finish(),
        artifacts,
        interfaces,
    })
}

/// The module holding everything generated for one interface, re-exported
/// into its namespace.
fn interface_item(plan: &InterfacePlan, options: &Options) -> String {
    let mut gen = CodeGen::with_capacity();
    let short = &plan.short;
    gen.emit(f!(
        "pub use self::{module}::{{\n    \
             {name}, {short}Client, {short}Proxy, {short}ProxyLocal, {short}ProxyRemote, \
             {short}Stub,\n}};\n\n",
        module = plan.module,
        name = plan.name,
    ));
    gen.emit(f!("pub mod {} {{\n", plan.module));
    let mut body = CodeGen::with_capacity();
    body.emit(f!(
        "#[allow(unused_imports)]\nuse super::*;\n\
         #[allow(unused_imports)]\nuse {} as rt;\n\n",
        options.runtime_path
    ));
    body.emit(f!("{}\n", types::protocol_constants(plan)));
    body.emit(f!("{}\n", types::implementer_trait(plan)));
    body.emit(f!("{}\n", proxy::generate(plan)));
    body.emit(f!("{}", stub::generate(plan)));
    gen.block(1, &body.finish());
    gen.emit(f!("}}\n"));
    gen.finish()
}

fn standalone(plan: &InterfacePlan, options: &Options, code: &str) -> String {
    let mut gen = CodeGen::with_capacity();
    gen.emit(f!("{HEADER}\nuse {} as rt;\n\n", options.runtime_path));
    gen.emit(f!("{}\n", types::protocol_constants(plan)));
    gen.emit(f!("{code}"));
    gen.finish()
}

#[derive(Default)]
struct ModuleTree {
    items: Vec<String>,
    children: BTreeMap<String, ModuleTree>,
}

impl ModuleTree {
    fn module(&mut self, path: &[String]) -> &mut ModuleTree {
        path.iter().fold(self, |module, segment| {
            module.children.entry(segment.clone()).or_default()
        })
    }

    fn emit(&self, gen: &mut CodeGen, options: &Options) {
        gen.emit(f!(
            "#[allow(unused_imports)]\nuse {} as rt;\n",
            options.runtime_path
        ));
        for item in &self.items {
            gen.emit(f!("\n{item}"));
        }
        for (name, child) in &self.children {
            let mut inner = CodeGen::with_capacity();
            child.emit(&mut inner, options);
            gen.emit(f!("\npub mod {name} {{\n"));
            gen.block(1, &inner.finish());
            gen.emit(f!("}}\n"));
        }
    }
}

/// Accumulates generated source text.
pub(crate) struct CodeGen {
    code: String,
}

impl CodeGen {
    pub fn with_capacity() -> CodeGen {
        CodeGen {
            code: String::with_capacity(DEFAULT_CODE_CAPACITY),
        }
    }

    pub fn emit(&mut self, f: fmt::Arguments<'_>) {
        self.code
            .write_fmt(f)
            .expect("code emit should be infallible");
    }

    /// Emits `code` with every non-empty line indented by `depth` levels.
    pub fn block(&mut self, depth: usize, code: &str) {
        for line in code.lines() {
            if line.is_empty() {
                self.code.push('\n');
            } else {
                for _ in 0..depth {
                    self.code.push_str("    ");
                }
                self.code.push_str(line);
                self.code.push('\n');
            }
        }
    }

    pub fn finish(self) -> String {
        self.code
    }
}

pub(crate) use std::format_args as f;
