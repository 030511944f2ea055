use std::{env, fs, path::PathBuf};

use rpcidl::{codegen, driver, parser::ParseOptions, resolve::FsLoader};

fn main() {
    println!("cargo::rerun-if-changed=idl");

    let mut inputs: Vec<PathBuf> = fs::read_dir("idl")
        .expect("failed to read the idl directory")
        .map(|entry| entry.expect("failed to read directory entry").path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "idl"))
        .collect();
    inputs.sort();

    let options = codegen::Options {
        root_path: "crate::generated".to_string(),
        ..codegen::Options::default()
    };
    let compiled = driver::compile(FsLoader, &inputs, ParseOptions::default(), &options)
        .unwrap_or_else(|error| panic!("failed to compile idl: {error}"));
    for diagnostic in &compiled.diagnostics {
        println!("cargo::warning={diagnostic}");
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    fs::write(out_dir.join("bundle.rs"), &compiled.output.bundle)
        .expect("failed to write the generated bundle");
}
