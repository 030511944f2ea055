use std::{
    error::Error,
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use rpcidl::{
    codegen::{self, metadata::InterfaceMetadata},
    driver,
    parser::{self, ParseOptions},
    resolve::FsLoader,
    util::tree,
};

#[derive(Parser)]
#[clap(version, about)]
struct Cli {
    #[clap(value_parser, required = true, help = "The IDL files to compile")]
    inputs: Vec<PathBuf>,

    #[clap(short, long, default_value = ".", help = "Where to write generated code")]
    out_dir: PathBuf,

    #[clap(long, help = "Also write a JSON description of every interface here")]
    metadata_dir: Option<PathBuf>,

    #[clap(long, help = "Also write each proxy and stub as a standalone file")]
    split: bool,

    #[clap(
        long,
        default_value = "crate",
        help = "The module path the bundle is included at"
    )]
    root_path: String,

    #[clap(long, default_value = "::rpcidl::runtime", help = "The path of the runtime module")]
    runtime_path: String,

    #[clap(long, help = "Skip unrecognized characters instead of failing")]
    lenient: bool,

    #[clap(long, help = "Print the parsed documents instead of generating code")]
    print_tree: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let parse_options = if cli.lenient {
        ParseOptions::lenient()
    } else {
        ParseOptions::default()
    };

    if cli.print_tree {
        for input in &cli.inputs {
            let src = fs::read_to_string(input)?;
            let document = parser::parse_document_with(&src, parse_options)?;
            println!("{}:", input.display());
            tree::print_document(&mut std::io::stdout().lock(), &document)?;
        }
        return Ok(());
    }

    let options = codegen::Options {
        root_path: cli.root_path.clone(),
        runtime_path: cli.runtime_path.clone(),
    };
    let compiled = driver::compile(FsLoader, &cli.inputs, parse_options, &options)?;
    for diagnostic in &compiled.diagnostics {
        eprintln!("{diagnostic}");
    }

    write(&cli.out_dir.join("bundle.rs"), &compiled.output.bundle)?;
    if cli.split {
        for artifact in &compiled.output.artifacts {
            write(&cli.out_dir.join(&artifact.path), &artifact.contents)?;
        }
    }
    if let Some(dir) = &cli.metadata_dir {
        for plan in &compiled.output.interfaces {
            let metadata = InterfaceMetadata::of(plan);
            write(&dir.join(metadata.file_name()), &metadata.to_json()?)?;
        }
    }
    Ok(())
}

fn write(path: &Path, contents: &str) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    eprintln!("Generated: {}", path.display());
    Ok(())
}
