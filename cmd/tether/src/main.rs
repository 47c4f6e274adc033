use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::{env, fs};

use anyhow::{bail, Context, Result};
use clap::{Arg, Command};
use tether_codegen::{generate_glue, generate_glue_header, generate_header};
use tether_wit::diag::Diagnostics;
use tether_wit::ir::{package_name_component, Interface};
use tether_wit::{builder, parser, resolver};

fn main() -> Result<ExitCode> {
    let cmd = Command::new("tether")
        .about("Generate C++ host bindings for WebAssembly components")
        .arg(Arg::new("file").help("The WIT file or package directory to process"))
        .arg(Arg::new("prefix").help("Output file prefix (default: derived from the package name)"));
    let matches = cmd.get_matches();

    let Some(input) = matches.get_one::<String>("file") else {
        print_usage();
        return Ok(ExitCode::FAILURE);
    };

    let root = PathBuf::from(input);
    let root_file = if root.is_dir() {
        match resolver::find_root_wit_file(&root)? {
            Some(file) => file,
            None => bail!("no .wit file found in {}", root.display()),
        }
    } else if root.is_file() {
        root.clone()
    } else {
        bail!("no such file or directory: {}", root.display());
    };

    let mut files = resolver::discover_dependencies(&root)?;
    files.push(root_file.clone());
    let (ordered, cycle_warnings) = resolver::sort_by_dependencies(&files)?;
    for warning in &cycle_warnings {
        eprintln!("Warning: {warning}");
    }

    let mut interfaces: Vec<Interface> = Vec::new();
    let mut root_package = String::new();
    for path in &ordered {
        println!("Parsing WIT file: {}", path.display());
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let (ast, errors) = parser::parse(&source);
        if !errors.is_empty() {
            for error in &errors {
                eprintln!("{}: {error}", path.display());
            }
            bail!("{} error(s) in {}", errors.len(), path.display());
        }

        let mut diags = Diagnostics::default();
        let ir = builder::build(&ast, &mut diags);
        for warning in &diags.warnings {
            eprintln!("Warning: {warning}");
        }
        if diags.has_errors() {
            for error in &diags.errors {
                eprintln!("{}: {error}", path.display());
            }
            bail!("{} error(s) in {}", diags.errors.len(), path.display());
        }

        if *path == root_file {
            root_package = ir.package.clone();
        }
        interfaces.extend(ir.interfaces);
    }

    if interfaces.is_empty() {
        eprintln!("Warning: No interfaces found in {}", root_file.display());
        return Ok(ExitCode::FAILURE);
    }

    println!("Found {} interface(s)", interfaces.len());
    for iface in &interfaces {
        println!("  - {} ({} functions)", iface.name, iface.functions.len());
    }

    let prefix = match matches.get_one::<String>("prefix") {
        Some(prefix) => prefix.clone(),
        None => derive_prefix(&root_package),
    };
    let stem = Path::new(&prefix)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| prefix.clone());
    let header_file = format!("{prefix}.hpp");
    let glue_header_file = format!("{prefix}_wamr.hpp");
    let glue_file = format!("{prefix}_wamr.cpp");
    let header_name = format!("{stem}.hpp");
    let glue_header_name = format!("{stem}_wamr.hpp");

    let header = generate_header(&interfaces, &stem)?;
    let glue_header = generate_glue_header(&root_package, &header_name)?;
    let glue = generate_glue(&interfaces, &root_package, &glue_header_name, &header_name)?;

    println!("Generating files:");
    println!("  {header_file}");
    fs::write(&header_file, header)
        .with_context(|| format!("failed to write {header_file}"))?;
    println!("  {glue_header_file}");
    fs::write(&glue_header_file, glue_header)
        .with_context(|| format!("failed to write {glue_header_file}"))?;
    println!("  {glue_file}");
    fs::write(&glue_file, glue).with_context(|| format!("failed to write {glue_file}"))?;

    println!("Code generation complete!");
    println!("Note: Host function implementations should be provided by the host application.");
    Ok(ExitCode::SUCCESS)
}

fn derive_prefix(package: &str) -> String {
    match package_name_component(package) {
        Some(name) => {
            println!("Using package-derived output prefix: {name}");
            name.to_string()
        }
        None => {
            println!("No package name found, using default prefix: generated");
            "generated".to_string()
        }
    }
}

fn print_usage() {
    let program = env::args().next().unwrap_or_else(|| "tether".to_string());
    eprintln!("tether - WebAssembly Interface Types (WIT) code generator");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  {program} <wit-file> [output-prefix]");
    eprintln!();
    eprintln!("ARGUMENTS:");
    eprintln!("  <wit-file>       Path to the WIT file (or package directory) to parse");
    eprintln!("  [output-prefix]  Optional output file prefix (default: derived from package name)");
    eprintln!();
    eprintln!("GENERATED FILES:");
    eprintln!("  <prefix>.hpp          - C++ header with type definitions and declarations");
    eprintln!("  <prefix>_wamr.hpp     - WAMR runtime integration header");
    eprintln!("  <prefix>_wamr.cpp     - WAMR binding implementation with NativeSymbol arrays");
}
