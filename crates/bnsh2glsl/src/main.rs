//! Convert BNSH shader binaries to GLSL source.
//!
//! Thin wrapper around the external `BnshToGlsl` decompiler: validates
//! paths, invokes the decompiler with `<input> <output_dir>`, and reports
//! how many GLSL files it produced. All actual shader decompilation
//! happens inside the external executable.
//!
//! Run: `bnsh2glsl shader.bnsh glsl_output`

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;

/// Name of the external decompiler executable.
const CONVERTER_NAME: &str = "BnshToGlsl";

#[derive(Parser)]
#[command(name = "bnsh2glsl")]
#[command(about = "Convert BNSH shader binaries to GLSL")]
#[command(version)]
struct Cli {
    /// Input .bnsh shader archive
    input: PathBuf,

    /// Directory the generated .glsl files are written into
    output: PathBuf,

    /// Path to the BnshToGlsl executable (default: next to this binary,
    /// then $PATH)
    #[arg(short, long)]
    converter: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let input = std::path::absolute(&cli.input)
        .with_context(|| format!("cannot resolve input path {}", cli.input.display()))?;
    let output = std::path::absolute(&cli.output)
        .with_context(|| format!("cannot resolve output path {}", cli.output.display()))?;

    if !input.exists() {
        bail!("input file not found: {}", input.display());
    }
    if !input
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("bnsh"))
    {
        eprintln!("warning: input extension is not .bnsh: {}", input.display());
    }

    let converter = find_converter(cli.converter)?;

    println!("input:  {}", input.display());
    println!("output: {}", output.display());

    run_converter(&converter, &input, &output)?;

    // The decompiler creates the output directory itself; it may legitimately
    // produce nothing for an archive with no shader programs.
    if output.exists() {
        let count = count_glsl_files(&output)?;
        println!("conversion succeeded: {count} GLSL files");
    } else {
        println!("conversion succeeded: no output written");
    }

    Ok(())
}

/// Locate the decompiler executable.
///
/// Order: explicit `--converter` path, a sibling of our own executable,
/// then `$PATH`.
fn find_converter(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path);
        }
        bail!("converter not found: {}", path.display());
    }

    if let Ok(exe) = env::current_exe() {
        let sibling = exe.with_file_name(CONVERTER_NAME);
        if sibling.exists() {
            return Ok(sibling);
        }
    }

    which::which(CONVERTER_NAME).map_err(|_| {
        anyhow!(
            "{CONVERTER_NAME} executable not found next to bnsh2glsl or on PATH\n\
             build it first: dotnet build {CONVERTER_NAME}/{CONVERTER_NAME}.csproj -c Release"
        )
    })
}

/// Invoke the decompiler, inheriting stdio so its own report is visible.
fn run_converter(converter: &Path, input: &Path, output: &Path) -> Result<()> {
    let status = Command::new(converter)
        .arg(input)
        .arg(output)
        .status()
        .with_context(|| format!("failed to run {}", converter.display()))?;

    if !status.success() {
        bail!("conversion failed: {status}");
    }
    Ok(())
}

/// Count the `.glsl` files the decompiler wrote into `dir`.
fn count_glsl_files(dir: &Path) -> Result<usize> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("cannot read output dir {}", dir.display()))?;

    let mut count = 0;
    for entry in entries {
        let path = entry?.path();
        if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("glsl"))
        {
            count += 1;
        }
    }
    Ok(count)
}
