use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{Diagnostic, Result};
use neoc::{Code, CompileOptions, Format, Program, compile, load_program, render_error};
use thiserror::Error;
use tracing::{debug, info};

/// neoc - compile typed program trees to NEO AVM bytecode
#[derive(Parser, Debug)]
#[command(name = "neoc")]
#[command(about = "Compile typed program trees to NEO AVM scripts", long_about = None)]
struct Args {
    /// More logging (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a program tree to an .avm script
    Compile {
        /// Serialized program tree (.json, or postcard binary)
        input: PathBuf,

        /// Output script (default: input with an .avm extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Entry function in the root package
        #[arg(long, default_value = "Main")]
        entry: String,

        /// Keep functions that are never called
        #[arg(long)]
        no_prune: bool,

        /// Tree format, overriding the file extension (json or postcard)
        #[arg(long)]
        format: Option<String>,

        /// Print the disassembly listing
        #[arg(long)]
        dump: bool,
    },

    /// Print the disassembly listing of an .avm script
    Inspect {
        script: PathBuf,
    },
}

#[derive(Debug, Error, Diagnostic)]
enum CliError {
    #[error("could not read {path}")]
    #[diagnostic(code(neoc::io))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write {path}")]
    #[diagnostic(code(neoc::io))]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    #[diagnostic(code(neoc::api))]
    Api(#[from] neoc::Error),

    #[error("compilation failed")]
    #[diagnostic(code(neoc::compile))]
    Compilation,

    #[error("malformed script: {0}")]
    #[diagnostic(code(neoc::decode))]
    Disassembly(#[from] neoc::vm::DecodeError),
}

fn read(path: &Path) -> Result<Vec<u8>, CliError> {
    fs::read(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn compile_command(
    input: &Path,
    output: Option<PathBuf>,
    options: CompileOptions,
    format: Option<&str>,
    dump: bool,
) -> Result<(), CliError> {
    let format = match format {
        Some(name) => Format::from_name(name)?,
        None => Format::from_path(input),
    };
    let program: Program = load_program(&read(input)?, format)?;
    debug!(?format, input = %input.display(), "Loaded tree");

    let code = match compile(&program, &options) {
        Ok(code) => code,
        Err(err) => {
            render_error(&err, Some(&program));
            return Err(CliError::Compilation);
        }
    };

    let output = output.unwrap_or_else(|| input.with_extension("avm"));
    fs::write(&output, &code.script).map_err(|source| CliError::Write {
        path: output.clone(),
        source,
    })?;
    info!(
        output = %output.display(),
        size = code.script.len(),
        "Wrote script"
    );

    if dump {
        print!("{}", code.disassemble()?);
    }
    Ok(())
}

fn inspect_command(script: &Path) -> Result<(), CliError> {
    let code = Code::from_script(read(script)?);
    print!("{}", code.disassemble()?);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging subscriber
    use tracing_subscriber::{EnvFilter, fmt};

    // RUST_LOG wins; otherwise -v raises the default WARN level
    let default_level = match args.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match args.command {
        Command::Compile {
            input,
            output,
            entry,
            no_prune,
            format,
            dump,
        } => {
            let options = CompileOptions {
                entry_point: entry,
                prune_unused: !no_prune,
            };
            compile_command(&input, output, options, format.as_deref(), dump)?;
        }
        Command::Inspect { script } => inspect_command(&script)?,
    }

    Ok(())
}
