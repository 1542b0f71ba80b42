//! mlogx Compiler CLI
//!
//! The `mlogx` command compiles mlogx files to processor logic and ports processor logic back.

use clap::{Parser, Subcommand};
use mlogx::port::{add_jump_labels, port_code};
use mlogx::settings::Mode;
use mlogx::{build_compiler_constants, parse_icons, Compiler, Constants, Diagnostic, Grammar, Level, PortingMode, Settings, TypeCheckingData};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "mlogx")]
#[command(author = "BalaM314")]
#[command(version = mlogx::VERSION)]
#[command(about = "Compiler for mlogx, an extended Mindustry logic", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile an mlogx file
    Build {
        /// Input file to compile
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file, defaults to the input with an `.mlog` extension
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Icon table (`id=name|sprite` per line) exposed as `$_name` constants
        #[arg(long, value_name = "FILE")]
        icons: Option<PathBuf>,

        /// Print extra information, including errors for every failing overload
        #[arg(short, long)]
        verbose: bool,
    },

    /// Check a file for errors without writing output
    Check {
        /// Input file to check
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Port processor output to mlogx
    Port {
        /// Input file containing plain logic
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file, defaults to the input with an `.mlogx` extension
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = PortingMode::ShortenSyntax)]
        mode: PortingMode,
    },

    /// Show the overloads of a command
    Info {
        #[arg(value_name = "COMMAND")]
        command: String,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "mlogx=debug" } else { "mlogx=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(fmt::layer().without_time().with_target(false))
        .init();
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    let verbose = matches!(cli.command, Commands::Build { verbose: true, .. });
    init_logging(verbose);

    match cli.command {
        Commands::Build {
            input,
            output,
            icons,
            verbose,
        } => {
            let mut settings = load_settings(&input);
            settings.compiler_options.verbose |= verbose;
            let icons = match icons {
                Some(path) => parse_icons(&read_lines(&path)?),
                None => Constants::new(),
            };

            info!("Compiling {}...", input.display());
            let mut compiled = compile_file(&input, &settings, &icons)?;

            if settings.compiler_options.mode == Mode::Single && !settings.compiler_options.remove_compiler_mark {
                compiled.push("end".to_string());
                compiled.extend(mlogx::COMPILER_MARK.iter().map(|line| line.to_string()));
            }

            let output = output.unwrap_or_else(|| input.with_extension("mlog"));
            fs::write(&output, compiled.join("\r\n")).map_err(|e| miette::miette!("Failed to write file: {}", e))?;
            info!("Compiled to {}", output.display());
        }

        Commands::Check { input } => {
            let settings = load_settings(&input);
            let compiled = compile_file(&input, &settings, &Constants::new())?;
            println!("{}: OK ({} lines)", input.display(), compiled.len());
        }

        Commands::Port { input, output, mode } => {
            let grammar = Grammar::standard();
            let program = read_lines(&input)?;

            let (labelled, diagnostics) =
                add_jump_labels(&grammar, &program).map_err(|e| miette::miette!("Failed to port {}: {}", input.display(), e))?;
            report(&diagnostics);
            let (ported, diagnostics) = port_code(&grammar, &labelled, mode);
            report(&diagnostics);

            let output = output.unwrap_or_else(|| input.with_extension(mlogx::FILE_EXTENSION));
            fs::write(&output, ported.join("\r\n")).map_err(|e| miette::miette!("Failed to write file: {}", e))?;
            info!("Ported to {}", output.display());
        }

        Commands::Info { command } => {
            let grammar = Grammar::standard();
            match grammar.describe(&command) {
                Some(description) => println!("{}", description),
                None => return Err(miette::miette!("Unknown command \"{}\"", command)),
            }
        }
    }

    Ok(())
}

fn read_lines(path: &Path) -> miette::Result<Vec<String>> {
    let source = fs::read_to_string(path).map_err(|e| miette::miette!("Failed to read file: {}", e))?;
    Ok(source.lines().map(String::from).collect())
}

/// Settings from `config.json` beside the input, with the input's file name filled in
fn load_settings(input: &Path) -> Settings {
    let config = input.with_file_name("config.json");
    let settings = if config.exists() {
        Settings::load(&config).unwrap_or_else(|e| {
            error!("Invalid config.json at {}, using defaults: {}", config.display(), e);
            Settings::default()
        })
    } else {
        debug!("No config.json beside {}, using defaults", input.display());
        Settings::default()
    };
    let filename = input.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default();
    settings.with_filename(filename)
}

/// Compile one file, reporting its diagnostics. Returns the emitted lines.
fn compile_file(input: &Path, settings: &Settings, icons: &Constants) -> miette::Result<Vec<String>> {
    if input.extension().map_or(false, |ext| ext == "mlog") {
        return Err(miette::miette!("Cannot compile mlog file {}", input.display()));
    }
    let program = read_lines(input)?;
    let grammar = Grammar::standard();
    let constants = build_compiler_constants(icons, settings);

    let mut compiler = Compiler::new(&grammar, settings, &constants);
    let result = compiler.compile(&program, TypeCheckingData::new());
    let diagnostics = compiler.into_diagnostics();
    report(&diagnostics);

    let output = result.map_err(|e| miette::miette!("Failed to compile {}: {}", input.display(), e))?;
    let errors = diagnostics.iter().filter(|d| d.level() == Level::Err).count();
    if errors > 0 {
        warn!("{} error(s) in {}", errors, input.display());
    }
    Ok(output.lines())
}

fn report(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        match diagnostic.level() {
            Level::Err => error!("{}", diagnostic),
            Level::Warn => warn!("{}", diagnostic),
        }
    }
}
