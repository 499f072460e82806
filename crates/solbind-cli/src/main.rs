//! solbind CLI
//!
//! Resolve a compiler's combined JSON output and write one binding manifest
//! per contract.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use solbind_compiler::naming::DEFAULT_MAX_OVERLOAD_NAME_LEN;
use solbind_compiler::{parse_combined_json, resolve_all, ResolverConfig, StructNaming};
use solbind_exporter::{ExportConfig, ManifestExporter};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "solbind")]
#[command(about = "Resolve contract ABIs into typed binding manifests", long_about = None)]
struct Cli {
    /// Combined JSON file (reads stdin when omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory for manifests
    #[arg(short, long)]
    out: PathBuf,

    /// Write single-line JSON
    #[arg(long)]
    compact: bool,

    /// Leave creation and runtime bytecode out of manifests
    #[arg(long)]
    no_bytecode: bool,

    /// Fail when a custom error is missing from the selector table
    #[arg(long)]
    require_error_selectors: bool,

    /// Longest type-derived overload name before the selector form is used
    #[arg(long, default_value_t = DEFAULT_MAX_OVERLOAD_NAME_LEN)]
    max_name_len: usize,

    /// How struct names are derived from `internalType`
    #[arg(long, value_enum, default_value_t = NamingArg::Heuristic)]
    struct_naming: NamingArg,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum NamingArg {
    /// Last dotted segment, else split at the last case transition
    Heuristic,
    /// Last dotted segment only
    LastSegment,
}

impl From<NamingArg> for StructNaming {
    fn from(arg: NamingArg) -> Self {
        match arg {
            NamingArg::Heuristic => StructNaming::Heuristic,
            NamingArg::LastSegment => StructNaming::LastSegment,
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {:?}", path)),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).context("Failed to read stdin")?;
            Ok(buffer)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let input = read_input(cli.input.as_deref())?;
    let schema = parse_combined_json(&input).context("Failed to parse combined JSON")?;
    tracing::debug!(
        contracts = schema.contracts.len(),
        version = ?schema.version,
        "loaded combined JSON"
    );

    let config = ResolverConfig {
        require_error_selectors: cli.require_error_selectors,
        max_overload_name_len: cli.max_name_len,
        struct_naming: cli.struct_naming.into(),
    };
    let models = resolve_all(&schema, &config).context("Failed to resolve contracts")?;

    let exporter = ManifestExporter::new(ExportConfig {
        out_dir: cli.out,
        pretty: !cli.compact,
        include_bytecode: !cli.no_bytecode,
    });
    exporter.export_all(&models, schema.version.as_deref())?;

    println!("✅ Resolved {} contract(s)", models.len());
    for model in &models {
        println!("   {} -> {}", model.key(), exporter.manifest_path(model).display());
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(cli)
}
