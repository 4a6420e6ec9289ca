//! Schema Reflect CLI
//!
//! Loads data-driven class specs, reflects each class and prints the ordered
//! property layout as JSON.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use schema_reflector::{
    load_specs, Checksum, OutputFormat, Reflector, ReflectorConfig, SpecCatalog,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "schema-reflect")]
#[command(about = "Reflect class specs and print their property layout")]
struct Cli {
    /// Config file layered over the default locations
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format: pretty or compact
    #[arg(short, long)]
    format: Option<String>,

    /// Only reflect this class
    #[arg(long)]
    class: Option<String>,

    /// Omit layout fingerprints
    #[arg(long)]
    no_fingerprint: bool,

    /// Spec files or directories (defaults to the configured paths)
    paths: Vec<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ReflectorConfig::load_from(cli.config.as_deref())
        .context("Failed to load configuration")?;

    let format = match cli.format.as_deref() {
        None => config.output.format,
        Some("pretty") => OutputFormat::Pretty,
        Some("compact") => OutputFormat::Compact,
        Some(other) => bail!("Invalid format '{}'. Use 'pretty' or 'compact'", other),
    };
    let include_fingerprint = config.output.include_fingerprint && !cli.no_fingerprint;

    let roots = if cli.paths.is_empty() {
        config.descriptors.paths.clone()
    } else {
        cli.paths.clone()
    };
    if roots.is_empty() {
        bail!("No spec paths given and none configured");
    }

    let mut catalog = SpecCatalog::default();
    for file in spec_files(&roots, &config)? {
        for spec in load_specs(&file).with_context(|| format!("Failed to load {}", file.display()))? {
            catalog.insert(spec)?;
        }
    }
    let catalog = Arc::new(catalog);
    debug!(classes = catalog.len(), "Catalog ready");

    let names: Vec<String> = match &cli.class {
        Some(name) => vec![name.clone()],
        None => catalog.names().map(String::from).collect(),
    };

    let reflector = Reflector::with_transformers(catalog.transformers().clone());
    let mut report = Vec::with_capacity(names.len());
    for name in &names {
        let object = catalog.instantiate(name)?;
        let properties = reflector
            .reflect(&object)
            .with_context(|| format!("Reflection of {} failed", name))?;

        let mut entry = serde_json::json!({
            "class": name,
            "properties": properties,
        });
        if include_fingerprint {
            entry["fingerprint"] = serde_json::Value::String(
                Checksum::of_properties(&properties).to_string(),
            );
        }
        report.push(entry);
    }

    let output = match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(&report)?,
        OutputFormat::Compact => serde_json::to_string(&report)?,
    };
    println!("{}", output);
    Ok(())
}

/// Expand directories into spec files, in a stable order
fn spec_files(roots: &[PathBuf], config: &ReflectorConfig) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for root in roots {
        if !root.exists() {
            bail!("Spec path {} does not exist", root.display());
        }
        if root.is_file() {
            files.push(root.clone());
            continue;
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(root) {
            let path = entry
                .with_context(|| format!("Failed to walk {}", root.display()))?
                .into_path();
            if path.is_file() && !is_hidden(&path) && config.is_spec_file(&path) {
                found.push(path);
            }
        }
        found.sort();
        files.extend(found);
    }
    Ok(files)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}
