use clap::{Parser, Subcommand};
use deps_core::SyntheticRepository;
use deps_plugin::{ConnectConfig, Manifest, Result, activate};
use deps_tar::{ExtractorConfig, FallbackExtractor, SuccessSignal};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "deps-connect",
    version,
    about = "Resolve and unpack connect registry modules"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve extension keys into package descriptors
    Resolve {
        /// Extension keys, casing as published (e.g. Foo_Bar)
        #[arg(required = true)]
        keys: Vec<String>,
        /// Manifest to read `extra.connect` settings from
        #[arg(long)]
        manifest: Option<PathBuf>,
        /// Release feed base URL (http(s):// or file://)
        #[arg(long)]
        feed_base: Option<String>,
        /// Tarball base URL
        #[arg(long)]
        dist_base: Option<String>,
    },
    /// Extract a module tarball
    Extract {
        archive: PathBuf,
        destination: PathBuf,
        /// How a `tar` fallback run is judged (exit-status, silent-output)
        #[arg(long, default_value = "exit-status")]
        success_signal: SuccessSignal,
    },
    /// Run plugin activation for a manifest and print the report
    Activate {
        #[arg(long)]
        manifest: PathBuf,
    },
}

#[derive(Serialize)]
struct ResolvedKey<'a> {
    extension: &'a str,
    packages: SyntheticRepository,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli.command).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {}", error_chain(&e));
            ExitCode::FAILURE
        }
    }
}

/// Renders an error followed by each of its causes not already shown.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str("\ncaused by: ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

/// Runs one command; `Ok(false)` means it completed with reported failures.
async fn run(command: Commands) -> Result<bool> {
    match command {
        Commands::Resolve {
            keys,
            manifest,
            feed_base,
            dist_base,
        } => {
            let mut config = match manifest {
                Some(path) => Manifest::load(&path)?.connect_config().clone(),
                None => ConnectConfig::default(),
            };
            if let Some(base) = feed_base {
                config.feed_base = base;
            }
            if let Some(base) = dist_base {
                config.dist_base = base;
            }
            resolve(&config, &keys).await
        }
        Commands::Extract {
            archive,
            destination,
            success_signal,
        } => {
            let extractor = FallbackExtractor::system(ExtractorConfig { success_signal });
            extractor.extract(&archive, &destination)?;
            tracing::info!(
                "extracted {} into {}",
                archive.display(),
                destination.display()
            );
            Ok(true)
        }
        Commands::Activate { manifest } => activate_manifest(&manifest).await,
    }
}

async fn resolve(config: &ConnectConfig, keys: &[String]) -> Result<bool> {
    let registry = config.registry()?;
    let mut resolved = Vec::with_capacity(keys.len());
    let mut all_ok = true;

    for key in keys {
        match registry.resolve(key).await {
            Ok(packages) => resolved.push(ResolvedKey {
                extension: key,
                packages,
            }),
            Err(e) => {
                eprintln!("{e}");
                all_ok = false;
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(all_ok)
}

async fn activate_manifest(path: &Path) -> Result<bool> {
    let manifest = Manifest::load(path)?;
    let host = manifest.host();
    let registry = manifest.connect_config().registry()?;
    let extractor = Arc::new(FallbackExtractor::system(manifest.extractor_config()));

    let report = activate(&host, &registry, extractor).await;

    for message in host.errors() {
        eprintln!("{message}");
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(report.failed.is_empty())
}
