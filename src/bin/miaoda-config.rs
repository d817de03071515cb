// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line front end for loading, validating and exporting Miaoda configuration.

use clap::{Parser, Subcommand};
use miaoda_config::domain::ConfigurationSchema;
use miaoda_config::prelude::*;
use miaoda_config::service::report::display_value;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Miaoda configuration tool: resolve, validate and export layered settings
#[derive(Parser)]
#[command(name = "miaoda-config", version)]
#[command(about = "Resolve, validate and export Miaoda configuration", long_about = None)]
struct Cli {
    /// Directory holding the .env files
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Log filter used when MIAODA_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load an environment and print a summary
    Load {
        /// Environment to load (defaults to NODE_ENV, then development)
        env: Option<Environment>,
    },

    /// Validate an environment; exits with 1 when invalid
    Validate {
        /// Environment to validate
        env: Option<Environment>,
    },

    /// Export the masked configuration
    Export {
        /// Environment to export
        env: Option<Environment>,

        /// Output file; stdout when omitted
        path: Option<PathBuf>,

        /// Output format
        #[arg(long, short, default_value = "json")]
        format: ExportFormat,
    },

    /// Print one value by dotted path or variable name
    Get {
        /// `[ENV] KEY`
        #[arg(num_args = 1..=2, required = true)]
        args: Vec<String>,
    },

    /// List the expected env files; exits with 1 when a required file is missing
    Files,

    /// Validate every environment; exits with 1 when any is invalid
    Environments,

    /// Write the multi-environment report
    Report {
        /// Output file
        #[arg(default_value = "config-report.json")]
        path: PathBuf,
    },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_env("MIAODA_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn loaded(root: &Path, env: Option<Environment>) -> Result<ConfigManager> {
    let env = env.unwrap_or_else(Environment::from_process);
    let mut manager = ConfigManager::with_loader(env, SourceLoader::new(root));
    manager.load()?;
    Ok(manager)
}

fn print_findings(result: &ValidationResult) {
    for finding in result.errors.iter().chain(&result.warnings) {
        println!("  {}", finding);
    }
}

fn load(root: &Path, env: Option<Environment>) -> Result<bool> {
    let manager = loaded(root, env)?;
    println!("environment: {}", manager.environment());
    for source in manager.sources() {
        println!(
            "  {:<18} priority {}  {:>3} entries  {:?}",
            source.name, source.priority, source.entries, source.status
        );
    }
    for issue in manager.issues() {
        println!("  issue: {}", issue);
    }
    println!("raw keys: {}", manager.raw_entries().len());
    Ok(true)
}

fn validate(root: &Path, env: Option<Environment>) -> Result<bool> {
    let manager = loaded(root, env)?;
    let result = manager.validate();
    println!(
        "{}: {} ({} errors, {} warnings)",
        manager.environment(),
        if result.is_valid { "valid" } else { "invalid" },
        result.errors.len(),
        result.warnings.len()
    );
    print_findings(&result);
    Ok(result.is_valid)
}

fn export(
    root: &Path,
    env: Option<Environment>,
    path: Option<PathBuf>,
    format: ExportFormat,
) -> Result<bool> {
    let manager = loaded(root, env)?;
    match path {
        Some(path) => {
            manager.export_to(&path, format)?;
            println!("exported {} configuration to {}", manager.environment(), path.display());
        }
        None => println!("{}", manager.export(format)?),
    }
    Ok(true)
}

fn get(root: &Path, args: &[String]) -> Result<bool> {
    let Some((key, rest)) = args.split_last() else {
        return Ok(false);
    };
    let env = match rest.first() {
        Some(name) => Some(name.parse::<Environment>().map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
            source: Some(Box::new(e)),
        })?),
        None => None,
    };
    let key = key.as_str();
    let manager = loaded(root, env)?;

    let path = ConfigurationSchema::field_for_env_var(key).map_or(key, |f| f.path);
    let value = match manager.get(path) {
        Some(value) => value.clone(),
        None => manager.raw(key).ok_or_else(|| ConfigError::ConfigKeyNotFound {
            key: key.to_string(),
        })?,
    };
    println!("{}", display_value(path, &value));
    Ok(true)
}

fn files(root: &Path) -> bool {
    let loader = SourceLoader::new(root);
    let mut ok = true;
    for file in loader.inventory() {
        let state = match (file.exists, file.required) {
            (true, _) => "present",
            (false, true) => "MISSING",
            (false, false) => "absent (optional)",
        };
        println!("  {:<18} {}", file.name, state);
        ok &= file.exists || !file.required;
    }
    ok
}

fn environments(root: &Path) -> Result<bool> {
    let mut all_valid = true;
    for env in Environment::ALL {
        let manager = loaded(root, Some(env))?;
        let result = manager.validate();
        println!(
            "{}: {} ({} errors, {} warnings)",
            env,
            if result.is_valid { "valid" } else { "invalid" },
            result.errors.len(),
            result.warnings.len()
        );
        print_findings(&result);
        for advisory in manager.posture() {
            println!("  advisory: {}", advisory.message);
        }
        all_valid &= result.is_valid;
    }
    Ok(all_valid)
}

fn report(root: &Path, path: &Path) -> Result<bool> {
    let report = ConfigReport::generate(&SourceLoader::new(root))?;
    report.write_to(path, ExportFormat::Json)?;
    println!(
        "{}/{} environments valid, {} errors, {} warnings; written to {}",
        report.summary.valid,
        report.summary.total,
        report.summary.errors,
        report.summary.warnings,
        path.display()
    );
    Ok(report.all_valid())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let outcome = match cli.command {
        Commands::Load { env } => load(&cli.root, env),
        Commands::Validate { env } => validate(&cli.root, env),
        Commands::Export { env, path, format } => export(&cli.root, env, path, format),
        Commands::Get { args } => get(&cli.root, &args),
        Commands::Files => Ok(files(&cli.root)),
        Commands::Environments => environments(&cli.root),
        Commands::Report { path } => report(&cli.root, &path),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::from(2)
        }
    }
}
