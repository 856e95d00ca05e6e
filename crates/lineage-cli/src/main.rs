//! Lineage CLI
//!
//! - `ingest`: parse and resolve GEDCOM files or directories of them
//! - `tags`: print the tag dispatch table
//! - `config`: print the effective configuration

use std::fs;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use lineage_ingest_gedcom::rules::STANDARD_RULES;

mod config;
mod ingest;
mod logging;

use config::LineageConfig;

#[derive(Parser)]
#[command(name = "lineage")]
#[command(author, version, about = "Lineage: GEDCOM ingest and family-graph resolution")]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace); overrides RUST_LOG
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// TOML config file (`[parser]`, `[resolve]`)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and resolve GEDCOM files; directories are walked for `*.ged`.
    Ingest {
        /// Files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Use the trusted-uploader cutoff year
        #[arg(long)]
        trusted: bool,
        /// Write resolved graphs and reports as JSON
        #[arg(long)]
        json: Option<PathBuf>,
        /// Exit non-zero if any file had unknown tags or resolution errors
        #[arg(long)]
        strict: bool,
    },

    /// Print the (context, tag) dispatch table.
    Tags,

    /// Print the effective configuration as TOML.
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = LineageConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Ingest {
            paths,
            trusted,
            json,
            strict,
        } => {
            if trusted {
                config.resolve.trusted_uploader = true;
            }
            cmd_ingest(&config, &paths, json.as_ref(), strict)?;
        }
        Commands::Tags => cmd_tags(),
        Commands::Config => print!("{}", config.to_toml()?),
    }
    Ok(())
}

fn cmd_ingest(
    config: &LineageConfig,
    paths: &[PathBuf],
    json: Option<&PathBuf>,
    strict: bool,
) -> Result<()> {
    let files = ingest::collect_inputs(paths)?;
    if files.is_empty() {
        println!("{} no GEDCOM files found", "info:".yellow().bold());
        return Ok(());
    }

    let parser = config.parser_config();
    let batch = ingest::ingest_all(&files, &parser, &config.resolve);
    for outcome in &batch.files {
        ingest::print_outcome(outcome);
    }
    for failure in &batch.failures {
        ingest::print_failure(failure);
    }

    if let Some(out) = json {
        let text = serde_json::to_string_pretty(&batch)?;
        fs::write(out, text).with_context(|| format!("writing {}", out.display()))?;
        eprintln!("{} {}", "wrote".green().bold(), out.display().to_string().bold());
    }

    if !batch.failures.is_empty() {
        anyhow::bail!("{} of {} files failed to parse", batch.failures.len(), files.len());
    }
    if strict && batch.unclean() > 0 {
        anyhow::bail!(
            "{} of {} files had unknown tags or resolution errors",
            batch.unclean(),
            files.len()
        );
    }
    Ok(())
}

fn cmd_tags() {
    for (context, tag, rule) in STANDARD_RULES.rows() {
        println!("{:<16} {:<10} {:<8} {}", context.to_string(), tag, rule.action, rule.context);
    }
    for (context, rule) in STANDARD_RULES.defaults() {
        println!("{:<16} {:<10} {:<8} {}", context.to_string(), "*", rule.action, rule.context);
    }
}
