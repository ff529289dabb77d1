//! roiscout — suburb investment scoring from ABS census and SEIFA data.
//! Entry point for the command-line binary. Results go to stdout as JSON;
//! logs go to stderr.

mod config;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use roiscout_common::RoiConfig;
use roiscout_features::pipeline::write_engineered_csv_path;
use roiscout_features::{FeaturePipeline, RawTables};
use roiscout_ranker::catalogue::{closest_to_score, feature_metadata, suburb_names};
use roiscout_ranker::{filter, predict, rank_opportunities, Dataset, FilterQuery};
use serde::Serialize;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "roiscout")]
#[command(version)]
#[command(about = "Rank and explain suburb investment scores", long_about = None)]
struct Cli {
    /// Config file (otherwise ROISCOUT_CONFIG, ./roiscout.toml, then the platform config dir)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the engineered feature table from the raw ABS tables
    Prepare {
        /// Output CSV (defaults to data.engineered_csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Top opportunities with descriptive tags
    Rank {
        #[arg(short = 'n', long)]
        top_n: Option<usize>,
    },
    /// Suburbs matching every given predicate, best score first
    Filter {
        #[arg(long)]
        name: Option<String>,
        /// Fraction (0.15) or percent (15)
        #[arg(long)]
        min_score: Option<f64>,
        #[arg(long)]
        max_price: Option<f64>,
        #[arg(long)]
        min_seifa: Option<f64>,
        #[arg(long, default_value_t = 100)]
        limit: usize,
    },
    /// Score a suburb or a hypothetical feature vector
    Predict {
        #[arg(short, long)]
        suburb: Option<String>,
        /// Feature override, repeatable: --set Median_rent_weekly=520
        #[arg(long = "set", value_name = "FEATURE=VALUE", value_parser = parse_override)]
        overrides: Vec<(String, f64)>,
    },
    /// Plausible input ranges for each model feature
    Features,
    /// Sorted suburb names
    Names {
        #[arg(short, long)]
        query: Option<String>,
        #[arg(long, default_value_t = 200)]
        limit: usize,
    },
    /// Suburbs whose score is closest to a target
    Near {
        #[arg(long)]
        score: f64,
        #[arg(short = 'n', long, default_value_t = 5)]
        top_n: usize,
    },
    ModelInfo,
    Health,
}

fn parse_override(raw: &str) -> Result<(String, f64), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FEATURE=VALUE, got '{}'", raw))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid value for {}: {}", key, e))?;
    Ok((key.trim().to_string(), value))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn prepare(config: &RoiConfig, output: Option<&Path>) -> anyhow::Result<()> {
    let raw = RawTables::load(&config.data).context("loading raw ABS tables")?;
    let pipeline = FeaturePipeline::new(config.pipeline.clone());
    let out = pipeline.run(&raw, &mut pipeline.seeded_rng())?;

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.data.engineered_csv));
    write_engineered_csv_path(&out.table, &path)
        .with_context(|| format!("writing {}", path.display()))?;

    print_json(&json!({
        "output": path.display().to_string(),
        "suburbs": out.table.len(),
        "joins": out.joins,
        "schema": out.report,
    }))
}

fn load_dataset(config: &RoiConfig) -> anyhow::Result<Dataset> {
    Dataset::load(config).with_context(|| {
        format!(
            "loading engineered table {} (run `roiscout prepare` first)",
            config.data.engineered_csv
        )
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (config, source) = config::load(cli.config.as_deref())?;
    info!("roiscout {} (config: {:?})", env!("CARGO_PKG_VERSION"), source);

    if let Command::Prepare { output } = &cli.command {
        return prepare(&config, output.as_deref());
    }

    let dataset = load_dataset(&config)?;
    match cli.command {
        Command::Prepare { .. } => Ok(()),
        Command::Rank { top_n } => {
            let top_n = top_n.unwrap_or(config.ranking.default_top_n);
            print_json(&rank_opportunities(dataset.rows(), top_n))
        }
        Command::Filter { name, min_score, max_price, min_seifa, limit } => {
            let query = FilterQuery { name, min_score, max_price, min_seifa };
            let mut rows = filter(dataset.rows(), &query);
            rows.truncate(limit.clamp(1, 500));
            print_json(&rows)
        }
        Command::Predict { suburb, overrides } => {
            let overrides: HashMap<String, f64> = overrides.into_iter().collect();
            let result = predict(&dataset, suburb.as_deref(), &overrides)?;
            print_json(&result)
        }
        Command::Features => match dataset.artifact() {
            Some(artifact) => print_json(&json!({
                "features": feature_metadata(dataset.table(), artifact.features()),
            })),
            None => print_json(&json!({ "features": [], "message": "Model not loaded." })),
        },
        Command::Names { query, limit } => print_json(&json!({
            "names": suburb_names(dataset.rows(), query.as_deref(), limit),
        })),
        Command::Near { score, top_n } => print_json(&json!({
            "target_score": score,
            "suburbs": closest_to_score(dataset.rows(), score, top_n),
        })),
        Command::ModelInfo => print_json(&dataset.model_info()),
        Command::Health => print_json(&dataset.health()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_override() {
        assert_eq!(
            parse_override("Median_rent_weekly = 520").unwrap(),
            ("Median_rent_weekly".to_string(), 520.0)
        );
        assert!(parse_override("no_equals").is_err());
        assert!(parse_override("x=abc").is_err());
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from([
            "roiscout", "predict", "--suburb", "Carlton", "--set", "a=1", "--set", "b=2.5",
        ])
        .unwrap();
        match cli.command {
            Command::Predict { suburb, overrides } => {
                assert_eq!(suburb.as_deref(), Some("Carlton"));
                assert_eq!(overrides.len(), 2);
            }
            other => panic!("unexpected {:?}", other),
        }

        let cli = Cli::try_parse_from(["roiscout", "filter", "--min-score", "15"]).unwrap();
        assert!(matches!(cli.command, Command::Filter { min_score: Some(s), .. } if s == 15.0));
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
