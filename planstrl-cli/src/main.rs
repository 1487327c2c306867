//! planstrl binary
//!
//! Reads a contingent planner trace, builds the plan graph against the domain
//! tables and writes the Esterel controller, plus an optional JSON export.
//!
//! Usage:
//!   planstrl --domain <DOMAIN> [--config <TOML>] [--plan <TRACE>] [--output <STRL>]
//!            [--free-action-id <ID>] [--export <JSON>] [--print-plan] [--verbose]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use planstrl::{CffPlanParser, DomainModel, EsterelEmitter, PlanExport, PlanstrlConfig};

#[derive(Parser, Debug)]
#[command(name = "planstrl")]
#[command(about = "Translate a contingent plan trace into an Esterel plan controller")]
#[command(version)]
struct Args {
    /// Configuration file (TOML format)
    #[arg(short, long, env = "PLANSTRL_CONFIG")]
    config: Option<PathBuf>,

    /// Domain tables: predicates, functions, operators, preconditions (.json or .toml)
    #[arg(short, long, env = "PLANSTRL_DOMAIN")]
    domain: PathBuf,

    /// Planner trace (defaults to data_path/plan_file from the configuration)
    #[arg(short, long)]
    plan: Option<PathBuf>,

    /// Esterel output file (defaults to strl_file_path from the configuration)
    #[arg(short, long, env = "PLANSTRL_STRL_FILE")]
    output: Option<PathBuf>,

    /// First action id to assign
    #[arg(long)]
    free_action_id: Option<usize>,

    /// Write dispatch records and conditions as JSON
    #[arg(long)]
    export: Option<PathBuf>,

    /// Print the parsed plan graph
    #[arg(long)]
    print_plan: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Load the config file (if any) and apply CLI overrides on top of it
    /// Priority: CLI > config file > defaults
    fn merge_with_config(&self) -> Result<PlanstrlConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let config = PlanstrlConfig::load_from_file(path)
                    .with_context(|| format!("loading configuration {}", path.display()))?;
                info!("Loaded configuration from: {}", path.display());
                config
            }
            None => PlanstrlConfig::default(),
        };

        if let Some(plan) = &self.plan {
            config.data_path = plan
                .parent()
                .map(PathBuf::from)
                .unwrap_or_default();
            config.plan_file = plan
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        if let Some(output) = &self.output {
            config.strl_file_path = output.clone();
        }
        if let Some(id) = self.free_action_id {
            config.free_action_id = id;
        }
        if self.export.is_some() {
            config.export_path = self.export.clone();
        }
        Ok(config)
    }
}

fn init_tracing(verbose: bool) {
    let directive = if verbose { "planstrl=debug" } else { "planstrl=info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> Result<()> {
    let config = args.merge_with_config()?;
    let domain = DomainModel::load_from_file(&args.domain)
        .with_context(|| format!("loading domain tables {}", args.domain.display()))?;

    let mut parser = CffPlanParser::new();
    let report = parser
        .prepare_plan_from_config(&config, &domain)
        .with_context(|| format!("parsing plan {}", config.plan_path().display()))?;

    if !report.plan_found {
        warn!("No plan found in {}", config.plan_path().display());
    }
    for warning in &report.warnings {
        warn!("{}", warning);
    }
    if args.print_plan {
        print!("{}", parser.graph());
    }

    EsterelEmitter::new(parser.graph())
        .write_to_path(&config.strl_file_path)
        .with_context(|| format!("writing {}", config.strl_file_path.display()))?;

    if let Some(export_path) = &config.export_path {
        PlanExport::from_graph(parser.graph())
            .write_to_path(export_path)
            .with_context(|| format!("writing {}", export_path.display()))?;
    }

    info!(
        "Plan translated: {} actions, next free action id {}",
        report.node_count, report.next_free_action_id
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    run(&args)
}
