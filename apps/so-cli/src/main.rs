use clap::{Parser, Subcommand};
use so_app::{AppResult, RunResponse, RunStage, StageEvent, load_config, run_service};
use so_core::Reporter;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "so-cli")]
#[command(about = "streamorder CLI - Stream network flow and Strahler order tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a run config and its stream dataset
    Validate {
        /// Path to the run config (YAML or JSON)
        config_path: PathBuf,
    },
    /// Run every enabled stage
    Run {
        /// Path to the run config (YAML or JSON)
        config_path: PathBuf,
    },
    /// Assign unique stream ids
    Prepare {
        /// Path to the run config (YAML or JSON)
        config_path: PathBuf,
    },
    /// Build the node network from line endpoints
    Nodes {
        /// Path to the run config (YAML or JSON)
        config_path: PathBuf,
    },
    /// Resolve flow direction from the drainage nodes
    Flow {
        /// Path to the run config (YAML or JSON)
        config_path: PathBuf,
    },
    /// Complete braided sub-networks
    Braids {
        /// Path to the run config (YAML or JSON)
        config_path: PathBuf,
    },
    /// Calculate Strahler stream order
    Order {
        /// Path to the run config (YAML or JSON)
        config_path: PathBuf,
    },
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Run { config_path } => cmd_run(&config_path),
        Commands::Prepare { config_path } => cmd_stage(&config_path, RunStage::PrepareStream),
        Commands::Nodes { config_path } => cmd_stage(&config_path, RunStage::GetNodeNetwork),
        Commands::Flow { config_path } => cmd_stage(&config_path, RunStage::CalculateFlow),
        Commands::Braids { config_path } => {
            cmd_stage(&config_path, RunStage::CompleteBraidedStreams)
        }
        Commands::Order { config_path } => cmd_stage(&config_path, RunStage::CalculateStreamOrder),
    }
}

fn cmd_validate(config_path: &Path) -> AppResult<()> {
    println!("Validating config: {}", config_path.display());
    let config = load_config(config_path)?;
    let dataset: so_project::StreamDataset = so_project::load_document(&config.streams)?;
    so_project::validate_streams(&dataset)?;
    println!(
        "✓ Config is valid ({} stream features)",
        dataset.features.len()
    );
    Ok(())
}

fn cmd_run(config_path: &Path) -> AppResult<()> {
    let config = load_config(config_path)?;
    tracing::info!(config = %config_path.display(), "loaded run config");
    println!("Running pipeline: {}", config.name);

    let response = run_service::run_pipeline_with_progress(
        &config,
        &Reporter::new(),
        Some(&mut |event: StageEvent| render_progress(&event)),
    )?;
    print_summary(&response);
    Ok(())
}

fn cmd_stage(config_path: &Path, stage: RunStage) -> AppResult<()> {
    let config = load_config(config_path)?;
    println!("Running {} for {}", stage, config.name);
    let response = run_service::run_stage(&config, stage, &Reporter::new())?;
    print_summary(&response);
    Ok(())
}

fn render_progress(event: &StageEvent) {
    match &event.message {
        Some(message) => println!(
            "  [{:>7.2}s] {}: {}",
            event.elapsed_wall_s, event.stage, message
        ),
        None => println!("  [{:>7.2}s] {}", event.elapsed_wall_s, event.stage),
    }
}

fn print_summary(response: &RunResponse) {
    let summary = &response.summary;
    println!("✓ Completed at {}", summary.timestamp);
    println!("  Segments: {}", summary.segments);
    println!("  Nodes: {}", summary.nodes);
    for stage in &summary.stages {
        println!("  {:<26} {:.3}s", stage.stage, stage.elapsed_s);
    }
    let advisories = &summary.advisories;
    if !advisories.unconnected.is_empty() {
        println!("  Unconnected segments: {}", advisories.unconnected.len());
    }
    if !advisories.auto_braided.is_empty() {
        println!("  Auto-braided segments: {}", advisories.auto_braided.len());
    }
    if !advisories.unordered.is_empty() {
        println!("  Unordered segments: {}", advisories.unordered.len());
    }
    if !advisories.elevation_skipped.is_empty() {
        println!(
            "  Segments without elevation: {}",
            advisories.elevation_skipped.len()
        );
    }
}
