//! Pipeline execution service.

use std::path::Path;
use std::time::Instant;

use so_core::Reporter;
use so_project::{DatasetStore, ElevationGrid, FeatureStore, RunConfig, validate_config};
use so_results::{AdvisorySummary, OutputStore, RunSummary, StageRecord};
use so_topology::Advisories;

use crate::error::{AppError, AppResult};
use crate::progress::{RunStage, StageEvent};
use crate::stage_service::{self, StageOutcome};

/// Outcome of a run: the summary as written to the output directory.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub summary: RunSummary,
    pub advisories: Advisories,
}

/// Load and validate a run config file.
pub fn load_config(path: &Path) -> AppResult<RunConfig> {
    if !path.exists() {
        return Err(AppError::ConfigFileRead {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        });
    }
    Ok(RunConfig::load(path)?)
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(StageEvent)>,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(StageEvent::new(
            stage,
            started.elapsed().as_secs_f64(),
            message,
        ));
    }
}

fn stage_enabled(config: &RunConfig, stage: RunStage) -> bool {
    let flags = &config.stages;
    match stage {
        RunStage::PrepareStream => flags.prepare_stream,
        RunStage::GetNodeNetwork => flags.get_node_network,
        RunStage::CalculateFlow => flags.calculate_flow,
        RunStage::CompleteBraidedStreams => flags.complete_braided_streams,
        RunStage::CalculateStreamOrder => flags.calculate_stream_order,
        RunStage::SavingSummary | RunStage::Completed => false,
    }
}

fn open_store(config: &RunConfig) -> AppResult<DatasetStore> {
    Ok(DatasetStore::open(&config.streams, &config.nodes_path())?)
}

fn load_elevation(config: &RunConfig, reporter: &Reporter) -> AppResult<Option<ElevationGrid>> {
    match &config.elevation {
        Some(path) => {
            reporter.msg(format!("Loading elevation grid {}", path.display()));
            Ok(Some(ElevationGrid::load(path)?))
        }
        None => Ok(None),
    }
}

fn execute_stage(
    stage: RunStage,
    store: &mut dyn FeatureStore,
    config: &RunConfig,
    outputs: &OutputStore,
    reporter: &Reporter,
) -> AppResult<StageOutcome> {
    let nested = reporter.nested();
    let outcome = match stage {
        RunStage::PrepareStream => {
            StageOutcome::Prepared(stage_service::prepare_stream(store, config, &nested)?)
        }
        RunStage::GetNodeNetwork => StageOutcome::Network(stage_service::get_node_network(
            store, config, outputs, &nested,
        )?),
        RunStage::CalculateFlow => {
            StageOutcome::Flow(stage_service::calculate_flow(store, config, outputs, &nested)?)
        }
        RunStage::CompleteBraidedStreams => {
            let elevation = load_elevation(config, &nested)?;
            StageOutcome::Braids(stage_service::complete_braided_streams(
                store,
                config,
                outputs,
                elevation.as_ref(),
                &nested,
            )?)
        }
        RunStage::CalculateStreamOrder => StageOutcome::Order(
            stage_service::calculate_stream_order(store, config, outputs, &nested)?,
        ),
        RunStage::SavingSummary | RunStage::Completed => {
            return Err(AppError::InvalidInput(format!(
                "{stage} is not a processing stage"
            )));
        }
    };
    Ok(outcome)
}

fn to_summary(advisories: &Advisories) -> AdvisorySummary {
    let raw = |ids: &[so_core::SegmentId]| -> Vec<u32> { ids.iter().map(|id| id.get()).collect() };
    AdvisorySummary {
        unconnected: raw(&advisories.unconnected),
        auto_braided: raw(&advisories.auto_braided),
        unordered: raw(&advisories.unordered),
        elevation_skipped: raw(&advisories.elevation_skipped),
    }
}

/// Run every enabled stage in pipeline order.
pub fn run_pipeline(config: &RunConfig, reporter: &Reporter) -> AppResult<RunResponse> {
    run_pipeline_with_progress(config, reporter, None)
}

/// Run every enabled stage and stream progress events.
pub fn run_pipeline_with_progress(
    config: &RunConfig,
    reporter: &Reporter,
    progress_cb: Option<&mut dyn FnMut(StageEvent)>,
) -> AppResult<RunResponse> {
    let stages: Vec<RunStage> = RunStage::PIPELINE
        .into_iter()
        .filter(|&stage| stage_enabled(config, stage))
        .collect();
    run_stages(config, &stages, reporter, progress_cb)
}

/// Run a single stage, still writing a run summary.
pub fn run_stage(
    config: &RunConfig,
    stage: RunStage,
    reporter: &Reporter,
) -> AppResult<RunResponse> {
    run_stages(config, &[stage], reporter, None)
}

fn run_stages(
    config: &RunConfig,
    stages: &[RunStage],
    reporter: &Reporter,
    mut progress_cb: Option<&mut dyn FnMut(StageEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    validate_config(config)?;

    let mut store = open_store(config)?;
    let outputs = OutputStore::new(config.output_dir.clone())?;
    let mut summary = RunSummary::now(&config.name);
    let mut advisories = Advisories::default();

    for &stage in stages {
        emit_progress(&mut progress_cb, stage, started, None);
        reporter.msg(format!("Running {stage}.."));
        let stage_started = Instant::now();
        let outcome = execute_stage(stage, &mut store, config, &outputs, reporter)?;
        let elapsed_s = stage_started.elapsed().as_secs_f64();
        tracing::debug!(stage = stage.name(), elapsed_s, "stage finished");

        advisories.merge(outcome.advisories());
        summary.stages.push(StageRecord {
            stage: stage.name().to_string(),
            elapsed_s,
        });
        emit_progress(&mut progress_cb, stage, started, Some(outcome.message()));
    }

    emit_progress(&mut progress_cb, RunStage::SavingSummary, started, None);
    summary.segments = store.line_features().len();
    summary.nodes = store.node_features().len();
    summary.advisories = to_summary(&advisories);
    let path = outputs.save_summary(&summary)?;
    reporter.msg(format!("Wrote {}", path.display()));

    emit_progress(
        &mut progress_cb,
        RunStage::Completed,
        started,
        Some("Run complete".to_string()),
    );
    Ok(RunResponse {
        summary,
        advisories,
    })
}
