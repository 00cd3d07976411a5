use std::fmt;

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    PrepareStream,
    GetNodeNetwork,
    CalculateFlow,
    CompleteBraidedStreams,
    CalculateStreamOrder,
    SavingSummary,
    Completed,
}

impl RunStage {
    /// The five processing stages, in the order a run executes them.
    pub const PIPELINE: [RunStage; 5] = [
        RunStage::PrepareStream,
        RunStage::GetNodeNetwork,
        RunStage::CalculateFlow,
        RunStage::CompleteBraidedStreams,
        RunStage::CalculateStreamOrder,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RunStage::PrepareStream => "prepare_stream",
            RunStage::GetNodeNetwork => "get_node_network",
            RunStage::CalculateFlow => "calculate_flow",
            RunStage::CompleteBraidedStreams => "complete_braided_streams",
            RunStage::CalculateStreamOrder => "calculate_stream_order",
            RunStage::SavingSummary => "saving_summary",
            RunStage::Completed => "completed",
        }
    }
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone)]
pub struct StageEvent {
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
}

impl StageEvent {
    pub fn new(stage: RunStage, elapsed_wall_s: f64, message: Option<String>) -> Self {
        Self {
            stage,
            elapsed_wall_s,
            message,
        }
    }
}
