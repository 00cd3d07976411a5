//! Non-fatal findings collected during a pass and reported afterwards.

use so_core::{Reporter, SegmentId, join_ids};

/// Warnings that do not stop a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Advisories {
    /// Segments left without a from or to node.
    pub unconnected: Vec<SegmentId>,
    /// Segments auto-flagged braided during flow resolution.
    pub auto_braided: Vec<SegmentId>,
    /// Segments no headwater reaches; their order stays unresolved.
    pub unordered: Vec<SegmentId>,
    /// Braided segments whose ends could not both be sampled for elevation.
    pub elevation_skipped: Vec<SegmentId>,
}

impl Advisories {
    pub fn is_empty(&self) -> bool {
        self.unconnected.is_empty()
            && self.auto_braided.is_empty()
            && self.unordered.is_empty()
            && self.elevation_skipped.is_empty()
    }

    /// Fold another pass's findings into this one.
    pub fn merge(&mut self, other: Advisories) {
        self.unconnected.extend(other.unconnected);
        self.auto_braided.extend(other.auto_braided);
        self.unordered.extend(other.unordered);
        self.elevation_skipped.extend(other.elevation_skipped);
    }

    /// Emit warnings at column zero, labelled with the stream id column.
    pub fn report(&self, reporter: &Reporter, stream_id_column: &str) {
        let top = reporter.top();
        if !self.unconnected.is_empty() {
            top.warn(
                "WARNING: Unconnected segments in stream network. Assign drainage point to \
                 unconnected branches or remove them.",
            );
            top.warn(format!(
                "  {}: {}",
                stream_id_column,
                join_ids(&self.unconnected)
            ));
        }
        if !self.auto_braided.is_empty() {
            top.warn(
                "WARNING: Possible braided stream errors, check outputs and correct as needed \
                 before proceeding.",
            );
        }
        if !self.unordered.is_empty() {
            top.warn("WARNING: Segments not reached from any headwater keep an unresolved order.");
            top.warn(format!(
                "  {}: {}",
                stream_id_column,
                join_ids(&self.unordered)
            ));
        }
        if !self.elevation_skipped.is_empty() {
            top.warn("WARNING: Elevation unavailable at braided segment ends, direction kept.");
            top.warn(format!(
                "  {}: {}",
                stream_id_column,
                join_ids(&self.elevation_skipped)
            ));
        }
    }
}
