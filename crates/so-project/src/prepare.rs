//! Stream id preparation.

use std::collections::HashSet;

use so_core::Reporter;

use crate::ProjectResult;
use crate::schema::AttrValue;
use crate::store::FeatureStore;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrepareReport {
    /// The id column did not exist and was added.
    pub created_column: bool,
    /// Features whose id repeated an earlier feature's id.
    pub duplicates: Vec<usize>,
    /// `(feature index, new id)` for every feature given a fresh id.
    pub assigned: Vec<(usize, i64)>,
}

/// Give every feature a unique positive stream id.
///
/// The first feature holding an id keeps it. Later repeats, non-positive
/// values and missing values are replaced by fresh ids counting up from the
/// largest id kept.
pub fn assign_stream_ids(
    store: &mut dyn FeatureStore,
    column: &str,
    reporter: &Reporter,
) -> ProjectResult<PrepareReport> {
    let mut report = PrepareReport::default();
    if store.ensure_column(column) {
        reporter.warn("stream ID column not found, creating..");
        report.created_column = true;
    }

    reporter.msg("Assigning new stream IDs..");
    let mut kept = HashSet::new();
    let mut needs_id = Vec::new();
    for (index, feature) in store.line_features().iter().enumerate() {
        match feature.attr(column).and_then(AttrValue::as_i64) {
            Some(id) if id > 0 && id <= i64::from(u32::MAX) => {
                if !kept.insert(id) {
                    report.duplicates.push(index);
                    needs_id.push(index);
                }
            }
            _ => needs_id.push(index),
        }
    }

    let mut next = kept.iter().copied().max().unwrap_or(0);
    for index in needs_id {
        next += 1;
        store.set_attribute(index, column, AttrValue::Int(next))?;
        report.assigned.push((index, next));
    }

    if !report.duplicates.is_empty() {
        reporter.nested().warn(format!(
            "{} duplicate stream IDs replaced",
            report.duplicates.len()
        ));
    }
    Ok(report)
}
