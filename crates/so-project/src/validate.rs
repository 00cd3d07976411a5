//! Config and dataset validation.

use std::collections::HashSet;

use crate::config::RunConfig;
use crate::schema::{LATEST_VERSION, StreamDataset};
use crate::{ProjectError, ProjectResult};

/// Linear units the clustering tolerance is meaningful in.
pub const LINEAR_UNITS: [&str; 6] = ["foot", "feet", "meter", "meters", "metre", "metres"];

fn invalid(what: impl Into<String>) -> ProjectError {
    ProjectError::InvalidConfig { what: what.into() }
}

pub fn validate_config(config: &RunConfig) -> ProjectResult<()> {
    if !config.tolerance.is_finite() || config.tolerance < 0.0 {
        return Err(invalid(format!(
            "tolerance must be finite and not negative (got {})",
            config.tolerance
        )));
    }

    let mut seen = HashSet::new();
    for column in config.columns.all() {
        if column.trim().is_empty() {
            return Err(invalid("column names must not be empty"));
        }
        if !seen.insert(column) {
            return Err(invalid(format!("column name {column} used twice")));
        }
    }

    let mut outputs = HashSet::new();
    for name in config.outputs.all().into_iter().flatten() {
        if name.trim().is_empty() {
            return Err(invalid("output names must not be empty"));
        }
        if !outputs.insert(name) {
            return Err(invalid(format!("output name {name} used twice")));
        }
    }

    if config.nodes_from_table && config.outputs.node_streams.is_none() {
        return Err(invalid(
            "nodes_from_table requires the node_streams output table",
        ));
    }

    Ok(())
}

/// Reject declared units that are not a foot or metre variant.
/// An undeclared unit passes.
pub fn check_linear_unit(unit: Option<&str>) -> ProjectResult<()> {
    let Some(unit) = unit else {
        return Ok(());
    };
    let lower = unit.trim().to_ascii_lowercase();
    if LINEAR_UNITS.contains(&lower.as_str()) {
        Ok(())
    } else {
        Err(ProjectError::UnsupportedUnits { unit: lower })
    }
}

/// Structural checks on a loaded stream dataset.
pub fn validate_streams(dataset: &StreamDataset) -> ProjectResult<()> {
    if dataset.version > LATEST_VERSION {
        return Err(ProjectError::UnsupportedVersion {
            version: dataset.version,
        });
    }
    for (index, feature) in dataset.features.iter().enumerate() {
        if feature.points.is_empty() {
            return Err(ProjectError::InvalidAttribute {
                column: "points".to_string(),
                feature: index,
                value: "no vertices".to_string(),
            });
        }
        for point in &feature.points {
            for v in point {
                so_core::ensure_finite(*v, "vertex coordinate")?;
            }
        }
    }
    Ok(())
}
