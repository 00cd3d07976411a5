//! Dataset schema definitions.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use so_core::Point;

/// Newest dataset layout this crate reads and writes.
pub const LATEST_VERSION: u32 = 1;

/// A single attribute cell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AttrValue {
    Null,
    Int(i64),
    Real(f64),
    Text(String),
}

impl AttrValue {
    /// Integer view: whole reals and numeric text convert, everything else
    /// (including null) does not.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Null => None,
            AttrValue::Int(v) => Some(*v),
            AttrValue::Real(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            AttrValue::Real(_) => None,
            AttrValue::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    /// Nonzero integers count as set; null and text that is not a number
    /// do not.
    pub fn as_flag(&self) -> bool {
        self.as_i64().is_some_and(|v| v > 0)
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Null => Ok(()),
            AttrValue::Int(v) => write!(f, "{v}"),
            AttrValue::Real(v) => write!(f, "{v}"),
            AttrValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Int(i64::from(value))
    }
}

impl From<Option<so_core::Id>> for AttrValue {
    fn from(value: Option<so_core::Id>) -> Self {
        value.map_or(AttrValue::Null, |id| AttrValue::Int(i64::from(id.get())))
    }
}

/// Stream line dataset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreamDataset {
    pub version: u32,
    pub name: String,
    /// Linear unit of the coordinate frame, when declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linear_unit: Option<String>,
    /// Attribute columns in creation order.
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub features: Vec<LineFeatureDef>,
}

impl StreamDataset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: LATEST_VERSION,
            name: name.into(),
            linear_unit: None,
            columns: Vec::new(),
            features: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineFeatureDef {
    #[serde(default)]
    pub attributes: BTreeMap<String, AttrValue>,
    /// Vertices in drawing order.
    pub points: Vec<[f64; 2]>,
}

impl LineFeatureDef {
    pub fn new(points: Vec<[f64; 2]>) -> Self {
        Self {
            attributes: BTreeMap::new(),
            points,
        }
    }

    pub fn with_attr(mut self, column: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(column.into(), value.into());
        self
    }

    pub fn attr(&self, column: &str) -> Option<&AttrValue> {
        self.attributes.get(column)
    }

    pub fn vertices(&self) -> Vec<Point> {
        self.points.iter().copied().map(Point::from).collect()
    }
}

/// Node point dataset written by the node network stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeDataset {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<NodeFeatureDef>,
}

impl NodeDataset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: LATEST_VERSION,
            name: name.into(),
            nodes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeFeatureDef {
    pub node: i64,
    pub x: f64,
    pub y: f64,
    /// Comma-joined stream ids, e.g. `"3,7,12"`.
    pub stream_ids: String,
    #[serde(default)]
    pub end_point: bool,
    #[serde(default)]
    pub drainage: bool,
}

impl NodeFeatureDef {
    pub fn coord(&self) -> Point {
        Point::new(self.x, self.y)
    }
}
