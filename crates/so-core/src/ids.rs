use core::fmt;
use core::num::NonZeroU32;

use crate::error::SoError;

/// Compact, stable identifier used across the stream network.
///
/// - `u32` keeps memory small
/// - `NonZero` enables `Option<Id>` to be pointer-optimized
/// - the stored value is the id as written to feature attributes and tables
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Id(NonZeroU32);

impl Id {
    /// Create an Id from its raw (1-based) value.
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    /// Create an Id from a 0-based index by storing index+1.
    pub fn from_index(index: u32) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index))
    }

    /// Raw value as stored in attributes.
    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Recover the 0-based index.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }

    /// Convert an attribute value, rejecting zero, negatives and overflow.
    pub fn from_attr(what: &'static str, value: i64) -> Result<Self, SoError> {
        u32::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or(SoError::InvalidId { what, value })
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.get())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Domain-specific ID aliases for clarity (no runtime cost).
pub type NodeId = Id;
pub type SegmentId = Id;

/// Join ids the way node/stream tables store them: `"3,7,12"`.
pub fn join_ids(ids: &[Id]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse a comma-joined id list. Blank input yields an empty list.
pub fn parse_id_list(what: &'static str, text: &str) -> Result<Vec<Id>, SoError> {
    text.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let value: i64 = part
                .parse()
                .map_err(|_| SoError::InvalidArg { what })?;
            Id::from_attr(what, value)
        })
        .collect()
}
