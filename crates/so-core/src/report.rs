//! Explicit logging handle.
//!
//! Every stage receives a `Reporter` and hands `reporter.nested()` to the
//! stages it calls, so message indentation follows call depth without any
//! shared mutable state. Messages go out as `tracing` events; whoever runs
//! the binary decides where they land.

use std::fmt::Display;

/// Columns added per nesting level.
pub const INDENT_STEP: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reporter {
    depth: usize,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at_depth(depth: usize) -> Self {
        Self { depth }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Handle for a callee, indented one level deeper.
    pub fn nested(&self) -> Self {
        Self {
            depth: self.depth + INDENT_STEP,
        }
    }

    /// Handle at column zero, used for advisories printed after a stage.
    pub fn top(&self) -> Self {
        Self::default()
    }

    pub fn msg(&self, message: impl Display) {
        tracing::info!("{}", self.indent(message));
    }

    pub fn warn(&self, message: impl Display) {
        tracing::warn!("{}", self.indent(message));
    }

    pub fn error(&self, message: impl Display) {
        tracing::error!("{}", self.indent(message));
    }

    fn indent(&self, message: impl Display) -> String {
        format!("{:width$}{}", "", message, width = self.depth)
    }
}
