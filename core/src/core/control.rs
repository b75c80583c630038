// storefront-flow/src/core/control.rs

//! Handler flow signals and the outcome of a run.

/// Returned by every handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  Continue,
  /// Halt the run. No further handlers of this or later steps execute.
  Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  /// Every step ran (or was legitimately skipped).
  Completed,
  /// Some handler returned [`PipelineControl::Stop`].
  Stopped,
}
