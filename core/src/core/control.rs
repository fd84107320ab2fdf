// cartflow/src/core/control.rs

//! Signals for controlling pipeline flow and the outcome of a run.

/// Returned by every step handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  /// Run the remaining handlers of this step, then the following steps.
  Continue,
  /// Halt the pipeline. Nothing after the current handler runs.
  Stop,
}

/// Outcome of a pipeline run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  /// Every step was executed or deliberately skipped.
  Completed,
  /// A handler returned [`PipelineControl::Stop`].
  Stopped,
}
