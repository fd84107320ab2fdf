// cartflow/src/pipeline/definition.rs

use crate::core::step::{SkipCondition, StepDef};
use crate::error::{FlowError, FlowResult};
use crate::pipeline::hooks::Handler;
use std::collections::HashMap;

/// An ordered list of named steps over the context type `TData`.
///
/// Handlers return `Result<PipelineControl, Err>`. `Err` must be able to carry
/// a [`FlowError`] so that engine failures (a required step without handlers)
/// surface through the same channel as handler failures.
pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) steps: Vec<StepDef<TData>>,
  pub(crate) handlers: HashMap<String, Vec<Handler<TData, Err>>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Builds a pipeline from `(name, optional, skip_if)` step definitions.
  pub fn new(step_defs: &[(&str, bool, Option<SkipCondition<TData>>)]) -> FlowResult<Self> {
    let mut pipeline = Self {
      steps: Vec::with_capacity(step_defs.len()),
      handlers: HashMap::new(),
    };
    for (name, optional, skip_if) in step_defs {
      pipeline.ensure_step_absent(name)?;
      pipeline.steps.push(StepDef {
        name: (*name).to_string(),
        optional: *optional,
        skip_if: skip_if.clone(),
      });
    }
    Ok(pipeline)
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  pub(crate) fn step_index(&self, step_name: &str) -> FlowResult<usize> {
    self
      .steps
      .iter()
      .position(|s| s.name == step_name)
      .ok_or_else(|| FlowError::StepNotFound {
        step_name: step_name.to_string(),
      })
  }

  fn ensure_step_absent(&self, step_name: &str) -> FlowResult<()> {
    if self.steps.iter().any(|s| s.name == step_name) {
      return Err(FlowError::DuplicateStep {
        step_name: step_name.to_string(),
      });
    }
    Ok(())
  }

  /// Inserts a new required step directly after `existing_step_name`.
  pub fn insert_after(&mut self, existing_step_name: &str, new_step_name: impl Into<String>) -> FlowResult<()> {
    let idx = self.step_index(existing_step_name)?;
    let step = StepDef::new(new_step_name);
    self.ensure_step_absent(&step.name)?;
    self.steps.insert(idx + 1, step);
    Ok(())
  }

  pub fn set_optional(&mut self, step_name: &str, optional: bool) -> FlowResult<()> {
    let idx = self.step_index(step_name)?;
    if let Some(step) = self.steps.get_mut(idx) {
      step.optional = optional;
    }
    Ok(())
  }

  pub fn set_skip_condition(&mut self, step_name: &str, skip_if: Option<SkipCondition<TData>>) -> FlowResult<()> {
    let idx = self.step_index(step_name)?;
    if let Some(step) = self.steps.get_mut(idx) {
      step.skip_if = skip_if;
    }
    Ok(())
  }
}

impl<TData, Err> std::fmt::Debug for Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Pipeline")
      .field("steps", &self.steps)
      .field("handled_steps", &self.handlers.keys().collect::<Vec<_>>())
      .finish()
  }
}
