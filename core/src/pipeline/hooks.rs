// cartflow/src/pipeline/hooks.rs

//! Handler registration for pipeline steps.

use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use crate::error::{FlowError, FlowResult};
use crate::pipeline::definition::Pipeline;
use std::future::Future;
use std::pin::Pin;

/// A boxed async step handler.
///
/// It receives a clone of the run's `ContextData<TData>` and resolves to the
/// control signal for the pipeline. Lock guards taken inside the handler must
/// be released before the handler awaits.
pub type Handler<TData, Err> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<PipelineControl, Err>> + Send>>
    + Send
    + Sync,
>;

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Attaches a handler to `step_name`. Handlers of one step run in
  /// registration order.
  ///
  /// The handler's own error type only needs to convert into the pipeline's
  /// `Err`, so steps may return `FlowError`, `anyhow`-backed errors or the
  /// application error directly.
  pub fn on_step<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) -> FlowResult<()>
  where
    F: Future<Output = Result<PipelineControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.step_index(step_name)?;
    let handler: Handler<TData, Err> = Box::new(move |ctx_data| {
      let fut = handler_fn(ctx_data);
      Box::pin(async move { fut.await.map_err(Into::into) })
    });
    self.handlers.entry(step_name.to_string()).or_default().push(handler);
    Ok(())
  }

  pub(crate) fn handlers_for(&self, step_name: &str) -> &[Handler<TData, Err>] {
    self.handlers.get(step_name).map(Vec::as_slice).unwrap_or(&[])
  }
}
