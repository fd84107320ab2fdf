// cartflow/src/lib.rs

//! Cartflow: a small asynchronous step-pipeline engine.
//!
//! A request workflow is described as a [`Pipeline`] of named steps. Each step
//! carries zero or more async handlers that operate on a shared
//! [`ContextData`] and either let the pipeline continue or stop it early.
//! Steps may be optional or skipped based on the current context.
//!
//! Pipelines are stored in a [`Registry`] keyed by their context type, so an
//! HTTP handler only needs to build a context and call [`Registry::run`].

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::step::{SkipCondition, StepDef};
pub use crate::error::{FlowError, FlowResult};
pub use crate::pipeline::definition::Pipeline;
pub use crate::pipeline::hooks::Handler;
pub use crate::registry::Registry;
