// cart_service/src/pipelines/mod.rs

//! Defines and registers the cartflow pipelines behind the cart endpoints.

use crate::errors::{AppError, Result};
use cartflow::{Registry, SkipCondition};
use std::sync::Arc;

pub mod common_steps;
pub mod contexts;

pub mod cart_details_pipeline;
pub mod create_cart_pipeline;
pub mod update_cart_pipeline;

/// Registers every pipeline with `registry`. Called once at startup.
pub fn register_all_pipelines(registry: &Registry<AppError>) -> Result<()> {
  tracing::info!("Registering cart pipelines...");

  create_cart_pipeline::register_create_cart_pipeline(registry)?;
  update_cart_pipeline::register_update_cart_pipeline(registry)?;
  cart_details_pipeline::register_cart_details_pipeline(registry)?;
  cart_details_pipeline::register_empty_cart_pipeline(registry)?;

  tracing::info!(count = registry.len(), "All cart pipelines registered.");
  Ok(())
}

pub(crate) fn skip_if<T, F>(cond: F) -> Option<SkipCondition<T>>
where
  T: Send + Sync + 'static,
  F: Fn(&T) -> bool + Send + Sync + 'static,
{
  Some(Arc::new(cond))
}
