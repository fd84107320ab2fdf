// cart_service/src/lib.rs

//! Shopping-cart service: per-user carts with line items and running
//! totals, exposed over HTTP with actix-web.
//!
//! Each endpoint builds a pipeline context and runs the matching `cartflow`
//! pipeline registered in [`pipelines::register_all_pipelines`].

pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod state;
pub mod store;
pub mod validator;
pub mod web;

use crate::errors::{AppError, Result};
use crate::state::AppState;
use crate::store::{CartRepository, ProductCatalog};
use std::sync::Arc;

/// Wires the stores and a fully registered pipeline registry into an [`AppState`].
pub fn build_app_state(
  products: Arc<dyn ProductCatalog>,
  carts: Arc<dyn CartRepository>,
) -> Result<AppState> {
  let flows = Arc::new(cartflow::Registry::<AppError>::new());
  pipelines::register_all_pipelines(&flows)?;
  Ok(AppState { products, carts, flows })
}
