// cart_service/src/state.rs
use crate::errors::AppError;
use crate::store::{CartRepository, ProductCatalog};
use std::sync::Arc;

/// Shared by every request handler and copied into each pipeline context.
#[derive(Clone)]
pub struct AppState {
  pub products: Arc<dyn ProductCatalog>,
  pub carts: Arc<dyn CartRepository>,
  pub flows: Arc<cartflow::Registry<AppError>>,
}
