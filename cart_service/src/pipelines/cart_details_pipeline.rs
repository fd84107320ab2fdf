// cart_service/src/pipelines/cart_details_pipeline.rs

//! Read and empty the requesting user's cart.

use crate::errors::{AppError, Result};
use crate::pipelines::common_steps::{self, required};
use crate::pipelines::contexts::{CartDetailsCtxData, CartOutcome, EmptyCartCtxData};
use crate::store::{CartFilter, CartUpdate};
use cartflow::{ContextData, Pipeline, PipelineControl, Registry};
use tracing::{info, instrument};

pub fn register_cart_details_pipeline(registry: &Registry<AppError>) -> Result<()> {
  let mut p = Pipeline::<CartDetailsCtxData, AppError>::new(&[("load_user_cart", false, None)])?;

  p.on_step("load_user_cart", |ctx_data: ContextData<CartDetailsCtxData>| async move {
    let (user_id, carts) = ctx_data.snapshot(|c| (c.user_id, c.app_state.carts.clone()));
    let cart = common_steps::load_user_cart(carts.as_ref(), user_id).await?;
    ctx_data.write().cart = Some(cart);
    Ok::<_, AppError>(PipelineControl::Continue)
  })?;

  registry.register_pipeline(p);
  info!("Cart details pipeline registered.");
  Ok(())
}

pub fn register_empty_cart_pipeline(registry: &Registry<AppError>) -> Result<()> {
  let mut p = Pipeline::<EmptyCartCtxData, AppError>::new(&[
    ("load_user_cart", false, None),
    ("clear_cart", false, None),
  ])?;

  p.on_step("load_user_cart", |ctx_data: ContextData<EmptyCartCtxData>| async move {
    let (user_id, carts) = ctx_data.snapshot(|c| (c.user_id, c.app_state.carts.clone()));
    let cart = common_steps::load_user_cart(carts.as_ref(), user_id).await?;
    ctx_data.write().existing_cart = Some(cart);
    Ok::<_, AppError>(PipelineControl::Continue)
  })?;
  p.on_step("clear_cart", clear_cart)?;

  registry.register_pipeline(p);
  info!("Empty cart pipeline registered.");
  Ok(())
}

/// Clearing an already empty cart succeeds and leaves it as it was.
#[instrument(name = "empty_cart::clear_cart", skip_all)]
async fn clear_cart(ctx_data: ContextData<EmptyCartCtxData>) -> Result<PipelineControl> {
  let (user_id, existing, carts) =
    ctx_data.snapshot(|c| (c.user_id, c.existing_cart.as_ref().map(|cart| cart.id), c.app_state.carts.clone()));
  let cart_id = required(existing, "cart")?;

  let cleared = carts.atomic_update(CartFilter::User(user_id), CartUpdate::Clear).await?;
  let cleared = common_steps::updated_cart(cleared, cart_id)?;
  info!(cart_id = %cleared.id, "Cart emptied for user {}.", user_id);

  ctx_data.write().outcome = Some(CartOutcome {
    message: "cart made empty successfully",
    cart: cleared,
  });
  Ok(PipelineControl::Continue)
}
