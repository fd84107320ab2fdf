// cart_service/src/pipelines/update_cart_pipeline.rs

//! `PUT /users/{userId}/cart`: take one unit of a product out of the cart,
//! or drop its line entirely.

use crate::errors::{AppError, Result};
use crate::pipelines::common_steps::{self, required};
use crate::pipelines::contexts::{CartOutcome, RemovalMode, UpdateCartCtxData};
use crate::store::{CartFilter, CartUpdate};
use cartflow::{ContextData, Pipeline, PipelineControl, Registry};
use serde_json::Value;
use tracing::{info, instrument, warn};

const REMOVE_PRODUCT_INVALID: &str = "RemoveProduct is required and its value must be either 0 or 1";

pub fn register_update_cart_pipeline(registry: &Registry<AppError>) -> Result<()> {
  let mut p = Pipeline::<UpdateCartCtxData, AppError>::new(&[
    ("ensure_body_present", false, None),
    ("fetch_active_product", false, None),
    ("load_owned_cart", false, None),
    ("validate_remove_product", false, None),
    ("locate_cart_item", false, None),
    ("apply_cart_change", false, None),
  ])?;

  p.on_step("ensure_body_present", |ctx_data: ContextData<UpdateCartCtxData>| async move {
    if ctx_data.read().body_is_empty {
      return Err(AppError::not_found("data is required to add products in cart"));
    }
    Ok(PipelineControl::Continue)
  })?;
  p.on_step("fetch_active_product", fetch_active_product)?;
  p.on_step("load_owned_cart", load_owned_cart)?;
  p.on_step("validate_remove_product", validate_remove_product)?;
  p.on_step("locate_cart_item", locate_cart_item)?;
  p.on_step("apply_cart_change", apply_cart_change)?;

  registry.register_pipeline(p);
  info!("Update cart pipeline registered.");
  Ok(())
}

/// Only the JSON numbers 0 and 1 are accepted, in either integer or float
/// spelling (`1` and `1.0` alike); `"1"`, `true` or `1.5` are not.
pub fn parse_removal_mode(value: Option<&Value>) -> Option<RemovalMode> {
  match value.and_then(Value::as_f64) {
    Some(n) if n == 1.0 => Some(RemovalMode::DecrementOne),
    Some(n) if n == 0.0 => Some(RemovalMode::RemoveLine),
    _ => None,
  }
}

#[instrument(name = "update_cart::fetch_active_product", skip_all)]
async fn fetch_active_product(ctx_data: ContextData<UpdateCartCtxData>) -> Result<PipelineControl> {
  let (raw_product_id, catalog) = ctx_data.snapshot(|c| (c.product_id_input.clone(), c.app_state.products.clone()));

  let product_id = common_steps::parse_product_id(raw_product_id.as_deref())?;
  let product = common_steps::fetch_active_product(catalog.as_ref(), product_id).await?;

  ctx_data.write().product = Some(product);
  Ok(PipelineControl::Continue)
}

#[instrument(name = "update_cart::load_owned_cart", skip_all)]
async fn load_owned_cart(ctx_data: ContextData<UpdateCartCtxData>) -> Result<PipelineControl> {
  let (raw_cart_id, user_id, carts) =
    ctx_data.snapshot(|c| (c.cart_id_input.clone(), c.user_id, c.app_state.carts.clone()));

  let cart_id = common_steps::parse_cart_id(raw_cart_id.as_deref(), "cart Id is required", "cart Id is not valid")?;
  let cart = common_steps::load_owned_cart(carts.as_ref(), cart_id, user_id).await?;

  ctx_data.write().target_cart = Some(cart);
  Ok(PipelineControl::Continue)
}

async fn validate_remove_product(ctx_data: ContextData<UpdateCartCtxData>) -> Result<PipelineControl> {
  let mut guard = ctx_data.write();
  let Some(mode) = parse_removal_mode(guard.remove_product_input.as_ref()) else {
    warn!(value = ?guard.remove_product_input, "Rejected removeProduct value.");
    return Err(AppError::validation(REMOVE_PRODUCT_INVALID));
  };
  guard.removal = Some(mode);
  Ok(PipelineControl::Continue)
}

async fn locate_cart_item(ctx_data: ContextData<UpdateCartCtxData>) -> Result<PipelineControl> {
  let mut guard = ctx_data.write();
  let product_id = required(guard.product.as_ref().map(|p| p.id), "product")?;
  let quantity = required(guard.target_cart.as_ref(), "cart")?
    .item(product_id)
    .map(|item| item.quantity);

  match quantity {
    Some(quantity) => {
      guard.current_quantity = Some(quantity);
      Ok(PipelineControl::Continue)
    }
    None => {
      warn!("Product {} is not in the cart.", product_id);
      Err(AppError::not_found("No product found by this product id inside cart"))
    }
  }
}

#[instrument(name = "update_cart::apply_cart_change", skip_all)]
async fn apply_cart_change(ctx_data: ContextData<UpdateCartCtxData>) -> Result<PipelineControl> {
  let (product, cart, removal, current_quantity, carts) = ctx_data.snapshot(|c| {
    (
      c.product.clone(),
      c.target_cart.as_ref().map(|cart| cart.id),
      c.removal,
      c.current_quantity,
      c.app_state.carts.clone(),
    )
  });
  let product = required(product, "product")?;
  let cart_id = required(cart, "cart")?;
  let removal = required(removal, "removal mode")?;
  let current_quantity = required(current_quantity, "item quantity")?;

  let (update, message) = match removal {
    RemovalMode::DecrementOne if current_quantity > 1 => (
      CartUpdate::DecrementItem {
        product_id: product.id,
        unit_price_cents: product.price_cents,
      },
      "Item quantity reduced in cart",
    ),
    RemovalMode::DecrementOne => (
      CartUpdate::PullItem {
        product_id: product.id,
        unit_price_cents: product.price_cents,
      },
      "Item updated to cart",
    ),
    RemovalMode::RemoveLine => (
      CartUpdate::PullItem {
        product_id: product.id,
        unit_price_cents: product.price_cents,
      },
      "Item removed from cart",
    ),
  };

  let filter = CartFilter::IdWithItem {
    cart_id,
    product_id: product.id,
  };
  let Some(updated) = carts.atomic_update(filter, update).await? else {
    // The line vanished between the read and the update.
    warn!(%cart_id, "Product {} left the cart before the update.", product.id);
    return Err(AppError::not_found("No product found by this product id inside cart"));
  };
  info!(cart_id = %updated.id, operation = update.name(), total_items = updated.total_items, "Cart updated.");

  ctx_data.write().outcome = Some(CartOutcome { message, cart: updated });
  Ok(PipelineControl::Continue)
}
