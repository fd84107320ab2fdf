// cart_service/src/pipelines/create_cart_pipeline.rs

//! `POST /users/{userId}/cart`: add one unit of a product, creating the
//! user's cart on first use.

use crate::errors::{AppError, Result};
use crate::pipelines::common_steps::{self, required};
use crate::pipelines::contexts::{CartOutcome, CreateCartCtxData};
use crate::pipelines::skip_if;
use crate::store::{CartFilter, CartUpdate, NewCart};
use cartflow::{ContextData, Pipeline, PipelineControl, Registry};
use tracing::{info, instrument, warn};

pub fn register_create_cart_pipeline(registry: &Registry<AppError>) -> Result<()> {
  let mut p = Pipeline::<CreateCartCtxData, AppError>::new(&[
    ("fetch_active_product", false, None),
    ("check_product_stock", false, None),
    (
      "load_target_cart",
      false,
      skip_if(|ctx: &CreateCartCtxData| !ctx.cart_id_supplied),
    ),
    (
      "ensure_no_existing_cart",
      false,
      skip_if(|ctx: &CreateCartCtxData| ctx.cart_id_supplied),
    ),
    ("apply_cart_change", false, None),
  ])?;

  p.on_step("fetch_active_product", fetch_active_product)?;
  p.on_step("check_product_stock", check_product_stock)?;
  p.on_step("load_target_cart", load_target_cart)?;
  p.on_step("ensure_no_existing_cart", ensure_no_existing_cart)?;
  p.on_step("apply_cart_change", apply_cart_change)?;

  registry.register_pipeline(p);
  info!("Create cart pipeline registered.");
  Ok(())
}

#[instrument(name = "create_cart::fetch_active_product", skip_all)]
async fn fetch_active_product(ctx_data: ContextData<CreateCartCtxData>) -> Result<PipelineControl> {
  let (raw_product_id, catalog) = ctx_data.snapshot(|c| (c.product_id_input.clone(), c.app_state.products.clone()));

  let product_id = common_steps::parse_product_id(raw_product_id.as_deref())?;
  let product = common_steps::fetch_active_product(catalog.as_ref(), product_id).await?;

  ctx_data.write().product = Some(product);
  Ok(PipelineControl::Continue)
}

async fn check_product_stock(ctx_data: ContextData<CreateCartCtxData>) -> Result<PipelineControl> {
  let product = required(ctx_data.snapshot(|c| c.product.clone()), "product")?;
  if !product.is_in_stock() {
    warn!("Product {} is out of stock.", product.id);
    return Err(AppError::validation(format!("{} is out of stock currently", product.id)));
  }
  Ok(PipelineControl::Continue)
}

#[instrument(name = "create_cart::load_target_cart", skip_all)]
async fn load_target_cart(ctx_data: ContextData<CreateCartCtxData>) -> Result<PipelineControl> {
  let (raw_cart_id, user_id, carts) =
    ctx_data.snapshot(|c| (c.cart_id_input.clone(), c.user_id, c.app_state.carts.clone()));

  let cart_id = common_steps::parse_cart_id(raw_cart_id.as_deref(), "cartId could not be blank", "cartId is not valid")?;
  let cart = common_steps::load_owned_cart(carts.as_ref(), cart_id, user_id).await?;

  ctx_data.write().target_cart = Some(cart);
  Ok(PipelineControl::Continue)
}

#[instrument(name = "create_cart::ensure_no_existing_cart", skip_all)]
async fn ensure_no_existing_cart(ctx_data: ContextData<CreateCartCtxData>) -> Result<PipelineControl> {
  let (user_id, carts) = ctx_data.snapshot(|c| (c.user_id, c.app_state.carts.clone()));

  if let Some(existing) = carts.find_by_user(user_id).await? {
    warn!(cart_id = %existing.id, "User {} already owns a cart.", user_id);
    return Err(AppError::Conflict("cart already exist, provide cart id".to_string()));
  }
  Ok(PipelineControl::Continue)
}

#[instrument(name = "create_cart::apply_cart_change", skip_all)]
async fn apply_cart_change(ctx_data: ContextData<CreateCartCtxData>) -> Result<PipelineControl> {
  let (user_id, product, target_cart, carts) = ctx_data.snapshot(|c| {
    (
      c.user_id,
      c.product.clone(),
      c.target_cart.clone(),
      c.app_state.carts.clone(),
    )
  });
  let product = required(product, "product")?;

  let outcome = match target_cart {
    Some(cart) if cart.contains_product(product.id) => {
      let filter = CartFilter::IdWithItem {
        cart_id: cart.id,
        product_id: product.id,
      };
      let update = CartUpdate::IncrementItem {
        product_id: product.id,
        unit_price_cents: product.price_cents,
      };
      let updated = common_steps::updated_cart(carts.atomic_update(filter, update).await?, cart.id)?;
      info!(cart_id = %updated.id, "Incremented quantity of product {}.", product.id);
      CartOutcome {
        message: "Item quantity updated to cart",
        cart: updated,
      }
    }
    Some(cart) => {
      let update = CartUpdate::PushItem {
        product_id: product.id,
        unit_price_cents: product.price_cents,
      };
      let updated = common_steps::updated_cart(carts.atomic_update(CartFilter::Id(cart.id), update).await?, cart.id)?;
      info!(cart_id = %updated.id, "Added product {} to cart.", product.id);
      CartOutcome {
        message: "Item updated to cart",
        cart: updated,
      }
    }
    None => {
      let created = carts
        .create(NewCart {
          user_id,
          product_id: product.id,
          unit_price_cents: product.price_cents,
        })
        .await?;
      info!(cart_id = %created.id, "Created cart for user {}.", user_id);
      CartOutcome {
        message: "Item added to cart",
        cart: created,
      }
    }
  };

  ctx_data.write().outcome = Some(outcome);
  Ok(PipelineControl::Continue)
}
