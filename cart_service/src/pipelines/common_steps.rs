// cart_service/src/pipelines/common_steps.rs

//! Checks shared by the cart pipelines. They take plain values rather than a
//! context so each pipeline can call them from its own step handlers.

use crate::errors::{AppError, Result};
use crate::models::{Cart, Product};
use crate::store::{CartRepository, ProductCatalog};
use crate::validator;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub const NOT_ALLOWED: &str = "User is not allowed to update this cart";

/// `productId` must be present and a valid identifier.
pub fn parse_product_id(raw: Option<&str>) -> Result<Uuid> {
  let raw = match raw {
    Some(v) if validator::is_valid_input_value(Some(v)) => v,
    _ => return Err(AppError::validation("Product ID is required")),
  };
  validator::parse_id(raw).ok_or_else(|| AppError::validation("Product ID is not valid"))
}

/// Generic over the wording because create and update phrase these differently.
pub fn parse_cart_id(raw: Option<&str>, blank_message: &str, invalid_message: &str) -> Result<Uuid> {
  let raw = match raw {
    Some(v) if validator::is_valid_input_value(Some(v)) => v,
    _ => return Err(AppError::validation(blank_message)),
  };
  validator::parse_id(raw).ok_or_else(|| AppError::validation(invalid_message))
}

#[instrument(name = "common_step::fetch_active_product", skip(catalog))]
pub async fn fetch_active_product(catalog: &dyn ProductCatalog, product_id: Uuid) -> Result<Product> {
  match catalog.find_active_by_id(product_id).await? {
    Some(product) => {
      info!(price_cents = product.price_cents, stock = product.stock_quantity, "Product found.");
      Ok(product)
    }
    None => {
      warn!("Product {} not found or deleted.", product_id);
      Err(AppError::not_found(format!("No product found by {}", product_id)))
    }
  }
}

/// Loads `cart_id` and checks that it belongs to `user_id`.
///
/// A missing cart is 404. A cart owned by someone else is 403, which also
/// covers a requesting user who owns no cart at all.
#[instrument(name = "common_step::load_owned_cart", skip(carts))]
pub async fn load_owned_cart(carts: &dyn CartRepository, cart_id: Uuid, user_id: Uuid) -> Result<Cart> {
  let Some(cart) = carts.find_by_id(cart_id).await? else {
    warn!("Cart {} not found.", cart_id);
    return Err(AppError::not_found(format!("No cart found by {}", cart_id)));
  };

  if cart.user_id != user_id {
    warn!(owner = %cart.user_id, "Cart {} is owned by another user.", cart_id);
    return Err(AppError::forbidden(NOT_ALLOWED));
  }
  Ok(cart)
}

#[instrument(name = "common_step::load_user_cart", skip(carts))]
pub async fn load_user_cart(carts: &dyn CartRepository, user_id: Uuid) -> Result<Cart> {
  carts
    .find_by_user(user_id)
    .await?
    .ok_or_else(|| AppError::not_found(format!("no cart found by {}", user_id)))
}

/// Result of `atomic_update`; the cart may have vanished since it was read.
pub fn updated_cart(cart: Option<Cart>, cart_id: Uuid) -> Result<Cart> {
  cart.ok_or_else(|| AppError::not_found(format!("No cart found by {}", cart_id)))
}

/// A value an earlier step was expected to put into the context.
pub fn required<T>(value: Option<T>, what: &str) -> Result<T> {
  value.ok_or_else(|| AppError::Internal(format!("Pipeline context is missing {}", what)))
}
