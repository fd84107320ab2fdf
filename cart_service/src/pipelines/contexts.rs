// cart_service/src/pipelines/contexts.rs

//! Context structs the cart pipelines run against.
//! Handlers build one of these, wrap it in `cartflow::ContextData` and read
//! the outcome back once the pipeline completes.

use crate::models::{Cart, Product};
use crate::state::AppState;
use uuid::Uuid;

/// What a mutating pipeline reports back to its HTTP handler.
#[derive(Debug, Clone)]
pub struct CartOutcome {
  pub message: &'static str,
  pub cart: Cart,
}

/// How `PUT /users/{userId}/cart` changes the matched line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalMode {
  /// `removeProduct: 1`
  DecrementOne,
  /// `removeProduct: 0`
  RemoveLine,
}

#[derive(Clone)]
pub struct CreateCartCtxData {
  pub app_state: AppState,
  pub user_id: Uuid,
  pub product_id_input: Option<String>,
  /// The body named a `cartId`, even as `null`. Otherwise the pipeline
  /// creates a cart.
  pub cart_id_supplied: bool,
  pub cart_id_input: Option<String>,
  pub product: Option<Product>,
  pub target_cart: Option<Cart>,
  pub outcome: Option<CartOutcome>,
}

impl CreateCartCtxData {
  /// `cart_id_input` is `None` when absent and `Some(None)` for an explicit `null`.
  pub fn new(
    app_state: AppState,
    user_id: Uuid,
    product_id_input: Option<String>,
    cart_id_input: Option<Option<String>>,
  ) -> Self {
    Self {
      app_state,
      user_id,
      product_id_input,
      cart_id_supplied: cart_id_input.is_some(),
      cart_id_input: cart_id_input.flatten(),
      product: None,
      target_cart: None,
      outcome: None,
    }
  }
}

#[derive(Clone)]
pub struct UpdateCartCtxData {
  pub app_state: AppState,
  pub user_id: Uuid,
  pub body_is_empty: bool,
  pub product_id_input: Option<String>,
  pub cart_id_input: Option<String>,
  pub remove_product_input: Option<serde_json::Value>,
  pub product: Option<Product>,
  pub target_cart: Option<Cart>,
  pub removal: Option<RemovalMode>,
  /// Quantity of the matched line when the cart was read.
  pub current_quantity: Option<i32>,
  pub outcome: Option<CartOutcome>,
}

impl UpdateCartCtxData {
  pub fn new(app_state: AppState, user_id: Uuid) -> Self {
    Self {
      app_state,
      user_id,
      body_is_empty: true,
      product_id_input: None,
      cart_id_input: None,
      remove_product_input: None,
      product: None,
      target_cart: None,
      removal: None,
      current_quantity: None,
      outcome: None,
    }
  }
}

#[derive(Clone)]
pub struct CartDetailsCtxData {
  pub app_state: AppState,
  pub user_id: Uuid,
  pub cart: Option<Cart>,
}

#[derive(Clone)]
pub struct EmptyCartCtxData {
  pub app_state: AppState,
  pub user_id: Uuid,
  pub existing_cart: Option<Cart>,
  pub outcome: Option<CartOutcome>,
}
