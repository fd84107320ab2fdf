// cart_service/src/store/mod.rs

//! Storage collaborators used by the cart pipelines.
//!
//! Every mutation goes through [`CartRepository::atomic_update`]: a filter
//! selecting one cart plus one update applied to it in a single atomic unit.
//! Implementations must keep `total_items` and `total_price` consistent with
//! the items they touch.

pub mod memory;
pub mod postgres;

use crate::errors::Result;
use crate::models::{Cart, Product};
use async_trait::async_trait;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait ProductCatalog: Send + Sync {
  /// Returns the product only if it is not soft-deleted.
  async fn find_active_by_id(&self, product_id: Uuid) -> Result<Option<Product>>;
}

#[async_trait]
pub trait CartRepository: Send + Sync {
  async fn find_by_id(&self, cart_id: Uuid) -> Result<Option<Cart>>;

  async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Cart>>;

  /// Fails with [`crate::errors::AppError::Conflict`] when the user already owns a cart.
  async fn create(&self, new_cart: NewCart) -> Result<Cart>;

  /// Applies `update` to the cart matched by `filter` and returns the cart as
  /// it is after the update, or `None` when nothing matched.
  async fn atomic_update(&self, filter: CartFilter, update: CartUpdate) -> Result<Option<Cart>>;
}

/// A cart holding a single unit of its first product.
#[derive(Debug, Clone)]
pub struct NewCart {
  pub user_id: Uuid,
  pub product_id: Uuid,
  pub unit_price_cents: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartFilter {
  Id(Uuid),
  /// Matches only while the cart still holds a line for `product_id`.
  IdWithItem { cart_id: Uuid, product_id: Uuid },
  User(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartUpdate {
  /// One more unit of a product already in the cart.
  IncrementItem { product_id: Uuid, unit_price_cents: i64 },
  /// Adds a line with quantity 1; an existing line for the product is incremented instead.
  PushItem { product_id: Uuid, unit_price_cents: i64 },
  /// One unit less. A line that would reach zero is removed.
  DecrementItem { product_id: Uuid, unit_price_cents: i64 },
  /// Removes the whole line, subtracting the quantity it held at removal time.
  PullItem { product_id: Uuid, unit_price_cents: i64 },
  /// Drops every line and zeroes both aggregates.
  Clear,
}

impl CartUpdate {
  pub fn name(&self) -> &'static str {
    match self {
      CartUpdate::IncrementItem { .. } => "increment_item",
      CartUpdate::PushItem { .. } => "push_item",
      CartUpdate::DecrementItem { .. } => "decrement_item",
      CartUpdate::PullItem { .. } => "pull_item",
      CartUpdate::Clear => "clear",
    }
  }
}

pub(crate) fn duplicate_cart_error() -> crate::errors::AppError {
  crate::errors::AppError::Conflict("cart already exist, provide cart id".to_string())
}
