// cart_service/src/models/cart.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A line of a cart. Quantity is at least 1 while the line exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
  pub product_id: Uuid,
  pub quantity: i32,
}

/// One user's cart.
///
/// `total_items` and `total_price` are kept in step with `items` by every
/// store operation: the sum of quantities and the sum of quantity times the
/// unit price each unit was added at.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
  pub id: Uuid,
  pub user_id: Uuid,
  pub items: Vec<CartItem>,
  pub total_items: i32,
  /// Minor currency units, same as `Product::price_cents`.
  pub total_price: i64,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Cart {
  pub fn item(&self, product_id: Uuid) -> Option<&CartItem> {
    self.items.iter().find(|item| item.product_id == product_id)
  }

  pub fn contains_product(&self, product_id: Uuid) -> bool {
    self.item(product_id).is_some()
  }
}
