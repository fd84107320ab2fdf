// cart_service/src/models/product.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Catalog entry. The cart service only ever reads these.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  pub description: Option<String>,
  pub price_cents: i64,
  pub stock_quantity: i32,
  pub is_deleted: bool,
  pub deleted_at: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Product {
  /// Not soft-deleted by either marker.
  pub fn is_active(&self) -> bool {
    !self.is_deleted && self.deleted_at.is_none()
  }

  pub fn is_in_stock(&self) -> bool {
    self.stock_quantity > 0
  }
}
