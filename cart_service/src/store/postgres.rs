// cart_service/src/store/postgres.rs

use super::{duplicate_cart_error, CartFilter, CartRepository, CartUpdate, NewCart, ProductCatalog};
use crate::errors::{AppError, Result};
use crate::models::{Cart, CartItem, Product};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use tracing::{debug, error, instrument};
use uuid::Uuid;

const CART_COLUMNS: &str = "id, user_id, total_items, total_price, created_at, updated_at";

#[derive(Debug, FromRow)]
struct CartRow {
  id: Uuid,
  user_id: Uuid,
  total_items: i32,
  total_price: i64,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl CartRow {
  fn into_cart(self, items: Vec<CartItem>) -> Cart {
    Cart {
      id: self.id,
      user_id: self.user_id,
      items,
      total_items: self.total_items,
      total_price: self.total_price,
      created_at: self.created_at,
      updated_at: self.updated_at,
    }
  }
}

/// How an update moves the cart aggregates.
enum Totals {
  Delta { items: i32, price_cents: i64 },
  Reset,
}

/// Carts and catalog lookups backed by PostgreSQL.
///
/// A mutation locks the cart row with `SELECT ... FOR UPDATE` inside a
/// transaction, so concurrent updates of one cart are serialized.
#[derive(Debug, Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  async fn load_items(conn: &mut PgConnection, cart_id: Uuid) -> Result<Vec<CartItem>> {
    let items = sqlx::query_as::<_, CartItem>(
      "SELECT product_id, quantity FROM cart_items WHERE cart_id = $1 ORDER BY position ASC",
    )
    .bind(cart_id)
    .fetch_all(conn)
    .await?;
    Ok(items)
  }

  async fn find_one(&self, column: &str, value: Uuid) -> Result<Option<Cart>> {
    let mut conn = self.pool.acquire().await?;
    let query = format!("SELECT {CART_COLUMNS} FROM carts WHERE {column} = $1");
    let row: Option<CartRow> = sqlx::query_as(&query).bind(value).fetch_optional(&mut *conn).await?;
    match row {
      Some(row) => {
        let items = Self::load_items(&mut conn, row.id).await?;
        Ok(Some(row.into_cart(items)))
      }
      None => Ok(None),
    }
  }

  async fn lock_cart(conn: &mut PgConnection, filter: CartFilter) -> Result<Option<Uuid>> {
    let locked = match filter {
      CartFilter::Id(cart_id) => {
        sqlx::query_scalar("SELECT id FROM carts WHERE id = $1 FOR UPDATE")
          .bind(cart_id)
          .fetch_optional(conn)
          .await?
      }
      CartFilter::IdWithItem { cart_id, product_id } => {
        sqlx::query_scalar(
          "SELECT c.id FROM carts c WHERE c.id = $1 \
           AND EXISTS (SELECT 1 FROM cart_items i WHERE i.cart_id = c.id AND i.product_id = $2) \
           FOR UPDATE",
        )
        .bind(cart_id)
        .bind(product_id)
        .fetch_optional(conn)
        .await?
      }
      CartFilter::User(user_id) => {
        sqlx::query_scalar("SELECT id FROM carts WHERE user_id = $1 FOR UPDATE")
          .bind(user_id)
          .fetch_optional(conn)
          .await?
      }
    };
    Ok(locked)
  }

  async fn remove_line(conn: &mut PgConnection, cart_id: Uuid, product_id: Uuid) -> Result<Option<i32>> {
    let removed = sqlx::query_scalar("DELETE FROM cart_items WHERE cart_id = $1 AND product_id = $2 RETURNING quantity")
      .bind(cart_id)
      .bind(product_id)
      .fetch_optional(conn)
      .await?;
    Ok(removed)
  }

  async fn apply_items_change(conn: &mut PgConnection, cart_id: Uuid, update: CartUpdate) -> Result<Totals> {
    let totals = match update {
      CartUpdate::IncrementItem {
        product_id,
        unit_price_cents,
      }
      | CartUpdate::PushItem {
        product_id,
        unit_price_cents,
      } => {
        sqlx::query(
          "INSERT INTO cart_items (cart_id, product_id, quantity) VALUES ($1, $2, 1) \
           ON CONFLICT (cart_id, product_id) DO UPDATE SET quantity = cart_items.quantity + 1",
        )
        .bind(cart_id)
        .bind(product_id)
        .execute(&mut *conn)
        .await?;
        Totals::Delta {
          items: 1,
          price_cents: unit_price_cents,
        }
      }
      CartUpdate::DecrementItem {
        product_id,
        unit_price_cents,
      } => {
        let decremented = sqlx::query(
          "UPDATE cart_items SET quantity = quantity - 1 \
           WHERE cart_id = $1 AND product_id = $2 AND quantity > 1",
        )
        .bind(cart_id)
        .bind(product_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

        if decremented == 1 || Self::remove_line(conn, cart_id, product_id).await?.is_some() {
          Totals::Delta {
            items: -1,
            price_cents: -unit_price_cents,
          }
        } else {
          Totals::Delta { items: 0, price_cents: 0 }
        }
      }
      CartUpdate::PullItem {
        product_id,
        unit_price_cents,
      } => {
        let quantity = Self::remove_line(conn, cart_id, product_id).await?.unwrap_or(0);
        Totals::Delta {
          items: -quantity,
          price_cents: -(i64::from(quantity) * unit_price_cents),
        }
      }
      CartUpdate::Clear => {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
          .bind(cart_id)
          .execute(&mut *conn)
          .await?;
        Totals::Reset
      }
    };
    Ok(totals)
  }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
  matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

#[async_trait]
impl ProductCatalog for PgStore {
  #[instrument(name = "store::find_active_product", skip(self))]
  async fn find_active_by_id(&self, product_id: Uuid) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
      "SELECT id, name, description, price_cents, stock_quantity, is_deleted, deleted_at, created_at, updated_at \
       FROM products WHERE id = $1 AND is_deleted = FALSE AND deleted_at IS NULL",
    )
    .bind(product_id)
    .fetch_optional(&self.pool)
    .await
    .map_err(|e| {
      error!("Database error while fetching product {}: {}", product_id, e);
      AppError::Sqlx(e)
    })?;
    Ok(product)
  }
}

#[async_trait]
impl CartRepository for PgStore {
  #[instrument(name = "store::find_cart_by_id", skip(self))]
  async fn find_by_id(&self, cart_id: Uuid) -> Result<Option<Cart>> {
    self.find_one("id", cart_id).await
  }

  #[instrument(name = "store::find_cart_by_user", skip(self))]
  async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Cart>> {
    self.find_one("user_id", user_id).await
  }

  #[instrument(name = "store::create_cart", skip(self), fields(user_id = %new_cart.user_id))]
  async fn create(&self, new_cart: NewCart) -> Result<Cart> {
    let mut tx = self.pool.begin().await?;

    let inserted = sqlx::query_as::<_, CartRow>(&format!(
      "INSERT INTO carts (id, user_id, total_items, total_price) VALUES ($1, $2, 1, $3) RETURNING {CART_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(new_cart.user_id)
    .bind(new_cart.unit_price_cents)
    .fetch_one(&mut *tx)
    .await;

    let row = match inserted {
      Ok(row) => row,
      Err(e) if is_unique_violation(&e) => {
        debug!("Lost the race to create a cart for user {}", new_cart.user_id);
        return Err(duplicate_cart_error());
      }
      Err(e) => return Err(e.into()),
    };

    sqlx::query("INSERT INTO cart_items (cart_id, product_id, quantity) VALUES ($1, $2, 1)")
      .bind(row.id)
      .bind(new_cart.product_id)
      .execute(&mut *tx)
      .await?;
    tx.commit().await?;

    Ok(row.into_cart(vec![CartItem {
      product_id: new_cart.product_id,
      quantity: 1,
    }]))
  }

  #[instrument(name = "store::atomic_update", skip(self), fields(operation = update.name()))]
  async fn atomic_update(&self, filter: CartFilter, update: CartUpdate) -> Result<Option<Cart>> {
    let mut tx = self.pool.begin().await?;

    let Some(cart_id) = Self::lock_cart(&mut tx, filter).await? else {
      tx.rollback().await?;
      return Ok(None);
    };

    let totals = Self::apply_items_change(&mut tx, cart_id, update).await?;
    let row = match totals {
      Totals::Delta { items, price_cents } => {
        sqlx::query_as::<_, CartRow>(&format!(
          "UPDATE carts SET total_items = total_items + $2, total_price = total_price + $3, updated_at = NOW() \
           WHERE id = $1 RETURNING {CART_COLUMNS}"
        ))
        .bind(cart_id)
        .bind(items)
        .bind(price_cents)
        .fetch_one(&mut *tx)
        .await?
      }
      Totals::Reset => {
        sqlx::query_as::<_, CartRow>(&format!(
          "UPDATE carts SET total_items = 0, total_price = 0, updated_at = NOW() WHERE id = $1 RETURNING {CART_COLUMNS}"
        ))
        .bind(cart_id)
        .fetch_one(&mut *tx)
        .await?
      }
    };
    let items = Self::load_items(&mut tx, cart_id).await?;
    tx.commit().await?;

    Ok(Some(row.into_cart(items)))
  }
}
