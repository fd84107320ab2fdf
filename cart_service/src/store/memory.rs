// cart_service/src/store/memory.rs

//! Process-local store. Each operation runs under one mutex, which gives the
//! same per-cart atomicity the PostgreSQL store gets from row locks.

use super::{duplicate_cart_error, CartFilter, CartRepository, CartUpdate, NewCart, ProductCatalog};
use crate::errors::Result;
use crate::models::{Cart, CartItem, Product};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Inner {
  products: HashMap<Uuid, Product>,
  carts: HashMap<Uuid, Cart>,
  cart_by_user: HashMap<Uuid, Uuid>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
  inner: Mutex<Inner>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds or replaces a catalog entry.
  pub fn insert_product(&self, product: Product) {
    self.inner.lock().products.insert(product.id, product);
  }

  pub fn cart_count(&self) -> usize {
    self.inner.lock().carts.len()
  }
}

#[async_trait]
impl ProductCatalog for MemoryStore {
  async fn find_active_by_id(&self, product_id: Uuid) -> Result<Option<Product>> {
    let inner = self.inner.lock();
    Ok(inner.products.get(&product_id).filter(|p| p.is_active()).cloned())
  }
}

#[async_trait]
impl CartRepository for MemoryStore {
  async fn find_by_id(&self, cart_id: Uuid) -> Result<Option<Cart>> {
    Ok(self.inner.lock().carts.get(&cart_id).cloned())
  }

  async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Cart>> {
    let inner = self.inner.lock();
    Ok(
      inner
        .cart_by_user
        .get(&user_id)
        .and_then(|cart_id| inner.carts.get(cart_id))
        .cloned(),
    )
  }

  async fn create(&self, new_cart: NewCart) -> Result<Cart> {
    let mut inner = self.inner.lock();
    if inner.cart_by_user.contains_key(&new_cart.user_id) {
      return Err(duplicate_cart_error());
    }

    let now = Utc::now();
    let cart = Cart {
      id: Uuid::new_v4(),
      user_id: new_cart.user_id,
      items: vec![CartItem {
        product_id: new_cart.product_id,
        quantity: 1,
      }],
      total_items: 1,
      total_price: new_cart.unit_price_cents,
      created_at: now,
      updated_at: now,
    };
    inner.cart_by_user.insert(cart.user_id, cart.id);
    inner.carts.insert(cart.id, cart.clone());
    Ok(cart)
  }

  async fn atomic_update(&self, filter: CartFilter, update: CartUpdate) -> Result<Option<Cart>> {
    let mut inner = self.inner.lock();
    let cart_id = match filter {
      CartFilter::Id(cart_id) => Some(cart_id),
      CartFilter::IdWithItem { cart_id, product_id } => inner
        .carts
        .get(&cart_id)
        .filter(|cart| cart.contains_product(product_id))
        .map(|cart| cart.id),
      CartFilter::User(user_id) => inner.cart_by_user.get(&user_id).copied(),
    };

    let Some(cart_id) = cart_id else {
      return Ok(None);
    };
    let Some(cart) = inner.carts.get_mut(&cart_id) else {
      return Ok(None);
    };
    apply_update(cart, update);
    cart.updated_at = Utc::now();
    Ok(Some(cart.clone()))
  }
}

fn apply_update(cart: &mut Cart, update: CartUpdate) {
  match update {
    CartUpdate::IncrementItem {
      product_id,
      unit_price_cents,
    }
    | CartUpdate::PushItem {
      product_id,
      unit_price_cents,
    } => {
      match cart.items.iter_mut().find(|item| item.product_id == product_id) {
        Some(item) => item.quantity += 1,
        None => cart.items.push(CartItem { product_id, quantity: 1 }),
      }
      cart.total_items += 1;
      cart.total_price += unit_price_cents;
    }
    CartUpdate::DecrementItem {
      product_id,
      unit_price_cents,
    } => {
      let Some(pos) = cart.items.iter().position(|item| item.product_id == product_id) else {
        return;
      };
      let quantity = cart.items.get(pos).map_or(0, |item| item.quantity);
      if quantity > 1 {
        if let Some(item) = cart.items.get_mut(pos) {
          item.quantity -= 1;
        }
      } else {
        cart.items.remove(pos);
      }
      cart.total_items -= 1;
      cart.total_price -= unit_price_cents;
    }
    CartUpdate::PullItem {
      product_id,
      unit_price_cents,
    } => {
      let Some(pos) = cart.items.iter().position(|item| item.product_id == product_id) else {
        return;
      };
      let removed = cart.items.remove(pos);
      cart.total_items -= removed.quantity;
      cart.total_price -= i64::from(removed.quantity) * unit_price_cents;
    }
    CartUpdate::Clear => {
      cart.items.clear();
      cart.total_items = 0;
      cart.total_price = 0;
    }
  }
}
