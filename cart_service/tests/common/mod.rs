// cart_service/tests/common/mod.rs

#![allow(dead_code)]

pub mod postgres;

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use cart_service::models::Product;
use cart_service::state::AppState;
use cart_service::store::{CartRepository, MemoryStore};
use cart_service::{build_app_state, web::configure_app_routes};
use chrono::Utc;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

static TRACING: Lazy<()> = Lazy::new(|| {
  let filter = tracing_subscriber::EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
  tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().init();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING);
}

/// A memory-backed service plus a handle on its store for seeding.
pub struct TestEnv {
  pub store: Arc<MemoryStore>,
  pub state: AppState,
}

impl TestEnv {
  pub fn new() -> Self {
    setup_tracing();
    let store = Arc::new(MemoryStore::new());
    let state = build_app_state(store.clone(), store.clone()).expect("pipelines register");
    Self { store, state }
  }

  /// Catalog from the memory store, carts from `carts`.
  pub fn with_carts(carts: Arc<dyn CartRepository>) -> Self {
    setup_tracing();
    let store = Arc::new(MemoryStore::new());
    let state = build_app_state(store.clone(), carts).expect("pipelines register");
    Self { store, state }
  }

  pub fn app(
    &self,
  ) -> App<
    impl ServiceFactory<
      ServiceRequest,
      Config = (),
      Response = ServiceResponse<impl MessageBody>,
      Error = actix_web::Error,
      InitError = (),
    >,
  > {
    App::new()
      .app_data(web::Data::new(self.state.clone()))
      .configure(configure_app_routes)
  }

  /// Seeds an active product with the given price and stock.
  pub fn add_product(&self, price_cents: i64, stock_quantity: i32) -> Uuid {
    let now = Utc::now();
    let product = Product {
      id: Uuid::new_v4(),
      name: "Test product".to_string(),
      description: None,
      price_cents,
      stock_quantity,
      is_deleted: false,
      deleted_at: None,
      created_at: now,
      updated_at: now,
    };
    let id = product.id;
    self.store.insert_product(product);
    id
  }

  pub fn add_deleted_product(&self) -> Uuid {
    let now = Utc::now();
    let product = Product {
      id: Uuid::new_v4(),
      name: "Retired product".to_string(),
      description: None,
      price_cents: 10,
      stock_quantity: 5,
      is_deleted: true,
      deleted_at: Some(now),
      created_at: now,
      updated_at: now,
    };
    let id = product.id;
    self.store.insert_product(product);
    id
  }
}

pub fn cart_uri(user_id: Uuid) -> String {
  format!("/users/{}/cart", user_id)
}

/// Sends `req` and returns the status with the decoded JSON body.
pub async fn call_json<S, R, B, E>(app: &S, req: R) -> (StatusCode, Value)
where
  S: Service<R, Response = ServiceResponse<B>, Error = E>,
  B: MessageBody,
  E: std::fmt::Debug,
{
  let resp = test::call_service(app, req).await;
  let status = resp.status();
  let body: Value = test::read_body_json(resp).await;
  (status, body)
}
