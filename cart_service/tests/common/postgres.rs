// cart_service/tests/common/postgres.rs

//! A PostgreSQL container shared by every test in the binary, with one
//! freshly migrated database per test.

use cart_service::store::PgStore;
use once_cell::sync::Lazy;
use sqlx::{Connection, PgConnection, PgPool};
use std::sync::atomic::{AtomicUsize, Ordering};
use testcontainers::{runners::AsyncRunner, ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres as PostgresImage;
use tokio::sync::OnceCell;
use uuid::Uuid;

const PG_USER: &str = "cart_test";
const PG_PASSWORD: &str = "cart_test_password";

/// The running container and the host port it was published on.
///
/// The port is read once at start-up; later lookups would go through the
/// Docker client of whichever test runtime happened to start the container.
struct SharedPostgres {
  _container: ContainerAsync<PostgresImage>,
  host: String,
  port: u16,
}

impl SharedPostgres {
  fn url(&self, db_name: &str) -> String {
    format!("postgresql://{PG_USER}:{PG_PASSWORD}@{}:{}/{db_name}", self.host, self.port)
  }
}

static POSTGRES: Lazy<OnceCell<SharedPostgres>> = Lazy::new(OnceCell::new);
static DB_COUNTER: AtomicUsize = AtomicUsize::new(0);

async fn start_postgres() -> SharedPostgres {
  let container = PostgresImage::default()
    .with_user(PG_USER)
    .with_password(PG_PASSWORD)
    .with_db_name("cart_test")
    .with_env_var("POSTGRES_INITDB_ARGS", "--auth-host=trust")
    .start()
    .await
    .expect("Failed to start PostgreSQL container");
  let port = container
    .get_host_port_ipv4(5432)
    .await
    .expect("Failed to get container port");
  let host = std::env::var("TESTCONTAINERS_HOST_OVERRIDE").unwrap_or_else(|_| "localhost".to_string());
  SharedPostgres {
    _container: container,
    host,
    port,
  }
}

/// An isolated database with the service migrations applied.
///
/// Databases are not dropped; they go away with the container.
pub struct TestDb {
  pub pool: PgPool,
  pub name: String,
}

impl TestDb {
  pub async fn new() -> Self {
    let server = POSTGRES.get_or_init(start_postgres).await;
    let name = format!(
      "cart_test_{}_{}",
      std::process::id(),
      DB_COUNTER.fetch_add(1, Ordering::SeqCst)
    );

    let mut admin = PgConnection::connect(&server.url("postgres"))
      .await
      .expect("Failed to connect to postgres database");
    sqlx::query(&format!("CREATE DATABASE \"{name}\""))
      .execute(&mut admin)
      .await
      .expect("Failed to create test database");
    admin.close().await.expect("Failed to close admin connection");

    let pool = PgPool::connect(&server.url(&name))
      .await
      .expect("Failed to create pool for database");
    sqlx::migrate!("./migrations")
      .run(&pool)
      .await
      .expect("Failed to run migrations on database");

    Self { pool, name }
  }

  pub fn store(&self) -> PgStore {
    PgStore::new(self.pool.clone())
  }

  /// Inserts an active product straight into the catalog table.
  pub async fn add_product(&self, price_cents: i64, stock_quantity: i32) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO products (id, name, price_cents, stock_quantity) VALUES ($1, $2, $3, $4)")
      .bind(id)
      .bind("Test product")
      .bind(price_cents)
      .bind(stock_quantity)
      .execute(&self.pool)
      .await
      .expect("Failed to insert product");
    id
  }

  pub async fn add_deleted_product(&self) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
      "INSERT INTO products (id, name, price_cents, stock_quantity, is_deleted, deleted_at) \
       VALUES ($1, $2, 10, 5, TRUE, NOW())",
    )
    .bind(id)
    .bind("Retired product")
    .execute(&self.pool)
    .await
    .expect("Failed to insert product");
    id
  }
}
