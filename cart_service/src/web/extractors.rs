// cart_service/src/web/extractors.rs

use crate::errors::AppError;
use crate::validator;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

/// Fails with `page not found` when the request carries query parameters.
///
/// List it as the first handler argument so it is checked before the path and
/// body are extracted.
#[derive(Debug)]
pub struct RejectQueryParams;

impl FromRequest for RejectQueryParams {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    if validator::has_query_params(req.query_string()) {
      warn!(path = %req.path(), query = %req.query_string(), "Rejected request with query parameters.");
      return ready(Err(AppError::PageNotFound));
    }
    ready(Ok(RejectQueryParams))
  }
}

/// The `{user_id}` path segment parsed as a user identifier.
#[derive(Debug, Clone, Copy)]
pub struct UserIdPath(pub Uuid);

impl FromRequest for UserIdPath {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let parsed = req
      .match_info()
      .get("user_id")
      .and_then(validator::parse_id)
      .map(UserIdPath);
    match parsed {
      Some(user_id) => ready(Ok(user_id)),
      None => {
        warn!(path = %req.path(), "Rejected request with an invalid user id.");
        ready(Err(AppError::validation("User ID is not valid")))
      }
    }
  }
}

/// A JSON request body where an empty body counts as `T::default()`.
///
/// Anything else must parse as `T`; failures answer 400 in the usual envelope.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<T> JsonBody<T> {
  pub fn into_inner(self) -> T {
    self.0
  }
}

impl<T> FromRequest for JsonBody<T>
where
  T: DeserializeOwned + Default + 'static,
{
  type Error = actix_web::Error;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
    let body = web::Bytes::from_request(req, payload);
    Box::pin(async move {
      let bytes = body.await?;
      let parsed = parse_json_body(&bytes)?;
      Ok(JsonBody(parsed))
    })
  }
}

pub fn parse_json_body<T>(bytes: &[u8]) -> Result<T, AppError>
where
  T: DeserializeOwned + Default,
{
  if bytes.iter().all(u8::is_ascii_whitespace) {
    return Ok(T::default());
  }
  serde_json::from_slice(bytes).map_err(|err| {
    warn!("Rejected request body: {}", err);
    AppError::validation(format!("Invalid request body: {}", err))
  })
}

/// Deserializes a field that may be absent, `null` or a value into
/// `None`, `Some(None)` or `Some(Some(v))`. Pair it with `#[serde(default)]`.
pub fn present<'de, D, V>(deserializer: D) -> Result<Option<Option<V>>, D::Error>
where
  D: Deserializer<'de>,
  V: Deserialize<'de>,
{
  Option::<V>::deserialize(deserializer).map(Some)
}
