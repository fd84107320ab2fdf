// cart_service/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{info, instrument};

use crate::errors::{AppError, Result};
use crate::models::Cart;
use crate::pipelines::common_steps::required;
use crate::pipelines::contexts::{CartDetailsCtxData, CreateCartCtxData, EmptyCartCtxData, UpdateCartCtxData};
use crate::state::AppState;
use crate::web::extractors::{present, JsonBody, RejectQueryParams, UserIdPath};
use cartflow::{ContextData, PipelineResult};

// --- Request DTOs ---

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateCartPayload {
  pub product_id: Option<String>,
  /// `Some(None)` for an explicit `null`, which still counts as supplied.
  #[serde(default, deserialize_with = "present")]
  pub cart_id: Option<Option<String>>,
}

/// Known fields keep their presence so that `{"productId": null}` is not an
/// empty body.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartPayload {
  #[serde(default, deserialize_with = "present")]
  pub product_id: Option<Option<String>>,
  #[serde(default, deserialize_with = "present")]
  pub cart_id: Option<Option<String>>,
  /// Kept as raw JSON; only the numbers 0 and 1 are accepted later on.
  #[serde(default, deserialize_with = "present")]
  pub remove_product: Option<Option<Value>>,
  #[serde(flatten)]
  pub other: Map<String, Value>,
}

impl UpdateCartPayload {
  /// No keys at all, whatever their values.
  pub fn is_empty(&self) -> bool {
    self.product_id.is_none() && self.cart_id.is_none() && self.remove_product.is_none() && self.other.is_empty()
  }
}

// --- Helpers ---

/// Runs the pipeline registered for `T` and hands back the shared context.
async fn run_to_completion<T>(app_state: &AppState, ctx: T) -> Result<ContextData<T>>
where
  T: Send + Sync + 'static,
{
  let ctx_data = ContextData::new(ctx);
  match app_state.flows.run(ctx_data.clone()).await? {
    PipelineResult::Completed => Ok(ctx_data),
    PipelineResult::Stopped => Err(AppError::Internal(format!(
      "Pipeline for {} was halted",
      std::any::type_name::<T>()
    ))),
  }
}

fn cart_response(message: &str, cart: &Cart) -> HttpResponse {
  HttpResponse::Ok().json(json!({
    "status": true,
    "message": message,
    "data": cart,
  }))
}

// --- Handlers ---

#[instrument(name = "handler::create_cart", skip_all, fields(user_id = %user.0))]
pub async fn create_cart_handler(
  _query: RejectQueryParams,
  user: UserIdPath,
  app_state: web::Data<AppState>,
  req_payload: JsonBody<CreateCartPayload>,
) -> Result<HttpResponse> {
  let payload = req_payload.into_inner();
  let ctx = CreateCartCtxData::new(app_state.get_ref().clone(), user.0, payload.product_id, payload.cart_id);

  let ctx_data = run_to_completion(&app_state, ctx).await?;
  let outcome = required(ctx_data.snapshot(|c| c.outcome.clone()), "outcome")?;

  info!(cart_id = %outcome.cart.id, total_items = outcome.cart.total_items, "{}", outcome.message);
  Ok(cart_response(outcome.message, &outcome.cart))
}

#[instrument(name = "handler::update_cart", skip_all, fields(user_id = %user.0))]
pub async fn update_cart_handler(
  _query: RejectQueryParams,
  user: UserIdPath,
  app_state: web::Data<AppState>,
  req_payload: JsonBody<UpdateCartPayload>,
) -> Result<HttpResponse> {
  let payload = req_payload.into_inner();
  let mut ctx = UpdateCartCtxData::new(app_state.get_ref().clone(), user.0);
  ctx.body_is_empty = payload.is_empty();
  ctx.product_id_input = payload.product_id.flatten();
  ctx.cart_id_input = payload.cart_id.flatten();
  ctx.remove_product_input = payload.remove_product.flatten();

  let ctx_data = run_to_completion(&app_state, ctx).await?;
  let outcome = required(ctx_data.snapshot(|c| c.outcome.clone()), "outcome")?;

  info!(cart_id = %outcome.cart.id, total_items = outcome.cart.total_items, "{}", outcome.message);
  Ok(cart_response(outcome.message, &outcome.cart))
}

#[instrument(name = "handler::get_cart_details", skip_all, fields(user_id = %user.0))]
pub async fn get_cart_details_handler(
  _query: RejectQueryParams,
  user: UserIdPath,
  app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
  let ctx = CartDetailsCtxData {
    app_state: app_state.get_ref().clone(),
    user_id: user.0,
    cart: None,
  };

  let ctx_data = run_to_completion(&app_state, ctx).await?;
  let cart = required(ctx_data.snapshot(|c| c.cart.clone()), "cart")?;
  Ok(cart_response("Cart details are here", &cart))
}

#[instrument(name = "handler::empty_cart", skip_all, fields(user_id = %user.0))]
pub async fn empty_cart_handler(
  _query: RejectQueryParams,
  user: UserIdPath,
  app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
  let ctx = EmptyCartCtxData {
    app_state: app_state.get_ref().clone(),
    user_id: user.0,
    existing_cart: None,
    outcome: None,
  };

  let ctx_data = run_to_completion(&app_state, ctx).await?;
  let outcome = required(ctx_data.snapshot(|c| c.outcome.clone()), "outcome")?;

  info!(cart_id = %outcome.cart.id, "{}", outcome.message);
  Ok(cart_response(outcome.message, &outcome.cart))
}
