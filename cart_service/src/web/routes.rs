// cart_service/src/web/routes.rs

use crate::web::handlers::cart_handlers;
use actix_web::{web, HttpResponse};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// Called from `main.rs` and from the HTTP tests to mount every route.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .route("/health", web::get().to(health_check_handler))
    .service(
      web::resource("/users/{user_id}/cart")
        .route(web::post().to(cart_handlers::create_cart_handler))
        .route(web::put().to(cart_handlers::update_cart_handler))
        .route(web::get().to(cart_handlers::get_cart_details_handler))
        .route(web::delete().to(cart_handlers::empty_cart_handler)),
    );
}
