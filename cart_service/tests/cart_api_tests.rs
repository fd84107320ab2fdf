// cart_service/tests/cart_api_tests.rs

mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::{call_json, cart_uri, TestEnv};
use serde_json::{json, Value};
use uuid::Uuid;

fn data_totals(body: &Value) -> (i64, i64) {
  (
    body["data"]["totalItems"].as_i64().unwrap(),
    body["data"]["totalPrice"].as_i64().unwrap(),
  )
}

#[actix_web::test]
async fn add_and_remove_walkthrough_keeps_totals() {
  let env = TestEnv::new();
  let app = test::init_service(env.app()).await;
  let user = Uuid::new_v4();
  let product = env.add_product(10, 5);

  let req = test::TestRequest::post()
    .uri(&cart_uri(user))
    .set_json(json!({ "productId": product.to_string() }))
    .to_request();
  let (status, body) = call_json(&app, req).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], json!(true));
  assert_eq!(body["message"], "Item added to cart");
  assert_eq!(data_totals(&body), (1, 10));
  let cart_id = body["data"]["id"].as_str().unwrap().to_string();

  let req = test::TestRequest::post()
    .uri(&cart_uri(user))
    .set_json(json!({ "productId": product.to_string(), "cartId": cart_id }))
    .to_request();
  let (status, body) = call_json(&app, req).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Item quantity updated to cart");
  assert_eq!(data_totals(&body), (2, 20));
  assert_eq!(body["data"]["items"][0]["quantity"], json!(2));

  let req = test::TestRequest::put()
    .uri(&cart_uri(user))
    .set_json(json!({ "productId": product.to_string(), "cartId": cart_id, "removeProduct": 1 }))
    .to_request();
  let (status, body) = call_json(&app, req).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Item quantity reduced in cart");
  assert_eq!(data_totals(&body), (1, 10));

  let req = test::TestRequest::put()
    .uri(&cart_uri(user))
    .set_json(json!({ "productId": product.to_string(), "cartId": cart_id, "removeProduct": 1 }))
    .to_request();
  let (status, body) = call_json(&app, req).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Item updated to cart");
  assert_eq!(data_totals(&body), (0, 0));
  assert_eq!(body["data"]["items"], json!([]));
}

#[actix_web::test]
async fn second_product_is_appended_to_existing_cart() {
  let env = TestEnv::new();
  let app = test::init_service(env.app()).await;
  let user = Uuid::new_v4();
  let first = env.add_product(250, 3);
  let second = env.add_product(1_000, 3);

  let req = test::TestRequest::post()
    .uri(&cart_uri(user))
    .set_json(json!({ "productId": first.to_string() }))
    .to_request();
  let (_, body) = call_json(&app, req).await;
  let cart_id = body["data"]["id"].as_str().unwrap().to_string();

  let req = test::TestRequest::post()
    .uri(&cart_uri(user))
    .set_json(json!({ "productId": second.to_string(), "cartId": cart_id }))
    .to_request();
  let (status, body) = call_json(&app, req).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Item updated to cart");
  assert_eq!(data_totals(&body), (2, 1_250));
  assert_eq!(body["data"]["items"][1]["productId"], json!(second.to_string()));
}

#[actix_web::test]
async fn query_parameters_are_rejected_on_every_cart_route() {
  let env = TestEnv::new();
  let app = test::init_service(env.app()).await;
  let uri = format!("{}?page=2", cart_uri(Uuid::new_v4()));

  let requests = vec![
    test::TestRequest::post().uri(&uri).set_json(json!({})).to_request(),
    test::TestRequest::put().uri(&uri).set_json(json!({})).to_request(),
    test::TestRequest::get().uri(&uri).to_request(),
    test::TestRequest::delete().uri(&uri).to_request(),
  ];
  for req in requests {
    let (status, body) = call_json(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "status": false, "message": "page not found" }));
  }
}

#[actix_web::test]
async fn create_validates_product_before_touching_carts() {
  let env = TestEnv::new();
  let app = test::init_service(env.app()).await;
  let user = Uuid::new_v4();
  let sold_out = env.add_product(10, 0);
  let retired = env.add_deleted_product();
  let unknown = Uuid::new_v4();

  let cases = [
    (json!({}), StatusCode::BAD_REQUEST, "Product ID is required".to_string()),
    (json!({ "productId": "  " }), StatusCode::BAD_REQUEST, "Product ID is required".to_string()),
    (json!({ "productId": "abc" }), StatusCode::BAD_REQUEST, "Product ID is not valid".to_string()),
    (
      json!({ "productId": unknown.to_string() }),
      StatusCode::NOT_FOUND,
      format!("No product found by {}", unknown),
    ),
    (
      json!({ "productId": retired.to_string() }),
      StatusCode::NOT_FOUND,
      format!("No product found by {}", retired),
    ),
    (
      json!({ "productId": sold_out.to_string() }),
      StatusCode::BAD_REQUEST,
      format!("{} is out of stock currently", sold_out),
    ),
  ];
  for (payload, expected_status, expected_message) in cases {
    let req = test::TestRequest::post().uri(&cart_uri(user)).set_json(&payload).to_request();
    let (status, body) = call_json(&app, req).await;
    assert_eq!(status, expected_status, "{}", payload);
    assert_eq!(body["message"], json!(expected_message), "{}", payload);
  }
  assert_eq!(env.store.cart_count(), 0);
}

#[actix_web::test]
async fn create_without_cart_id_rejects_existing_cart() {
  let env = TestEnv::new();
  let app = test::init_service(env.app()).await;
  let user = Uuid::new_v4();
  let product = env.add_product(10, 5);

  for expected in [StatusCode::OK, StatusCode::BAD_REQUEST] {
    let req = test::TestRequest::post()
      .uri(&cart_uri(user))
      .set_json(json!({ "productId": product.to_string() }))
      .to_request();
    let (status, body) = call_json(&app, req).await;
    assert_eq!(status, expected);
    if status == StatusCode::BAD_REQUEST {
      assert_eq!(body["message"], "cart already exist, provide cart id");
    }
  }
  assert_eq!(env.store.cart_count(), 1);
}

#[actix_web::test]
async fn create_checks_the_supplied_cart_id() {
  let env = TestEnv::new();
  let app = test::init_service(env.app()).await;
  let user = Uuid::new_v4();
  let product = env.add_product(10, 5);
  let missing_cart = Uuid::new_v4();

  let cases = [
    (json!(""), StatusCode::BAD_REQUEST, "cartId could not be blank".to_string()),
    (json!("cart-1"), StatusCode::BAD_REQUEST, "cartId is not valid".to_string()),
    (
      json!(missing_cart.to_string()),
      StatusCode::NOT_FOUND,
      format!("No cart found by {}", missing_cart),
    ),
  ];
  for (cart_id, expected_status, expected_message) in cases {
    let req = test::TestRequest::post()
      .uri(&cart_uri(user))
      .set_json(json!({ "productId": product.to_string(), "cartId": cart_id }))
      .to_request();
    let (status, body) = call_json(&app, req).await;
    assert_eq!(status, expected_status);
    assert_eq!(body["message"], json!(expected_message));
  }
}

#[actix_web::test]
async fn foreign_cart_is_forbidden_for_create_and_update() {
  let env = TestEnv::new();
  let app = test::init_service(env.app()).await;
  let owner = Uuid::new_v4();
  let intruder = Uuid::new_v4();
  let product = env.add_product(10, 5);

  let req = test::TestRequest::post()
    .uri(&cart_uri(owner))
    .set_json(json!({ "productId": product.to_string() }))
    .to_request();
  let (_, body) = call_json(&app, req).await;
  let cart_id = body["data"]["id"].as_str().unwrap().to_string();

  let req = test::TestRequest::post()
    .uri(&cart_uri(intruder))
    .set_json(json!({ "productId": product.to_string(), "cartId": cart_id }))
    .to_request();
  let (status, body) = call_json(&app, req).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert_eq!(body["message"], "User is not allowed to update this cart");

  let req = test::TestRequest::put()
    .uri(&cart_uri(intruder))
    .set_json(json!({ "productId": product.to_string(), "cartId": cart_id, "removeProduct": 0 }))
    .to_request();
  let (status, _) = call_json(&app, req).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let req = test::TestRequest::get().uri(&cart_uri(owner)).to_request();
  let (_, body) = call_json(&app, req).await;
  assert_eq!(data_totals(&body), (1, 10));
}

#[actix_web::test]
async fn remove_product_zero_drops_the_whole_line() {
  let env = TestEnv::new();
  let app = test::init_service(env.app()).await;
  let user = Uuid::new_v4();
  let kept = env.add_product(5, 9);
  let dropped = env.add_product(30, 9);

  let req = test::TestRequest::post()
    .uri(&cart_uri(user))
    .set_json(json!({ "productId": kept.to_string() }))
    .to_request();
  let (_, body) = call_json(&app, req).await;
  let cart_id = body["data"]["id"].as_str().unwrap().to_string();

  for _ in 0..3 {
    let req = test::TestRequest::post()
      .uri(&cart_uri(user))
      .set_json(json!({ "productId": dropped.to_string(), "cartId": cart_id }))
      .to_request();
    let (status, _) = call_json(&app, req).await;
    assert_eq!(status, StatusCode::OK);
  }

  let req = test::TestRequest::put()
    .uri(&cart_uri(user))
    .set_json(json!({ "productId": dropped.to_string(), "cartId": cart_id, "removeProduct": 0 }))
    .to_request();
  let (status, body) = call_json(&app, req).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Item removed from cart");
  assert_eq!(data_totals(&body), (1, 5));
  assert_eq!(body["data"]["items"], json!([{ "productId": kept.to_string(), "quantity": 1 }]));
}

#[actix_web::test]
async fn update_rejects_bad_input_in_order() {
  let env = TestEnv::new();
  let app = test::init_service(env.app()).await;
  let user = Uuid::new_v4();
  let in_cart = env.add_product(10, 5);
  let not_in_cart = env.add_product(10, 5);

  let req = test::TestRequest::post()
    .uri(&cart_uri(user))
    .set_json(json!({ "productId": in_cart.to_string() }))
    .to_request();
  let (_, body) = call_json(&app, req).await;
  let cart_id = body["data"]["id"].as_str().unwrap().to_string();

  let cases = [
    (json!({}), StatusCode::NOT_FOUND, "data is required to add products in cart"),
    (json!({ "removeProduct": 1 }), StatusCode::BAD_REQUEST, "Product ID is required"),
    (
      json!({ "productId": in_cart.to_string(), "removeProduct": 1 }),
      StatusCode::BAD_REQUEST,
      "cart Id is required",
    ),
    (
      json!({ "productId": in_cart.to_string(), "cartId": "nope", "removeProduct": 1 }),
      StatusCode::BAD_REQUEST,
      "cart Id is not valid",
    ),
    (
      json!({ "productId": in_cart.to_string(), "cartId": cart_id }),
      StatusCode::BAD_REQUEST,
      "RemoveProduct is required and its value must be either 0 or 1",
    ),
    (
      json!({ "productId": in_cart.to_string(), "cartId": cart_id, "removeProduct": "1" }),
      StatusCode::BAD_REQUEST,
      "RemoveProduct is required and its value must be either 0 or 1",
    ),
    (
      json!({ "productId": in_cart.to_string(), "cartId": cart_id, "removeProduct": 2 }),
      StatusCode::BAD_REQUEST,
      "RemoveProduct is required and its value must be either 0 or 1",
    ),
    (
      json!({ "productId": not_in_cart.to_string(), "cartId": cart_id, "removeProduct": 1 }),
      StatusCode::NOT_FOUND,
      "No product found by this product id inside cart",
    ),
  ];
  for (payload, expected_status, expected_message) in cases {
    let req = test::TestRequest::put().uri(&cart_uri(user)).set_json(&payload).to_request();
    let (status, body) = call_json(&app, req).await;
    assert_eq!(status, expected_status, "{}", payload);
    assert_eq!(body["message"], expected_message, "{}", payload);
  }

  let req = test::TestRequest::get().uri(&cart_uri(user)).to_request();
  let (_, body) = call_json(&app, req).await;
  assert_eq!(data_totals(&body), (1, 10));
}

#[actix_web::test]
async fn get_and_empty_report_missing_cart() {
  let env = TestEnv::new();
  let app = test::init_service(env.app()).await;
  let user = Uuid::new_v4();
  let expected = json!({ "status": false, "message": format!("no cart found by {}", user) });

  let req = test::TestRequest::get().uri(&cart_uri(user)).to_request();
  let (status, body) = call_json(&app, req).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body, expected);

  let req = test::TestRequest::delete().uri(&cart_uri(user)).to_request();
  let (status, body) = call_json(&app, req).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body, expected);
}

#[actix_web::test]
async fn empty_cart_is_idempotent_and_keeps_the_cart() {
  let env = TestEnv::new();
  let app = test::init_service(env.app()).await;
  let user = Uuid::new_v4();
  let product = env.add_product(99, 5);

  let req = test::TestRequest::post()
    .uri(&cart_uri(user))
    .set_json(json!({ "productId": product.to_string() }))
    .to_request();
  let (_, body) = call_json(&app, req).await;
  let cart_id = body["data"]["id"].clone();

  for _ in 0..2 {
    let req = test::TestRequest::delete().uri(&cart_uri(user)).to_request();
    let (status, body) = call_json(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "cart made empty successfully");
    assert_eq!(body["data"]["id"], cart_id);
    assert_eq!(body["data"]["items"], json!([]));
    assert_eq!(data_totals(&body), (0, 0));
  }

  let req = test::TestRequest::get().uri(&cart_uri(user)).to_request();
  let (status, body) = call_json(&app, req).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Cart details are here");
  assert_eq!(body["data"]["id"], cart_id);
}

#[actix_web::test]
async fn malformed_path_and_body_are_client_errors() {
  let env = TestEnv::new();
  let app = test::init_service(env.app()).await;

  let req = test::TestRequest::get().uri("/users/not-a-user/cart").to_request();
  let (status, body) = call_json(&app, req).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["message"], "User ID is not valid");

  let req = test::TestRequest::post()
    .uri(&cart_uri(Uuid::new_v4()))
    .insert_header(("content-type", "application/json"))
    .set_payload("{not json")
    .to_request();
  let (status, body) = call_json(&app, req).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["message"].as_str().unwrap().starts_with("Invalid request body"));

  let req = test::TestRequest::post()
    .uri(&cart_uri(Uuid::new_v4()))
    .set_json(json!({ "productId": 42 }))
    .to_request();
  let (status, _) = call_json(&app, req).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn null_fields_count_as_supplied_and_missing_bodies_are_defaulted() {
  let env = TestEnv::new();
  let app = test::init_service(env.app()).await;
  let user = Uuid::new_v4();
  let product = env.add_product(10, 5);

  let req = test::TestRequest::post()
    .uri(&cart_uri(user))
    .set_json(json!({ "productId": product.to_string(), "cartId": null }))
    .to_request();
  let (status, body) = call_json(&app, req).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["message"], "cartId could not be blank");
  assert_eq!(env.store.cart_count(), 0);

  let req = test::TestRequest::post().uri(&cart_uri(user)).to_request();
  let (status, body) = call_json(&app, req).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["message"], "Product ID is required");

  let req = test::TestRequest::put()
    .uri(&cart_uri(user))
    .set_json(json!({ "productId": null }))
    .to_request();
  let (status, body) = call_json(&app, req).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["message"], "Product ID is required");

  let req = test::TestRequest::put().uri(&cart_uri(user)).to_request();
  let (status, body) = call_json(&app, req).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["message"], "data is required to add products in cart");
}

#[actix_web::test]
async fn remove_product_accepts_float_spelling_of_one() {
  let env = TestEnv::new();
  let app = test::init_service(env.app()).await;
  let user = Uuid::new_v4();
  let product = env.add_product(10, 5);

  let req = test::TestRequest::post()
    .uri(&cart_uri(user))
    .set_json(json!({ "productId": product.to_string() }))
    .to_request();
  let (_, body) = call_json(&app, req).await;
  let cart_id = body["data"]["id"].as_str().unwrap().to_string();

  let req = test::TestRequest::post()
    .uri(&cart_uri(user))
    .set_json(json!({ "productId": product.to_string(), "cartId": cart_id }))
    .to_request();
  let (status, _) = call_json(&app, req).await;
  assert_eq!(status, StatusCode::OK);

  let req = test::TestRequest::put()
    .uri(&cart_uri(user))
    .set_json(json!({ "productId": product.to_string(), "cartId": cart_id, "removeProduct": 1.0 }))
    .to_request();
  let (status, body) = call_json(&app, req).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Item quantity reduced in cart");
  assert_eq!(data_totals(&body), (1, 10));
}

#[actix_web::test]
async fn health_check_reports_ok() {
  let env = TestEnv::new();
  let app = test::init_service(env.app()).await;

  let req = test::TestRequest::get().uri("/health").to_request();
  let (status, body) = call_json(&app, req).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "status": "ok" }));
}
