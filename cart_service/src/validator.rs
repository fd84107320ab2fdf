// cart_service/src/validator.rs

//! Input predicates shared by the cart pipelines.

use std::collections::HashMap;
use uuid::Uuid;

/// Present and not just whitespace.
pub fn is_valid_input_value(value: Option<&str>) -> bool {
  value.is_some_and(|v| !v.trim().is_empty())
}

/// A well-formed entity identifier (hyphenated or simple UUID).
pub fn is_valid_id(value: &str) -> bool {
  Uuid::parse_str(value.trim()).is_ok()
}

pub fn parse_id(value: &str) -> Option<Uuid> {
  Uuid::parse_str(value.trim()).ok()
}

/// Whether a raw query string carries at least one parameter.
///
/// A bare `?` or stray separators do not count. Anything that does not parse
/// as a form-encoded query is treated as carrying parameters.
pub fn has_query_params(query_string: &str) -> bool {
  if query_string.split('&').all(str::is_empty) {
    return false;
  }
  match actix_web::web::Query::<HashMap<String, String>>::from_query(query_string) {
    Ok(params) => !params.is_empty(),
    Err(_) => true,
  }
}
