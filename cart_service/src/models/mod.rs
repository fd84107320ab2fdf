// cart_service/src/models/mod.rs

//! Records persisted by the cart service and the product records it reads.

pub mod cart;
pub mod product;

pub use cart::{Cart, CartItem};
pub use product::Product;
