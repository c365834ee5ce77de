//! Business logic services for storefront.
//!
//! # Services
//!
//! - `cart` - Add/update-cart flow on top of the QKart cart endpoints

pub mod cart;

pub use cart::CartService;
