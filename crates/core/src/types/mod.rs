//! Core types for QKart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod credentials;
pub mod id;
pub mod price;
pub mod product;

pub use address::Address;
pub use credentials::{CredentialError, Password, Username};
pub use id::*;
pub use price::Cost;
pub use product::{CartRecord, Product};
