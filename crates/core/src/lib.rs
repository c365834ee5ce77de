//! QKart Core - Shared domain types and cart logic.
//!
//! This crate provides the types and pure logic used by the QKart storefront:
//! - `storefront` - Server-rendered shop backed by the QKart REST API
//! - `integration-tests` - End-to-end tests against a fake backend
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no timers. Everything here can be tested without a runtime.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, costs, credentials, and catalog records
//! - [`cart`] - Reconciliation of server cart records with the product catalog
//! - [`cart_flow`] - Add/update-cart planning and mutation states
//! - [`checkout`] - Order placement validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod cart_flow;
pub mod checkout;
pub mod types;

pub use cart::{CartItem, CartSummary, find_record, reconcile};
pub use cart_flow::{AddDecision, AddRejection, MutationState, QuantityChange, plan_add};
pub use checkout::{CheckoutError, validate_checkout};
pub use types::*;
