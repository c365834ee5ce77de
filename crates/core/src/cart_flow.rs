//! Add/update-cart planning.
//!
//! A cart mutation moves through [`MutationState`]:
//!
//! ```text
//! Idle ──begin──▶ Pending ──resolve──▶ Succeeded(records)
//!                                 └──▶ Failed(message)
//! ```
//!
//! Whether a mutation may leave `Idle` at all is decided up front by
//! [`plan_add`] (for the product card's ADD TO CART button) or
//! [`QuantityChange::request`] (for the cart sidebar's +/- buttons). A rejected
//! add never reaches `Pending`, so it never touches the network.

use crate::cart::find_record;
use crate::types::{CartRecord, ProductId};

/// Why an add-to-cart was refused before any request was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddRejection {
    /// No session token; the user must log in first.
    NotLoggedIn,
    /// The product already has a cart record.
    AlreadyInCart,
}

impl AddRejection {
    /// User-facing warning text.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotLoggedIn => "Login to add an item to the Cart",
            Self::AlreadyInCart => {
                "Item already in cart. Use the cart sidebar to update quantity or remove item"
            }
        }
    }
}

/// Outcome of planning an add-to-cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddDecision {
    /// Do not send anything; warn the user instead.
    Rejected(AddRejection),
    /// Send this record to the backend.
    Send(CartRecord),
}

/// Plan adding a new product to the cart.
///
/// The login check comes first, then the duplicate check. New items are
/// always created with a quantity of one.
#[must_use]
pub fn plan_add(logged_in: bool, records: &[CartRecord], product_id: &ProductId) -> AddDecision {
    if !logged_in {
        return AddDecision::Rejected(AddRejection::NotLoggedIn);
    }
    if find_record(records, product_id).is_some() {
        return AddDecision::Rejected(AddRejection::AlreadyInCart);
    }
    AddDecision::Send(CartRecord::new(product_id.clone(), 1))
}

/// A +/- button press in the cart sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// One more unit.
    Increment,
    /// One fewer unit; reaching zero removes the line.
    Decrement,
}

impl QuantityChange {
    /// Apply to a current quantity. Never goes below zero.
    #[must_use]
    pub const fn apply(self, current: u32) -> u32 {
        match self {
            Self::Increment => current.saturating_add(1),
            Self::Decrement => current.saturating_sub(1),
        }
    }

    /// Build the record to send. A resulting quantity of zero is still sent.
    #[must_use]
    pub fn request(self, product_id: &ProductId, current: u32) -> CartRecord {
        CartRecord::new(product_id.clone(), self.apply(current))
    }
}

/// State of a single cart mutation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MutationState {
    /// Nothing sent yet.
    #[default]
    Idle,
    /// Request in flight.
    Pending,
    /// Backend accepted the change and returned the full cart.
    Succeeded(Vec<CartRecord>),
    /// Request failed; carries the message to show.
    Failed(String),
}

impl MutationState {
    /// Move from `Idle` to `Pending`. Other states are left unchanged.
    #[must_use]
    pub fn begin(self) -> Self {
        match self {
            Self::Idle => Self::Pending,
            other => other,
        }
    }

    /// Settle a pending mutation with the backend outcome.
    ///
    /// Only `Pending` can be resolved; other states are left unchanged.
    #[must_use]
    pub fn resolve(self, outcome: Result<Vec<CartRecord>, String>) -> Self {
        match self {
            Self::Pending => outcome.map_or_else(Self::Failed, Self::Succeeded),
            other => other,
        }
    }

    /// Whether a request is in flight.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Whether the mutation has reached a final state.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart() -> Vec<CartRecord> {
        vec![CartRecord::new("A", 2)]
    }

    #[test]
    fn test_add_requires_login() {
        let decision = plan_add(false, &cart(), &ProductId::new("B"));
        assert_eq!(decision, AddDecision::Rejected(AddRejection::NotLoggedIn));
    }

    #[test]
    fn test_login_check_precedes_duplicate_check() {
        let decision = plan_add(false, &cart(), &ProductId::new("A"));
        assert_eq!(decision, AddDecision::Rejected(AddRejection::NotLoggedIn));
    }

    #[test]
    fn test_add_rejects_duplicates() {
        let decision = plan_add(true, &cart(), &ProductId::new("A"));
        assert_eq!(decision, AddDecision::Rejected(AddRejection::AlreadyInCart));
    }

    #[test]
    fn test_add_new_item_sends_qty_one() {
        let decision = plan_add(true, &cart(), &ProductId::new("B"));
        assert_eq!(decision, AddDecision::Send(CartRecord::new("B", 1)));
    }

    #[test]
    fn test_quantity_change() {
        let id = ProductId::new("A");
        assert_eq!(QuantityChange::Increment.request(&id, 2), CartRecord::new("A", 3));
        assert_eq!(QuantityChange::Decrement.request(&id, 2), CartRecord::new("A", 1));
    }

    #[test]
    fn test_decrement_to_zero_is_still_a_request() {
        let record = QuantityChange::Decrement.request(&ProductId::new("A"), 1);
        assert_eq!(record.qty, 0);
        assert_eq!(QuantityChange::Decrement.apply(0), 0);
    }

    #[test]
    fn test_mutation_state_transitions() {
        let state = MutationState::default();
        assert_eq!(state, MutationState::Idle);

        let state = state.begin();
        assert!(state.is_pending());

        let state = state.resolve(Ok(cart()));
        assert!(state.is_settled());
        assert_eq!(state, MutationState::Succeeded(cart()));
    }

    #[test]
    fn test_mutation_failure_carries_message() {
        let state = MutationState::Idle
            .begin()
            .resolve(Err("Product doesn't exist".to_string()));
        assert_eq!(state, MutationState::Failed("Product doesn't exist".to_string()));
    }

    #[test]
    fn test_resolve_without_begin_is_ignored() {
        let state = MutationState::Idle.resolve(Ok(cart()));
        assert_eq!(state, MutationState::Idle);
    }
}
