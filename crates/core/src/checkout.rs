//! Order placement validation.

use thiserror::Error;

use crate::cart::{CartItem, CartSummary};
use crate::types::{Address, AddressId, Cost};

/// Reasons an order cannot be placed. Checked in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// The cart has no items.
    #[error("You must add items to cart first")]
    EmptyCart,
    /// The order total exceeds the wallet balance.
    #[error("You do not have enough balance in your wallet for this purchase")]
    InsufficientBalance,
    /// The user has no saved addresses.
    #[error("Please add a new address before proceeding.")]
    NoAddresses,
    /// No address (or an unknown one) was selected.
    #[error("Please select one shipping address to proceed.")]
    NoAddressSelected,
}

/// Validate an order before sending it to the backend.
///
/// On success returns the order total, which the caller deducts from the
/// wallet balance once the backend confirms the order.
///
/// # Errors
///
/// Returns the first failing [`CheckoutError`].
pub fn validate_checkout(
    items: &[CartItem],
    balance: Cost,
    addresses: &[Address],
    selected: Option<&AddressId>,
) -> Result<Cost, CheckoutError> {
    if items.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let total = CartSummary::of(items).total;
    if total > balance {
        return Err(CheckoutError::InsufficientBalance);
    }

    if addresses.is_empty() {
        return Err(CheckoutError::NoAddresses);
    }

    match selected {
        Some(id) if addresses.iter().any(|a| &a.id == id) => Ok(total),
        _ => Err(CheckoutError::NoAddressSelected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductId;

    fn item(cost: i64, qty: u32) -> CartItem {
        CartItem {
            product_id: ProductId::new("A"),
            qty,
            name: "Thing".to_string(),
            category: "Misc".to_string(),
            cost: Cost::from_units(cost),
            rating: 3,
            image: String::new(),
        }
    }

    fn home() -> Address {
        Address {
            id: AddressId::new("home"),
            address: "221B Baker Street".to_string(),
        }
    }

    #[test]
    fn test_empty_cart_fails_first() {
        let result = validate_checkout(&[], Cost::ZERO, &[], None);
        assert_eq!(result, Err(CheckoutError::EmptyCart));
    }

    #[test]
    fn test_balance_checked_before_addresses() {
        let result = validate_checkout(&[item(100, 2)], Cost::from_units(150), &[], None);
        assert_eq!(result, Err(CheckoutError::InsufficientBalance));
    }

    #[test]
    fn test_requires_an_address() {
        let result = validate_checkout(&[item(100, 1)], Cost::from_units(150), &[], None);
        assert_eq!(result, Err(CheckoutError::NoAddresses));
    }

    #[test]
    fn test_requires_a_known_selection() {
        let addresses = [home()];
        let unknown = AddressId::new("office");

        let result = validate_checkout(&[item(10, 1)], Cost::from_units(10), &addresses, None);
        assert_eq!(result, Err(CheckoutError::NoAddressSelected));

        let result = validate_checkout(
            &[item(10, 1)],
            Cost::from_units(10),
            &addresses,
            Some(&unknown),
        );
        assert_eq!(result, Err(CheckoutError::NoAddressSelected));
    }

    #[test]
    fn test_valid_order_returns_total() {
        let addresses = [home()];
        let selected = AddressId::new("home");
        let result = validate_checkout(
            &[item(10, 2), item(5, 1)],
            Cost::from_units(25),
            &addresses,
            Some(&selected),
        );
        assert_eq!(result, Ok(Cost::from_units(25)));
    }
}
