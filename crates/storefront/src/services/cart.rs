//! Cart mutations.
//!
//! Every mutation is driven through [`MutationState`]. Guards run first, so a
//! rejected add (not logged in, or already in the cart) is answered locally
//! and never reaches the backend.

use qkart_core::{
    AddDecision, AddRejection, CartRecord, MutationState, ProductId, QuantityChange, plan_add,
};
use reqwest::StatusCode;
use tracing::instrument;

use crate::api::{ApiError, CartApi};
use crate::models::{Notice, SessionUser};

/// Shown when adding fails without a structured server message.
pub const ADD_FAILED: &str =
    "Could not add to cart. Check that the backend is running, reachable and returns valid JSON";

/// Shown when a quantity change fails without a structured server message.
pub const QUANTITY_FAILED: &str = "Could not update quantity of card product. Check that the backend is running, reachable and returns valid JSON";

/// Shown when the cart cannot be loaded.
pub const FETCH_FAILED: &str = "Could not fetch cart details. Check that the backend is running, reachable and returns valid JSON";

/// Cart operations for one request.
pub struct CartService<'a, A> {
    api: &'a A,
}

impl<'a, A: CartApi> CartService<'a, A> {
    /// Create a cart service backed by `api`.
    #[must_use]
    pub const fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Load the user's cart records.
    ///
    /// A `400` surfaces the server's message; anything else gets the generic
    /// connectivity message.
    ///
    /// # Errors
    ///
    /// Returns the notice to show when the cart cannot be loaded.
    #[instrument(skip(self, user), fields(username = %user.username))]
    pub async fn fetch(&self, user: &SessionUser) -> Result<Vec<CartRecord>, Notice> {
        self.api.get_cart(&user.token).await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to fetch cart");
            match e {
                ApiError::Status {
                    status,
                    message: Some(message),
                } if status == StatusCode::BAD_REQUEST => Notice::error(message),
                _ => Notice::error(FETCH_FAILED),
            }
        })
    }

    /// Add a product that is not yet in the cart, with a quantity of one.
    ///
    /// `records` is the cart as last seen by this session.
    ///
    /// # Errors
    ///
    /// Returns a warning when the add is refused locally, or an error notice
    /// when the backend rejects it.
    #[instrument(skip(self, user, records), fields(logged_in = user.is_some()))]
    pub async fn add(
        &self,
        user: Option<&SessionUser>,
        records: &[CartRecord],
        product_id: &ProductId,
    ) -> Result<Vec<CartRecord>, Notice> {
        let record = match plan_add(user.is_some(), records, product_id) {
            AddDecision::Rejected(reason) => {
                tracing::debug!(?reason, "Add to cart refused");
                return Err(Notice::warning(reason.message()));
            }
            AddDecision::Send(record) => record,
        };

        let Some(user) = user else {
            return Err(Notice::warning(AddRejection::NotLoggedIn.message()));
        };

        self.send(user, &record, ADD_FAILED).await
    }

    /// Apply a +/- press to a cart line. Decrementing to zero removes it.
    ///
    /// # Errors
    ///
    /// Returns an error notice when the backend rejects the change.
    #[instrument(skip(self, user), fields(username = %user.username))]
    pub async fn change_quantity(
        &self,
        user: &SessionUser,
        product_id: &ProductId,
        current: u32,
        change: QuantityChange,
    ) -> Result<Vec<CartRecord>, Notice> {
        let record = change.request(product_id, current);
        self.send(user, &record, QUANTITY_FAILED).await
    }

    async fn send(
        &self,
        user: &SessionUser,
        record: &CartRecord,
        fallback: &str,
    ) -> Result<Vec<CartRecord>, Notice> {
        let state = MutationState::Idle.begin();

        let outcome = self
            .api
            .update_cart(&user.token, record)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, product_id = %record.product_id, "Cart update failed");
                e.user_message(fallback).to_string()
            });

        match state.resolve(outcome) {
            MutationState::Succeeded(records) => Ok(records),
            MutationState::Failed(message) => Err(Notice::error(message)),
            MutationState::Idle | MutationState::Pending => Err(Notice::error(fallback)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use qkart_core::Cost;

    use super::*;
    use crate::models::{AuthToken, NoticeVariant};

    type Reply = Box<dyn Fn(&CartRecord) -> Result<Vec<CartRecord>, ApiError> + Send + Sync>;

    /// In-memory stand-in for the backend that counts calls.
    struct FakeCart {
        calls: AtomicUsize,
        sent: Mutex<Vec<CartRecord>>,
        reply: Reply,
    }

    impl FakeCart {
        fn replying<F>(reply: F) -> Self
        where
            F: Fn(&CartRecord) -> Result<Vec<CartRecord>, ApiError> + Send + Sync + 'static,
        {
            Self {
                calls: AtomicUsize::new(0),
                sent: Mutex::new(Vec::new()),
                reply: Box::new(reply),
            }
        }

        fn echoing() -> Self {
            Self::replying(|record| Ok(vec![record.clone()]))
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl CartApi for FakeCart {
        async fn get_cart(&self, _token: &AuthToken) -> Result<Vec<CartRecord>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.reply)(&CartRecord::new("A", 1))
        }

        async fn update_cart(
            &self,
            _token: &AuthToken,
            record: &CartRecord,
        ) -> Result<Vec<CartRecord>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.sent.lock().unwrap().push(record.clone());
            (self.reply)(record)
        }
    }

    fn user() -> SessionUser {
        SessionUser {
            username: "crio.do".to_string(),
            token: AuthToken::new("token"),
            balance: Cost::from_units(5000),
        }
    }

    fn transport_error() -> ApiError {
        ApiError::Transport(reqwest::Client::new().get("not a url").build().unwrap_err())
    }

    #[tokio::test]
    async fn test_unauthenticated_add_sends_nothing() {
        let api = FakeCart::echoing();
        let result = CartService::new(&api)
            .add(None, &[], &ProductId::new("A"))
            .await;

        let notice = result.unwrap_err();
        assert_eq!(notice.variant, NoticeVariant::Warning);
        assert_eq!(notice.message, "Login to add an item to the Cart");
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_add_sends_nothing() {
        let api = FakeCart::echoing();
        let records = [CartRecord::new("A", 2)];
        let result = CartService::new(&api)
            .add(Some(&user()), &records, &ProductId::new("A"))
            .await;

        assert_eq!(
            result.unwrap_err().message,
            "Item already in cart. Use the cart sidebar to update quantity or remove item"
        );
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn test_add_sends_qty_one() {
        let api = FakeCart::echoing();
        let records = CartService::new(&api)
            .add(Some(&user()), &[], &ProductId::new("B"))
            .await
            .unwrap();

        assert_eq!(records, vec![CartRecord::new("B", 1)]);
        assert_eq!(*api.sent.lock().unwrap(), vec![CartRecord::new("B", 1)]);
    }

    #[tokio::test]
    async fn test_decrement_from_one_sends_zero() {
        let api = FakeCart::replying(|_| Ok(Vec::new()));
        let records = CartService::new(&api)
            .change_quantity(&user(), &ProductId::new("A"), 1, QuantityChange::Decrement)
            .await
            .unwrap();

        assert!(records.is_empty());
        assert_eq!(*api.sent.lock().unwrap(), vec![CartRecord::new("A", 0)]);
    }

    #[tokio::test]
    async fn test_structured_error_is_verbatim() {
        let api = FakeCart::replying(|_| {
            Err(ApiError::Status {
                status: StatusCode::NOT_FOUND,
                message: Some("Product doesn't exist".to_string()),
            })
        });
        let notice = CartService::new(&api)
            .add(Some(&user()), &[], &ProductId::new("Z"))
            .await
            .unwrap_err();

        assert_eq!(notice.variant, NoticeVariant::Error);
        assert_eq!(notice.message, "Product doesn't exist");
    }

    #[tokio::test]
    async fn test_transport_error_uses_generic_message() {
        let api = FakeCart::replying(|_| Err(transport_error()));
        let service = CartService::new(&api);

        let notice = service
            .add(Some(&user()), &[], &ProductId::new("B"))
            .await
            .unwrap_err();
        assert_eq!(notice.message, ADD_FAILED);

        let notice = service
            .change_quantity(&user(), &ProductId::new("B"), 2, QuantityChange::Increment)
            .await
            .unwrap_err();
        assert_eq!(notice.message, QUANTITY_FAILED);
        assert_eq!(api.calls(), 2);
    }

    #[tokio::test]
    async fn test_fetch_surfaces_bad_request_message_only() {
        let api = FakeCart::replying(|_| {
            Err(ApiError::Status {
                status: StatusCode::BAD_REQUEST,
                message: Some("Protected route, Oauth2 Bearer token not found".to_string()),
            })
        });
        let notice = CartService::new(&api).fetch(&user()).await.unwrap_err();
        assert_eq!(notice.message, "Protected route, Oauth2 Bearer token not found");

        let api = FakeCart::replying(|_| {
            Err(ApiError::Status {
                status: StatusCode::UNAUTHORIZED,
                message: Some("Unauthorized".to_string()),
            })
        });
        let notice = CartService::new(&api).fetch(&user()).await.unwrap_err();
        assert_eq!(notice.message, FETCH_FAILED);
    }
}
