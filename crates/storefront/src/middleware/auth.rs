//! Authentication middleware and extractors.
//!
//! A user is "logged in" when the session holds a [`SessionUser`], which is
//! written by the login handler from the backend's token response.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::middleware::flash::set_flash;
use crate::models::{Notice, SessionUser, session_keys};

/// Extractor that requires a logged-in user.
///
/// If nobody is logged in, full page requests are redirected to the login
/// page with a warning; HTMX requests get `401`.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub SessionUser);

/// Error returned when authentication is required but nobody is logged in.
pub enum AuthRejection {
    /// Redirect to login page (for full page requests).
    RedirectToLogin,
    /// Unauthorized response (for HTMX requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        if let Some(user) = session
            .get::<SessionUser>(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
        {
            return Ok(Self(user));
        }

        if parts.headers.contains_key("hx-request") {
            return Err(AuthRejection::Unauthorized);
        }

        let notice = Notice::warning(login_required_message(parts.uri.path()));
        if let Err(e) = set_flash(session, &notice).await {
            tracing::warn!("Failed to store login warning: {e}");
        }
        Err(AuthRejection::RedirectToLogin)
    }
}

/// Warning shown when a protected page bounces to login.
fn login_required_message(path: &str) -> &'static str {
    if path.starts_with("/checkout") {
        "You must be logged in to access checkout page"
    } else {
        "You must be logged in to access this page"
    }
}

/// Extractor that optionally gets the logged-in user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is logged in.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(
///     OptionalAuth(user): OptionalAuth,
/// ) -> impl IntoResponse {
///     match user {
///         Some(u) => format!("Hello, {}!", u.username),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
pub struct OptionalAuth(pub Option<SessionUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<SessionUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Store the logged-in user in the session.
///
/// Cycles the session ID to prevent fixation and drops any cart mirror left
/// by a previous user.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &SessionUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.remove_value(session_keys::CART).await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Log out: drop everything the session holds.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use qkart_core::{CartRecord, Cost};
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::models::AuthToken;

    fn user(username: &str) -> SessionUser {
        SessionUser {
            username: username.to_string(),
            token: AuthToken::new("token"),
            balance: Cost::from_units(5000),
        }
    }

    #[tokio::test]
    async fn test_login_drops_previous_cart_mirror() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        session
            .insert(session_keys::CART, vec![CartRecord::new("A", 2)])
            .await
            .unwrap();
        set_current_user(&session, &user("first.user")).await.unwrap();
        session
            .insert(session_keys::CART, vec![CartRecord::new("B", 1)])
            .await
            .unwrap();

        set_current_user(&session, &user("second.user")).await.unwrap();

        let cart: Option<Vec<CartRecord>> = session.get(session_keys::CART).await.unwrap();
        assert!(cart.is_none());
        let current: SessionUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.username, "second.user");
    }

    #[test]
    fn test_login_required_message() {
        assert_eq!(
            login_required_message("/checkout"),
            "You must be logged in to access checkout page"
        );
        assert_eq!(
            login_required_message("/thanks"),
            "You must be logged in to access this page"
        );
    }
}
