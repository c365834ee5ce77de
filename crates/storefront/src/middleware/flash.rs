//! One-shot notices carried across a redirect.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::models::{Notice, session_keys};

/// Extractor that takes (and removes) the pending flash notice.
pub struct Flash(pub Option<Notice>);

impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let notice = match parts.extensions.get::<Session>() {
            Some(session) => session
                .remove::<Notice>(session_keys::FLASH)
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!("Failed to read flash notice: {e}");
                    None
                }),
            None => None,
        };

        Ok(Self(notice))
    }
}

/// Queue a notice for the next full page render.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_flash(
    session: &Session,
    notice: &Notice,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::FLASH, notice).await
}
