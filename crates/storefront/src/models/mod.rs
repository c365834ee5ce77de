//! Domain models for storefront.
//!
//! Types stored in the session and shown to the user.

pub mod notice;
pub mod session;

pub use notice::{Notice, NoticeVariant};
pub use session::{AuthToken, SessionUser, keys as session_keys};
