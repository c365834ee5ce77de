//! Transient user notifications.
//!
//! A [`Notice`] reaches the browser in one of two ways:
//! - HTMX responses carry it in an `HX-Trigger` header as a `notify` event,
//!   which `static/notify.js` turns into a snackbar.
//! - Full page redirects store it in the session as a flash (see
//!   [`crate::middleware::flash`]) and the layout renders it once.

use serde::{Deserialize, Serialize};

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeVariant {
    Success,
    Info,
    Warning,
    Error,
}

impl NoticeVariant {
    /// CSS class suffix.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub variant: NoticeVariant,
    pub message: String,
}

impl Notice {
    /// Green notice for completed actions.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            variant: NoticeVariant::Success,
            message: message.into(),
        }
    }

    /// Neutral notice.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            variant: NoticeVariant::Info,
            message: message.into(),
        }
    }

    /// Notice for actions refused before any request.
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            variant: NoticeVariant::Warning,
            message: message.into(),
        }
    }

    /// Notice for failed requests.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            variant: NoticeVariant::Error,
            message: message.into(),
        }
    }

    /// CSS class suffix for templates.
    #[must_use]
    pub const fn class(&self) -> &'static str {
        self.variant.as_str()
    }

    /// Value for an `HX-Trigger` header firing a `notify` event.
    ///
    /// Non-ASCII characters are escaped so the value is always a valid
    /// header value, even for arbitrary server messages.
    #[must_use]
    pub fn hx_trigger(&self) -> String {
        let json = serde_json::json!({ "notify": self }).to_string();
        escape_non_ascii(&json)
    }
}

/// Replace every non-ASCII or control character with a JSON `\uXXXX` escape.
fn escape_non_ascii(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        if c.is_ascii() && !c.is_ascii_control() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    out
}
