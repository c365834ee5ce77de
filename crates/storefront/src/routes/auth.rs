//! Authentication route handlers.
//!
//! Handles login, registration, and logout against the QKart auth
//! endpoints. Outcomes are reported as flash notices across redirects.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use qkart_core::{Password, Username};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::layout::Chrome;
use super::redirect_with;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::middleware::{Flash, OptionalAuth, clear_current_user, set_current_user};
use crate::models::{AuthToken, Notice, SessionUser};
use crate::state::AppState;

/// Shown when the auth endpoints give no structured answer.
pub const AUTH_FAILED: &str =
    "Something went wrong. Check that the backend is running, reachable and returns valid JSON.";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Registration form data.
#[derive(Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub chrome: Chrome,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub chrome: Chrome,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(OptionalAuth(user): OptionalAuth, Flash(flash): Flash) -> impl IntoResponse {
    LoginTemplate {
        chrome: Chrome::without_auth_buttons(user.as_ref(), flash),
    }
}

/// Handle login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let credentials = Username::parse(&form.username)
        .and_then(|username| Password::parse(&form.password).map(|password| (username, password)));
    let (username, password) = match credentials {
        Ok(credentials) => credentials,
        Err(e) => return redirect_with(&session, Notice::warning(e.to_string()), "/login").await,
    };

    let response = match state.api().login(&username, &password).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Login failed: {e}");
            return redirect_with(&session, Notice::error(e.user_message(AUTH_FAILED)), "/login")
                .await;
        }
    };

    let user = SessionUser {
        username: response.username,
        token: AuthToken::new(response.token),
        balance: response.balance,
    };

    if let Err(e) = set_current_user(&session, &user).await {
        tracing::error!("Failed to set session: {e}");
        return redirect_with(&session, Notice::error(AUTH_FAILED), "/login").await;
    }

    set_sentry_user(&user.username);
    tracing::info!(username = %user.username, "Logged in");

    redirect_with(&session, Notice::success("Logged in successfully"), "/").await
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(
    OptionalAuth(user): OptionalAuth,
    Flash(flash): Flash,
) -> impl IntoResponse {
    RegisterTemplate {
        chrome: Chrome::without_auth_buttons(user.as_ref(), flash),
    }
}

/// Handle registration form submission.
///
/// Validation failures are reported without calling the backend.
#[instrument(skip(state, session, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    let credentials = Username::parse_new(&form.username).and_then(|username| {
        Password::parse_new(&form.password, &form.confirm_password)
            .map(|password| (username, password))
    });
    let (username, password) = match credentials {
        Ok(credentials) => credentials,
        Err(e) => return redirect_with(&session, Notice::warning(e.to_string()), "/register").await,
    };

    if let Err(e) = state.api().register(&username, &password).await {
        tracing::warn!("Registration failed: {e}");
        return redirect_with(&session, Notice::error(e.user_message(AUTH_FAILED)), "/register")
            .await;
    }

    tracing::info!(username = %username, "Registered");
    redirect_with(&session, Notice::success("Registered Successfully"), "/login").await
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {e}");
    }
    clear_sentry_user();

    redirect_with(&session, Notice::success("Logged Out Successfully"), "/").await
}
