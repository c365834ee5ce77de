//! Integration tests for login, registration, and logout.

use std::sync::atomic::Ordering;

use qkart_integration_tests::{PASSWORD, TestContext, USERNAME};

#[tokio::test]
async fn test_login_shows_username_and_notice() {
    let ctx = TestContext::start().await;

    ctx.login().await;
    let (_, body) = ctx.page("/").await;

    assert!(body.contains("Logged in successfully"));
    assert!(body.contains(USERNAME));
    assert!(body.contains("LOGOUT"));

    // Flash notices show once
    let (_, body) = ctx.page("/").await;
    assert!(!body.contains("Logged in successfully"));
}

#[tokio::test]
async fn test_login_failure_shows_server_message() {
    let ctx = TestContext::start().await;

    let location = ctx
        .submit("/login", &[("username", USERNAME), ("password", "wrong-password")])
        .await;
    assert_eq!(location, "/login");

    let (_, body) = ctx.page("/login").await;
    assert!(body.contains("Password is incorrect"));
}

#[tokio::test]
async fn test_login_requires_username() {
    let ctx = TestContext::start().await;

    let location = ctx
        .submit("/login", &[("username", ""), ("password", PASSWORD)])
        .await;
    assert_eq!(location, "/login");

    let (_, body) = ctx.page("/login").await;
    assert!(body.contains("Username is a required field"));
}

#[tokio::test]
async fn test_register_validation_sends_nothing() {
    let ctx = TestContext::start().await;

    let location = ctx
        .submit(
            "/register",
            &[
                ("username", "newshopper"),
                ("password", "abc"),
                ("confirm_password", "abc"),
            ],
        )
        .await;
    assert_eq!(location, "/register");

    let (_, body) = ctx.page("/register").await;
    assert!(body.contains("Password must be at least 6 characters"));

    ctx.submit(
        "/register",
        &[
            ("username", "newshopper"),
            ("password", "abcdef"),
            ("confirm_password", "abcdeg"),
        ],
    )
    .await;
    let (_, body) = ctx.page("/register").await;
    assert!(body.contains("Passwords do not match"));

    assert_eq!(ctx.backend.calls.register.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_register_success_redirects_to_login() {
    let ctx = TestContext::start().await;

    let location = ctx
        .submit(
            "/register",
            &[
                ("username", "newshopper"),
                ("password", "abcdef"),
                ("confirm_password", "abcdef"),
            ],
        )
        .await;

    assert_eq!(location, "/login");
    let (_, body) = ctx.page("/login").await;
    assert!(body.contains("Registered Successfully"));
    assert_eq!(ctx.backend.calls.register.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let ctx = TestContext::start().await;
    ctx.login().await;

    let location = ctx.submit("/logout", &[]).await;
    assert_eq!(location, "/");

    let (_, body) = ctx.page("/").await;
    assert!(body.contains("Logged Out Successfully"));
    assert!(body.contains("REGISTER"));
    assert!(!body.contains("LOGOUT"));
}
