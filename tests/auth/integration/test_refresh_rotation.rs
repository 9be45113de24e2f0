use std::time::Duration;

use gatehouse::auth::jwt::{sign, TokenSecret};
use gatehouse::auth::{AuthError, OperationContext, RefreshRequest};

use crate::support::{setup_test_app, setup_test_app_with, test_config, REFRESH_SECRET};

#[tokio::test]
async fn refresh_rotates_the_session() {
    let app = setup_test_app();
    let t1 = app.register("a@x.com", "p", &[]).await;

    let t2 = app
        .service
        .refresh(&OperationContext::new(), RefreshRequest::new(t1.refresh_token.clone()))
        .await
        .unwrap();
    assert_ne!(t1.refresh_token, t2.refresh_token);

    let err = app
        .service
        .refresh(&OperationContext::new(), RefreshRequest::new(t1.refresh_token))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::SessionMismatch));

    app.service
        .refresh(&OperationContext::new(), RefreshRequest::new(t2.refresh_token))
        .await
        .unwrap();
}

#[tokio::test]
async fn access_token_cannot_refresh() {
    let app = setup_test_app();
    let tokens = app.register("a@x.com", "p", &[]).await;

    let err = app
        .service
        .refresh(&OperationContext::new(), RefreshRequest::new(tokens.access_token))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::TokenInvalid));
}

#[tokio::test]
async fn garbage_token_leaves_sessions_alone() {
    let app = setup_test_app();
    app.register("a@x.com", "p", &[]).await;
    let user_id = app.user_id("a@x.com").await;

    let err = app
        .service
        .refresh(&OperationContext::new(), RefreshRequest::new("not-a-token"))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::TokenInvalid));
    assert!(app.sessions.contains(&user_id));
}

#[tokio::test]
async fn expired_refresh_token_ends_its_session() {
    let mut config = test_config();
    config.refresh_token_ttl_seconds = 1;
    let app = setup_test_app_with(config);
    let tokens = app.register("a@x.com", "p", &[]).await;
    let user_id = app.user_id("a@x.com").await;

    tokio::time::sleep(Duration::from_millis(2100)).await;

    let err = app
        .service
        .refresh(&OperationContext::new(), RefreshRequest::new(tokens.refresh_token))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::TokenExpired));
    assert!(!app.sessions.contains(&user_id));
}

#[tokio::test]
async fn stale_expired_token_cannot_end_a_newer_session() {
    let app = setup_test_app();
    app.register("a@x.com", "p", &[]).await;
    let user = app.user("a@x.com").await;

    let stale = sign(&user.claims(), chrono::Duration::seconds(-60), &TokenSecret::new(REFRESH_SECRET.as_bytes()))
        .unwrap();

    let err = app
        .service
        .refresh(&OperationContext::new(), RefreshRequest::new(stale))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::TokenExpired));
    assert!(app.sessions.contains(&user.id));
}

#[tokio::test]
async fn valid_token_without_session_is_not_found() {
    let app = setup_test_app();
    let tokens = app.register("a@x.com", "p", &[]).await;
    let user_id = app.user_id("a@x.com").await;
    app.service.logout(&OperationContext::new(), &user_id).await.unwrap();

    let err = app
        .service
        .refresh(&OperationContext::new(), RefreshRequest::new(tokens.refresh_token))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::SessionNotFound));
}
