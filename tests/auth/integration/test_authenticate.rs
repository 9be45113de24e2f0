use std::time::Duration;

use gatehouse::auth::jwt::{sign, TokenSecret};
use gatehouse::auth::{AuthError, AuthenticateRequest, OperationContext, Role, UserClaims};
use gatehouse::domain::UserId;

use crate::support::{setup_test_app, setup_test_app_with, test_config, ACCESS_SECRET};

#[tokio::test]
async fn any_of_role_semantics() {
    let app = setup_test_app();
    let tokens = app.register("a@x.com", "p", &["regular"]).await;
    let ctx = OperationContext::new();

    let user = app
        .service
        .authenticate(
            &ctx,
            &AuthenticateRequest::new(tokens.access_token.clone(), vec![Role::Admin, Role::Regular]),
        )
        .await
        .unwrap();
    assert_eq!(user.email, "a@x.com");

    let err = app
        .service
        .authenticate(&ctx, &AuthenticateRequest::new(tokens.access_token.clone(), vec![Role::Admin]))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InsufficientPermission));

    app.service
        .authenticate(&ctx, &AuthenticateRequest::new(tokens.access_token, vec![]))
        .await
        .unwrap();
}

#[tokio::test]
async fn authenticate_never_touches_sessions() {
    let app = setup_test_app();
    let tokens = app.register("a@x.com", "p", &["admin"]).await;
    let before = app.sessions.calls();

    app.service
        .authenticate(
            &OperationContext::new(),
            &AuthenticateRequest::new(tokens.access_token, vec![Role::Admin]),
        )
        .await
        .unwrap();

    assert_eq!(app.sessions.calls(), before);
}

#[tokio::test]
async fn refresh_token_is_not_an_access_token() {
    let app = setup_test_app();
    let tokens = app.register("a@x.com", "p", &[]).await;

    let err = app
        .service
        .authenticate(&OperationContext::new(), &AuthenticateRequest::new(tokens.refresh_token, vec![]))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::TokenInvalid));
}

#[tokio::test]
async fn token_for_missing_user_is_user_not_found() {
    let app = setup_test_app();
    let claims = UserClaims { id: UserId::new(), email: "ghost@x.com".into() };
    let token = sign(&claims, chrono::Duration::minutes(5), &TokenSecret::new(ACCESS_SECRET.as_bytes()))
        .unwrap();

    let err = app
        .service
        .authenticate(&OperationContext::new(), &AuthenticateRequest::new(token, vec![]))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::UserNotFound));
}

#[tokio::test]
async fn expired_access_token_is_expired() {
    let mut config = test_config();
    config.access_token_ttl_seconds = 1;
    let app = setup_test_app_with(config);
    let tokens = app.register("a@x.com", "p", &[]).await;

    tokio::time::sleep(Duration::from_millis(2100)).await;

    let err = app
        .service
        .authenticate(&OperationContext::new(), &AuthenticateRequest::new(tokens.access_token, vec![]))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::TokenExpired));
}

#[tokio::test]
async fn role_changes_apply_to_existing_tokens() {
    let app = setup_test_app();
    let tokens = app.register("a@x.com", "p", &[]).await;
    let user_id = app.user_id("a@x.com").await;
    let ctx = OperationContext::new();
    let request = AuthenticateRequest::new(tokens.access_token, vec![Role::Support]);

    assert!(matches!(
        app.service.authenticate(&ctx, &request).await,
        Err(AuthError::InsufficientPermission)
    ));

    app.service.assign_roles(&ctx, &user_id, &["support", "bogus"]).await.unwrap();
    app.service.authenticate(&ctx, &request).await.unwrap();

    app.service.revoke_roles(&ctx, &user_id, &["support"]).await.unwrap();
    assert!(matches!(
        app.service.authenticate(&ctx, &request).await,
        Err(AuthError::InsufficientPermission)
    ));
}
