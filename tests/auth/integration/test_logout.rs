use gatehouse::auth::{AuthError, AuthenticateRequest, OperationContext, RefreshRequest};
use gatehouse::domain::UserId;

use crate::support::setup_test_app;

#[tokio::test]
async fn logout_twice_then_refresh_fails() {
    let app = setup_test_app();
    let tokens = app.register("a@x.com", "p", &[]).await;
    let user_id = app.user_id("a@x.com").await;
    let ctx = OperationContext::new();

    app.service.logout(&ctx, &user_id).await.unwrap();
    app.service.logout(&ctx, &user_id).await.unwrap();

    let err = app
        .service
        .refresh(&ctx, RefreshRequest::new(tokens.refresh_token))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::SessionNotFound));
}

#[tokio::test]
async fn logout_of_unknown_user_fails() {
    let app = setup_test_app();

    let err = app.service.logout(&OperationContext::new(), &UserId::new()).await.unwrap_err();
    assert!(matches!(err, AuthError::UserNotFound));
}

#[tokio::test]
async fn access_token_outlives_logout() {
    let app = setup_test_app();
    let tokens = app.register("a@x.com", "p", &[]).await;
    let user_id = app.user_id("a@x.com").await;

    app.service.logout(&OperationContext::new(), &user_id).await.unwrap();

    let user = app
        .service
        .authenticate(&OperationContext::new(), &AuthenticateRequest::new(tokens.access_token, vec![]))
        .await
        .unwrap();
    assert_eq!(user.id, user_id);
}
