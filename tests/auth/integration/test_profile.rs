use gatehouse::auth::{AuthError, OperationContext, RegisterRequest, Role};
use gatehouse::domain::UserId;

use crate::support::setup_test_app;

#[tokio::test]
async fn profile_returns_user_and_roles() {
    let app = setup_test_app();
    let mut request = RegisterRequest::new("a@x.com", "p").with_roles(["support", "admin"]);
    request.first_name = Some("Ada".into());
    request.last_name = Some("Lovelace".into());
    app.service.register(&OperationContext::new(), request).await.unwrap();
    let user_id = app.user_id("a@x.com").await;

    let profile = app.service.profile(&OperationContext::new(), &user_id).await.unwrap();

    assert_eq!(profile.user.first_name.as_deref(), Some("Ada"));
    assert_eq!(profile.user.last_name.as_deref(), Some("Lovelace"));
    assert_eq!(profile.roles, vec![Role::Admin, Role::Support]);

    let json = serde_json::to_value(&profile).unwrap();
    assert!(json["user"].get("hashedPassword").is_none());
    assert_eq!(json["roles"], serde_json::json!(["admin", "support"]));
}

#[tokio::test]
async fn profile_of_unknown_user_fails() {
    let app = setup_test_app();

    let err = app.service.profile(&OperationContext::new(), &UserId::new()).await.unwrap_err();
    assert!(matches!(err, AuthError::UserNotFound));
}

#[tokio::test]
async fn profile_reads_current_roles() {
    let app = setup_test_app();
    app.register("a@x.com", "p", &["regular"]).await;
    let user_id = app.user_id("a@x.com").await;
    let ctx = OperationContext::new();

    app.service.assign_roles(&ctx, &user_id, &["admin"]).await.unwrap();
    let profile = app.service.profile(&ctx, &user_id).await.unwrap();
    assert_eq!(profile.roles, vec![Role::Admin, Role::Regular]);
}
