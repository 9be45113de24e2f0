use std::sync::Arc;

use gatehouse::auth::{AuthError, OperationContext, RefreshRequest};

use crate::support::setup_test_app;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_refreshes_have_one_winner() {
    let app = Arc::new(setup_test_app());
    let tokens = app.register("a@x.com", "p", &[]).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = app.service.clone();
        let refresh_token = tokens.refresh_token.clone();
        handles.push(tokio::spawn(async move {
            service.refresh(&OperationContext::new(), RefreshRequest::new(refresh_token)).await
        }));
    }

    let mut winners = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(pair) => winners.push(pair),
            Err(err) => assert!(matches!(err, AuthError::SessionMismatch), "unexpected {err:?}"),
        }
    }

    assert_eq!(winners.len(), 1);
    app.service
        .refresh(&OperationContext::new(), RefreshRequest::new(winners[0].refresh_token.clone()))
        .await
        .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_registrations_with_one_email() {
    let app = Arc::new(setup_test_app());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = app.service.clone();
        handles.push(tokio::spawn(async move {
            service
                .register(
                    &OperationContext::new(),
                    gatehouse::auth::RegisterRequest::new("race@x.com", "p"),
                )
                .await
        }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(err) => assert!(matches!(err, AuthError::EmailTaken)),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(app.users.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn users_do_not_share_sessions() {
    let app = Arc::new(setup_test_app());
    let alice = app.register("alice@x.com", "p", &[]).await;
    let bob = app.register("bob@x.com", "p", &[]).await;

    let (ctx_a, ctx_b) = (OperationContext::new(), OperationContext::new());
    let (a, b) = tokio::join!(
        app.service.refresh(&ctx_a, RefreshRequest::new(alice.refresh_token)),
        app.service.refresh(&ctx_b, RefreshRequest::new(bob.refresh_token)),
    );

    a.unwrap();
    b.unwrap();
}
