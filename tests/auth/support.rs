#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use gatehouse::auth::{
    AuthService, LoginRequest, NewUser, OperationContext, RegisterRequest, Role, TokenPair, User,
    UserLookup,
};
use gatehouse::config::AuthConfig;
use gatehouse::domain::UserId;
use gatehouse::storage::{
    InMemoryRoleRepository, InMemorySessionRepository, InMemoryUserRepository, RoleRepository,
    SessionRepository, SessionStatus, UserRepository,
};
use gatehouse::{Error, Result};

pub const ACCESS_SECRET: &str = "test-access-secret-0123456789abcdef";
pub const REFRESH_SECRET: &str = "test-refresh-secret-0123456789abcdef";

/// Valid config with the cheapest bcrypt cost.
pub fn test_config() -> AuthConfig {
    let mut config = AuthConfig::new(ACCESS_SECRET, REFRESH_SECRET);
    config.password.bcrypt_cost = 4;
    config
}

pub struct TestApp {
    pub service: AuthService,
    pub users: Arc<InMemoryUserRepository>,
    pub roles: Arc<InMemoryRoleRepository>,
    pub sessions: Arc<RecordingSessionRepository>,
}

impl TestApp {
    pub async fn register(&self, email: &str, password: &str, roles: &[&str]) -> TokenPair {
        self.service
            .register(
                &OperationContext::new(),
                RegisterRequest::new(email, password).with_roles(roles.iter().copied()),
            )
            .await
            .expect("register user")
    }

    pub async fn login(&self, email: &str, password: &str) -> TokenPair {
        self.service
            .login(&OperationContext::new(), LoginRequest::new(email, password))
            .await
            .expect("login user")
    }

    pub async fn user(&self, email: &str) -> User {
        self.users.find(&UserLookup::Email(email.to_string())).await.expect("user exists")
    }

    pub async fn user_id(&self, email: &str) -> UserId {
        self.user(email).await.id
    }
}

pub fn setup_test_app() -> TestApp {
    setup_test_app_with(test_config())
}

pub fn setup_test_app_with(config: AuthConfig) -> TestApp {
    let users = Arc::new(InMemoryUserRepository::new());
    let roles = Arc::new(InMemoryRoleRepository::new());
    let sessions = Arc::new(RecordingSessionRepository::default());
    let service = AuthService::new(users.clone(), roles.clone(), sessions.clone(), &config)
        .expect("build auth service");

    TestApp { service, users, roles, sessions }
}

/// In-memory session store that counts every call.
#[derive(Default)]
pub struct RecordingSessionRepository {
    inner: InMemorySessionRepository,
    calls: AtomicUsize,
}

impl RecordingSessionRepository {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn contains(&self, user_id: &UserId) -> bool {
        self.inner.contains(user_id)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl SessionRepository for RecordingSessionRepository {
    async fn save(&self, user_id: &UserId, fingerprint: &str) -> Result<()> {
        self.record();
        self.inner.save(user_id, fingerprint).await
    }

    async fn check(&self, user_id: &UserId, fingerprint: &str) -> Result<SessionStatus> {
        self.record();
        self.inner.check(user_id, fingerprint).await
    }

    async fn delete(&self, user_id: &UserId) -> Result<()> {
        self.record();
        self.inner.delete(user_id).await
    }

    async fn delete_if_current(&self, user_id: &UserId, fingerprint: &str) -> Result<bool> {
        self.record();
        self.inner.delete_if_current(user_id, fingerprint).await
    }

    async fn replace_if_current(
        &self,
        user_id: &UserId,
        current: &str,
        next: &str,
    ) -> Result<SessionStatus> {
        self.record();
        self.inner.replace_if_current(user_id, current, next).await
    }
}

/// Role store whose writes and checks always fail.
#[derive(Default)]
pub struct FailingRoleRepository;

#[async_trait]
impl RoleRepository for FailingRoleRepository {
    async fn check(&self, _: &UserId, _: &[Role]) -> Result<bool> {
        Err(Error::storage("role store unavailable"))
    }

    async fn list_for_user(&self, _: &UserId) -> Result<Vec<Role>> {
        Err(Error::storage("role store unavailable"))
    }

    async fn add(&self, _: &UserId, _: &[Role]) -> Result<()> {
        Err(Error::storage("role store unavailable"))
    }

    async fn remove(&self, _: &UserId, _: &[Role]) -> Result<()> {
        Err(Error::storage("role store unavailable"))
    }
}

/// User store that never answers.
#[derive(Default)]
pub struct StalledUserRepository;

#[async_trait]
impl UserRepository for StalledUserRepository {
    async fn find(&self, _: &UserLookup) -> Result<User> {
        std::future::pending().await
    }

    async fn save(&self, _: NewUser) -> Result<User> {
        std::future::pending().await
    }
}

/// User store that reports a backend failure on every call.
#[derive(Default)]
pub struct BrokenUserRepository;

#[async_trait]
impl UserRepository for BrokenUserRepository {
    async fn find(&self, _: &UserLookup) -> Result<User> {
        Err(Error::storage("connection reset by peer"))
    }

    async fn save(&self, _: NewUser) -> Result<User> {
        Err(Error::storage("connection reset by peer"))
    }
}

pub fn service_with(
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
) -> AuthService {
    AuthService::new(users, roles, Arc::new(InMemorySessionRepository::new()), &test_config())
        .expect("build auth service")
}
