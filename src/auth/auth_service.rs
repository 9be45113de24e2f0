//! Account lifecycle orchestration: register, login, refresh, logout,
//! authenticate and profile.

use std::sync::Arc;

use tracing::{debug, error, field, info, instrument, warn, Span};

use crate::auth::authorization::AuthorizationGate;
use crate::auth::context::OperationContext;
use crate::auth::hashing::CredentialVerifier;
use crate::auth::jwt::TokenIssuer;
use crate::auth::models::{
    AuthError, AuthenticateRequest, LoginRequest, Profile, RefreshRequest, RegisterRequest,
    TokenPair,
};
use crate::auth::session::SessionRegister;
use crate::auth::user::{NewUser, User, UserClaims, UserLookup};
use crate::config::AuthConfig;
use crate::domain::UserId;
use crate::errors::{Error, Result};
use crate::storage::{
    InMemoryRoleRepository, InMemorySessionRepository, InMemoryUserRepository, RoleRepository,
    SessionRepository, UserRepository,
};

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    gate: AuthorizationGate,
    sessions: SessionRegister,
    credentials: CredentialVerifier,
    tokens: Arc<TokenIssuer>,
}

impl AuthService {
    /// Build the service over the given stores. Fails when `config` is invalid.
    pub fn new(
        users: Arc<dyn UserRepository>,
        roles: Arc<dyn RoleRepository>,
        sessions: Arc<dyn SessionRepository>,
        config: &AuthConfig,
    ) -> Result<Self> {
        validator::Validate::validate(config)?;
        config.validate_custom()?;

        let credentials = CredentialVerifier::new(&config.password)
            .map_err(|e| Error::config(e.to_string()))?;

        Ok(Self {
            users,
            gate: AuthorizationGate::new(roles),
            sessions: SessionRegister::new(sessions),
            credentials,
            tokens: Arc::new(TokenIssuer::from_config(config)),
        })
    }

    pub fn in_memory(config: &AuthConfig) -> Result<Self> {
        Self::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryRoleRepository::new()),
            Arc::new(InMemorySessionRepository::new()),
            config,
        )
    }

    /// Create an account, assign its roles and open its first session.
    ///
    /// When role assignment fails the user record is kept and the error is
    /// returned; no session is opened in that case.
    #[instrument(
        skip_all,
        fields(operation = "register", correlation_id = %ctx.correlation_id(), user_id = field::Empty)
    )]
    pub async fn register(
        &self,
        ctx: &OperationContext,
        request: RegisterRequest,
    ) -> std::result::Result<TokenPair, AuthError> {
        let email = User::normalize_email(&request.email);
        debug!(requested_roles = request.roles.len(), "registering user");

        ctx.ensure_active("credentials.hash")?;
        let hashed_password = self.credentials.hash(&request.password).map_err(|err| {
            error!(error = %err, "password hashing failed");
            AuthError::from(err)
        })?;

        let new_user = NewUser {
            last_name: request.last_name,
            first_name: request.first_name,
            middle_name: request.middle_name,
            email,
            hashed_password,
        };

        let user = match ctx.run("users.save", self.users.save(new_user)).await? {
            Ok(user) => user,
            Err(err) if err.is_conflict() => {
                warn!("registration rejected: email already taken");
                return Err(AuthError::EmailTaken);
            }
            Err(err) => {
                error!(error = %err, "failed to create user");
                return Err(err.into());
            }
        };
        Span::current().record("user_id", field::display(&user.id));

        ctx.run("roles.add", self.gate.add(&user.id, &request.roles)).await?.map_err(|err| {
            error!(error = %err, "role assignment failed; user record kept");
            AuthError::from(err)
        })?;

        let tokens = self.start_session(ctx, &user.claims()).await?;
        info!("user registered");
        Ok(tokens)
    }

    /// Exchange email and password for a fresh token pair. Any previous
    /// session of the user is replaced.
    #[instrument(
        skip_all,
        fields(operation = "login", correlation_id = %ctx.correlation_id(), user_id = field::Empty)
    )]
    pub async fn login(
        &self,
        ctx: &OperationContext,
        request: LoginRequest,
    ) -> std::result::Result<TokenPair, AuthError> {
        let lookup = UserLookup::Email(User::normalize_email(&request.email));

        let user = match ctx.run("users.find", self.users.find(&lookup)).await? {
            Ok(user) => user,
            Err(err) if err.is_not_found() => {
                self.credentials.compare_dummy(&request.password);
                warn!("login attempt for unknown email");
                return Err(AuthError::UserNotFound);
            }
            Err(err) => {
                error!(error = %err, "failed to look up user");
                return Err(err.into());
            }
        };
        Span::current().record("user_id", field::display(&user.id));

        ctx.ensure_active("credentials.compare")?;
        if let Err(err) = self.credentials.compare(&user.hashed_password, &request.password) {
            warn!("login rejected: password mismatch");
            return Err(err.into());
        }

        let tokens = self.start_session(ctx, &user.claims()).await?;
        info!("user logged in");
        Ok(tokens)
    }

    /// Rotate a refresh token. The presented token must be the user's
    /// registered session; afterwards only the new one is.
    #[instrument(
        skip_all,
        fields(operation = "refresh", correlation_id = %ctx.correlation_id(), user_id = field::Empty)
    )]
    pub async fn refresh(
        &self,
        ctx: &OperationContext,
        request: RefreshRequest,
    ) -> std::result::Result<TokenPair, AuthError> {
        let claims = match self.tokens.verify_refresh(&request.refresh_token) {
            Ok(claims) => claims,
            Err(err) => {
                warn!(error = %err, "refresh token rejected");
                self.revoke_rejected_refresh(ctx, &request.refresh_token).await?;
                return Err(err.into());
            }
        };
        Span::current().record("user_id", field::display(&claims.sub));

        ctx.run("sessions.check", self.sessions.check(&claims.sub, &request.refresh_token))
            .await?
            .map_err(|err| {
                warn!(error = %err, "refresh token is not the registered session");
                AuthError::from(err)
            })?;

        ctx.ensure_active("tokens.issue")?;
        let tokens = self.tokens.issue_pair(&claims.user_claims()).map_err(|err| {
            error!(error = %err, "failed to issue tokens");
            AuthError::from(err)
        })?;

        ctx.run(
            "sessions.rotate",
            self.sessions.rotate(&claims.sub, &request.refresh_token, &tokens.refresh_token),
        )
        .await?
        .map_err(|err| {
            warn!(error = %err, "session changed during rotation");
            AuthError::from(err)
        })?;

        info!("refresh token rotated");
        Ok(tokens)
    }

    /// End the user's session. Ending a session that does not exist succeeds.
    #[instrument(
        skip_all,
        fields(operation = "logout", correlation_id = %ctx.correlation_id(), user_id = %user_id)
    )]
    pub async fn logout(
        &self,
        ctx: &OperationContext,
        user_id: &UserId,
    ) -> std::result::Result<(), AuthError> {
        self.find_user(ctx, user_id).await?;

        ctx.run("sessions.delete", self.sessions.delete(user_id)).await?.map_err(|err| {
            error!(error = %err, "failed to delete session");
            AuthError::from(err)
        })?;

        info!("user logged out");
        Ok(())
    }

    /// Resolve an access token to its user, requiring ANY of the requested roles.
    /// Session state is not consulted.
    #[instrument(
        skip_all,
        fields(operation = "authenticate", correlation_id = %ctx.correlation_id(), user_id = field::Empty)
    )]
    pub async fn authenticate(
        &self,
        ctx: &OperationContext,
        request: &AuthenticateRequest,
    ) -> std::result::Result<User, AuthError> {
        let claims = self.tokens.verify_access(&request.access_token).map_err(|err| {
            warn!(error = %err, "access token rejected");
            AuthError::from(err)
        })?;
        Span::current().record("user_id", field::display(&claims.sub));

        let user = self.find_user(ctx, &claims.sub).await?;

        let allowed = ctx.run("roles.check", self.gate.check(&user.id, &request.roles)).await??;
        if !allowed {
            warn!(required = ?request.roles, "insufficient permission");
            return Err(AuthError::InsufficientPermission);
        }

        debug!("access token authenticated");
        Ok(user)
    }

    /// The user record together with the user's current roles.
    #[instrument(
        skip_all,
        fields(operation = "profile", correlation_id = %ctx.correlation_id(), user_id = %user_id)
    )]
    pub async fn profile(
        &self,
        ctx: &OperationContext,
        user_id: &UserId,
    ) -> std::result::Result<Profile, AuthError> {
        let user = self.find_user(ctx, user_id).await?;
        let roles = ctx.run("roles.list", self.gate.list(user_id)).await?.map_err(|err| {
            error!(error = %err, "failed to list roles");
            AuthError::from(err)
        })?;

        Ok(Profile { user, roles })
    }

    /// Grant roles by name to an existing user. Unknown names are skipped.
    #[instrument(
        skip_all,
        fields(operation = "assign_roles", correlation_id = %ctx.correlation_id(), user_id = %user_id)
    )]
    pub async fn assign_roles<S: AsRef<str> + Sync>(
        &self,
        ctx: &OperationContext,
        user_id: &UserId,
        roles: &[S],
    ) -> std::result::Result<(), AuthError> {
        self.find_user(ctx, user_id).await?;
        ctx.run("roles.add", self.gate.add(user_id, roles)).await??;
        info!(count = roles.len(), "roles assigned");
        Ok(())
    }

    /// Withdraw roles by name from an existing user. Unknown names are skipped.
    #[instrument(
        skip_all,
        fields(operation = "revoke_roles", correlation_id = %ctx.correlation_id(), user_id = %user_id)
    )]
    pub async fn revoke_roles<S: AsRef<str> + Sync>(
        &self,
        ctx: &OperationContext,
        user_id: &UserId,
        roles: &[S],
    ) -> std::result::Result<(), AuthError> {
        self.find_user(ctx, user_id).await?;
        ctx.run("roles.remove", self.gate.remove(user_id, roles)).await??;
        info!(count = roles.len(), "roles revoked");
        Ok(())
    }

    async fn find_user(
        &self,
        ctx: &OperationContext,
        user_id: &UserId,
    ) -> std::result::Result<User, AuthError> {
        let lookup = UserLookup::Id(user_id.clone());
        match ctx.run("users.find", self.users.find(&lookup)).await? {
            Ok(user) => Ok(user),
            Err(err) if err.is_not_found() => {
                warn!("user not found");
                Err(AuthError::UserNotFound)
            }
            Err(err) => {
                error!(error = %err, "failed to look up user");
                Err(err.into())
            }
        }
    }

    async fn start_session(
        &self,
        ctx: &OperationContext,
        claims: &UserClaims,
    ) -> std::result::Result<TokenPair, AuthError> {
        ctx.ensure_active("tokens.issue")?;
        let tokens = self.tokens.issue_pair(claims).map_err(|err| {
            error!(error = %err, "failed to issue tokens");
            AuthError::from(err)
        })?;

        ctx.run("sessions.save", self.sessions.save(&claims.id, &tokens.refresh_token))
            .await?
            .map_err(|err| {
                error!(error = %err, "failed to save session");
                AuthError::from(err)
            })?;

        Ok(tokens)
    }

    /// A refresh token that fails verification but carries a valid signature
    /// (it expired) ends the session it still represents. Tokens without a
    /// trusted signature leave session state untouched.
    async fn revoke_rejected_refresh(
        &self,
        ctx: &OperationContext,
        refresh_token: &str,
    ) -> std::result::Result<(), AuthError> {
        let Some(owner) = self.tokens.refresh_owner(refresh_token) else {
            debug!("rejected refresh token has no trusted owner; sessions untouched");
            return Ok(());
        };
        Span::current().record("user_id", field::display(&owner));

        let removed = ctx
            .run("sessions.revoke", self.sessions.revoke(&owner, refresh_token))
            .await?
            .map_err(|err| {
                error!(error = %err, "failed to revoke session for rejected refresh token");
                AuthError::from(err)
            })?;

        if removed {
            info!("session of expired refresh token revoked");
        }
        Ok(())
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}
