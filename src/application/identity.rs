//! User registration and token authentication.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::repos::{
    AuthTokensRepo, CreateAuthTokenParams, CreateUserParams, RepoError, UsersRepo,
};
use crate::domain::entities::UserRecord;
use crate::domain::error::DomainError;
use crate::domain::users::normalize_username;

const TOKEN_PREFIX: &str = "pl";
const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("username `{0}` is already taken")]
    UsernameTaken(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing credentials")]
    Missing,
    #[error("invalid token")]
    Invalid,
    #[error("credential store unavailable")]
    Unavailable,
}

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone)]
pub struct Registered {
    pub user: UserRecord,
    pub token: String,
}

#[derive(Clone)]
pub struct IdentityService {
    users: Arc<dyn UsersRepo>,
    tokens: Arc<dyn AuthTokensRepo>,
}

impl IdentityService {
    pub fn new(users: Arc<dyn UsersRepo>, tokens: Arc<dyn AuthTokensRepo>) -> Self {
        Self { users, tokens }
    }

    /// Create a user and hand back its token. The secret is not recoverable later.
    pub async fn register(&self, username: &str) -> Result<Registered, IdentityError> {
        let username = normalize_username(username)?;

        let user = match self
            .users
            .create_user(CreateUserParams {
                username: username.clone(),
            })
            .await
        {
            Ok(user) => user,
            Err(RepoError::Duplicate { .. }) => return Err(IdentityError::UsernameTaken(username)),
            Err(err) => return Err(err.into()),
        };

        let token = match self.issue_token(user.id).await {
            Ok(token) => token,
            Err(err) => {
                // Release the username; a user without a token cannot sign in.
                if let Err(cleanup) = self.users.delete_user(user.id).await {
                    warn!(
                        target = "postline::identity",
                        user_id = %user.id,
                        error = %cleanup,
                        "failed to remove user after token issue failure"
                    );
                }
                return Err(err);
            }
        };
        info!(
            target = "postline::identity",
            user_id = %user.id,
            username = %user.username,
            "registered user"
        );

        Ok(Registered { user, token })
    }

    pub async fn issue_token(&self, user_id: Uuid) -> Result<String, IdentityError> {
        let prefix = Self::generate_prefix();
        let secret = Self::generate_secret();
        let token = format!("{TOKEN_PREFIX}_{prefix}_{secret}");

        self.tokens
            .create_token(CreateAuthTokenParams {
                user_id,
                prefix,
                hashed_secret: Self::hash_secret(&secret),
            })
            .await?;

        Ok(token)
    }

    pub async fn authenticate(&self, token: &str) -> Result<Principal, AuthError> {
        let parsed = Self::parse_token(token).ok_or(AuthError::Invalid)?;
        let record = self
            .tokens
            .find_by_prefix(&parsed.prefix)
            .await
            .map_err(Self::store_failure)?
            .ok_or(AuthError::Invalid)?;

        let hashed_input = Self::hash_secret(&parsed.secret);
        if record.hashed_secret.ct_eq(&hashed_input).unwrap_u8() == 0 {
            return Err(AuthError::Invalid);
        }

        let user = self
            .users
            .find_by_id(record.user_id)
            .await
            .map_err(Self::store_failure)?
            .ok_or(AuthError::Invalid)?;

        Ok(Principal {
            user_id: user.id,
            username: user.username,
        })
    }

    fn store_failure(err: RepoError) -> AuthError {
        match err {
            RepoError::NotFound => AuthError::Invalid,
            other => {
                warn!(target = "postline::identity", error = %other, "token lookup failed");
                AuthError::Unavailable
            }
        }
    }

    fn hash_secret(secret: &str) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        hasher.finalize().to_vec()
    }

    fn generate_prefix() -> String {
        Uuid::new_v4().simple().to_string()[..12].to_string()
    }

    fn generate_secret() -> String {
        format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
    }

    fn parse_token(token: &str) -> Option<ParsedToken> {
        let mut parts = token.trim().splitn(3, '_');
        if parts.next()? != TOKEN_PREFIX {
            return None;
        }
        let prefix = parts.next()?;
        let secret = parts.next()?;
        if prefix.is_empty() || secret.len() < MIN_SECRET_LEN {
            return None;
        }
        Some(ParsedToken {
            prefix: prefix.to_string(),
            secret: secret.to_string(),
        })
    }
}

struct ParsedToken {
    prefix: String,
    secret: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_token() {
        let secret = "a".repeat(MIN_SECRET_LEN);
        let parsed = IdentityService::parse_token(&format!("pl_abc123_{secret}"))
            .expect("token should parse");
        assert_eq!(parsed.prefix, "abc123");
        assert_eq!(parsed.secret, secret);
    }

    #[test]
    fn rejects_foreign_or_short_tokens() {
        let secret = "a".repeat(MIN_SECRET_LEN);
        assert!(IdentityService::parse_token(&format!("sk_abc_{secret}")).is_none());
        assert!(IdentityService::parse_token("pl_abc_short").is_none());
        assert!(IdentityService::parse_token(&format!("pl__{secret}")).is_none());
        assert!(IdentityService::parse_token("garbage").is_none());
    }

    #[test]
    fn hashing_is_deterministic() {
        assert_eq!(
            IdentityService::hash_secret("secret"),
            IdentityService::hash_secret("secret")
        );
        assert_ne!(
            IdentityService::hash_secret("secret"),
            IdentityService::hash_secret("other")
        );
    }

    use async_trait::async_trait;

    use crate::domain::entities::AuthTokenRecord;
    use crate::infra::memory::MemoryRepositories;

    struct BrokenTokens(fn() -> RepoError);

    #[async_trait]
    impl AuthTokensRepo for BrokenTokens {
        async fn create_token(
            &self,
            _params: CreateAuthTokenParams,
        ) -> Result<AuthTokenRecord, RepoError> {
            Err((self.0)())
        }

        async fn find_by_prefix(&self, _prefix: &str) -> Result<Option<AuthTokenRecord>, RepoError> {
            Err((self.0)())
        }
    }

    fn service_with_broken_tokens(users: Arc<MemoryRepositories>) -> IdentityService {
        IdentityService::new(users, Arc::new(BrokenTokens(|| RepoError::Timeout)))
    }

    #[tokio::test]
    async fn failed_token_issue_releases_the_username() {
        let users = Arc::new(MemoryRepositories::new());
        let broken = service_with_broken_tokens(users.clone());

        let err = broken.register("alice").await.unwrap_err();
        assert!(matches!(err, IdentityError::Repo(RepoError::Timeout)));
        assert!(users.find_by_username("alice").await.unwrap().is_none());

        let working = IdentityService::new(users.clone(), users);
        let registered = working.register("alice").await.expect("username is free again");
        assert_eq!(registered.user.username, "alice");
    }

    #[tokio::test]
    async fn store_failure_during_authentication_is_unavailable() {
        let users = Arc::new(MemoryRepositories::new());
        let broken = service_with_broken_tokens(users);
        let token = format!("pl_abc123_{}", "a".repeat(MIN_SECRET_LEN));

        assert_eq!(broken.authenticate(&token).await, Err(AuthError::Unavailable));
        assert_eq!(broken.authenticate("garbage").await, Err(AuthError::Invalid));
    }

    #[tokio::test]
    async fn issued_tokens_authenticate_their_owner() {
        let repos = Arc::new(MemoryRepositories::new());
        let service = IdentityService::new(repos.clone(), repos);
        let registered = service.register("bob").await.unwrap();

        let principal = service.authenticate(&registered.token).await.unwrap();
        assert_eq!(principal.user_id, registered.user.id);
        assert_eq!(principal.username, "bob");

        let forged = format!("{}x", &registered.token[..registered.token.len() - 1]);
        assert_eq!(service.authenticate(&forged).await, Err(AuthError::Invalid));
    }
}
