//! Login and bearer-token checks against the live snapshot.
//!
//! The encoder and decoder are rebuilt from the snapshot on every call, so a
//! reloaded secret or lifetime applies to the next request.

use tracing::{info, warn};

use filevault_auth::{Claims, JwtDecoder, JwtEncoder, PasswordHasher};
use filevault_core::error::AppError;
use filevault_core::result::AppResult;

use crate::context::Context;

/// Issues and checks bearer tokens.
#[derive(Debug, Clone)]
pub struct SessionService {
    context: Context,
}

impl SessionService {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    /// Verify `password` against every user named `username` and issue a
    /// token for the first match.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<(String, Claims)> {
        let snapshot = self.context.snapshot();
        let hasher = PasswordHasher::new(&snapshot.config.password_hash)?;
        let candidates = snapshot.users().find_credentials_by_name(username).await?;

        for candidate in &candidates {
            let matched = match hasher.verify_password(password, &candidate.password_hash) {
                Ok(matched) => matched,
                Err(e) => {
                    warn!(
                        user_id = %candidate.id,
                        error = %e,
                        "Stored password hash is unreadable"
                    );
                    false
                }
            };
            if matched {
                let encoder = JwtEncoder::new(&snapshot.config);
                let (token, claims) = encoder.generate_token(candidate.id, &candidate.name)?;
                info!(user_id = %candidate.id, "User logged in");
                return Ok((token, claims));
            }
        }

        warn!(username, candidates = candidates.len(), "Login failed");
        Err(AppError::unauthenticated("Invalid username or password"))
    }

    /// Validate a bearer token and return its claims.
    pub fn authenticate(&self, token: &str) -> AppResult<Claims> {
        JwtDecoder::new(&self.context.snapshot().config).decode(token)
    }
}

#[cfg(test)]
mod tests {
    use filevault_core::error::ErrorKind;

    use super::*;
    use crate::coordinator::{Coordinator, NewUser};
    use crate::testing::harness;

    #[tokio::test]
    async fn test_login_issues_token_for_valid_credentials() {
        let h = harness().await;
        let alice = Coordinator::new(h.context.clone())
            .create_user(NewUser {
                name: "alice".into(),
                password: "wonderland".into(),
            })
            .await
            .unwrap();

        let sessions = SessionService::new(h.context.clone());
        let (token, claims) = sessions.login("alice", "wonderland").await.unwrap();
        assert_eq!(claims.id, alice.id);
        assert!(claims.admin);

        let decoded = sessions.authenticate(&token).unwrap();
        assert_eq!(decoded.name, "alice");
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password_and_unknown_user() {
        let h = harness().await;
        Coordinator::new(h.context.clone())
            .create_user(NewUser {
                name: "alice".into(),
                password: "wonderland".into(),
            })
            .await
            .unwrap();

        let sessions = SessionService::new(h.context.clone());
        let err = sessions.login("alice", "looking-glass").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthenticated);
        let err = sessions.login("mallory", "wonderland").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthenticated);
    }

    #[tokio::test]
    async fn test_stored_hash_is_not_the_password() {
        let h = harness().await;
        Coordinator::new(h.context.clone())
            .create_user(NewUser {
                name: "alice".into(),
                password: "wonderland".into(),
            })
            .await
            .unwrap();

        let creds = h
            .context
            .snapshot()
            .users()
            .find_credentials_by_name("alice")
            .await
            .unwrap();
        assert!(creds[0].password_hash.starts_with("$argon2id$"));
        assert!(!creds[0].password_hash.contains("wonderland"));
    }
}
