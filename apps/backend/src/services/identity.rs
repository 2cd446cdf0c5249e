//! Bearer-token identity provider.

use std::collections::HashMap;
use std::future::Future;

use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Resolves the user behind a request.
pub trait IdentityProvider: Send + Sync {
    /// The user a bearer token belongs to, or `None` when there is no session.
    fn resolve(&self, token: &str) -> impl Future<Output = Option<Uuid>> + Send;

    /// Mint a new user and a token for it.
    fn register(&self) -> impl Future<Output = (Uuid, String)> + Send;
}

/// Calculate SHA256 digest of a token.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Token table keyed by digest; raw tokens are never kept.
#[derive(Debug, Default)]
pub struct TokenIdentity {
    users: RwLock<HashMap<String, Uuid>>,
}

impl TokenIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider pre-loaded with configured `(token, user)` pairs.
    pub fn with_tokens<I>(tokens: I) -> Self
    where
        I: IntoIterator<Item = (String, Uuid)>,
    {
        let users = tokens
            .into_iter()
            .map(|(token, user)| (hash_token(&token), user))
            .collect();
        Self {
            users: RwLock::new(users),
        }
    }

    pub async fn token_count(&self) -> usize {
        self.users.read().await.len()
    }
}

impl IdentityProvider for TokenIdentity {
    async fn resolve(&self, token: &str) -> Option<Uuid> {
        self.users.read().await.get(&hash_token(token)).copied()
    }

    async fn register(&self) -> (Uuid, String) {
        let user_id = Uuid::new_v4();
        let token = Uuid::new_v4().simple().to_string();
        self.users.write().await.insert(hash_token(&token), user_id);
        tracing::info!(%user_id, "Registered user");
        (user_id, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::block_on;

    #[test]
    fn test_hash_token_is_hex_sha256() {
        let digest = hash_token("abc");
        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_configured_tokens_resolve() {
        let user = Uuid::new_v4();
        let identity = TokenIdentity::with_tokens([("secret".to_string(), user)]);
        assert_eq!(block_on(identity.resolve("secret")), Some(user));
        assert_eq!(block_on(identity.resolve("other")), None);
    }

    #[test]
    fn test_registered_token_resolves() {
        let identity = TokenIdentity::new();
        let (user, token) = block_on(identity.register());
        assert!(token.len() > 10);
        assert_eq!(block_on(identity.resolve(&token)), Some(user));
        assert_eq!(block_on(identity.token_count()), 1);
    }

    #[test]
    fn test_raw_token_is_not_stored() {
        let identity = TokenIdentity::with_tokens([("secret".to_string(), Uuid::new_v4())]);
        let users = block_on(identity.users.read());
        assert!(!users.contains_key("secret"));
    }
}
