use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Rendered in place of any profile field the identity service left blank.
pub const NOT_PROVIDED: &str = "Chưa cung cấp";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub customer_code: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl CustomerProfile {
    pub fn name_or_default(&self) -> String {
        self.name.clone().unwrap_or_else(|| NOT_PROVIDED.to_string())
    }

    pub fn email_or_default(&self) -> String {
        self.email.clone().unwrap_or_else(|| NOT_PROVIDED.to_string())
    }

    pub fn phone_or_default(&self) -> String {
        self.phone.clone().unwrap_or_else(|| NOT_PROVIDED.to_string())
    }
}

/// Remote identity collaborator. Profile fetch is best-effort; a failure
/// never blocks payment.
#[async_trait]
pub trait IdentityClient: Send + Sync {
    async fn fetch_profile(
        &self,
        token: &str,
    ) -> Result<CustomerProfile, Box<dyn std::error::Error + Send + Sync>>;
}

/// Persisted client-side token store. Issuance and removal belong to the
/// external identity collaborator; the workflow only reads.
pub trait TokenStore: Send + Sync {
    fn access_token(&self) -> Option<String>;
}

/// Gates workflow entry: search is public, seat hold and payment are not.
#[derive(Clone)]
pub struct AuthTokenGate {
    store: Arc<dyn TokenStore>,
}

impl AuthTokenGate {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// Local read only, no network call.
    pub fn has_credential(&self) -> bool {
        self.store.access_token().is_some()
    }

    pub fn token(&self) -> Option<String> {
        self.store.access_token()
    }
}

/// In-memory token store for tests and the demo binary.
#[derive(Default)]
pub struct InMemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl InMemoryTokenStore {
    pub fn with_token(token: &str) -> Self {
        Self { token: Mutex::new(Some(token.to_string())) }
    }

    pub fn set_token(&self, token: &str) {
        *self.token.lock().unwrap() = Some(token.to_string());
    }

    pub fn clear(&self) {
        *self.token.lock().unwrap() = None;
    }
}

impl TokenStore for InMemoryTokenStore {
    fn access_token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_reflects_store() {
        let store = Arc::new(InMemoryTokenStore::default());
        let gate = AuthTokenGate::new(store.clone());
        assert!(!gate.has_credential());

        store.set_token("jwt-abc");
        assert!(gate.has_credential());
        assert_eq!(gate.token().as_deref(), Some("jwt-abc"));

        store.clear();
        assert!(!gate.has_credential());
    }

    #[test]
    fn test_profile_defaults() {
        let profile = CustomerProfile { email: Some("a@b.vn".to_string()), ..Default::default() };
        assert_eq!(profile.name_or_default(), NOT_PROVIDED);
        assert_eq!(profile.email_or_default(), "a@b.vn");
    }
}
