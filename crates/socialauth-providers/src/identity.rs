use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use socialauth_models::AuthProvider;

use crate::error::ProviderError;

/// What a provider vouches for once a credential checks out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialIdentity {
    pub email: String,
    pub full_name: String,
}

/// Providers that verify a single opaque bearer credential.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    fn provider(&self) -> AuthProvider;

    async fn verify(&self, token: &str) -> Result<SocialIdentity, ProviderError>;
}
