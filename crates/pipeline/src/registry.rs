//! Account/credential registry seam.
//!
//! The surrounding product owns accounts; the engine only needs two
//! questions answered at run start: is a provider credential
//! configured, and does this account exist. Both are fatal when they
//! come back negative.

use async_trait::async_trait;

/// Per-account configuration the engine consumes.
#[derive(Debug, Clone)]
pub struct AccountConfig {
    pub account_key: String,
    pub display_name: String,
    /// Optional per-account model override.
    pub model: Option<String>,
}

/// Result of the credential pre-flight check.
#[derive(Debug, Clone)]
pub struct CredentialCheck {
    pub valid: bool,
    pub error: Option<String>,
}

impl CredentialCheck {
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
        }
    }
}

/// Account lookup and credential validation.
#[async_trait]
pub trait AccountRegistry: Send + Sync {
    /// Load the configuration for an account, or `None` if unknown.
    async fn load_account_config(&self, account_key: &str) -> Option<AccountConfig>;

    /// Check that provider credentials are configured.
    fn validate_credentials(&self) -> CredentialCheck;
}

/// Registry backed by the engine's own configuration: any account key
/// is accepted, and credentials are valid when an API key is set.
pub struct EnvAccountRegistry {
    api_key: String,
}

impl EnvAccountRegistry {
    pub fn new(api_key: String) -> Self {
        Self { api_key }
    }
}

#[async_trait]
impl AccountRegistry for EnvAccountRegistry {
    async fn load_account_config(&self, account_key: &str) -> Option<AccountConfig> {
        Some(AccountConfig {
            account_key: account_key.to_string(),
            display_name: account_key.to_string(),
            model: None,
        })
    }

    fn validate_credentials(&self) -> CredentialCheck {
        if self.api_key.is_empty() {
            CredentialCheck::invalid("COMPLETION_API_KEY is not configured")
        } else {
            CredentialCheck::ok()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn env_registry_accepts_any_account() {
        let registry = EnvAccountRegistry::new("key".to_string());
        let config = registry.load_account_config("acct-42").await.unwrap();
        assert_eq!(config.account_key, "acct-42");
    }

    #[test]
    fn missing_api_key_is_invalid() {
        let registry = EnvAccountRegistry::new(String::new());
        let check = registry.validate_credentials();
        assert!(!check.valid);
        assert!(check.error.unwrap().contains("COMPLETION_API_KEY"));
    }

    #[test]
    fn configured_api_key_is_valid() {
        let registry = EnvAccountRegistry::new("key".to_string());
        assert!(registry.validate_credentials().valid);
    }
}
