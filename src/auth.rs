/*!
 * AAD client-credentials token acquisition
 *
 * Exchanges the tenant/client/secret triple from the configuration for a
 * bearer token scoped to the management audience, and caches it for the
 * lifetime of the provider. A single export run normally performs one
 * exchange; the cache exists so long catalogs spanning the token lifetime
 * refresh transparently.
 */

use chrono::Utc;
use serde::Deserialize;
use std::sync::Mutex;
use url::Url;

use crate::config::ExportConfig;
use crate::error::{ExportError, Result};

/// Refresh when the cached token is valid for less than this many seconds
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Fallback lifetime when the token response omits expires_in
const DEFAULT_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    // AAD v1 returns this as a decimal string
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: i64,
}

/// Bearer token provider for the catalog API
pub struct TokenProvider {
    token_url: Url,
    client_id: String,
    client_secret: String,
    resource: String,
    cache: Mutex<Option<CachedToken>>,
    http: reqwest::Client,
}

impl TokenProvider {
    /// Build a provider from configuration
    ///
    /// The token endpoint is `{aad_endpoint}/{tenant}/oauth2/token`.
    pub fn from_config(config: &ExportConfig, http: reqwest::Client) -> Result<Self> {
        let token_url = config
            .aad_endpoint
            .join(&format!("{}/oauth2/token", config.aad_tenant_id))
            .map_err(|e| ExportError::Config(format!("Invalid AAD endpoint: {}", e)))?;

        Ok(Self {
            token_url,
            client_id: config.aad_client_id.clone(),
            client_secret: config.aad_secret.clone(),
            resource: config.arm_aad_audience.as_str().to_string(),
            cache: Mutex::new(None),
            http,
        })
    }

    /// Get a bearer token, reusing the cached one while it stays fresh
    pub async fn access_token(&self) -> Result<String> {
        {
            let cache = self.cache.lock().expect("token cache lock poisoned");
            if let Some(cached) = cache.as_ref() {
                if cached.expires_at > Utc::now().timestamp() + EXPIRY_MARGIN_SECS {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("resource", self.resource.as_str()),
        ];

        let response = self
            .http
            .post(self.token_url.clone())
            .form(&params)
            .send()
            .await
            .map_err(|e| ExportError::Authentication(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExportError::Authentication(format!(
                "Token request rejected with status {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            ExportError::Authentication(format!("Failed to parse token response: {}", e))
        })?;

        let lifetime = token
            .expires_in
            .as_deref()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(DEFAULT_LIFETIME_SECS);
        let expires_at = Utc::now().timestamp() + lifetime;

        {
            let mut cache = self.cache.lock().expect("token cache lock poisoned");
            *cache = Some(CachedToken {
                access_token: token.access_token.clone(),
                expires_at,
            });
        }

        Ok(token.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_config() -> ExportConfig {
        ExportConfig {
            aad_tenant_id: "tenant-1".to_string(),
            aad_client_id: "client-1".to_string(),
            aad_secret: "secret".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_token_url_includes_tenant() {
        let provider =
            TokenProvider::from_config(&provider_config(), reqwest::Client::new()).unwrap();
        assert_eq!(
            provider.token_url.as_str(),
            "https://login.microsoftonline.com/tenant-1/oauth2/token"
        );
    }

    #[test]
    fn test_token_response_parsing() {
        let json = r#"{"token_type":"Bearer","expires_in":"3599","access_token":"tok-abc"}"#;
        let parsed: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.access_token, "tok-abc");
        assert_eq!(parsed.expires_in.as_deref(), Some("3599"));
    }

    #[test]
    fn test_token_response_without_expiry() {
        let json = r#"{"access_token":"tok-abc"}"#;
        let parsed: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.access_token, "tok-abc");
        assert!(parsed.expires_in.is_none());
    }

    #[test]
    fn test_cached_token_reused_while_fresh() {
        let provider =
            TokenProvider::from_config(&provider_config(), reqwest::Client::new()).unwrap();
        {
            let mut cache = provider.cache.lock().unwrap();
            *cache = Some(CachedToken {
                access_token: "cached-token".to_string(),
                expires_at: Utc::now().timestamp() + 600,
            });
        }

        // No HTTP endpoint is reachable here, so a hit proves the cache served it.
        let token = futures_block_on(provider.access_token()).unwrap();
        assert_eq!(token, "cached-token");
    }

    #[test]
    fn test_stale_token_triggers_refresh_attempt() {
        let mut config = provider_config();
        // Unroutable endpoint: the refresh attempt must fail fast instead of
        // serving the stale token.
        config.aad_endpoint = Url::parse("http://127.0.0.1:9/").unwrap();
        let provider = TokenProvider::from_config(&config, reqwest::Client::new()).unwrap();
        {
            let mut cache = provider.cache.lock().unwrap();
            *cache = Some(CachedToken {
                access_token: "stale-token".to_string(),
                // Inside the refresh margin
                expires_at: Utc::now().timestamp() + 10,
            });
        }

        let result = futures_block_on(provider.access_token());
        assert!(matches!(result, Err(ExportError::Authentication(_))));
    }

    fn futures_block_on<F: std::future::Future>(fut: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(fut)
    }
}
