/*!
 * Typed client for the media catalog API
 *
 * Wraps the ARM-style REST surface: paginated asset and streaming locator
 * listings (continuation via `@odata.nextLink`) and the listPaths action on
 * a streaming locator. Every request carries the bearer token from the
 * provider and the pinned api-version.
 */

use serde::Deserialize;
use url::Url;

use crate::auth::TokenProvider;
use crate::config::ExportConfig;
use crate::error::{ExportError, Result};

const API_VERSION: &str = "2022-08-01";

/// One page of a listing, with an opaque continuation link
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// A stored media item
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "AssetEnvelope")]
pub struct Asset {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AssetEnvelope {
    name: String,
    #[serde(default)]
    properties: AssetProperties,
}

#[derive(Debug, Default, Deserialize)]
struct AssetProperties {
    #[serde(default)]
    description: Option<String>,
}

impl From<AssetEnvelope> for Asset {
    fn from(envelope: AssetEnvelope) -> Self {
        Asset {
            name: envelope.name,
            description: envelope.properties.description,
        }
    }
}

/// A published streaming endpoint binding, tied to one asset by name
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "LocatorEnvelope")]
pub struct StreamingLocator {
    pub name: String,
    pub asset_name: String,
}

#[derive(Debug, Deserialize)]
struct LocatorEnvelope {
    name: String,
    #[serde(default)]
    properties: LocatorProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocatorProperties {
    #[serde(default)]
    asset_name: String,
}

impl From<LocatorEnvelope> for StreamingLocator {
    fn from(envelope: LocatorEnvelope) -> Self {
        StreamingLocator {
            name: envelope.name,
            asset_name: envelope.properties.asset_name,
        }
    }
}

/// URL-shaped playback paths published under one streaming protocol
#[derive(Debug, Clone, Deserialize)]
pub struct StreamingPath {
    #[serde(default = "Vec::new")]
    pub paths: Vec<String>,
}

/// Response of the listPaths action
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPathsResponse {
    #[serde(default = "Vec::new")]
    pub streaming_paths: Vec<StreamingPath>,
}

/// Authenticated catalog client, reused read-only across all calls
pub struct CatalogClient {
    http: reqwest::Client,
    tokens: TokenProvider,
    base: Url,
}

impl CatalogClient {
    /// Build a client rooted at the account's media-services resource path
    pub fn from_config(config: &ExportConfig, tokens: TokenProvider) -> Result<Self> {
        let base = config
            .arm_endpoint
            .join(&format!(
                "subscriptions/{}/resourceGroups/{}/providers/Microsoft.Media/mediaServices/{}/",
                config.subscription_id, config.resource_group, config.account_name
            ))
            .map_err(|e| ExportError::Config(format!("Invalid catalog endpoint: {}", e)))?;

        Ok(Self {
            http: reqwest::Client::new(),
            tokens,
            base,
        })
    }

    /// First page of the asset listing
    pub async fn list_assets(&self) -> Result<Page<Asset>> {
        self.get_collection("assets").await
    }

    /// Next page of the asset listing
    pub async fn list_assets_next(&self, link: &str) -> Result<Page<Asset>> {
        self.get_link(link).await
    }

    /// First page of the streaming locator listing
    pub async fn list_streaming_locators(&self) -> Result<Page<StreamingLocator>> {
        self.get_collection("streamingLocators").await
    }

    /// Next page of the streaming locator listing
    pub async fn list_streaming_locators_next(&self, link: &str) -> Result<Page<StreamingLocator>> {
        self.get_link(link).await
    }

    /// Streaming paths published for one locator
    pub async fn list_streaming_paths(&self, locator_name: &str) -> Result<ListPathsResponse> {
        let url = self
            .base
            .join(&format!("streamingLocators/{}/listPaths", locator_name))
            .map_err(|e| ExportError::Config(format!("Invalid locator name: {}", e)))?;

        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .post(url)
            .query(&[("api-version", API_VERSION)])
            .bearer_auth(token)
            .send()
            .await?;

        Self::decode(response).await
    }

    /// Drain every asset page eagerly into memory
    pub async fn list_all_assets(&self) -> Result<Vec<Asset>> {
        let mut page = self.list_assets().await?;
        let mut assets = std::mem::take(&mut page.value);
        while let Some(link) = page.next_link {
            page = self.list_assets_next(&link).await?;
            assets.append(&mut page.value);
        }
        Ok(assets)
    }

    async fn get_collection<T: serde::de::DeserializeOwned>(&self, segment: &str) -> Result<Page<T>> {
        let url = self
            .base
            .join(segment)
            .map_err(|e| ExportError::Config(format!("Invalid collection path: {}", e)))?;

        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .get(url)
            .query(&[("api-version", API_VERSION)])
            .bearer_auth(token)
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn get_link<T: serde::de::DeserializeOwned>(&self, link: &str) -> Result<Page<T>> {
        // Continuation links are absolute and already carry the api-version
        let url = Url::parse(link)
            .map_err(|e| ExportError::Api {
                status: 0,
                message: format!("Malformed continuation link '{}': {}", link, e),
            })?;

        let token = self.tokens.access_token().await?;
        let response = self.http.get(url).bearer_auth(token).send().await?;

        Self::decode(response).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ExportError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<T>().await?)
    }
}
