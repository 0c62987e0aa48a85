use crate::dropdown_api::{ContentResponse, DropdownsResponse};
use crate::errors::AppError;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Client for a running content API.
#[derive(Clone)]
pub struct ContentApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ContentApiClient {
    /// Creates a new `ContentApiClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Scheme, host and port of the content API, without a trailing slash.
    pub fn new(base_url: impl Into<String>) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create content API client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches the dropdowns of a screen in one language.
    pub async fn get_dropdowns(
        &self,
        screen: &str,
        language: &str,
    ) -> Result<DropdownsResponse, AppError> {
        let url = format!("{}/api/dropdowns/{}/{}", self.base_url, screen, language);
        tracing::debug!("Fetching dropdowns: {}", url);
        self.get_json(self.client.get(&url)).await
    }

    /// Fetches approved content of a screen, optionally filtered by component type.
    pub async fn get_content(
        &self,
        screen: &str,
        language: &str,
        component_type: Option<&str>,
    ) -> Result<ContentResponse, AppError> {
        let url = format!("{}/api/content/{}/{}", self.base_url, screen, language);
        tracing::debug!("Fetching content: {}", url);

        let mut request = self.client.get(&url);
        if let Some(component_type) = component_type {
            request = request.query(&[("type", component_type)]);
        }
        self.get_json(request).await
    }

    /// Asks the server to drop its response cache.
    pub async fn clear_cache(&self) -> Result<serde_json::Value, AppError> {
        let url = format!("{}/api/cache/clear", self.base_url);
        tracing::info!("Clearing content API cache");
        self.get_json(self.client.post(&url)).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, AppError> {
        let response = request
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Content API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Content API returned {}: {}",
                status, error_text
            )));
        }

        response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse content API response: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = ContentApiClient::new("http://localhost:8003/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8003");
    }
}
