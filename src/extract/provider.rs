//! Extraction providers
//!
//! Defines the provider trait and the HTTP client for the extraction service.

use std::time::Duration;

use async_trait::async_trait;

use super::types::{ExtractedAnnotation, ExtractionError, SequenceFeature};
use crate::config::ExtractionConfig;

/// Annotation extraction provider trait
#[async_trait]
pub trait ExtractionProvider: Send + Sync {
    /// Provider name, for logs
    fn name(&self) -> &str;

    /// Check if the provider is reachable
    async fn is_available(&self) -> bool;

    /// Find ontology terms mentioned in a plain description
    async fn fetch_text_annotations(
        &self,
        plain_text: &str,
    ) -> Result<Vec<ExtractedAnnotation>, ExtractionError>;

    /// Predict features of a serialized record
    async fn fetch_sequence_annotations(
        &self,
        content: &str,
    ) -> Result<Vec<SequenceFeature>, ExtractionError>;
}

/// Extraction service over HTTP
pub struct HttpExtractionProvider {
    base_url: String,
    client: reqwest::Client,
}

impl HttpExtractionProvider {
    pub fn new(config: &ExtractionConfig) -> Result<Self, ExtractionError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ExtractionError::InvalidConfig(
                "base URL is empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ExtractionError::InvalidConfig(format!("Failed to build client: {}", e)))?;

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, ExtractionError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    ExtractionError::ProviderNotAvailable(format!("{}: {}", url, e))
                } else {
                    ExtractionError::Api(format!("Failed to call {}: {}", url, e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Api(format!(
                "{} returned {}: {}",
                url, status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ExtractionError::Decode(format!("{}: {}", url, e)))
    }
}

#[async_trait]
impl ExtractionProvider for HttpExtractionProvider {
    fn name(&self) -> &str {
        "http"
    }

    async fn is_available(&self) -> bool {
        match self.client.get(&self.base_url).send().await {
            Ok(response) => !response.status().is_server_error(),
            Err(_) => false,
        }
    }

    async fn fetch_text_annotations(
        &self,
        plain_text: &str,
    ) -> Result<Vec<ExtractedAnnotation>, ExtractionError> {
        tracing::debug!("Requesting text annotations for {} bytes", plain_text.len());
        self.post("/annotate/text", serde_json::json!({ "text": plain_text }))
            .await
    }

    async fn fetch_sequence_annotations(
        &self,
        content: &str,
    ) -> Result<Vec<SequenceFeature>, ExtractionError> {
        tracing::debug!("Requesting sequence annotations for {} bytes", content.len());
        self.post("/annotate/sequence", serde_json::json!({ "sbol": content }))
            .await
    }
}

/// Mock provider for testing
#[cfg(test)]
pub struct MockProvider {
    pub text: Vec<ExtractedAnnotation>,
    pub features: Vec<SequenceFeature>,
    pub available: bool,
}

#[cfg(test)]
impl MockProvider {
    pub fn with_text(text: Vec<ExtractedAnnotation>) -> Self {
        Self {
            text,
            features: Vec::new(),
            available: true,
        }
    }

    pub fn with_features(features: Vec<SequenceFeature>) -> Self {
        Self {
            text: Vec::new(),
            features,
            available: true,
        }
    }
}

#[cfg(test)]
#[async_trait]
impl ExtractionProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    async fn fetch_text_annotations(
        &self,
        _plain_text: &str,
    ) -> Result<Vec<ExtractedAnnotation>, ExtractionError> {
        if !self.available {
            return Err(ExtractionError::ProviderNotAvailable("mock".to_string()));
        }
        Ok(self.text.clone())
    }

    async fn fetch_sequence_annotations(
        &self,
        _content: &str,
    ) -> Result<Vec<SequenceFeature>, ExtractionError> {
        if !self.available {
            return Err(ExtractionError::ProviderNotAvailable("mock".to_string()));
        }
        Ok(self.features.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_provider_rejects_empty_url() {
        let config = ExtractionConfig {
            base_url: String::new(),
            timeout_secs: 5,
        };

        assert!(matches!(
            HttpExtractionProvider::new(&config),
            Err(ExtractionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_http_provider_trims_trailing_slash() {
        let config = ExtractionConfig {
            base_url: "http://localhost:5000/".to_string(),
            timeout_secs: 5,
        };
        let provider = HttpExtractionProvider::new(&config).unwrap();

        assert_eq!(provider.base_url(), "http://localhost:5000");
        assert_eq!(provider.name(), "http");
    }

    #[tokio::test]
    async fn test_mock_provider_unavailable() {
        let provider = MockProvider {
            text: Vec::new(),
            features: Vec::new(),
            available: false,
        };

        assert!(!provider.is_available().await);
        assert!(matches!(
            provider.fetch_text_annotations("TetR").await,
            Err(ExtractionError::ProviderNotAvailable(_))
        ));
    }
}
