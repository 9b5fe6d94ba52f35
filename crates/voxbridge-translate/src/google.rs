//! Google Cloud Translation v2 (`language/translate/v2`) over REST.

use crate::translator::Translator;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use voxbridge_core::{TranslateError, Translation};

const DEFAULT_ENDPOINT: &str = "https://translation.googleapis.com/language/translate/v2";

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    target: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    #[serde(default)]
    translations: Vec<WireTranslation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTranslation {
    translated_text: String,
    #[serde(default)]
    detected_source_language: Option<String>,
}

pub struct GoogleTranslator {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl GoogleTranslator {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
        }
    }
}

impl Default for GoogleTranslator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    fn name(&self) -> &str {
        "google"
    }

    async fn initialize(&mut self, config: toml::Value) -> Result<(), TranslateError> {
        let api_key = config
            .get("api_key")
            .and_then(|v| v.as_str())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                TranslateError::InitializationFailed(
                    "missing 'api_key' in google translator config".to_string(),
                )
            })?;
        self.api_key = Some(api_key.to_string());

        if let Some(endpoint) = config.get("endpoint").and_then(|v| v.as_str()) {
            self.endpoint = endpoint.trim_end_matches('/').to_string();
        }

        tracing::info!(endpoint = %self.endpoint, "GoogleTranslator initialized");
        Ok(())
    }

    async fn translate(
        &self,
        text: &str,
        target: &str,
        source: Option<&str>,
    ) -> Result<Translation, TranslateError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            TranslateError::InitializationFailed("translator not initialized".to_string())
        })?;

        let body = TranslateRequest {
            q: text,
            target,
            source,
            format: "text",
        };

        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| TranslateError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(TranslateError::RequestFailed(format!(
                "HTTP {status}: {text}"
            )));
        }

        let parsed: TranslateResponse = response
            .json()
            .await
            .map_err(|e| TranslateError::InvalidResponse(e.to_string()))?;

        let first = parsed.data.translations.into_iter().next().ok_or_else(|| {
            TranslateError::InvalidResponse("response contained no translations".to_string())
        })?;

        tracing::debug!(
            target_language = target,
            source_language = ?source,
            detected = ?first.detected_source_language,
            "translation completed"
        );
        Ok(Translation {
            translated_text: first.translated_text,
            detected_source_language: first.detected_source_language,
        })
    }
}
