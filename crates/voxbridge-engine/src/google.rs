//! Google Cloud Speech-to-Text over the REST `speech:recognize` endpoint.
//!
//! The REST surface has no bidirectional stream, so streaming sessions
//! buffer captured frames into fixed windows and submit each window as a
//! single-shot request. Every result that comes back is final.

use crate::recognizer::{ResponseStream, SpeechRecognizer};
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use voxbridge_core::{
    AsrError, AudioChunk, RecognitionConfig, RecognitionResult, SpeechAlternative,
    StreamingRecognitionConfig, StreamingRecognizeResponse,
};

const DEFAULT_ENDPOINT: &str = "https://speech.googleapis.com/v1p1beta1";
const DEFAULT_WINDOW_MS: u64 = 5000;
/// `speech:recognize` accepts at most one minute of audio per request.
const MAX_WINDOW_MS: u64 = 60_000;

// ── Wire types ────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireConfig<'a> {
    encoding: &'static str,
    sample_rate_hertz: u32,
    language_code: &'a str,
    #[serde(skip_serializing_if = "no_alternatives")]
    alternative_language_codes: &'a [String],
    enable_automatic_punctuation: bool,
    model: &'a str,
}

fn no_alternatives(codes: &&[String]) -> bool {
    codes.is_empty()
}

#[derive(Debug, Serialize)]
struct WireAudio {
    content: String,
}

#[derive(Debug, Serialize)]
struct RecognizeRequest<'a> {
    config: WireConfig<'a>,
    audio: WireAudio,
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<WireResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResult {
    #[serde(default)]
    alternatives: Vec<WireAlternative>,
    #[serde(default)]
    language_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireAlternative {
    #[serde(default)]
    transcript: String,
    #[serde(default)]
    confidence: f32,
}

impl From<WireResult> for RecognitionResult {
    fn from(r: WireResult) -> Self {
        RecognitionResult {
            alternatives: r
                .alternatives
                .into_iter()
                .map(|a| SpeechAlternative {
                    transcript: a.transcript,
                    confidence: a.confidence,
                })
                .collect(),
            is_final: true,
            language_code: r.language_code,
        }
    }
}

// ── Client ────────────────────────────────────────────────────

#[derive(Clone)]
struct SpeechClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl SpeechClient {
    async fn recognize(
        &self,
        config: &RecognitionConfig,
        audio: &[u8],
    ) -> Result<Vec<RecognitionResult>, AsrError> {
        let body = RecognizeRequest {
            config: WireConfig {
                encoding: config.encoding.as_str(),
                sample_rate_hertz: config.sample_rate_hertz,
                language_code: &config.language_code,
                alternative_language_codes: &config.alternative_language_codes,
                enable_automatic_punctuation: config.enable_automatic_punctuation,
                model: &config.model,
            },
            audio: WireAudio {
                content: base64::engine::general_purpose::STANDARD.encode(audio),
            },
        };

        let url = format!("{}/speech:recognize", self.endpoint);
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| AsrError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AsrError::RequestFailed(format!("HTTP {status}: {text}")));
        }

        let parsed: RecognizeResponse = response
            .json()
            .await
            .map_err(|e| AsrError::InvalidResponse(e.to_string()))?;

        tracing::debug!(
            bytes = audio.len(),
            results = parsed.results.len(),
            language = %config.language_code,
            "speech:recognize completed"
        );
        Ok(parsed.results.into_iter().map(Into::into).collect())
    }
}

// ── Recognizer ────────────────────────────────────────────────

pub struct GoogleSpeechRecognizer {
    client: Option<SpeechClient>,
    window_ms: u64,
}

impl GoogleSpeechRecognizer {
    pub fn new() -> Self {
        Self {
            client: None,
            window_ms: DEFAULT_WINDOW_MS,
        }
    }

    fn client(&self) -> Result<&SpeechClient, AsrError> {
        self.client
            .as_ref()
            .ok_or_else(|| AsrError::InitializationFailed("recognizer not initialized".to_string()))
    }
}

impl Default for GoogleSpeechRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechRecognizer for GoogleSpeechRecognizer {
    fn name(&self) -> &str {
        "google"
    }

    async fn initialize(&mut self, config: toml::Value) -> Result<(), AsrError> {
        let api_key = config
            .get("api_key")
            .and_then(|v| v.as_str())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                AsrError::InitializationFailed(
                    "missing 'api_key' in google recognizer config".to_string(),
                )
            })?;
        let endpoint = config
            .get("endpoint")
            .and_then(|v| v.as_str())
            .unwrap_or(DEFAULT_ENDPOINT)
            .trim_end_matches('/')
            .to_string();

        if let Some(ms) = config.get("window_ms").and_then(|v| v.as_integer()) {
            self.window_ms = u64::try_from(ms)
                .ok()
                .filter(|ms| (1..=MAX_WINDOW_MS).contains(ms))
                .ok_or_else(|| {
                    AsrError::InitializationFailed(format!(
                        "'window_ms' must be between 1 and {MAX_WINDOW_MS}"
                    ))
                })?;
        }

        tracing::info!(endpoint = %endpoint, window_ms = self.window_ms, "GoogleSpeechRecognizer initialized");
        self.client = Some(SpeechClient {
            http: reqwest::Client::new(),
            endpoint,
            api_key: api_key.to_string(),
        });
        Ok(())
    }

    async fn streaming_recognize(
        &self,
        config: StreamingRecognitionConfig,
        mut audio: mpsc::Receiver<AudioChunk>,
    ) -> Result<ResponseStream, AsrError> {
        let client = self.client()?.clone();
        let bytes_per_ms = u64::from(config.config.sample_rate_hertz) * 2 / 1000;
        let window_bytes = usize::try_from(self.window_ms.saturating_mul(bytes_per_ms.max(1)))
            .unwrap_or(usize::MAX);
        let single_utterance = config.single_utterance;
        let (tx, rx) = mpsc::channel(4);

        tokio::spawn(async move {
            let mut buffer = Vec::new();
            loop {
                let chunk = tokio::select! {
                    biased;
                    _ = tx.closed() => {
                        tracing::debug!("recognition consumer finished, abandoning audio");
                        return;
                    }
                    chunk = audio.recv() => chunk,
                };

                let exhausted = match chunk {
                    Some(c) => {
                        buffer.extend_from_slice(&c.data);
                        false
                    }
                    None => true,
                };

                if buffer.len() >= window_bytes || (exhausted && !buffer.is_empty()) {
                    if tx.is_closed() {
                        return;
                    }
                    let window = std::mem::take(&mut buffer);
                    let outcome = client
                        .recognize(&config.config, &window)
                        .await
                        .map(|results| StreamingRecognizeResponse { results });
                    let utterance_done = matches!(
                        &outcome,
                        Ok(r) if r.results.iter().any(|res| res.first_transcript().is_some())
                    );
                    if tx.send(outcome).await.is_err() {
                        return;
                    }
                    if single_utterance && utterance_done {
                        tracing::debug!("utterance recognized, closing upload");
                        return;
                    }
                }

                if exhausted {
                    return;
                }
            }
        });

        Ok(rx)
    }

    async fn recognize(
        &self,
        config: &RecognitionConfig,
        audio: Vec<u8>,
    ) -> Result<Vec<RecognitionResult>, AsrError> {
        self.client()?.recognize(config, &audio).await
    }

    async fn shutdown(&self) -> Result<(), AsrError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxbridge_core::AudioEncoding;

    fn options(endpoint: &str) -> toml::Value {
        let mut t = toml::map::Map::new();
        t.insert("api_key".to_string(), toml::Value::String("k".to_string()));
        t.insert(
            "endpoint".to_string(),
            toml::Value::String(endpoint.to_string()),
        );
        toml::Value::Table(t)
    }

    fn config() -> RecognitionConfig {
        RecognitionConfig {
            encoding: AudioEncoding::Linear16,
            sample_rate_hertz: 16000,
            language_code: "hi-IN".to_string(),
            alternative_language_codes: vec!["en-US".to_string()],
            enable_automatic_punctuation: true,
            model: "latest_long".to_string(),
        }
    }

    #[test]
    fn test_wire_config_serializes_camel_case() {
        let cfg = config();
        let wire = WireConfig {
            encoding: cfg.encoding.as_str(),
            sample_rate_hertz: cfg.sample_rate_hertz,
            language_code: &cfg.language_code,
            alternative_language_codes: &cfg.alternative_language_codes,
            enable_automatic_punctuation: true,
            model: &cfg.model,
        };
        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(json["encoding"], "LINEAR16");
        assert_eq!(json["sampleRateHertz"], 16000);
        assert_eq!(json["languageCode"], "hi-IN");
        assert_eq!(json["alternativeLanguageCodes"][0], "en-US");
        assert_eq!(json["enableAutomaticPunctuation"], true);
        assert_eq!(json["model"], "latest_long");
    }

    #[test]
    fn test_wire_config_omits_empty_alternatives() {
        let wire = WireConfig {
            encoding: "LINEAR16",
            sample_rate_hertz: 16000,
            language_code: "fr-FR",
            alternative_language_codes: &[],
            enable_automatic_punctuation: true,
            model: "default",
        };
        let json = serde_json::to_value(&wire).unwrap();
        assert!(json.get("alternativeLanguageCodes").is_none());
    }

    #[test]
    fn test_empty_response_parses_to_no_results() {
        let parsed: RecognizeResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.results.is_empty());
    }

    #[tokio::test]
    async fn test_initialize_rejects_zero_window() {
        let mut recognizer = GoogleSpeechRecognizer::new();
        let mut opts = options("http://localhost");
        opts.as_table_mut()
            .unwrap()
            .insert("window_ms".to_string(), toml::Value::Integer(0));
        let result = recognizer.initialize(opts).await;
        assert!(matches!(result, Err(AsrError::InitializationFailed(_))));
    }

    #[tokio::test]
    async fn test_initialize_rejects_window_beyond_one_minute() {
        let mut recognizer = GoogleSpeechRecognizer::new();
        let mut opts = options("http://localhost");
        opts.as_table_mut()
            .unwrap()
            .insert("window_ms".to_string(), toml::Value::Integer(i64::MAX));
        let result = recognizer.initialize(opts).await;
        assert!(matches!(result, Err(AsrError::InitializationFailed(_))));

        let mut opts = options("http://localhost");
        opts.as_table_mut()
            .unwrap()
            .insert("window_ms".to_string(), toml::Value::Integer(60_000));
        assert!(recognizer.initialize(opts).await.is_ok());
    }

    #[tokio::test]
    async fn test_recognize_before_initialize_fails() {
        let recognizer = GoogleSpeechRecognizer::new();
        let result = recognizer.recognize(&config(), vec![0; 4]).await;
        assert!(matches!(result, Err(AsrError::InitializationFailed(_))));
    }

    #[tokio::test]
    async fn test_recognize_maps_results() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/speech:recognize")
            .match_query(mockito::Matcher::UrlEncoded("key".into(), "k".into()))
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"config":{"languageCode":"hi-IN","model":"latest_long"},"audio":{"content":"AAECAw=="}}"#
                    .to_string(),
            ))
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"results":[{"alternatives":[{"transcript":"namaste","confidence":0.92}],"languageCode":"hi-in"}]}"#,
            )
            .create_async()
            .await;

        let mut recognizer = GoogleSpeechRecognizer::new();
        recognizer.initialize(options(&server.url())).await.unwrap();
        let results = recognizer.recognize(&config(), vec![0, 1, 2, 3]).await.unwrap();

        mock.assert_async().await;
        assert_eq!(results.len(), 1);
        assert!(results[0].is_final);
        assert_eq!(results[0].first_transcript(), Some("namaste"));
        assert_eq!(results[0].language_code.as_deref(), Some("hi-in"));
    }

    #[tokio::test]
    async fn test_recognize_http_error_is_request_failed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/speech:recognize")
            .match_query(mockito::Matcher::Any)
            .with_status(403)
            .with_body("API key not valid")
            .create_async()
            .await;

        let mut recognizer = GoogleSpeechRecognizer::new();
        recognizer.initialize(options(&server.url())).await.unwrap();
        match recognizer.recognize(&config(), vec![0; 4]).await {
            Err(AsrError::RequestFailed(msg)) => {
                assert!(msg.contains("403"));
                assert!(msg.contains("API key not valid"));
            }
            other => panic!("expected RequestFailed, got {other:?}"),
        }
    }
}
