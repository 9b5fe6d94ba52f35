use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use voxbridge_audio::ReplayBackend;
use voxbridge_core::{
    AppConfig, AsrError, AudioChunk, AudioEncoding, PipelineError, RecognitionConfig,
    RecognitionResult, SpeechAlternative, StreamingRecognitionConfig, StreamingRecognizeResponse,
    TranscriptionResult, TranslateError, Translation,
};
use voxbridge_engine::{ResponseStream, SpeechRecognizer};
use voxbridge_server::{router, AppState, SpeechPipeline};
use voxbridge_translate::{PassthroughTranslator, Translator};

// ---- fakes ----

#[derive(Default)]
struct ScriptedRecognizer {
    stream: Vec<StreamingRecognizeResponse>,
    recognized: Vec<RecognitionResult>,
    fail_recognize: bool,
    last_config: Mutex<Option<RecognitionConfig>>,
}

#[async_trait]
impl SpeechRecognizer for ScriptedRecognizer {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn initialize(&mut self, _config: toml::Value) -> Result<(), AsrError> {
        Ok(())
    }

    async fn streaming_recognize(
        &self,
        config: StreamingRecognitionConfig,
        _audio: mpsc::Receiver<AudioChunk>,
    ) -> Result<ResponseStream, AsrError> {
        *self.last_config.lock().unwrap() = Some(config.config);
        let (tx, rx) = mpsc::channel(self.stream.len().max(1));
        for response in self.stream.clone() {
            tx.send(Ok(response)).await.unwrap();
        }
        Ok(rx)
    }

    async fn recognize(
        &self,
        config: &RecognitionConfig,
        _audio: Vec<u8>,
    ) -> Result<Vec<RecognitionResult>, AsrError> {
        *self.last_config.lock().unwrap() = Some(config.clone());
        if self.fail_recognize {
            return Err(AsrError::RequestFailed("status 503".to_string()));
        }
        Ok(self.recognized.clone())
    }

    async fn shutdown(&self) -> Result<(), AsrError> {
        Ok(())
    }
}

/// Answers "Hello" and claims to have detected French.
struct FrenchTranslator;

#[async_trait]
impl Translator for FrenchTranslator {
    fn name(&self) -> &str {
        "french"
    }

    async fn initialize(&mut self, _config: toml::Value) -> Result<(), TranslateError> {
        Ok(())
    }

    async fn translate(
        &self,
        _text: &str,
        _target: &str,
        _source: Option<&str>,
    ) -> Result<Translation, TranslateError> {
        Ok(Translation {
            translated_text: "Hello".to_string(),
            detected_source_language: Some("fr".to_string()),
        })
    }
}

struct FailingTranslator;

#[async_trait]
impl Translator for FailingTranslator {
    fn name(&self) -> &str {
        "failing"
    }

    async fn initialize(&mut self, _config: toml::Value) -> Result<(), TranslateError> {
        Ok(())
    }

    async fn translate(
        &self,
        _text: &str,
        _target: &str,
        _source: Option<&str>,
    ) -> Result<Translation, TranslateError> {
        Err(TranslateError::RequestFailed("status 403".to_string()))
    }
}

struct SilentPipeline;

#[async_trait]
impl SpeechPipeline for SilentPipeline {
    async fn run(
        &self,
        _target: &str,
        _source: &str,
    ) -> Result<Option<TranscriptionResult>, PipelineError> {
        Ok(None)
    }
}

// ---- helpers ----

fn result(text: &str, is_final: bool) -> StreamingRecognizeResponse {
    StreamingRecognizeResponse {
        results: vec![recognition(text, is_final)],
    }
}

fn recognition(text: &str, is_final: bool) -> RecognitionResult {
    RecognitionResult {
        alternatives: vec![SpeechAlternative {
            transcript: text.to_string(),
            confidence: 0.9,
        }],
        is_final,
        language_code: None,
    }
}

fn frames() -> Vec<AudioChunk> {
    vec![
        AudioChunk {
            data: vec![0; 3200],
            sample_rate: 16000,
            channels: 1,
        };
        3
    ]
}

fn state_with(
    config: &AppConfig,
    recognizer: Arc<ScriptedRecognizer>,
    translator: Arc<dyn Translator>,
) -> AppState {
    AppState::new(
        config,
        Arc::new(ReplayBackend::new(frames())),
        recognizer,
        translator,
    )
}

async fn spawn(state: AppState, config: &AppConfig) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(state, &config.server);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn upload(audio: &[u8], target: Option<&str>) -> reqwest::multipart::Form {
    let part = reqwest::multipart::Part::bytes(audio.to_vec())
        .file_name("clip.webm")
        .mime_str("audio/webm")
        .unwrap();
    let form = reqwest::multipart::Form::new().part("audio", part);
    match target {
        Some(t) => form.text("target", t.to_string()),
        None => form,
    }
}

// ---- translate-speech ----

#[tokio::test]
async fn test_speech_without_result_returns_no_content_and_no_body() {
    let config = AppConfig::default();
    let mut state = state_with(
        &config,
        Arc::new(ScriptedRecognizer::default()),
        Arc::new(PassthroughTranslator::new()),
    );
    state.speech = Arc::new(SilentPipeline);
    let base = spawn(state, &config).await;

    let response = reqwest::get(format!("{base}/api/translate-speech"))
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);
    assert!(response.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_speech_returns_first_final_transcript_and_releases_device() {
    let config = AppConfig::default();
    let input = Arc::new(ReplayBackend::new(frames()));
    let recognizer = Arc::new(ScriptedRecognizer {
        stream: vec![
            result("hel", false),
            result("hello", true),
            result("ignored", true),
        ],
        ..Default::default()
    });
    let state = AppState::new(
        &config,
        input.clone(),
        recognizer.clone(),
        Arc::new(PassthroughTranslator::new()),
    );
    let base = spawn(state, &config).await;

    let response = reqwest::get(format!("{base}/api/translate-speech?target=en&source=en"))
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["transcript"], "hello");
    assert_eq!(body["source_language"], "en-US");
    assert_eq!(body["target_language"], "en-US");
    assert_eq!(body["translation"], "hello");

    assert_eq!(input.opened(), 1);
    assert_eq!(input.active(), 0);

    let config_seen = recognizer.last_config.lock().unwrap().clone().unwrap();
    assert_eq!(config_seen.language_code, "en-US");
    assert_eq!(config_seen.model, "default");
    assert!(config_seen.alternative_language_codes.is_empty());
}

#[tokio::test]
async fn test_speech_auto_primes_candidate_languages() {
    let config = AppConfig::default();
    let recognizer = Arc::new(ScriptedRecognizer {
        stream: vec![result("namaste", true)],
        ..Default::default()
    });
    let state = state_with(&config, recognizer.clone(), Arc::new(FrenchTranslator));
    let base = spawn(state, &config).await;

    let response = reqwest::get(format!("{base}/api/translate-speech"))
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["source_language"], "hi-IN");
    assert_eq!(body["target_language"], "en-US");
    assert_eq!(body["translation"], "Hello");

    let config_seen = recognizer.last_config.lock().unwrap().clone().unwrap();
    assert_eq!(config_seen.language_code, "hi-IN");
    assert_eq!(config_seen.model, "latest_long");
    assert_eq!(config_seen.alternative_language_codes.len(), 10);
}

#[tokio::test]
async fn test_speech_with_only_interim_results_is_no_content() {
    let config = AppConfig::default();
    let recognizer = Arc::new(ScriptedRecognizer {
        stream: vec![result("hel", false), result("hell", false)],
        ..Default::default()
    });
    let state = state_with(&config, recognizer, Arc::new(PassthroughTranslator::new()));
    let base = spawn(state, &config).await;

    let response = reqwest::get(format!("{base}/api/translate-speech?source=en"))
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_speech_translation_failure_is_error_envelope() {
    let config = AppConfig::default();
    let recognizer = Arc::new(ScriptedRecognizer {
        stream: vec![result("bonjour", true)],
        ..Default::default()
    });
    let state = state_with(&config, recognizer, Arc::new(FailingTranslator));
    let base = spawn(state, &config).await;

    let response = reqwest::get(format!("{base}/api/translate-speech?source=fr&target=en"))
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("status 403"));
}

// ---- translate-text ----

#[tokio::test]
async fn test_text_translation_success() {
    let config = AppConfig::default();
    let state = state_with(
        &config,
        Arc::new(ScriptedRecognizer::default()),
        Arc::new(FrenchTranslator),
    );
    let base = spawn(state, &config).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/translate-text"))
        .json(&serde_json::json!({ "text": "Bonjour", "target": "en-US", "source": "auto" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["input"], "Bonjour");
    assert_eq!(body["detected_language"], "fr");
    assert_eq!(body["target_language"], "en");
    assert_eq!(body["translation"], "Hello");
}

#[tokio::test]
async fn test_text_translation_with_source_hint() {
    let config = AppConfig::default();
    let state = state_with(
        &config,
        Arc::new(ScriptedRecognizer::default()),
        Arc::new(FrenchTranslator),
    );
    let base = spawn(state, &config).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/translate-text"))
        .json(&serde_json::json!({ "text": "Bonjour", "target": "en", "source": "fr" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["translation"], "Hello");
    assert_eq!(body["target_language"], "en");
    assert_eq!(body["detected_language"], "fr");
}

#[tokio::test]
async fn test_text_translation_rejects_missing_and_blank_text() {
    let config = AppConfig::default();
    let state = state_with(
        &config,
        Arc::new(ScriptedRecognizer::default()),
        Arc::new(PassthroughTranslator::new()),
    );
    let base = spawn(state, &config).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/api/translate-text"))
        .json(&serde_json::json!({ "target": "en" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "No text provided.");

    let response = client
        .post(format!("{base}/api/translate-text"))
        .json(&serde_json::json!({ "text": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Empty text input.");
}

#[tokio::test]
async fn test_text_translation_malformed_json_is_bad_request() {
    let config = AppConfig::default();
    let state = state_with(
        &config,
        Arc::new(ScriptedRecognizer::default()),
        Arc::new(PassthroughTranslator::new()),
    );
    let base = spawn(state, &config).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/translate-text"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_text_translation_upstream_failure_is_internal_error() {
    let config = AppConfig::default();
    let state = state_with(
        &config,
        Arc::new(ScriptedRecognizer::default()),
        Arc::new(FailingTranslator),
    );
    let base = spawn(state, &config).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/translate-text"))
        .json(&serde_json::json!({ "text": "Bonjour" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
}

// ---- translate-audio ----

#[tokio::test]
async fn test_audio_upload_is_recognized_as_webm_and_translated() {
    let config = AppConfig::default();
    let recognizer = Arc::new(ScriptedRecognizer {
        recognized: vec![recognition("bonjour", true)],
        ..Default::default()
    });
    let state = state_with(&config, recognizer.clone(), Arc::new(FrenchTranslator));
    let base = spawn(state, &config).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/translate-audio"))
        .multipart(upload(b"\x1aE\xdf\xa3webm", Some("en")))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "translation": "Hello" }));

    let config_seen = recognizer.last_config.lock().unwrap().clone().unwrap();
    assert_eq!(config_seen.encoding, AudioEncoding::WebmOpus);
    assert_eq!(config_seen.sample_rate_hertz, 48000);
    assert_eq!(config_seen.language_code, "hi-IN");
}

#[tokio::test]
async fn test_audio_upload_honours_source_field() {
    let config = AppConfig::default();
    let recognizer = Arc::new(ScriptedRecognizer {
        recognized: vec![recognition("hola", true)],
        ..Default::default()
    });
    let state = state_with(&config, recognizer.clone(), Arc::new(FrenchTranslator));
    let base = spawn(state, &config).await;

    let form = upload(b"webm", None).text("source", "es");
    let response = reqwest::Client::new()
        .post(format!("{base}/api/translate-audio"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    // default target "es" matches the source, so the transcript comes back as is
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["translation"], "hola");

    let config_seen = recognizer.last_config.lock().unwrap().clone().unwrap();
    assert_eq!(config_seen.language_code, "es-ES");
    assert_eq!(config_seen.model, "default");
}

#[tokio::test]
async fn test_audio_upload_without_speech_is_no_content() {
    let config = AppConfig::default();
    let state = state_with(
        &config,
        Arc::new(ScriptedRecognizer::default()),
        Arc::new(PassthroughTranslator::new()),
    );
    let base = spawn(state, &config).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/translate-audio"))
        .multipart(upload(b"webm", Some("en")))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);
    assert!(response.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_audio_upload_without_file_is_bad_request() {
    let config = AppConfig::default();
    let state = state_with(
        &config,
        Arc::new(ScriptedRecognizer::default()),
        Arc::new(PassthroughTranslator::new()),
    );
    let base = spawn(state, &config).await;

    let form = reqwest::multipart::Form::new().text("target", "en");
    let response = reqwest::Client::new()
        .post(format!("{base}/api/translate-audio"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "No audio file provided.");
}

#[tokio::test]
async fn test_audio_upload_that_is_not_multipart_is_error_envelope() {
    let config = AppConfig::default();
    let state = state_with(
        &config,
        Arc::new(ScriptedRecognizer::default()),
        Arc::new(PassthroughTranslator::new()),
    );
    let base = spawn(state, &config).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/translate-audio"))
        .json(&serde_json::json!({ "audio": "webm" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_audio_upload_failure_answers_empty_translation_by_default() {
    let config = AppConfig::default();
    let recognizer = Arc::new(ScriptedRecognizer {
        fail_recognize: true,
        ..Default::default()
    });
    let state = state_with(&config, recognizer, Arc::new(PassthroughTranslator::new()));
    let base = spawn(state, &config).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/translate-audio"))
        .multipart(upload(b"webm", Some("en")))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "translation": "" }));
}

#[tokio::test]
async fn test_audio_upload_failure_is_error_envelope_when_quirk_disabled() {
    let mut config = AppConfig::default();
    config.server.audio_errors_as_empty_translation = false;
    let recognizer = Arc::new(ScriptedRecognizer {
        fail_recognize: true,
        ..Default::default()
    });
    let state = state_with(&config, recognizer, Arc::new(PassthroughTranslator::new()));
    let base = spawn(state, &config).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/translate-audio"))
        .multipart(upload(b"webm", Some("en")))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "error");
}

// ---- languages ----

#[tokio::test]
async fn test_languages_lists_mapping_and_auto_candidates() {
    let config = AppConfig::default();
    let state = state_with(
        &config,
        Arc::new(ScriptedRecognizer::default()),
        Arc::new(PassthroughTranslator::new()),
    );
    let base = spawn(state, &config).await;

    let body: serde_json::Value = reqwest::get(format!("{base}/api/languages"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["languages"]["fr"], "fr-FR");
    assert_eq!(body["languages"]["zh"], "zh");
    assert_eq!(body["auto_candidates"].as_array().unwrap().len(), 10);
}
