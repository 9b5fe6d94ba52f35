use crate::state::AppState;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use voxbridge_core::language::{AUTO, LANGUAGE_CODE_MAP};
use voxbridge_core::{PipelineError, TranslateError};

/// Failures as the HTTP layer reports them.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(m) | ApiError::Internal(m) => m,
        };
        (
            status,
            Json(ErrorBody {
                status: "error",
                message,
            }),
        )
            .into_response()
    }
}

impl From<TranslateError> for ApiError {
    fn from(e: TranslateError) -> Self {
        match e {
            TranslateError::InvalidInput(m) => ApiError::BadRequest(m),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::Translate(t) => t.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

// ---- translate-speech ----

#[derive(Debug, Deserialize)]
pub struct SpeechQuery {
    #[serde(default = "default_speech_target")]
    pub target: String,
    #[serde(default = "default_source")]
    pub source: String,
}

fn default_speech_target() -> String {
    "en-US".to_string()
}

fn default_source() -> String {
    AUTO.to_string()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SpeechResponse {
    pub status: String,
    pub transcript: String,
    pub source_language: String,
    pub target_language: String,
    pub translation: String,
}

pub async fn translate_speech(
    State(state): State<AppState>,
    Query(query): Query<SpeechQuery>,
) -> Result<Response, ApiError> {
    let result = state
        .speech
        .run(&query.target, &query.source)
        .await
        .map_err(|e| {
            tracing::error!("speech translation failed: {e}");
            ApiError::Internal(e.to_string())
        })?;

    let Some(result) = result else {
        tracing::info!("no speech detected");
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    Ok(Json(SpeechResponse {
        status: "success".to_string(),
        transcript: result.transcript,
        source_language: result.source_language,
        target_language: result.target_language,
        translation: result.translated,
    })
    .into_response())
}

// ---- translate-text ----

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_text_target")]
    pub target: String,
    #[serde(default = "default_source")]
    pub source: String,
}

fn default_text_target() -> String {
    "en".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TextResponse {
    pub status: String,
    pub input: String,
    pub detected_language: String,
    pub target_language: String,
    pub translation: String,
}

pub async fn translate_text(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> Result<Json<TextResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    if request.text.is_empty() {
        return Err(ApiError::BadRequest("No text provided.".to_string()));
    }

    let result = voxbridge_translate::translate_text(
        state.translator.as_ref(),
        &request.text,
        &request.target,
        &request.source,
    )
    .await
    .map_err(|e| {
        tracing::warn!("text translation failed: {e}");
        ApiError::from(e)
    })?;

    Ok(Json(TextResponse {
        status: "success".to_string(),
        input: result.input,
        detected_language: result.detected_language,
        target_language: result.target_language,
        translation: result.translated,
    }))
}

// ---- translate-audio ----

#[derive(Debug, Serialize, Deserialize)]
pub struct AudioResponse {
    pub translation: String,
}

#[derive(Default)]
struct AudioUpload {
    audio: Option<Vec<u8>>,
    target: Option<String>,
    source: Option<String>,
}

async fn read_upload(mut multipart: Multipart) -> Result<AudioUpload, ApiError> {
    let mut upload = AudioUpload::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "audio" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                upload.audio = Some(bytes.to_vec());
            }
            "target" | "source" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                if name == "target" {
                    upload.target = Some(value);
                } else {
                    upload.source = Some(value);
                }
            }
            other => tracing::debug!(field = other, "ignoring unknown upload field"),
        }
    }
    Ok(upload)
}

fn stage_recording(audio: &[u8]) -> std::io::Result<tempfile::NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("voxbridge-")
        .suffix(".webm")
        .tempfile()?;
    file.write_all(audio)?;
    file.flush()?;
    Ok(file)
}

pub async fn translate_audio(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let upload = read_upload(multipart).await?;

    let audio = match upload.audio {
        Some(audio) if !audio.is_empty() => audio,
        _ => return Err(ApiError::BadRequest("No audio file provided.".to_string())),
    };
    let target = upload
        .target
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "es".to_string());
    let source = upload
        .source
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| state.options.upload_source.clone());

    let outcome = match stage_recording(&audio) {
        // The staged file lives until the end of this arm.
        Ok(staged) => {
            state
                .recordings
                .run(staged.path(), &target, &source)
                .await
        }
        Err(e) => Err(PipelineError::Recording(e)),
    };

    match outcome {
        Ok(Some(result)) => Ok(Json(AudioResponse {
            translation: result.translated,
        })
        .into_response()),
        Ok(None) => Ok(StatusCode::NO_CONTENT.into_response()),
        Err(e) => {
            tracing::error!("audio translation failed: {e}");
            if state.options.audio_errors_as_empty_translation {
                Ok(Json(AudioResponse {
                    translation: String::new(),
                })
                .into_response())
            } else {
                Err(e.into())
            }
        }
    }
}

// ---- languages ----

#[derive(Debug, Serialize, Deserialize)]
pub struct LanguagesResponse {
    pub languages: BTreeMap<String, String>,
    pub auto_candidates: Vec<String>,
}

pub async fn languages(State(state): State<AppState>) -> Json<LanguagesResponse> {
    let languages = LANGUAGE_CODE_MAP
        .iter()
        .map(|(short, full)| (short.to_string(), full.to_string()))
        .collect();
    Json(LanguagesResponse {
        languages,
        auto_candidates: state.options.auto_candidates.clone(),
    })
}
