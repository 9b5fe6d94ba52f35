use serde::{Deserialize, Serialize};

/// One captured block of LINEAR16 (signed 16-bit little-endian) audio.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    pub data: Vec<u8>,
    pub sample_rate: u32,
    pub channels: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioEncoding {
    Linear16,
    Flac,
    OggOpus,
    WebmOpus,
}

impl AudioEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioEncoding::Linear16 => "LINEAR16",
            AudioEncoding::Flac => "FLAC",
            AudioEncoding::OggOpus => "OGG_OPUS",
            AudioEncoding::WebmOpus => "WEBM_OPUS",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionConfig {
    pub encoding: AudioEncoding,
    pub sample_rate_hertz: u32,
    pub language_code: String,
    pub alternative_language_codes: Vec<String>,
    pub enable_automatic_punctuation: bool,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StreamingRecognitionConfig {
    pub config: RecognitionConfig,
    pub interim_results: bool,
    /// End the session once one utterance has been recognized; audio
    /// captured after it is never submitted.
    pub single_utterance: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpeechAlternative {
    pub transcript: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionResult {
    pub alternatives: Vec<SpeechAlternative>,
    pub is_final: bool,
    /// Language the recognizer settled on, when it reports one.
    pub language_code: Option<String>,
}

impl RecognitionResult {
    pub fn first_transcript(&self) -> Option<&str> {
        self.alternatives.first().map(|a| a.transcript.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamingRecognizeResponse {
    pub results: Vec<RecognitionResult>,
}

/// The accepted outcome of one recognition session.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub text: String,
    pub language_code: Option<String>,
}

/// Raw reply from a translation backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub translated_text: String,
    pub detected_source_language: Option<String>,
}

/// Outcome of a text translation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationResult {
    pub input: String,
    pub detected_language: String,
    pub target_language: String,
    pub translated: String,
}

/// Outcome of a speech capture + recognition + translation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptionResult {
    pub transcript: String,
    pub source_language: String,
    pub target_language: String,
    pub translated: String,
}
