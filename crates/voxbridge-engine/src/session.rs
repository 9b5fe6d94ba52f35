use crate::recognizer::SpeechRecognizer;
use tokio::sync::mpsc;
use voxbridge_core::config::RecognizerConfig;
use voxbridge_core::{
    canonical_tag, AsrError, AudioChunk, AudioEncoding, RecognitionConfig, RecognitionResult, SourceLanguage,
    StreamingRecognitionConfig, Transcript,
};

/// How recognition requests are shaped for a requested source language.
///
/// `auto` offers the recognizer a primary hypothesis plus a candidate list
/// and uses the long-form model; a known language is sent alone with the
/// more conservative default model.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionProfile {
    pub auto_primary_language: String,
    pub auto_alternative_languages: Vec<String>,
    pub auto_model: String,
    pub known_model: String,
    pub report_detected_language: bool,
}

impl From<&RecognizerConfig> for RecognitionProfile {
    fn from(config: &RecognizerConfig) -> Self {
        Self {
            auto_primary_language: config.auto_primary_language.clone(),
            auto_alternative_languages: config.auto_alternative_languages.clone(),
            auto_model: config.auto_model.clone(),
            known_model: config.known_model.clone(),
            report_detected_language: config.report_detected_language,
        }
    }
}

impl Default for RecognitionProfile {
    fn default() -> Self {
        Self::from(&RecognizerConfig::default())
    }
}

impl RecognitionProfile {
    /// Locale the recognizer is primed with.
    pub fn language_used<'a>(&'a self, source: &'a SourceLanguage) -> &'a str {
        match source {
            SourceLanguage::Auto => &self.auto_primary_language,
            SourceLanguage::Known(code) => code,
        }
    }

    /// Source language to report for a finished transcript.
    ///
    /// A known source is always reported as requested. For `auto` the
    /// primed hypothesis is reported unless detected-language reporting is
    /// enabled and the recognizer returned a code.
    pub fn reported_language(&self, source: &SourceLanguage, detected: Option<&str>) -> String {
        match (source, detected) {
            (SourceLanguage::Auto, Some(code))
                if self.report_detected_language && !code.is_empty() =>
            {
                canonical_tag(code)
            }
            _ => self.language_used(source).to_string(),
        }
    }

    pub fn recognition_config(
        &self,
        source: &SourceLanguage,
        encoding: AudioEncoding,
        sample_rate_hertz: u32,
    ) -> RecognitionConfig {
        let (alternative_language_codes, model) = match source {
            SourceLanguage::Auto => (
                self.auto_alternative_languages.clone(),
                self.auto_model.clone(),
            ),
            SourceLanguage::Known(_) => (Vec::new(), self.known_model.clone()),
        };
        RecognitionConfig {
            encoding,
            sample_rate_hertz,
            language_code: self.language_used(source).to_string(),
            alternative_language_codes,
            enable_automatic_punctuation: true,
            model,
        }
    }

    /// Streaming config for LINEAR16 microphone capture.
    pub fn streaming_config(
        &self,
        source: &SourceLanguage,
        sample_rate_hertz: u32,
    ) -> StreamingRecognitionConfig {
        StreamingRecognitionConfig {
            config: self.recognition_config(source, AudioEncoding::Linear16, sample_rate_hertz),
            interim_results: true,
            single_utterance: true,
        }
    }
}

/// Run one streaming session and keep the first finalized transcript.
///
/// Only the first result of each response is inspected. Interim results
/// are skipped; the first final result carrying an alternative ends the
/// session, and the response stream is dropped so the recognizer stops
/// consuming audio. Audio running out first yields `Ok(None)`.
pub async fn first_final_transcript(
    recognizer: &dyn SpeechRecognizer,
    config: StreamingRecognitionConfig,
    audio: mpsc::Receiver<AudioChunk>,
) -> Result<Option<Transcript>, AsrError> {
    let mut responses = recognizer.streaming_recognize(config, audio).await?;

    while let Some(response) = responses.recv().await {
        let response = response?;
        let Some(result) = response.results.first() else {
            continue;
        };
        if !result.is_final {
            tracing::trace!(interim = ?result.first_transcript(), "interim result");
            continue;
        }
        if let Some(text) = result.first_transcript() {
            tracing::debug!(recognizer = recognizer.name(), "final transcript received");
            return Ok(Some(Transcript {
                text: text.to_string(),
                language_code: result.language_code.clone(),
            }));
        }
    }

    tracing::debug!(recognizer = recognizer.name(), "audio ended without a final result");
    Ok(None)
}

/// First alternative of the first result from a single-shot request.
pub fn first_transcript(results: &[RecognitionResult]) -> Option<Transcript> {
    let result = results.first()?;
    result.first_transcript().map(|text| Transcript {
        text: text.to_string(),
        language_code: result.language_code.clone(),
    })
}
