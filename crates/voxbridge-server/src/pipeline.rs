use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use voxbridge_audio::{CaptureFormat, CaptureSession, InputBackend};
use voxbridge_core::{
    normalize, AudioEncoding, PipelineError, SourceLanguage, Transcript, TranscriptionResult,
};
use voxbridge_engine::{first_final_transcript, first_transcript, RecognitionProfile, SpeechRecognizer};
use voxbridge_translate::{translate_transcript, Translator};

/// Capture one utterance and translate it.
#[async_trait]
pub trait SpeechPipeline: Send + Sync {
    /// `Ok(None)` means the audio ended without any finalized speech.
    async fn run(
        &self,
        target: &str,
        source: &str,
    ) -> Result<Option<TranscriptionResult>, PipelineError>;
}

/// Microphone -> streaming recognizer -> translator.
///
/// Steps run strictly in sequence with no retries; the first failure is
/// returned as is.
pub struct TranscriptionPipeline {
    input: Arc<dyn InputBackend>,
    recognizer: Arc<dyn SpeechRecognizer>,
    translator: Arc<dyn Translator>,
    profile: RecognitionProfile,
    format: CaptureFormat,
}

impl TranscriptionPipeline {
    pub fn new(
        input: Arc<dyn InputBackend>,
        recognizer: Arc<dyn SpeechRecognizer>,
        translator: Arc<dyn Translator>,
        profile: RecognitionProfile,
        format: CaptureFormat,
    ) -> Self {
        Self {
            input,
            recognizer,
            translator,
            profile,
            format,
        }
    }
}

#[async_trait]
impl SpeechPipeline for TranscriptionPipeline {
    async fn run(
        &self,
        target: &str,
        source: &str,
    ) -> Result<Option<TranscriptionResult>, PipelineError> {
        let target_language = normalize(target);
        let source = SourceLanguage::parse(source);
        let config = self
            .profile
            .streaming_config(&source, self.format.sample_rate);

        tracing::info!(
            source = %source,
            target = %target_language,
            recognizer = self.recognizer.name(),
            "listening for speech"
        );

        let mut capture = CaptureSession::acquire(Arc::clone(&self.input), self.format).await?;
        let outcome = match capture.take_stream() {
            Ok(audio) => first_final_transcript(self.recognizer.as_ref(), config, audio)
                .await
                .map_err(PipelineError::from),
            Err(e) => Err(e.into()),
        };
        // The device is released before translation starts.
        capture.release().await;

        let Some(transcript) = outcome? else {
            return Ok(None);
        };

        let result = finish(
            self.translator.as_ref(),
            &self.profile,
            transcript,
            &source,
            target_language,
        )
        .await?;
        Ok(Some(result))
    }
}

/// Uploaded recording -> single-shot recognizer -> translator.
pub struct RecordingPipeline {
    recognizer: Arc<dyn SpeechRecognizer>,
    translator: Arc<dyn Translator>,
    profile: RecognitionProfile,
    encoding: AudioEncoding,
    sample_rate: u32,
}

impl RecordingPipeline {
    pub fn new(
        recognizer: Arc<dyn SpeechRecognizer>,
        translator: Arc<dyn Translator>,
        profile: RecognitionProfile,
        encoding: AudioEncoding,
        sample_rate: u32,
    ) -> Self {
        Self {
            recognizer,
            translator,
            profile,
            encoding,
            sample_rate,
        }
    }

    /// Recognize the recording staged at `path` and translate it.
    pub async fn run(
        &self,
        path: &Path,
        target: &str,
        source: &str,
    ) -> Result<Option<TranscriptionResult>, PipelineError> {
        let audio = tokio::fs::read(path).await?;
        let target_language = normalize(target);
        let source = SourceLanguage::parse(source);
        let config = self
            .profile
            .recognition_config(&source, self.encoding, self.sample_rate);

        tracing::debug!(
            bytes = audio.len(),
            encoding = self.encoding.as_str(),
            target = %target_language,
            "recognizing uploaded recording"
        );

        let results = self.recognizer.recognize(&config, audio).await?;
        let Some(transcript) = first_transcript(&results) else {
            return Ok(None);
        };

        let result = finish(
            self.translator.as_ref(),
            &self.profile,
            transcript,
            &source,
            target_language,
        )
        .await?;
        Ok(Some(result))
    }
}

async fn finish(
    translator: &dyn Translator,
    profile: &RecognitionProfile,
    transcript: Transcript,
    source: &SourceLanguage,
    target_language: String,
) -> Result<TranscriptionResult, PipelineError> {
    let source_language = profile.reported_language(source, transcript.language_code.as_deref());

    let translated =
        translate_transcript(translator, &transcript.text, &source_language, &target_language)
            .await?;

    Ok(TranscriptionResult {
        transcript: transcript.text,
        source_language,
        target_language,
        translated,
    })
}
