use crate::pipeline::{RecordingPipeline, SpeechPipeline, TranscriptionPipeline};
use std::sync::Arc;
use voxbridge_audio::{CaptureFormat, InputBackend};
use voxbridge_core::AppConfig;
use voxbridge_engine::{RecognitionProfile, SpeechRecognizer};
use voxbridge_translate::Translator;

/// Handler-facing knobs that are not part of any pipeline.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub audio_errors_as_empty_translation: bool,
    pub upload_source: String,
    pub auto_candidates: Vec<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub speech: Arc<dyn SpeechPipeline>,
    pub recordings: Arc<RecordingPipeline>,
    pub translator: Arc<dyn Translator>,
    pub options: Arc<ServerOptions>,
}

impl AppState {
    /// Wire the pipelines from configuration and already-initialised backends.
    pub fn new(
        config: &AppConfig,
        input: Arc<dyn InputBackend>,
        recognizer: Arc<dyn SpeechRecognizer>,
        translator: Arc<dyn Translator>,
    ) -> Self {
        let profile = RecognitionProfile::from(&config.recognition);

        let speech = TranscriptionPipeline::new(
            input,
            Arc::clone(&recognizer),
            Arc::clone(&translator),
            profile.clone(),
            CaptureFormat::from(&config.audio),
        );
        let recordings = RecordingPipeline::new(
            recognizer,
            Arc::clone(&translator),
            profile,
            config.recognition.upload_encoding,
            config.recognition.upload_sample_rate,
        );

        Self {
            speech: Arc::new(speech),
            recordings: Arc::new(recordings),
            translator,
            options: Arc::new(ServerOptions {
                audio_errors_as_empty_translation: config
                    .server
                    .audio_errors_as_empty_translation,
                upload_source: config.recognition.upload_source.clone(),
                auto_candidates: config.recognition.auto_alternative_languages.clone(),
            }),
        }
    }
}
