pub mod config;
pub mod error;
pub mod language;
pub mod types;

pub use config::AppConfig;
pub use error::{AsrError, AudioError, ConfigError, PipelineError, TranslateError};
pub use language::{base_code, canonical_tag, normalize, SourceLanguage};
pub use types::{
    AudioChunk, AudioEncoding, RecognitionConfig, RecognitionResult, SpeechAlternative,
    StreamingRecognitionConfig, StreamingRecognizeResponse, Transcript, TranscriptionResult,
    Translation, TranslationResult,
};
