use async_trait::async_trait;
use tokio::sync::mpsc;
use voxbridge_core::{
    AsrError, AudioChunk, RecognitionConfig, RecognitionResult, StreamingRecognitionConfig,
    StreamingRecognizeResponse,
};

pub type ResponseStream = mpsc::Receiver<Result<StreamingRecognizeResponse, AsrError>>;

/// A speech recognition backend.
///
/// Implementations are registered via [`RecognizerRegistry`](crate::RecognizerRegistry),
/// initialised once at startup and shared behind an `Arc` afterwards.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Registry name (e.g. `"google"`).
    fn name(&self) -> &str;
    /// One-time initialisation with backend-specific TOML configuration.
    async fn initialize(&mut self, config: toml::Value) -> Result<(), AsrError>;
    /// Start a streaming session fed from `audio`.
    ///
    /// The response stream ends when the audio runs out. Dropping the
    /// returned receiver abandons the session; the backend must then stop
    /// consuming audio.
    async fn streaming_recognize(
        &self,
        config: StreamingRecognitionConfig,
        audio: mpsc::Receiver<AudioChunk>,
    ) -> Result<ResponseStream, AsrError>;
    /// Single-shot recognition of a complete audio payload.
    async fn recognize(
        &self,
        config: &RecognitionConfig,
        audio: Vec<u8>,
    ) -> Result<Vec<RecognitionResult>, AsrError>;
    async fn shutdown(&self) -> Result<(), AsrError>;
}
