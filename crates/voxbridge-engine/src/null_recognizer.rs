use crate::recognizer::{ResponseStream, SpeechRecognizer};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use voxbridge_core::{
    AsrError, AudioChunk, RecognitionConfig, RecognitionResult, StreamingRecognitionConfig,
};

const DEFAULT_LISTEN_MS: u64 = 5000;

/// Recognizer that hears nothing.
///
/// Streaming sessions swallow up to `listen_ms` of audio and then end
/// without a result, so a server without cloud credentials still answers
/// `no speech detected` instead of hanging on a live microphone.
pub struct NullRecognizer {
    listen_ms: u64,
    feed_count: Arc<AtomicUsize>,
}

impl NullRecognizer {
    pub fn new() -> Self {
        Self {
            listen_ms: DEFAULT_LISTEN_MS,
            feed_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Audio chunks consumed across all sessions.
    pub fn feed_count(&self) -> usize {
        self.feed_count.load(Ordering::Relaxed)
    }
}

impl Default for NullRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechRecognizer for NullRecognizer {
    fn name(&self) -> &str {
        "null"
    }

    async fn initialize(&mut self, config: toml::Value) -> Result<(), AsrError> {
        if let Some(ms) = config.get("listen_ms").and_then(|v| v.as_integer()) {
            let ms = u64::try_from(ms).map_err(|_| {
                AsrError::InitializationFailed("'listen_ms' must not be negative".to_string())
            })?;
            self.listen_ms = ms;
        }
        Ok(())
    }

    async fn streaming_recognize(
        &self,
        config: StreamingRecognitionConfig,
        mut audio: mpsc::Receiver<AudioChunk>,
    ) -> Result<ResponseStream, AsrError> {
        let (tx, rx) = mpsc::channel(1);
        let bytes_per_ms = u64::from(config.config.sample_rate_hertz) * 2 / 1000;
        let budget = self.listen_ms * bytes_per_ms.max(1);
        let feed_count = Arc::clone(&self.feed_count);

        tokio::spawn(async move {
            let mut heard = 0u64;
            while heard < budget {
                let Some(chunk) = audio.recv().await else {
                    break;
                };
                heard += chunk.data.len() as u64;
                feed_count.fetch_add(1, Ordering::Relaxed);
            }
            tracing::trace!(bytes = heard, "NullRecognizer session finished");
            drop(tx);
        });

        Ok(rx)
    }

    async fn recognize(
        &self,
        _config: &RecognitionConfig,
        _audio: Vec<u8>,
    ) -> Result<Vec<RecognitionResult>, AsrError> {
        Ok(Vec::new())
    }

    async fn shutdown(&self) -> Result<(), AsrError> {
        Ok(())
    }
}
