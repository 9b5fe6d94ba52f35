use crate::device::DeviceManager;
use crate::frames::FrameAssembler;
use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{SampleRate, Stream, StreamConfig};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use voxbridge_core::config::AudioConfig;
use voxbridge_core::{AudioChunk, AudioError};

/// Shape of the frames a capture session delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureFormat {
    pub sample_rate: u32,
    pub channels: u16,
    /// Samples per channel in each frame.
    pub chunk_size: u32,
    pub queue_depth: usize,
}

impl From<&AudioConfig> for CaptureFormat {
    fn from(config: &AudioConfig) -> Self {
        Self {
            sample_rate: config.sample_rate,
            channels: 1,
            chunk_size: config.chunk_size,
            queue_depth: config.queue_depth,
        }
    }
}

/// Exclusive hold on an input device. Dropping it releases the device and
/// drops the backend's frame sender, which ends the frame stream.
pub struct DeviceGuard {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl DeviceGuard {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }
}

impl Drop for DeviceGuard {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// A source of live audio frames.
pub trait InputBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Acquire the device and start pushing frames into `frames`.
    ///
    /// May block until the device is running, and releasing the returned
    /// guard may block until it has stopped. Async callers go through
    /// [`CaptureSession::acquire`] and [`CaptureSession::release`].
    /// Implementations must never block the producer side on a full queue.
    fn open(
        &self,
        format: CaptureFormat,
        frames: mpsc::Sender<AudioChunk>,
    ) -> Result<DeviceGuard, AudioError>;
}

// ── CaptureSession ────────────────────────────────────────────

/// One scoped microphone acquisition.
///
/// The frame stream is single-pass: it can be taken once, and a new session
/// must be opened for another attempt. The device is released by
/// [`close`](Self::close) or on drop, whichever comes first.
pub struct CaptureSession {
    frames: Option<mpsc::Receiver<AudioChunk>>,
    device: Option<DeviceGuard>,
}

impl CaptureSession {
    pub fn open(backend: &dyn InputBackend, format: CaptureFormat) -> Result<Self, AudioError> {
        let (tx, rx) = mpsc::channel(format.queue_depth.max(1));
        let device = backend.open(format, tx)?;
        tracing::debug!(
            backend = backend.name(),
            sample_rate = format.sample_rate,
            chunk_size = format.chunk_size,
            "capture session opened"
        );
        Ok(Self {
            frames: Some(rx),
            device: Some(device),
        })
    }

    /// [`open`](Self::open) on the blocking pool.
    pub async fn acquire(
        backend: Arc<dyn InputBackend>,
        format: CaptureFormat,
    ) -> Result<Self, AudioError> {
        tokio::task::spawn_blocking(move || Self::open(backend.as_ref(), format))
            .await
            .map_err(|e| AudioError::StreamBuild(format!("capture task failed: {e}")))?
    }

    /// [`close`](Self::close) on the blocking pool.
    pub async fn release(self) {
        if let Err(e) = tokio::task::spawn_blocking(move || drop(self)).await {
            tracing::warn!("capture release task failed: {e}");
        }
    }

    /// Hand the frame stream to its consumer.
    pub fn take_stream(&mut self) -> Result<mpsc::Receiver<AudioChunk>, AudioError> {
        self.frames.take().ok_or(AudioError::StreamConsumed)
    }

    pub fn is_open(&self) -> bool {
        self.device.is_some()
    }

    pub fn close(&mut self) {
        // Receiver first so a producer waiting on queue space sees it closed.
        self.frames.take();
        if let Some(device) = self.device.take() {
            drop(device);
            tracing::debug!("capture session closed");
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.close();
    }
}

// ── CpalBackend ───────────────────────────────────────────────

/// Microphone input through cpal.
///
/// `cpal::Stream` is not `Send` on every host, so each acquisition owns a
/// dedicated thread that builds the stream, parks until the guard is dropped,
/// then drops the stream.
pub struct CpalBackend {
    device_name: String,
}

impl CpalBackend {
    pub fn new(device_name: impl Into<String>) -> Self {
        Self {
            device_name: device_name.into(),
        }
    }
}

impl InputBackend for CpalBackend {
    fn name(&self) -> &str {
        "cpal"
    }

    fn open(
        &self,
        format: CaptureFormat,
        frames: mpsc::Sender<AudioChunk>,
    ) -> Result<DeviceGuard, AudioError> {
        let device_name = self.device_name.clone();
        let (ready_tx, ready_rx) = std::sync::mpsc::sync_channel::<Result<(), AudioError>>(1);
        let (stop_tx, stop_rx) = std::sync::mpsc::channel::<()>();

        let thread = std::thread::Builder::new()
            .name("voxbridge-capture".to_string())
            .spawn(move || {
                let stream = match build_stream(&device_name, format, frames) {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));

                // Returns once the guard drops its sender.
                let _ = stop_rx.recv();
                drop(stream);
                tracing::debug!(device = %device_name, "input device released");
            })
            .map_err(|e| AudioError::StreamBuild(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = thread.join();
                return Err(e);
            }
            Err(_) => {
                let _ = thread.join();
                return Err(AudioError::StreamBuild(
                    "capture thread exited before the stream started".to_string(),
                ));
            }
        }

        Ok(DeviceGuard::new(move || {
            drop(stop_tx);
            let _ = thread.join();
        }))
    }
}

fn build_stream(
    device_name: &str,
    format: CaptureFormat,
    frames: mpsc::Sender<AudioChunk>,
) -> Result<Stream, AudioError> {
    let device = DeviceManager::new().get_input_device(device_name)?;

    let config = StreamConfig {
        channels: format.channels,
        sample_rate: SampleRate(format.sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let frame_len = format.chunk_size as usize * format.channels as usize;
    let mut assembler = FrameAssembler::new(frame_len, format.sample_rate, format.channels);

    let err_callback = |err: cpal::StreamError| {
        tracing::error!("capture stream error: {}", err);
    };

    let stream = device
        .build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                assembler.push(data, |chunk| match frames.try_send(chunk) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        tracing::warn!("capture queue full, dropping frame");
                    }
                    // Consumer finished early; nothing left to deliver to.
                    Err(TrySendError::Closed(_)) => {}
                });
            },
            err_callback,
            None,
        )
        .map_err(|e| AudioError::StreamBuild(e.to_string()))?;

    stream
        .play()
        .map_err(|e| AudioError::StreamError(e.to_string()))?;

    Ok(stream)
}
