use crate::capture::{CaptureFormat, DeviceGuard, InputBackend};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use voxbridge_core::{AudioChunk, AudioError};

const RETRY_INTERVAL: Duration = Duration::from_millis(1);

/// Plays back pre-recorded frames as if they came from a device.
///
/// By default the stream ends after the last frame, like a finished
/// recording. With [`hold_open`](Self::hold_open) the "device" stays
/// acquired after playback until the session closes, like a live
/// microphone picking up silence.
pub struct ReplayBackend {
    chunks: Vec<AudioChunk>,
    hold_open: bool,
    opened: Arc<AtomicUsize>,
    active: Arc<AtomicUsize>,
}

impl ReplayBackend {
    pub fn new(chunks: Vec<AudioChunk>) -> Self {
        Self {
            chunks,
            hold_open: false,
            opened: Arc::new(AtomicUsize::new(0)),
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn hold_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    /// Number of acquisitions so far.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Acquisitions not yet released.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

impl InputBackend for ReplayBackend {
    fn name(&self) -> &str {
        "replay"
    }

    fn open(
        &self,
        _format: CaptureFormat,
        frames: mpsc::Sender<AudioChunk>,
    ) -> Result<DeviceGuard, AudioError> {
        let chunks = self.chunks.clone();
        let hold_open = self.hold_open;
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        self.opened.fetch_add(1, Ordering::SeqCst);
        self.active.fetch_add(1, Ordering::SeqCst);
        let active = Arc::clone(&self.active);

        let thread = std::thread::Builder::new()
            .name("voxbridge-replay".to_string())
            .spawn(move || {
                'chunks: for chunk in chunks {
                    let mut pending = chunk;
                    loop {
                        if stop_flag.load(Ordering::SeqCst) {
                            break 'chunks;
                        }
                        match frames.try_send(pending) {
                            Ok(()) => break,
                            Err(TrySendError::Full(c)) => {
                                pending = c;
                                std::thread::sleep(RETRY_INTERVAL);
                            }
                            Err(TrySendError::Closed(_)) => break 'chunks,
                        }
                    }
                }
                while hold_open && !stop_flag.load(Ordering::SeqCst) {
                    std::thread::sleep(RETRY_INTERVAL);
                }
                drop(frames);
            })
            .map_err(|e| {
                self.active.fetch_sub(1, Ordering::SeqCst);
                AudioError::StreamBuild(e.to_string())
            })?;

        Ok(DeviceGuard::new(move || {
            stop.store(true, Ordering::SeqCst);
            let _ = thread.join();
            active.fetch_sub(1, Ordering::SeqCst);
        }))
    }
}
