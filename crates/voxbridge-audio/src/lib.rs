pub mod capture;
pub mod device;
pub mod frames;
pub mod replay;

pub use capture::{CaptureFormat, CaptureSession, CpalBackend, DeviceGuard, InputBackend};
pub use device::DeviceManager;
pub use frames::{encode_linear16, FrameAssembler};
pub use replay::ReplayBackend;

use ringbuf::traits::Split;
use ringbuf::{HeapCons, HeapProd, HeapRb};

/// Create a ring buffer split into producer and consumer halves.
pub fn create_ring_buffer(capacity: usize) -> (HeapProd<f32>, HeapCons<f32>) {
    HeapRb::<f32>::new(capacity).split()
}
