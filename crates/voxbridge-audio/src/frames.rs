use crate::create_ring_buffer;
use ringbuf::traits::{Consumer, Observer, Producer};
use ringbuf::{HeapCons, HeapProd};
use voxbridge_core::AudioChunk;

/// Re-blocks device callback buffers of arbitrary length into fixed-size
/// LINEAR16 frames.
///
/// A trailing partial frame stays pending; it is dropped with the assembler.
pub struct FrameAssembler {
    producer: HeapProd<f32>,
    consumer: HeapCons<f32>,
    frame_len: usize,
    scratch: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl FrameAssembler {
    /// `frame_len` counts interleaved samples across all channels.
    pub fn new(frame_len: usize, sample_rate: u32, channels: u16) -> Self {
        let frame_len = frame_len.max(1);
        let (producer, consumer) = create_ring_buffer(frame_len * 2);
        Self {
            producer,
            consumer,
            frame_len,
            scratch: vec![0.0; frame_len],
            sample_rate,
            channels,
        }
    }

    pub fn push(&mut self, mut samples: &[f32], mut emit: impl FnMut(AudioChunk)) {
        while !samples.is_empty() {
            let pushed = self.producer.push_slice(samples);
            samples = &samples[pushed..];

            while self.consumer.occupied_len() >= self.frame_len {
                self.consumer.pop_slice(&mut self.scratch);
                emit(AudioChunk {
                    data: encode_linear16(&self.scratch),
                    sample_rate: self.sample_rate,
                    channels: self.channels,
                });
            }
        }
    }

    /// Samples buffered toward the next frame.
    pub fn pending(&self) -> usize {
        self.consumer.occupied_len()
    }
}

/// Convert `[-1.0, 1.0]` float samples to signed 16-bit little-endian bytes.
pub fn encode_linear16(samples: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * 2);
    for s in samples {
        let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}
