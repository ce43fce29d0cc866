//! Playback queue and audio output
//!
//! [`PlaybackQueue`] is the jitter buffer between the network thread and
//! the real-time output callback: a bounded drop-oldest FIFO of decoded
//! audio blocks plus the pull-side fill algorithm. [`AudioOutput`] wraps a
//! cpal output stream whose callback drains the queue.
//!
//! The fill path never blocks on anything unbounded and never allocates:
//! taking the next block out of the FIFO is a move, and copies go straight
//! into the backend's output slice.

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{BufferSize, SampleRate, Stream, StreamConfig};
use crossbeam_channel::{bounded, Receiver};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use crate::audio::device::default_output_device;
use crate::constants::{DEFAULT_VOLUME, PLAYBACK_QUEUE_CAP};
use crate::error::AudioError;

#[derive(Default)]
struct QueueState {
    /// Blocks waiting to be played, oldest first
    queue: VecDeque<Vec<f32>>,
    /// Block currently being drained
    current: Vec<f32>,
    /// Read position into `current`
    position: usize,
}

/// Bounded FIFO of audio blocks with a real-time pull side
pub struct PlaybackQueue {
    state: Mutex<QueueState>,
    /// Volume as f32 bits; single-word access keeps the callback lock-free
    volume: AtomicU32,
    underruns: AtomicU64,
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            volume: AtomicU32::new(DEFAULT_VOLUME.to_bits()),
            underruns: AtomicU64::new(0),
        }
    }

    /// Queue a decoded block for playback.
    ///
    /// Past capacity the oldest unplayed block is dropped, bounding both
    /// memory and end-to-end latency; the producer is never stalled.
    pub fn push(&self, samples: Vec<f32>) {
        if samples.is_empty() {
            return;
        }

        let mut state = self.state.lock();
        state.queue.push_back(samples);
        while state.queue.len() > PLAYBACK_QUEUE_CAP {
            state.queue.pop_front();
        }
    }

    /// Fill `output` from the queue, scaling by the current volume.
    ///
    /// The whole slice is zeroed first; an underrun leaves the unfilled
    /// tail as silence. Returns the number of samples actually written.
    pub fn fill(&self, output: &mut [f32]) -> usize {
        output.fill(0.0);

        let volume = self.volume();
        let mut state = self.state.lock();
        let mut filled = 0;

        while filled < output.len() {
            if state.position >= state.current.len() {
                match state.queue.pop_front() {
                    Some(next) => {
                        state.current = next;
                        state.position = 0;
                    }
                    None => {
                        self.underruns.fetch_add(1, Ordering::Relaxed);
                        break;
                    }
                }
            }

            let available = state.current.len() - state.position;
            let needed = output.len() - filled;
            let count = available.min(needed);

            for i in 0..count {
                output[filled + i] = state.current[state.position + i] * volume;
            }

            state.position += count;
            filled += count;
        }

        filled
    }

    /// Set playback volume, clamped to [0, 1]
    pub fn set_volume(&self, volume: f32) {
        self.volume
            .store(volume.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    /// Current playback volume
    pub fn volume(&self) -> f32 {
        f32::from_bits(self.volume.load(Ordering::Relaxed))
    }

    /// Blocks currently waiting in the FIFO
    pub fn queued_blocks(&self) -> usize {
        self.state.lock().queue.len()
    }

    /// Fills that ran out of queued audio
    pub fn underrun_count(&self) -> u64 {
        self.underruns.load(Ordering::Relaxed)
    }
}

impl Default for PlaybackQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Audio output through the default device
pub struct AudioOutput {
    sample_rate: u32,
    buffer_size: usize,
    queue: Arc<PlaybackQueue>,
    stream: Option<Stream>,
    error_rx: Option<Receiver<AudioError>>,
}

impl AudioOutput {
    /// Create an output for the given sample rate and block size
    pub fn new(sample_rate: u32, buffer_size: usize) -> Self {
        Self {
            sample_rate,
            buffer_size,
            queue: Arc::new(PlaybackQueue::new()),
            stream: None,
            error_rx: None,
        }
    }

    /// Open the default output device and start the stream.
    ///
    /// Idempotent while running.
    pub fn start(&mut self) -> Result<(), AudioError> {
        if self.stream.is_some() {
            return Ok(());
        }

        let device = default_output_device()?;

        let config = StreamConfig {
            channels: 1,
            sample_rate: SampleRate(self.sample_rate),
            buffer_size: BufferSize::Fixed(self.buffer_size as u32),
        };

        let (error_tx, error_rx) = bounded::<AudioError>(16);
        let queue = self.queue.clone();

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    queue.fill(data);
                },
                move |err| {
                    let _ = error_tx.try_send(AudioError::StreamError(err.to_string()));
                },
                None,
            )
            .map_err(|e| AudioError::StreamError(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamError(e.to_string()))?;

        self.stream = Some(stream);
        self.error_rx = Some(error_rx);

        tracing::info!(
            "Audio output started ({} Hz, {} frame blocks)",
            self.sample_rate,
            self.buffer_size
        );
        Ok(())
    }

    /// Stop and close the stream. Idempotent while stopped.
    pub fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.pause();
            tracing::info!("Audio output stopped");
        }
        self.error_rx = None;
    }

    /// Whether the stream is open
    pub fn is_running(&self) -> bool {
        self.stream.is_some()
    }

    /// Queue a decoded block for playback
    pub fn add_audio_data(&self, samples: Vec<f32>) {
        self.queue.push(samples);
    }

    /// Shared handle to the playback queue
    pub fn queue(&self) -> Arc<PlaybackQueue> {
        self.queue.clone()
    }

    /// Set playback volume, clamped to [0, 1]
    pub fn set_volume(&self, volume: f32) {
        self.queue.set_volume(volume);
    }

    /// Current playback volume
    pub fn volume(&self) -> f32 {
        self.queue.volume()
    }

    /// Check for asynchronous stream errors
    pub fn check_errors(&self) -> Option<AudioError> {
        self.error_rx.as_ref().and_then(|rx| rx.try_recv().ok())
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_bounded_keeps_newest() {
        let queue = PlaybackQueue::new();

        for i in 0..25 {
            queue.push(vec![i as f32; 4]);
        }

        assert_eq!(queue.queued_blocks(), PLAYBACK_QUEUE_CAP);

        // The survivors must be blocks 5..25, oldest first
        queue.set_volume(1.0);
        let mut output = vec![0.0f32; 4];
        queue.fill(&mut output);
        assert_eq!(output, vec![5.0; 4]);
    }

    #[test]
    fn test_fill_copies_and_scales() {
        let queue = PlaybackQueue::new();
        queue.set_volume(0.5);
        queue.push(vec![1.0, -1.0, 0.5, 0.25]);

        let mut output = vec![9.0f32; 4];
        let written = queue.fill(&mut output);

        assert_eq!(written, 4);
        assert_eq!(output, vec![0.5, -0.5, 0.25, 0.125]);
    }

    #[test]
    fn test_underrun_fills_silence() {
        let queue = PlaybackQueue::new();
        queue.set_volume(1.0);
        queue.push(vec![0.5, 0.5]);

        let mut output = vec![9.0f32; 8];
        let written = queue.fill(&mut output);

        assert_eq!(written, 2);
        assert_eq!(&output[..2], &[0.5, 0.5]);
        assert_eq!(&output[2..], &[0.0; 6], "underrun tail must be exact zeros");
        assert_eq!(queue.underrun_count(), 1);
    }

    #[test]
    fn test_empty_queue_is_all_silence() {
        let queue = PlaybackQueue::new();
        let mut output = vec![9.0f32; 16];

        let written = queue.fill(&mut output);

        assert_eq!(written, 0);
        assert!(output.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_fill_spans_multiple_blocks() {
        let queue = PlaybackQueue::new();
        queue.set_volume(1.0);
        queue.push(vec![0.1; 3]);
        queue.push(vec![0.2; 3]);
        queue.push(vec![0.3; 3]);

        let mut output = vec![0.0f32; 7];
        let written = queue.fill(&mut output);

        assert_eq!(written, 7);
        assert_eq!(output, vec![0.1, 0.1, 0.1, 0.2, 0.2, 0.2, 0.3]);

        // The remainder of the third block must survive for the next fill
        let mut rest = vec![0.0f32; 2];
        assert_eq!(queue.fill(&mut rest), 2);
        assert_eq!(rest, vec![0.3, 0.3]);
    }

    #[test]
    fn test_volume_clamped() {
        let queue = PlaybackQueue::new();

        queue.set_volume(-1.0);
        assert_eq!(queue.volume(), 0.0);

        queue.set_volume(2.0);
        assert_eq!(queue.volume(), 1.0);

        queue.set_volume(0.75);
        assert_eq!(queue.volume(), 0.75);
    }

    #[test]
    fn test_empty_push_ignored() {
        let queue = PlaybackQueue::new();
        queue.push(vec![]);
        assert_eq!(queue.queued_blocks(), 0);
    }

    #[test]
    fn test_output_creation() {
        // Stream startup needs real hardware; only the quiescent API here
        let output = AudioOutput::new(44_100, 512);
        assert!(!output.is_running());
        assert!(output.check_errors().is_none());

        output.set_volume(0.25);
        assert_eq!(output.volume(), 0.25);
    }
}
