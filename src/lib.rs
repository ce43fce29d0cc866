//! # OSC Audio Streamer
//!
//! Multi-channel audio, text, and analysis streaming over UDP using a
//! lightweight human-readable OSC-style wire format.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────── SENDER ────────────────────────────┐
//! │                                                                │
//! │  ┌────────────────┐    ┌──────────────┐    ┌───────────────┐   │
//! │  │ SineGenerator  │───▶│  BufferPool  │───▶│   OscSender   │   │
//! │  │ (mock source)  │    │ (preallocated│    │ clamp + chunk │   │
//! │  └────────────────┘    │  f32 blocks) │    │ + "%.3f" text │   │
//! │                        └──────────────┘    └───────┬───────┘   │
//! └────────────────────────────────────────────────────┼───────────┘
//!                                                      │ UDP datagrams
//!                          "/audio/stream_0 0.123 -0.456 ..."
//!                                                      │
//! ┌────────────────────────── RECEIVER ────────────────▼───────────┐
//! │  ┌─────────────┐   ┌───────────┐   ┌────────────────────────┐  │
//! │  │ OscReceiver │──▶│   Codec   │──▶│  dispatch by channel   │  │
//! │  │ (recv loop) │   │ decode +  │   │  audio / text /        │  │
//! │  └─────────────┘   │ classify  │   │  analysis / unknown    │  │
//! │                    └───────────┘   └───────────┬────────────┘  │
//! │                                                │ audio         │
//! │                                    ┌───────────▼────────────┐  │
//! │                                    │ PlaybackQueue (cap 20, │  │
//! │                                    │ drop-oldest jitter buf)│  │
//! │                                    └───────────┬────────────┘  │
//! │                                                │ pull          │
//! │                                    ┌───────────▼────────────┐  │
//! │                                    │ cpal output callback   │  │
//! │                                    │ (volume, silence-fill) │  │
//! │                                    └────────────────────────┘  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The wire format is plain ASCII: an address token, an optional `_<index>`
//! chunk suffix, then space-separated samples formatted to three decimals.
//! A datagram is one message; there is no length prefix, checksum, or
//! delivery guarantee beyond what UDP provides.

pub mod audio;
pub mod codec;
pub mod config;
pub mod error;
pub mod network;
pub mod pipeline;

pub use error::{Error, Result};

/// Application-wide constants
pub mod constants {
    /// Default sample rate for audio processing
    pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

    /// Default audio block size in frames
    pub const DEFAULT_BUFFER_SIZE: usize = 512;

    /// Default UDP port for OSC messages
    pub const DEFAULT_OSC_PORT: u16 = 8000;

    /// Default address for audio streams
    pub const DEFAULT_OSC_ADDRESS: &str = "/audio/stream";

    /// Samples carried by a single datagram
    pub const CHUNK_SIZE: usize = 128;

    /// Maximum samples accepted by one send call
    pub const MAX_SAMPLES_PER_SEND: usize = 4096;

    /// Maximum datagrams produced by one send call
    pub const MAX_CHUNKS_PER_SEND: usize = 32;

    /// Maximum encoded message size in bytes
    pub const MAX_DATAGRAM_SIZE: usize = 1200;

    /// Receive buffer size in bytes
    pub const RECV_BUFFER_SIZE: usize = 4096;

    /// Playback jitter buffer capacity in audio blocks
    pub const PLAYBACK_QUEUE_CAP: usize = 20;

    /// Receiver-side history of recent audio blocks
    pub const AUDIO_HISTORY_CAP: usize = 10;

    /// Default playback volume
    pub const DEFAULT_VOLUME: f32 = 0.5;

    /// Default mock-source frequency in Hz
    pub const DEFAULT_FREQUENCY: f32 = 440.0;
}
