//! UDP message sender
//!
//! Serializes a float buffer into one or more capped-size datagrams and
//! transmits them best-effort. Buffers larger than one chunk are split
//! into `CHUNK_SIZE`-sample datagrams tagged `<address>_<index>`.

use std::net::{SocketAddr, UdpSocket};

use crate::codec::encode_audio;
use crate::constants::{
    CHUNK_SIZE, DEFAULT_OSC_ADDRESS, MAX_CHUNKS_PER_SEND, MAX_SAMPLES_PER_SEND,
};
use crate::error::NetworkError;

/// Sender statistics
#[derive(Debug, Clone, Default)]
pub struct SenderStats {
    pub packets_sent: u64,
    pub bytes_sent: u64,
    pub sends_rejected: u64,
}

/// UDP sender for audio messages
pub struct OscSender {
    socket: Option<UdpSocket>,
    dest: SocketAddr,
    default_address: String,
    stats: SenderStats,
}

impl OscSender {
    /// Create a sender targeting `host:port`
    pub fn new(host: &str, port: u16) -> Result<Self, NetworkError> {
        let dest = parse_dest(host, port)?;
        let socket = open_socket()?;

        tracing::info!("OSC sender ready for {}", dest);

        Ok(Self {
            socket: Some(socket),
            dest,
            default_address: DEFAULT_OSC_ADDRESS.to_string(),
            stats: SenderStats::default(),
        })
    }

    /// Send samples under the default address
    pub fn send_audio(&mut self, samples: &[f32]) -> Result<(), NetworkError> {
        let address = self.default_address.clone();
        self.send_audio_to(&address, samples)
    }

    /// Send samples under an explicit address.
    ///
    /// The whole call is rejected up front when the sample or chunk caps
    /// are exceeded; nothing is partially sent in that case. A transmit
    /// failure mid-buffer abandons the remaining chunks of this call only.
    pub fn send_audio_to(&mut self, address: &str, samples: &[f32]) -> Result<(), NetworkError> {
        if samples.is_empty() {
            return Ok(());
        }

        let Some(socket) = self.socket.as_ref() else {
            tracing::error!("Send attempted without a socket");
            return Err(NetworkError::NotConnected);
        };

        if samples.len() > MAX_SAMPLES_PER_SEND {
            self.stats.sends_rejected += 1;
            tracing::error!("Audio buffer too large: {} samples", samples.len());
            return Err(NetworkError::TooManySamples(samples.len()));
        }

        let total_chunks = samples.len().div_ceil(CHUNK_SIZE);
        if total_chunks > MAX_CHUNKS_PER_SEND {
            self.stats.sends_rejected += 1;
            tracing::error!("Too many chunks required: {}", total_chunks);
            return Err(NetworkError::TooManyChunks(total_chunks));
        }

        for (index, chunk) in samples.chunks(CHUNK_SIZE).enumerate() {
            // Single-chunk sends keep the bare address on the wire
            let chunk_address = if total_chunks > 1 {
                format!("{}_{}", address, index)
            } else {
                address.to_string()
            };

            let payload = match encode_audio(&chunk_address, chunk) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::error!("Failed to encode chunk {}: {}", index, e);
                    break;
                }
            };

            match socket.send_to(&payload, self.dest) {
                Ok(sent) => {
                    self.stats.packets_sent += 1;
                    self.stats.bytes_sent += sent as u64;
                }
                Err(e) => {
                    tracing::warn!("Failed to send chunk {} to {}: {}", index, self.dest, e);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Point the sender at a new destination.
    ///
    /// The replacement socket is opened before the old one is dropped, so
    /// a failed update leaves the previous destination intact.
    pub fn update_destination(&mut self, host: &str, port: u16) -> Result<(), NetworkError> {
        let dest = parse_dest(host, port)?;
        let socket = open_socket()?;

        self.socket = Some(socket);
        self.dest = dest;

        tracing::info!("OSC destination updated: {}", dest);
        Ok(())
    }

    /// Change the address used by [`send_audio`](Self::send_audio)
    pub fn set_default_address(&mut self, address: &str) {
        self.default_address = address.to_string();
        tracing::info!("Default OSC address set to: {}", address);
    }

    /// Current default address
    pub fn default_address(&self) -> &str {
        &self.default_address
    }

    /// Current destination
    pub fn destination(&self) -> SocketAddr {
        self.dest
    }

    /// Whether the sender holds a usable socket
    pub fn is_ready(&self) -> bool {
        self.socket.is_some()
    }

    /// Get statistics
    pub fn stats(&self) -> SenderStats {
        self.stats.clone()
    }

    /// Reset statistics
    pub fn reset_stats(&mut self) {
        self.stats = SenderStats::default();
    }
}

fn parse_dest(host: &str, port: u16) -> Result<SocketAddr, NetworkError> {
    let ip: std::net::IpAddr = host
        .parse()
        .map_err(|_| NetworkError::InvalidAddress(host.to_string()))?;
    Ok(SocketAddr::new(ip, port))
}

fn open_socket() -> Result<UdpSocket, NetworkError> {
    UdpSocket::bind("0.0.0.0:0").map_err(|e| NetworkError::BindFailed(e.to_string()))
}
