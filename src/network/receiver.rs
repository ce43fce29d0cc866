//! UDP message receiver
//!
//! Owns the bound socket and a dedicated receive thread. Each datagram is
//! decoded, counted, and dispatched to the registered handler by channel.
//! Audio additionally lands in a latest-value slot and a short history
//! queue guarded by one mutex.
//!
//! ```text
//! UDP socket (recv_from, blocking)
//!     |
//!     v
//! codec::decode()          <- validation, token skipping
//!     |
//!     v
//! dispatch by ChannelKind  <- audio / text / analysis
//!     |
//!     +--> latest slot + history queue (mutex)
//!     +--> OscHandler callback (outside the lock)
//! ```
//!
//! `stop()` clears the running flag and wakes the blocked read by sending
//! a zero-length datagram to the socket's own port, then joins the thread.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::codec::{decode, OscMessage};
use crate::constants::{AUDIO_HISTORY_CAP, RECV_BUFFER_SIZE};
use crate::error::NetworkError;

/// Per-channel message handler.
///
/// All methods default to no-ops, so implementors pick only the channels
/// they care about and an unset handler costs nothing.
pub trait OscHandler: Send + Sync {
    /// Decoded audio samples
    fn on_audio(&self, address: &str, samples: &[f32]) {
        let _ = (address, samples);
    }

    /// Free-form text
    fn on_text(&self, address: &str, text: &str) {
        let _ = (address, text);
    }

    /// Feature vector
    fn on_analysis(&self, address: &str, features: &[f32]) {
        let _ = (address, features);
    }
}

/// Receiver statistics
#[derive(Debug, Clone, Default)]
pub struct ReceiverStats {
    pub messages_received: u64,
    pub bytes_received: u64,
    pub invalid_messages: u64,
    pub unknown_messages: u64,
}

#[derive(Default)]
struct AudioState {
    latest: Vec<f32>,
    history: VecDeque<Vec<f32>>,
}

#[derive(Default)]
struct Counters {
    messages: AtomicU64,
    bytes: AtomicU64,
    invalid: AtomicU64,
    unknown: AtomicU64,
}

/// Multi-channel UDP receiver
pub struct OscReceiver {
    port: u16,
    running: Arc<AtomicBool>,
    socket: Option<Arc<UdpSocket>>,
    thread_handle: Option<JoinHandle<()>>,
    handler: Option<Arc<dyn OscHandler>>,
    audio_state: Arc<Mutex<AudioState>>,
    counters: Arc<Counters>,
}

impl OscReceiver {
    /// Create a receiver for the given port (0 lets the OS pick)
    pub fn new(port: u16) -> Self {
        Self {
            port,
            running: Arc::new(AtomicBool::new(false)),
            socket: None,
            thread_handle: None,
            handler: None,
            audio_state: Arc::new(Mutex::new(AudioState::default())),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Register the message handler. Takes effect on the next `start`.
    pub fn set_handler(&mut self, handler: Arc<dyn OscHandler>) {
        self.handler = Some(handler);
    }

    /// Bind the socket and spawn the receive thread.
    ///
    /// Idempotent while running. On failure the receiver stays idle and
    /// can be started again later.
    pub fn start(&mut self) -> Result<(), NetworkError> {
        if self.running.load(Ordering::SeqCst) {
            return Ok(());
        }

        let socket = Arc::new(bind_reusable(self.port)?);
        self.running.store(true, Ordering::SeqCst);

        let running = self.running.clone();
        let thread_socket = socket.clone();
        let handler = self.handler.clone();
        let audio_state = self.audio_state.clone();
        let counters = self.counters.clone();

        let handle = thread::Builder::new()
            .name("osc-receiver".to_string())
            .spawn(move || {
                receive_loop(thread_socket, running, handler, audio_state, counters);
            })
            .map_err(|e| {
                self.running.store(false, Ordering::SeqCst);
                NetworkError::ThreadSpawn(e.to_string())
            })?;

        self.socket = Some(socket);
        self.thread_handle = Some(handle);

        tracing::info!("OSC receiver started on port {}", self.local_port().unwrap_or(self.port));
        Ok(())
    }

    /// Stop the receive thread and release the socket.
    ///
    /// Synchronous: returns after the thread has joined. Idempotent while
    /// idle. The receiver may be started again afterwards.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        // Wake a blocked recv_from with an empty datagram to our own port
        if let Some(socket) = self.socket.take() {
            if let Ok(local) = socket.local_addr() {
                let wake_addr = SocketAddr::from(([127, 0, 0, 1], local.port()));
                if let Ok(wake) = UdpSocket::bind("127.0.0.1:0") {
                    let _ = wake.send_to(&[], wake_addr);
                }
            }
        }

        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
            tracing::info!("OSC receiver stopped");
        }
    }

    /// Whether the receive thread is active
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Port the socket is bound to, once started
    pub fn local_port(&self) -> Option<u16> {
        self.socket
            .as_ref()
            .and_then(|s| s.local_addr().ok())
            .map(|a| a.port())
    }

    /// Most recently received audio buffer
    pub fn latest_audio(&self) -> Vec<f32> {
        self.audio_state.lock().latest.clone()
    }

    /// Recent audio buffers, oldest first
    pub fn audio_history(&self) -> Vec<Vec<f32>> {
        self.audio_state.lock().history.iter().cloned().collect()
    }

    /// Total datagrams received since creation
    pub fn message_count(&self) -> u64 {
        self.counters.messages.load(Ordering::Relaxed)
    }

    /// Get statistics
    pub fn stats(&self) -> ReceiverStats {
        ReceiverStats {
            messages_received: self.counters.messages.load(Ordering::Relaxed),
            bytes_received: self.counters.bytes.load(Ordering::Relaxed),
            invalid_messages: self.counters.invalid.load(Ordering::Relaxed),
            unknown_messages: self.counters.unknown.load(Ordering::Relaxed),
        }
    }
}

impl Drop for OscReceiver {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Bind `0.0.0.0:port` with SO_REUSEADDR set before the bind
fn bind_reusable(port: u16) -> Result<UdpSocket, NetworkError> {
    use socket2::{Domain, Protocol, Socket, Type};

    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))
        .map_err(|e| NetworkError::BindFailed(e.to_string()))?;
    socket
        .set_reuse_address(true)
        .map_err(|e| NetworkError::BindFailed(e.to_string()))?;

    let addr: SocketAddr = SocketAddr::from(([0, 0, 0, 0], port));
    socket
        .bind(&addr.into())
        .map_err(|e| NetworkError::BindFailed(format!("port {}: {}", port, e)))?;

    Ok(socket.into())
}

fn receive_loop(
    socket: Arc<UdpSocket>,
    running: Arc<AtomicBool>,
    handler: Option<Arc<dyn OscHandler>>,
    audio_state: Arc<Mutex<AudioState>>,
    counters: Arc<Counters>,
) {
    let mut buf = [0u8; RECV_BUFFER_SIZE];

    loop {
        match socket.recv_from(&mut buf) {
            Ok((len, _sender)) if len > 0 => {
                counters.messages.fetch_add(1, Ordering::Relaxed);
                counters.bytes.fetch_add(len as u64, Ordering::Relaxed);
                dispatch(&buf[..len], &handler, &audio_state, &counters);
            }
            Ok(_) => {
                // Zero-length read: the stop() wakeup, or an unexpected
                // empty datagram while still running
                if running.swap(false, Ordering::SeqCst) {
                    tracing::error!("Zero-length read in receive loop, stopping");
                }
                break;
            }
            Err(e) => {
                if running.swap(false, Ordering::SeqCst) {
                    tracing::error!("Socket error in receive loop: {}", e);
                }
                break;
            }
        }
    }
}

fn dispatch(
    data: &[u8],
    handler: &Option<Arc<dyn OscHandler>>,
    audio_state: &Mutex<AudioState>,
    counters: &Counters,
) {
    match decode(data) {
        Some(OscMessage::Audio { address, samples }) => {
            {
                let mut state = audio_state.lock();
                state.latest.clear();
                state.latest.extend_from_slice(&samples);
                state.history.push_back(samples.clone());
                while state.history.len() > AUDIO_HISTORY_CAP {
                    state.history.pop_front();
                }
            }
            // Handler runs without any lock held
            if let Some(handler) = handler {
                handler.on_audio(&address, &samples);
            }
            tracing::trace!("Audio message: {} ({} samples)", address, samples.len());
        }
        Some(OscMessage::Text { address, text }) => {
            if let Some(handler) = handler {
                handler.on_text(&address, &text);
            }
            tracing::trace!("Text message: {} ({} bytes)", address, text.len());
        }
        Some(OscMessage::Analysis { address, features }) => {
            if let Some(handler) = handler {
                handler.on_analysis(&address, &features);
            }
            tracing::trace!("Analysis message: {} ({} features)", address, features.len());
        }
        Some(OscMessage::Unknown { address }) => {
            counters.unknown.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Unroutable address: {}", address);
        }
        None => {
            counters.invalid.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Invalid message ({} bytes)", data.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{bounded, Sender};
    use std::time::{Duration, Instant};

    struct ChannelHandler {
        audio_tx: Sender<(String, Vec<f32>)>,
        text_tx: Sender<(String, String)>,
        analysis_tx: Sender<(String, Vec<f32>)>,
    }

    impl OscHandler for ChannelHandler {
        fn on_audio(&self, address: &str, samples: &[f32]) {
            let _ = self.audio_tx.try_send((address.to_string(), samples.to_vec()));
        }
        fn on_text(&self, address: &str, text: &str) {
            let _ = self.text_tx.try_send((address.to_string(), text.to_string()));
        }
        fn on_analysis(&self, address: &str, features: &[f32]) {
            let _ = self
                .analysis_tx
                .try_send((address.to_string(), features.to_vec()));
        }
    }

    fn started_receiver() -> (
        OscReceiver,
        u16,
        crossbeam_channel::Receiver<(String, Vec<f32>)>,
        crossbeam_channel::Receiver<(String, String)>,
        crossbeam_channel::Receiver<(String, Vec<f32>)>,
    ) {
        let (audio_tx, audio_rx) = bounded(64);
        let (text_tx, text_rx) = bounded(64);
        let (analysis_tx, analysis_rx) = bounded(64);

        let mut receiver = OscReceiver::new(0);
        receiver.set_handler(Arc::new(ChannelHandler {
            audio_tx,
            text_tx,
            analysis_tx,
        }));
        receiver.start().expect("receiver must start");
        let port = receiver.local_port().expect("bound port");
        (receiver, port, audio_rx, text_rx, analysis_rx)
    }

    fn send_to(port: u16, payload: &[u8]) {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket
            .send_to(payload, SocketAddr::from(([127, 0, 0, 1], port)))
            .unwrap();
    }

    fn wait_for(receiver: &OscReceiver, count: u64) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while receiver.message_count() < count {
            assert!(Instant::now() < deadline, "timed out waiting for messages");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_audio_dispatch() {
        let (mut receiver, port, audio_rx, _text_rx, _analysis_rx) = started_receiver();

        send_to(port, b"/audio/stream 0.100 0.200 0.300 ");

        let (address, samples) = audio_rx
            .recv_timeout(Duration::from_secs(2))
            .expect("audio callback");
        assert_eq!(address, "/audio/stream");
        assert_eq!(samples, vec![0.1, 0.2, 0.3]);

        assert_eq!(receiver.latest_audio(), vec![0.1, 0.2, 0.3]);
        receiver.stop();
    }

    #[test]
    fn test_text_and_analysis_dispatch() {
        let (mut receiver, port, _audio_rx, text_rx, analysis_rx) = started_receiver();

        send_to(port, b"/chan2/text hello world");
        send_to(port, b"/chan3/analysis 0.900 0.400");

        let (address, text) = text_rx
            .recv_timeout(Duration::from_secs(2))
            .expect("text callback");
        assert_eq!(address, "/chan2/text");
        assert_eq!(text, "hello world");

        let (address, features) = analysis_rx
            .recv_timeout(Duration::from_secs(2))
            .expect("analysis callback");
        assert_eq!(address, "/chan3/analysis");
        assert_eq!(features, vec![0.9, 0.4]);

        receiver.stop();
    }

    #[test]
    fn test_unknown_and_invalid_counted_not_dispatched() {
        let (mut receiver, port, audio_rx, text_rx, analysis_rx) = started_receiver();

        send_to(port, b"/foo/bar 1.0 2.0");
        send_to(port, b"/audio/stream no samples at all");
        wait_for(&receiver, 2);

        let stats = receiver.stats();
        assert_eq!(stats.messages_received, 2);
        assert_eq!(stats.unknown_messages, 1);
        assert_eq!(stats.invalid_messages, 1);

        assert!(audio_rx.try_recv().is_err());
        assert!(text_rx.try_recv().is_err());
        assert!(analysis_rx.try_recv().is_err());
        receiver.stop();
    }

    #[test]
    fn test_history_bounded() {
        let (mut receiver, port, _audio_rx, _text_rx, _analysis_rx) = started_receiver();

        for i in 0..12 {
            send_to(port, format!("/audio/stream 0.{:03} ", i).as_bytes());
        }
        wait_for(&receiver, 12);

        let history = receiver.audio_history();
        assert_eq!(history.len(), AUDIO_HISTORY_CAP);
        receiver.stop();
    }

    #[test]
    fn test_no_handler_is_noop() {
        let mut receiver = OscReceiver::new(0);
        receiver.start().unwrap();
        let port = receiver.local_port().unwrap();

        send_to(port, b"/audio/stream 0.500 ");
        wait_for(&receiver, 1);

        assert_eq!(receiver.latest_audio(), vec![0.5]);
        receiver.stop();
    }

    #[test]
    fn test_start_idempotent() {
        let mut receiver = OscReceiver::new(0);
        receiver.start().unwrap();
        let port = receiver.local_port();
        receiver.start().unwrap();
        assert_eq!(receiver.local_port(), port);
        receiver.stop();
    }

    #[test]
    fn test_stop_idempotent() {
        let mut receiver = OscReceiver::new(0);
        receiver.start().unwrap();
        receiver.stop();
        receiver.stop();
        assert!(!receiver.is_running());
    }

    #[test]
    fn test_repeated_start_stop_cycles() {
        // Each stop must unblock the pending read and join in bounded time
        let mut receiver = OscReceiver::new(0);
        let started = Instant::now();

        for _ in 0..100 {
            receiver.start().expect("start must succeed");
            assert!(receiver.is_running());
            receiver.stop();
            assert!(!receiver.is_running());
        }

        assert!(
            started.elapsed() < Duration::from_secs(30),
            "start/stop cycling took too long: {:?}",
            started.elapsed()
        );
    }

    #[test]
    fn test_restart_receives_again() {
        let (mut receiver, port, audio_rx, _text_rx, _analysis_rx) = started_receiver();
        send_to(port, b"/audio/stream 0.100 ");
        audio_rx.recv_timeout(Duration::from_secs(2)).unwrap();

        receiver.stop();
        receiver.start().unwrap();
        let port = receiver.local_port().unwrap();

        send_to(port, b"/audio/stream 0.200 ");
        let (_, samples) = audio_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(samples, vec![0.2]);
        receiver.stop();
    }
}
