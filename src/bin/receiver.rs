//! Audio Receiver Application
//!
//! Receives multi-channel messages over UDP and plays the audio channel
//! through the default output device.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use osc_audio_streamer::{
    audio::{output_device_names, AudioOutput, PlaybackQueue},
    config::AppConfig,
    network::{OscHandler, OscReceiver},
};

/// Routes received messages into playback and the log
struct ReceiverHandler {
    queue: Arc<PlaybackQueue>,
}

impl OscHandler for ReceiverHandler {
    fn on_audio(&self, address: &str, samples: &[f32]) {
        tracing::debug!("Audio: {} ({} samples)", address, samples.len());
        self.queue.push(samples.to_vec());
    }

    fn on_text(&self, address: &str, text: &str) {
        tracing::info!("Text on {}: {}", address, text);
    }

    fn on_analysis(&self, address: &str, features: &[f32]) {
        tracing::info!("Analysis on {}: {} features", address, features.len());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting OSC Audio Receiver");

    let config = AppConfig::load();

    // Listen port and volume: `receiver [port] [volume]`
    let mut args = std::env::args().skip(1);
    let port: u16 = args
        .next()
        .map(|p| p.parse().expect("Invalid port"))
        .unwrap_or(config.network.listen_port);
    let volume: f32 = args
        .next()
        .map(|v| v.parse().expect("Invalid volume"))
        .unwrap_or(config.audio.volume);

    println!("\n=== Available Output Devices ===");
    for name in output_device_names() {
        println!("  {}", name);
    }
    println!();

    // Start playback; keep running without audio if no device is usable
    let mut output = AudioOutput::new(config.audio.sample_rate, config.audio.buffer_size);
    output.set_volume(volume);
    if let Err(e) = output.start() {
        tracing::warn!("Audio output unavailable, continuing silent: {}", e);
    }

    // Wire the receiver into the playback queue
    let mut receiver = OscReceiver::new(port);
    receiver.set_handler(Arc::new(ReceiverHandler {
        queue: output.queue(),
    }));
    receiver
        .start()
        .map_err(|e| anyhow::anyhow!("Failed to start receiver: {}", e))?;

    tracing::info!("Listening on port {} (volume {:.1})", port, volume);
    tracing::info!("Expected audio address: {}", config.network.osc_address);

    // Status loop
    let mut ticker = tokio::time::interval(Duration::from_secs(5));
    ticker.tick().await; // First tick fires immediately
    let started = std::time::Instant::now();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let stats = receiver.stats();
                let rate = stats.messages_received as f64 / started.elapsed().as_secs_f64();
                tracing::info!(
                    "Stats: {} messages ({:.1}/s), {} bytes, {} invalid, {} unknown, {} blocks queued",
                    stats.messages_received,
                    rate,
                    stats.bytes_received,
                    stats.invalid_messages,
                    stats.unknown_messages,
                    output.queue().queued_blocks()
                );

                if let Some(e) = output.check_errors() {
                    tracing::error!("Audio output error: {}", e);
                }
            }

            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down...");
                break;
            }
        }
    }

    receiver.stop();
    output.stop();

    tracing::info!("Shutdown complete");
    Ok(())
}
