//! Audio Sender Application
//!
//! Generates a test tone and streams it to the receiver over UDP.

use anyhow::Result;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use osc_audio_streamer::{
    config::AppConfig,
    pipeline::{AudioPipeline, PipelineConfig},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting OSC Audio Sender");

    let config = AppConfig::load();

    // Target address from args or config: `sender [host] [port]`
    let mut args = std::env::args().skip(1);
    let target_host = args.next().unwrap_or(config.network.target_host.clone());
    let target_port: u16 = args
        .next()
        .map(|p| p.parse().expect("Invalid target port"))
        .unwrap_or(config.network.target_port);

    tracing::info!("Target receiver: {}:{}", target_host, target_port);

    let pipeline_config = PipelineConfig {
        sample_rate: config.audio.sample_rate,
        buffer_size: config.audio.buffer_size,
        frequency: config.audio.frequency,
        target_host,
        target_port,
        ..PipelineConfig::default()
    };

    let block_duration = Duration::from_secs_f64(
        pipeline_config.buffer_size as f64 / pipeline_config.sample_rate as f64,
    );
    let buffer_size = pipeline_config.buffer_size;

    let mut pipeline = AudioPipeline::new(pipeline_config)?;
    pipeline.set_address(&config.network.osc_address);

    tracing::info!(
        "Streaming {:.0} Hz tone in {} frame blocks ({:.1} ms) - press Ctrl+C to stop",
        config.audio.frequency,
        buffer_size,
        block_duration.as_secs_f64() * 1000.0
    );

    // Drive the pipeline at the audio block rate
    let mut ticker = tokio::time::interval(block_duration);
    let mut last_stats = std::time::Instant::now();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                pipeline.process(None, buffer_size);

                if last_stats.elapsed() >= Duration::from_secs(5) {
                    last_stats = std::time::Instant::now();
                    let stats = pipeline.sender_stats();
                    tracing::info!(
                        "Stats: {} blocks processed, {} packets sent, {:.1} KB sent",
                        pipeline.blocks_processed(),
                        stats.packets_sent,
                        stats.bytes_sent as f64 / 1024.0
                    );
                }
            }

            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down...");
                break;
            }
        }
    }

    Ok(())
}
