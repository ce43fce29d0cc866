//! Producer-side audio pipeline
//!
//! Owns the mock source, the buffer pool, and the UDP sender; one instance
//! per pipeline, lifetime managed by the caller. Each `process` call fills
//! the pooled buffer with the next audio block, transmits it, and
//! optionally copies it to a caller-provided output slice.

use crate::audio::{BufferPool, SineGenerator};
use crate::error::Result;
use crate::network::OscSender;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub sample_rate: u32,
    pub buffer_size: usize,
    pub inlet_count: usize,
    pub outlet_count: usize,
    pub frequency: f32,
    pub target_host: String,
    pub target_port: u16,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        use crate::constants::*;
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            buffer_size: DEFAULT_BUFFER_SIZE,
            inlet_count: 1,
            outlet_count: 1,
            frequency: DEFAULT_FREQUENCY,
            target_host: "127.0.0.1".to_string(),
            target_port: DEFAULT_OSC_PORT,
        }
    }
}

/// Generate → pool → send pipeline for one audio source
pub struct AudioPipeline {
    generator: SineGenerator,
    pool: BufferPool,
    sender: OscSender,
    blocks_processed: u64,
}

impl AudioPipeline {
    /// Allocate the pool and open the outbound socket
    pub fn new(config: PipelineConfig) -> Result<Self> {
        tracing::info!(
            "Initializing audio pipeline: sr={}, buffer={}, inlets={}, outlets={}",
            config.sample_rate,
            config.buffer_size,
            config.inlet_count,
            config.outlet_count
        );

        let generator = SineGenerator::new(config.sample_rate, config.frequency);
        let pool = BufferPool::new(config.buffer_size, config.inlet_count, config.outlet_count);
        let sender = OscSender::new(&config.target_host, config.target_port)?;

        Ok(Self {
            generator,
            pool,
            sender,
            blocks_processed: 0,
        })
    }

    /// Process one audio block: generate, transmit, copy out.
    ///
    /// `frame_count` is clamped to the pool's buffer size. When `output`
    /// is given, the generated block is copied into its head.
    pub fn process(&mut self, output: Option<&mut [f32]>, frame_count: usize) {
        let frames = frame_count.min(self.pool.buffer_size());
        if frames == 0 {
            return;
        }

        let mut buffer = self.pool.shared_buffer().lock();
        self.generator.generate(&mut buffer[..frames]);

        if let Err(e) = self.sender.send_audio(&buffer[..frames]) {
            tracing::warn!("Failed to send audio block: {}", e);
        }

        if let Some(output) = output {
            let count = frames.min(output.len());
            output[..count].copy_from_slice(&buffer[..count]);
        }

        self.blocks_processed += 1;
    }

    /// Re-point the sender at a new destination
    pub fn update_destination(&mut self, host: &str, port: u16) -> Result<()> {
        self.sender.update_destination(host, port)?;
        Ok(())
    }

    /// Change the address tag on outgoing audio
    pub fn set_address(&mut self, address: &str) {
        self.sender.set_default_address(address);
    }

    /// Change the mock-source frequency
    pub fn set_frequency(&mut self, frequency: f32) {
        self.generator.set_frequency(frequency);
    }

    /// Change the mock-source amplitude
    pub fn set_amplitude(&mut self, amplitude: f32) {
        self.generator.set_amplitude(amplitude);
    }

    /// Blocks processed since creation
    pub fn blocks_processed(&self) -> u64 {
        self.blocks_processed
    }

    /// Sender statistics
    pub fn sender_stats(&self) -> crate::network::SenderStats {
        self.sender.stats()
    }

    /// Buffer pool accessor
    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }
}

impl Drop for AudioPipeline {
    fn drop(&mut self) {
        tracing::info!(
            "Audio pipeline shut down after {} blocks",
            self.blocks_processed
        );
    }
}
