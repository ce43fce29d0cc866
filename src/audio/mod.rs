//! Audio subsystem module

pub mod device;
pub mod playback;
pub mod pool;
pub mod sine;

pub use device::{default_output_device, output_device_names};
pub use playback::{AudioOutput, PlaybackQueue};
pub use pool::BufferPool;
pub use sine::SineGenerator;
