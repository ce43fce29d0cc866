//! Audio output device lookup

use cpal::traits::{DeviceTrait, HostTrait};

use crate::error::AudioError;

/// Default output device of the default host
pub fn default_output_device() -> Result<cpal::Device, AudioError> {
    cpal::default_host()
        .default_output_device()
        .ok_or(AudioError::NoOutputDevice)
}

/// Names of all output-capable devices, default host
pub fn output_device_names() -> Vec<String> {
    let host = cpal::default_host();

    match host.output_devices() {
        Ok(devices) => devices.filter_map(|d| d.name().ok()).collect(),
        Err(e) => {
            tracing::warn!("Could not enumerate output devices: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumeration_does_not_panic() {
        // May be empty on CI machines without audio hardware
        let _ = output_device_names();
    }
}
