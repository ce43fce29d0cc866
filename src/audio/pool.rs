//! Pre-allocated audio buffer pool
//!
//! All buffers are allocated zero-filled at construction so the per-block
//! processing path never touches the heap. Accessors are index-checked and
//! return `None` for out-of-range indices instead of panicking.

use parking_lot::Mutex;

/// Fixed set of reusable sample buffers for one pipeline
pub struct BufferPool {
    buffer_size: usize,
    shared: Mutex<Vec<f32>>,
    inlets: Vec<Mutex<Vec<f32>>>,
    outlets: Vec<Mutex<Vec<f32>>>,
}

impl BufferPool {
    /// Allocate one shared buffer plus per-inlet and per-outlet buffers
    pub fn new(buffer_size: usize, inlet_count: usize, outlet_count: usize) -> Self {
        tracing::info!(
            "Creating buffer pool: size={}, inlets={}, outlets={}",
            buffer_size,
            inlet_count,
            outlet_count
        );

        Self {
            buffer_size,
            shared: Mutex::new(vec![0.0; buffer_size]),
            inlets: (0..inlet_count)
                .map(|_| Mutex::new(vec![0.0; buffer_size]))
                .collect(),
            outlets: (0..outlet_count)
                .map(|_| Mutex::new(vec![0.0; buffer_size]))
                .collect(),
        }
    }

    /// The shared working buffer
    pub fn shared_buffer(&self) -> &Mutex<Vec<f32>> {
        &self.shared
    }

    /// Buffer for a specific inlet, `None` when out of range
    pub fn inlet(&self, index: usize) -> Option<&Mutex<Vec<f32>>> {
        let buffer = self.inlets.get(index);
        if buffer.is_none() {
            tracing::error!("Invalid inlet index: {}", index);
        }
        buffer
    }

    /// Buffer for a specific outlet, `None` when out of range
    pub fn outlet(&self, index: usize) -> Option<&Mutex<Vec<f32>>> {
        let buffer = self.outlets.get(index);
        if buffer.is_none() {
            tracing::error!("Invalid outlet index: {}", index);
        }
        buffer
    }

    /// Configured buffer size in frames
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Number of inlet buffers
    pub fn inlet_count(&self) -> usize {
        self.inlets.len()
    }

    /// Number of outlet buffers
    pub fn outlet_count(&self) -> usize {
        self.outlets.len()
    }

    /// Zero-fill every buffer, restoring the known silent state
    pub fn clear_buffers(&self) {
        self.shared.lock().fill(0.0);
        for inlet in &self.inlets {
            inlet.lock().fill(0.0);
        }
        for outlet in &self.outlets {
            outlet.lock().fill(0.0);
        }
    }
}
