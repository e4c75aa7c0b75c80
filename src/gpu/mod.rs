//! GPU compute infrastructure.
//!
//! Uses wgpu for cross-platform GPU access (Metal, Vulkan, DX12, GL).
//! `Accelerator` owns the device and its queue; kernels and buffers borrow it,
//! so they can never outlive the device they were created on.

pub mod buffers;
pub mod dispatch;
pub mod kernel;
pub mod shaders;

use crate::error::HarnessError;

/// Handle to the compute device and its submission queue.
pub struct Accelerator {
    device: wgpu::Device,
    queue: wgpu::Queue,
    info: wgpu::AdapterInfo,
}

impl Accelerator {
    /// Open the default high-performance adapter among `backends` and create
    /// a device with the adapter's full limits.
    pub fn initialize(backends: wgpu::Backends) -> Result<Self, HarnessError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| HarnessError::DeviceUnavailable {
            backends: format!("{:?}", backends),
        })?;

        let info = adapter.get_info();
        tracing::info!(
            adapter = %info.name,
            backend = ?info.backend,
            device_type = ?info.device_type,
            "selected GPU adapter"
        );

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("kernel-smoke"),
                required_features: wgpu::Features::empty(),
                required_limits: adapter.limits(),
                memory_hints: wgpu::MemoryHints::Performance,
            },
            None,
        ))
        .map_err(|e| HarnessError::QueueCreationFailed(e.to_string()))?;

        // Every device call of a run is scoped; anything else is only logged.
        device.on_uncaptured_error(Box::new(|error| {
            tracing::error!(%error, "uncaptured GPU error");
        }));

        Ok(Self {
            device,
            queue,
            info,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn info(&self) -> &wgpu::AdapterInfo {
        &self.info
    }

    pub fn limits(&self) -> wgpu::Limits {
        self.device.limits()
    }

    /// Run `f` inside out-of-memory and validation error scopes, returning
    /// its value and the first error it raised.
    pub(crate) fn scoped<T>(&self, f: impl FnOnce(&wgpu::Device) -> T) -> (T, Option<wgpu::Error>) {
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = f(&self.device);
        // Scopes pop innermost first.
        let validation = pollster::block_on(self.device.pop_error_scope());
        let out_of_memory = pollster::block_on(self.device.pop_error_scope());
        (value, validation.or(out_of_memory))
    }

    /// Block until every submitted command buffer has finished executing.
    pub fn wait_idle(&self) {
        let _ = self.device.poll(wgpu::Maintain::Wait);
    }
}
