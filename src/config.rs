//! Run parameters for the device harness.
//!
//! Defaults reproduce the canonical check: 1000 elements, 1.0 + 2.0.

use crate::gpu::shaders;

/// Number of elements per buffer in the canonical run.
pub const DEFAULT_ELEMENTS: u32 = 1000;
/// Preferred threads per workgroup before device limits are applied.
pub const DEFAULT_WORKGROUP_SIZE: u32 = 256;

/// Graphics API the adapter may be picked from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Backend {
    #[default]
    All,
    Vulkan,
    Metal,
    Dx12,
    Gl,
}

impl Backend {
    pub fn to_wgpu(self) -> wgpu::Backends {
        match self {
            Backend::All => wgpu::Backends::all(),
            Backend::Vulkan => wgpu::Backends::VULKAN,
            Backend::Metal => wgpu::Backends::METAL,
            Backend::Dx12 => wgpu::Backends::DX12,
            Backend::Gl => wgpu::Backends::GL,
        }
    }
}

/// Deliberate damage applied between readback and validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    /// Overwrite the read-back element at `index` with a wrong value.
    /// Ignored when `index` is out of range.
    CorruptOutput { index: usize },
}

/// Parameters for one harness run.
#[derive(Clone, Debug)]
pub struct HarnessConfig {
    pub elements: u32,
    pub lhs: f32,
    pub rhs: f32,
    pub workgroup_size: u32,
    /// Graphics APIs the adapter may be picked from.
    pub backends: wgpu::Backends,
    pub fault: Option<Fault>,
    /// Replacement kernel source; `None` uses the built-in add kernel.
    pub kernel_source: Option<String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            elements: DEFAULT_ELEMENTS,
            lhs: 1.0,
            rhs: 2.0,
            workgroup_size: DEFAULT_WORKGROUP_SIZE,
            backends: Backend::All.to_wgpu(),
            fault: None,
            kernel_source: None,
        }
    }
}

impl HarnessConfig {
    pub fn with_elements(mut self, elements: u32) -> Self {
        self.elements = elements;
        self
    }

    pub fn with_inputs(mut self, lhs: f32, rhs: f32) -> Self {
        self.lhs = lhs;
        self.rhs = rhs;
        self
    }

    pub fn with_workgroup_size(mut self, workgroup_size: u32) -> Self {
        self.workgroup_size = workgroup_size;
        self
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backends = backend.to_wgpu();
        self
    }

    /// Restrict adapter selection to an arbitrary backend set, including none.
    pub fn with_backends(mut self, backends: wgpu::Backends) -> Self {
        self.backends = backends;
        self
    }

    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.fault = Some(fault);
        self
    }

    pub fn with_kernel_source(mut self, source: impl Into<String>) -> Self {
        self.kernel_source = Some(source.into());
        self
    }

    /// Value every output element must hold after the dispatch.
    pub fn expected_sum(&self) -> f32 {
        self.lhs + self.rhs
    }

    /// Kernel source text, still carrying the workgroup-size placeholder.
    pub fn kernel_template(&self) -> &str {
        self.kernel_source.as_deref().unwrap_or(shaders::ADD_ARRAYS)
    }
}
