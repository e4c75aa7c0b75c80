//! The device harness: one accelerator, one kernel, one dispatch, one check.
//!
//! `run_test` executes the steps in strict order and stops at the first
//! failure. The kernel and buffers of a run are locals of `execute`, so they
//! are released when it returns on every path.

use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::gpu::buffers::ArrayBuffers;
use crate::gpu::dispatch::{self, Grid};
use crate::gpu::kernel::Kernel;
use crate::gpu::Accelerator;
use crate::verify;

/// What a successful run exercised.
#[derive(Clone, Debug, PartialEq)]
pub struct RunReport {
    pub adapter: String,
    pub backend: wgpu::Backend,
    pub elements: u32,
    pub workgroup_size: u32,
    pub workgroups: u32,
}

/// Raw result of a run before validation.
#[derive(Clone, Debug, PartialEq)]
pub struct Execution {
    pub grid: Grid,
    pub output: Vec<f32>,
}

pub struct DeviceHarness {
    accel: Accelerator,
    config: HarnessConfig,
}

impl DeviceHarness {
    /// Acquire the accelerator. Fails with `DeviceUnavailable` or
    /// `QueueCreationFailed`.
    pub fn initialize(config: HarnessConfig) -> Result<Self, HarnessError> {
        let accel = Accelerator::initialize(config.backends)?;
        Ok(Self { accel, config })
    }

    pub fn accelerator(&self) -> &Accelerator {
        &self.accel
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Compile, allocate, dispatch, wait and read back, without validating.
    /// A configured fault is applied to the returned output.
    pub fn execute(&self) -> Result<Execution, HarnessError> {
        let config = &self.config;
        let limits = self.accel.limits();
        let workgroup_size = dispatch::workgroup_size(config.workgroup_size, &limits);

        let kernel = Kernel::compile(&self.accel, config.kernel_template(), workgroup_size)?;
        let grid = Grid::plan(config.elements, kernel.workgroup_size(), &limits)?;
        if grid.is_empty() {
            tracing::debug!("no elements, skipping dispatch");
            return Ok(Execution {
                grid,
                output: Vec::new(),
            });
        }

        let buffers =
            ArrayBuffers::allocate(&self.accel, &kernel, grid.elements, config.lhs, config.rhs)?;
        dispatch::submit_and_wait(&self.accel, &kernel, &buffers, grid)?;

        let mut output = buffers.read_output()?;
        if let Some(fault) = config.fault {
            verify::apply_fault(fault, &mut output, config.expected_sum());
        }
        Ok(Execution { grid, output })
    }

    /// Run the full test and validate every output element.
    pub fn run_test(&self) -> Result<RunReport, HarnessError> {
        let execution = self.execute().inspect_err(|e| {
            tracing::debug!(stage = e.stage(), "run aborted");
        })?;
        verify::verify_sum(&execution.output, self.config.expected_sum())?;

        let info = self.accel.info();
        let report = RunReport {
            adapter: info.name.clone(),
            backend: info.backend,
            elements: execution.grid.elements,
            workgroup_size: execution.grid.workgroup_size,
            workgroups: execution.grid.workgroups,
        };
        tracing::info!(
            elements = report.elements,
            workgroup_size = report.workgroup_size,
            workgroups = report.workgroups,
            "run verified"
        );
        Ok(report)
    }
}
