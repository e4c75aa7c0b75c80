//! Grid sizing and command recording for the single dispatch of a run.

use super::buffers::ArrayBuffers;
use super::kernel::Kernel;
use super::Accelerator;
use crate::error::HarnessError;

/// Threads per workgroup: `preferred`, capped by the device's per-group limits.
/// Never zero.
pub fn workgroup_size(preferred: u32, limits: &wgpu::Limits) -> u32 {
    preferred
        .min(limits.max_compute_workgroup_size_x)
        .min(limits.max_compute_invocations_per_workgroup)
        .max(1)
}

/// Workgroups needed so that at least `elements` work-items run.
pub fn workgroup_count(elements: u32, workgroup_size: u32) -> u32 {
    if elements == 0 {
        return 0;
    }
    elements.div_ceil(workgroup_size.max(1))
}

/// A 1-D thread grid covering a run's elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    pub elements: u32,
    pub workgroup_size: u32,
    pub workgroups: u32,
}

impl Grid {
    pub fn plan(
        elements: u32,
        workgroup_size: u32,
        limits: &wgpu::Limits,
    ) -> Result<Self, HarnessError> {
        let workgroups = workgroup_count(elements, workgroup_size);
        let limit = limits.max_compute_workgroups_per_dimension;
        if workgroups > limit {
            return Err(HarnessError::DispatchTooLarge { workgroups, limit });
        }
        Ok(Self {
            elements,
            workgroup_size,
            workgroups,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.workgroups == 0
    }
}

/// Record the dispatch and the output readback copy into one command buffer.
pub fn encode(
    accel: &Accelerator,
    kernel: &Kernel<'_>,
    buffers: &ArrayBuffers<'_>,
    grid: Grid,
) -> wgpu::CommandBuffer {
    let mut encoder = accel
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("add_arrays_encoder"),
        });
    {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("add_arrays_pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(kernel.pipeline());
        pass.set_bind_group(0, buffers.bind_group(), &[]);
        pass.dispatch_workgroups(grid.workgroups, 1, 1);
    }
    buffers.copy_output_to_staging(&mut encoder);
    encoder.finish()
}

/// Record, submit and block until the device reports completion. Encoding
/// and submission run inside an error scope; a captured error aborts the run
/// before any readback.
pub fn submit_and_wait(
    accel: &Accelerator,
    kernel: &Kernel<'_>,
    buffers: &ArrayBuffers<'_>,
    grid: Grid,
) -> Result<(), HarnessError> {
    let ((), error) = accel.scoped(|_| {
        let commands = encode(accel, kernel, buffers, grid);
        accel.queue().submit(std::iter::once(commands));
    });
    if let Some(error) = error {
        return Err(HarnessError::DispatchFailed(error.to_string()));
    }
    tracing::debug!(workgroups = grid.workgroups, "submitted dispatch, waiting for completion");
    accel.wait_idle();
    Ok(())
}
