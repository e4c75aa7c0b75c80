//! The three array buffers of a run plus the staging buffer used to read the
//! output back on the host.

use wgpu::util::DeviceExt;

use super::kernel::Kernel;
use super::Accelerator;
use crate::error::HarnessError;

const ELEMENT_BYTES: u64 = std::mem::size_of::<f32>() as u64;

/// Inputs `a` and `b`, output `c`, and a host-mappable copy of `c`.
///
/// All four buffers are destroyed on drop, on success and error paths alike.
pub struct ArrayBuffers<'a> {
    accel: &'a Accelerator,
    lhs: wgpu::Buffer,
    rhs: wgpu::Buffer,
    output: wgpu::Buffer,
    staging: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    elements: u32,
}

/// Largest single buffer the device can bind as storage.
pub fn max_buffer_bytes(limits: &wgpu::Limits) -> u64 {
    limits
        .max_buffer_size
        .min(limits.max_storage_buffer_binding_size as u64)
}

impl<'a> ArrayBuffers<'a> {
    /// Allocate `elements`-long buffers: `a` filled with `lhs`, `b` with `rhs`,
    /// `c` with zeros, and bind them to the kernel's three storage slots.
    /// `elements` must be nonzero; empty storage bindings are invalid.
    ///
    /// Fails with `AllocationFailed` above the device limit and with
    /// `AllocationRejected` when the device refuses a buffer or the bind group.
    pub fn allocate(
        accel: &'a Accelerator,
        kernel: &Kernel<'a>,
        elements: u32,
        lhs: f32,
        rhs: f32,
    ) -> Result<Self, HarnessError> {
        debug_assert!(elements > 0, "empty runs never allocate");
        let bytes = elements as u64 * ELEMENT_BYTES;
        let limit = max_buffer_bytes(&accel.limits());
        if bytes > limit {
            return Err(HarnessError::AllocationFailed { bytes, limit });
        }

        let len = elements as usize;
        let ((lhs_buf, rhs_buf, output, staging, bind_group), error) = accel.scoped(|device| {
            let lhs_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("array_a"),
                contents: bytemuck::cast_slice(&vec![lhs; len]),
                usage: wgpu::BufferUsages::STORAGE,
            });
            let rhs_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("array_b"),
                contents: bytemuck::cast_slice(&vec![rhs; len]),
                usage: wgpu::BufferUsages::STORAGE,
            });
            let output = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("array_c"),
                contents: bytemuck::cast_slice(&vec![0.0f32; len]),
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            });
            let staging = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("array_c_staging"),
                size: bytes,
                usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });

            let bind_group_layout = kernel.pipeline().get_bind_group_layout(0);
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("add_arrays_bind_group"),
                layout: &bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: lhs_buf.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: rhs_buf.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: output.as_entire_binding(),
                    },
                ],
            });
            (lhs_buf, rhs_buf, output, staging, bind_group)
        });
        if let Some(error) = error {
            return Err(HarnessError::AllocationRejected(error.to_string()));
        }

        tracing::debug!(elements, bytes, "allocated array buffers");
        Ok(Self {
            accel,
            lhs: lhs_buf,
            rhs: rhs_buf,
            output,
            staging,
            bind_group,
            elements,
        })
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn elements(&self) -> u32 {
        self.elements
    }

    pub fn byte_len(&self) -> u64 {
        self.elements as u64 * ELEMENT_BYTES
    }

    /// Record a copy of the output buffer into the staging buffer.
    pub fn copy_output_to_staging(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.copy_buffer_to_buffer(&self.output, 0, &self.staging, 0, self.byte_len());
    }

    /// Map the staging buffer and copy its contents to the host. The copy
    /// recorded by `copy_output_to_staging` must already be submitted.
    pub fn read_output(&self) -> Result<Vec<f32>, HarnessError> {
        let slice = self.staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.accel.wait_idle();
        rx.recv()
            .map_err(|_| HarnessError::ReadbackFailed("mapping callback never ran".to_string()))?
            .map_err(|e| HarnessError::ReadbackFailed(e.to_string()))?;

        let data = slice.get_mapped_range();
        let values: Vec<f32> = bytemuck::cast_slice(&data).to_vec();
        drop(data);
        self.staging.unmap();
        Ok(values)
    }
}

impl Drop for ArrayBuffers<'_> {
    fn drop(&mut self) {
        self.lhs.destroy();
        self.rhs.destroy();
        self.output.destroy();
        self.staging.destroy();
        tracing::trace!(elements = self.elements, "released array buffers");
    }
}
