//! Kernel compilation: WGSL source to compute pipeline.
//!
//! Shader module and pipeline creation each run in their own validation
//! scope so a malformed source is reported at the compile stage and a bad
//! entry point at the pipeline stage.

use std::marker::PhantomData;

use super::{shaders, Accelerator};
use crate::error::HarnessError;

/// Entry point every kernel source must define.
pub const ENTRY_POINT: &str = "add_arrays";

/// A compiled compute pipeline, valid for the accelerator it was built on.
pub struct Kernel<'a> {
    pipeline: wgpu::ComputePipeline,
    workgroup_size: u32,
    _accelerator: PhantomData<&'a Accelerator>,
}

impl<'a> Kernel<'a> {
    /// Compile `template` with `workgroup_size` substituted in.
    pub fn compile(
        accel: &'a Accelerator,
        template: &str,
        workgroup_size: u32,
    ) -> Result<Self, HarnessError> {
        let source = shaders::instantiate(template, workgroup_size);

        let (module, error) = accel.scoped(|device| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(ENTRY_POINT),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        });
        if let Some(error) = error {
            return Err(HarnessError::CompileError {
                label: ENTRY_POINT.to_string(),
                message: error.to_string(),
            });
        }

        let (pipeline, error) = accel.scoped(|device| {
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("add_arrays_pipeline"),
                layout: None,
                module: &module,
                entry_point: Some(ENTRY_POINT),
                compilation_options: Default::default(),
                cache: None,
            })
        });
        if let Some(error) = error {
            return Err(HarnessError::PipelineCreationFailed {
                entry_point: ENTRY_POINT.to_string(),
                message: error.to_string(),
            });
        }

        tracing::debug!(workgroup_size, "kernel compiled");
        Ok(Self {
            pipeline,
            workgroup_size,
            _accelerator: PhantomData,
        })
    }

    pub fn pipeline(&self) -> &wgpu::ComputePipeline {
        &self.pipeline
    }

    pub fn workgroup_size(&self) -> u32 {
        self.workgroup_size
    }
}
