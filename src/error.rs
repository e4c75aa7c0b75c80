//! Failure taxonomy for a harness run.
//!
//! Every variant is fatal for the run. Nothing here is retried.

/// Errors raised while acquiring the accelerator or running the test.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HarnessError {
    #[error("no compatible GPU adapter found (backends: {backends})")]
    DeviceUnavailable { backends: String },

    #[error("failed to create device and command queue: {0}")]
    QueueCreationFailed(String),

    #[error("kernel '{label}' failed to compile: {message}")]
    CompileError { label: String, message: String },

    #[error("failed to create compute pipeline for '{entry_point}': {message}")]
    PipelineCreationFailed { entry_point: String, message: String },

    #[error("cannot allocate {bytes} bytes per buffer (device limit {limit} bytes)")]
    AllocationFailed { bytes: u64, limit: u64 },

    #[error("device rejected buffer setup: {0}")]
    AllocationRejected(String),

    #[error("dispatch of {workgroups} workgroups exceeds device limit of {limit}")]
    DispatchTooLarge { workgroups: u32, limit: u32 },

    #[error("dispatch submission failed: {0}")]
    DispatchFailed(String),

    #[error("output readback failed: {0}")]
    ReadbackFailed(String),

    #[error("computation error at index {index}: expected {expected}, got {actual}")]
    ComputationMismatch {
        index: usize,
        expected: f32,
        actual: f32,
    },
}

impl HarnessError {
    /// Stage of the run the error belongs to, for log fields.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::DeviceUnavailable { .. } | Self::QueueCreationFailed(_) => "initialize",
            Self::CompileError { .. } => "compile",
            Self::PipelineCreationFailed { .. } => "pipeline",
            Self::AllocationFailed { .. } | Self::AllocationRejected(_) => "allocate",
            Self::DispatchTooLarge { .. } | Self::DispatchFailed(_) => "dispatch",
            Self::ReadbackFailed(_) => "readback",
            Self::ComputationMismatch { .. } => "verify",
        }
    }
}
