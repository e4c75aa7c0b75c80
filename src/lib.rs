//! GPU compute smoke test.
//!
//! Acquires the default accelerator, compiles an elementwise-add kernel,
//! dispatches it over three buffers and checks every output element on the
//! host. See [`DeviceHarness`].

pub mod config;
pub mod error;
pub mod gpu;
pub mod harness;
pub mod verify;

pub use config::{Backend, Fault, HarnessConfig};
pub use error::HarnessError;
pub use harness::{DeviceHarness, Execution, RunReport};
