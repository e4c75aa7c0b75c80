//! Host-side validation of the read-back output.

use crate::config::Fault;
use crate::error::HarnessError;

/// First element of `output` that differs from `expected`, with its value.
///
/// Comparison is exact: f32 addition rounds identically on host and device.
/// A NaN element never matches.
pub fn first_mismatch(output: &[f32], expected: f32) -> Option<(usize, f32)> {
    output
        .iter()
        .copied()
        .enumerate()
        .find(|&(_, actual)| actual != expected)
}

/// Check that every element of `output` equals `expected`. An empty output
/// passes.
pub fn verify_sum(output: &[f32], expected: f32) -> Result<(), HarnessError> {
    match first_mismatch(output, expected) {
        Some((index, actual)) => Err(HarnessError::ComputationMismatch {
            index,
            expected,
            actual,
        }),
        None => Ok(()),
    }
}

/// Apply `fault` to `output` so that validation must fail at its index.
/// Returns false when the index is out of range and nothing changed.
pub fn apply_fault(fault: Fault, output: &mut [f32], expected: f32) -> bool {
    match fault {
        Fault::CorruptOutput { index } => match output.get_mut(index) {
            Some(slot) => {
                *slot = if expected == 0.0 { 1.0 } else { -expected };
                tracing::warn!(index, value = *slot, "fault injected into output");
                true
            }
            None => false,
        },
    }
}
