use combu_core::{CombuError, ErrorInfo, ParamSpec};

use crate::standardize::{standardize, Axis};

/// Counts the combinations of `spec` without building any record.
///
/// Returns 0 for an empty specification or when any key has no candidates.
pub fn count(spec: &ParamSpec) -> Result<usize, CombuError> {
    if spec.is_empty() {
        return Ok(0);
    }
    let axes = standardize(spec, &[])?;
    total(&axes)
}

fn total(axes: &[Axis]) -> Result<usize, CombuError> {
    if axes.is_empty() || axes.iter().any(Axis::is_empty) {
        return Ok(0);
    }
    axes.iter().try_fold(1usize, |acc, axis| {
        acc.checked_mul(axis.len()).ok_or_else(|| {
            CombuError::Overflow(
                ErrorInfo::new("combination-count", "combination count exceeds usize")
                    .with_context("key", axis.key().to_string())
                    .with_context("candidates", axis.len().to_string()),
            )
        })
    })
}
