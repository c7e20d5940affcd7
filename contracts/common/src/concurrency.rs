//! Optimistic concurrency control (OCC) primitives.
//!
//! Every ledger record carries a monotonically increasing `version`. A writer
//! reads the record, remembers the version it saw, and commits only if the
//! stored version is still the same. Two proposals built from the same read
//! therefore cannot both commit: the second observes [`CommonError::StaleVersion`]
//! and has to be resubmitted by its caller.
//!
//! Version `0` means "no record stored yet", so creation is a write that
//! expects version `0`.

use crate::CommonError;

/// A record that carries an optimistic-concurrency version.
pub trait Versioned {
    /// Version currently held by this value (`0` for a value never written).
    fn version(&self) -> u64;

    /// Returns the value re-stamped with `version`.
    fn with_version(self, version: u64) -> Self;
}

/// Checks that `stored` still equals `expected` and returns the version the
/// next write must carry.
///
/// # Errors
/// - [`CommonError::StaleVersion`] when another write landed in between.
/// - [`CommonError::VersionOverflow`] when the counter is exhausted.
pub fn next_version(stored: u64, expected: u64) -> Result<u64, CommonError> {
    if stored != expected {
        return Err(CommonError::StaleVersion);
    }
    expected.checked_add(1).ok_or(CommonError::VersionOverflow)
}

/// Compare-and-swap on a versioned value.
///
/// `stored` is whatever currently sits under the key (if anything). On
/// success the returned value is `value` stamped with the next version.
pub fn compare_and_swap<T: Versioned>(
    stored: Option<&T>,
    expected: u64,
    value: T,
) -> Result<T, CommonError> {
    let current = stored.map(|s| s.version()).unwrap_or(0);
    let next = next_version(current, expected)?;
    Ok(value.with_version(next))
}
