//! Shared utilities and error types for the consent ledger contracts.
//!
//! This crate provides:
//! - [`CommonError`]: error codes shared by every contract in the workspace.
//! - [`concurrency`]: optimistic version checks for read-modify-write cycles.
//! - [`text`]: byte-class checks for Soroban `String` arguments.
//! - [`ttl`]: storage TTL constants and extension helpers.
//!
//! Contract-specific errors start at code **100** and above, so they never
//! collide with the common set.

#![no_std]
#![allow(clippy::arithmetic_side_effects)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

use soroban_sdk::contracterror;

// ── Modules ──────────────────────────────────────────────────────────────────

pub mod concurrency;
pub mod text;
pub mod ttl;

pub use concurrency::*;

// ── Shared error enum ────────────────────────────────────────────────────────

/// Error codes shared by every contract in the workspace.
///
/// # Code ranges
/// | Range   | Purpose                       |
/// |---------|-------------------------------|
/// | 60 – 69 | Optimistic concurrency        |
/// | 100+    | Reserved for contract-specific |
#[contracterror]
#[derive(Clone, Debug, Eq, PartialEq, Copy)]
#[repr(u32)]
pub enum CommonError {
    /// The stored version moved on after it was read.
    StaleVersion = 60,
    /// The version counter would exceed u64::MAX.
    VersionOverflow = 61,
}
