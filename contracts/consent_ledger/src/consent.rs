//! Consent manager.
//!
//! One current record per (bundle, grantee). `Granted` and `Revoked` are
//! stored; `Expired` is derived from `expires_at` whenever the record is read.
//!
//! ```text
//! ∅ ──grant──▶ Granted ──revoke──▶ Revoked
//!                 │
//!                 └──(now >= expires_at)──▶ Expired
//! any state ──grant──▶ Granted (fresh granted_at / expires_at)
//! ```
//!
//! Ownership of the bundle is checked by the caller before either function
//! runs.

use soroban_sdk::{Address, Env, String};

use crate::errors::ContractError;
use crate::store;
use crate::types::{ConsentRecord, ConsentScope, ConsentStatus, DataKey};

/// Creates or replaces the current record for the pair. A fresh grant
/// supersedes whatever was there, whatever its status.
pub fn grant(
    env: &Env,
    now: u64,
    bundle_id: &String,
    grantee: &Address,
    scope: ConsentScope,
    purpose: String,
    expires_at: u64,
) -> Result<ConsentRecord, ContractError> {
    let key = DataKey::Consent(bundle_id.clone(), grantee.clone());
    let expected = store::consent(env, bundle_id, grantee)
        .map(|r| r.version)
        .unwrap_or(0);

    let record = ConsentRecord {
        bundle_id: bundle_id.clone(),
        grantee: grantee.clone(),
        scope,
        purpose,
        granted_at: now,
        expires_at,
        status: ConsentStatus::Granted,
        version: expected,
    };
    store::put_versioned(env, &key, expected, record)
}

/// Flips a live grant to `Revoked`. Revoking a record that is already revoked
/// or has lapsed succeeds without writing.
pub fn revoke(
    env: &Env,
    now: u64,
    bundle_id: &String,
    grantee: &Address,
) -> Result<ConsentRecord, ContractError> {
    let current =
        store::consent(env, bundle_id, grantee).ok_or(ContractError::ConsentNotFound)?;
    if current.status_at(now) != ConsentStatus::Granted {
        return Ok(current);
    }

    let key = DataKey::Consent(bundle_id.clone(), grantee.clone());
    let expected = current.version;
    let mut next = current;
    next.status = ConsentStatus::Revoked;
    store::put_versioned(env, &key, expected, next)
}

pub fn status_at(
    env: &Env,
    bundle_id: &String,
    grantee: &Address,
    at: u64,
) -> Option<ConsentStatus> {
    store::consent(env, bundle_id, grantee).map(|r| r.status_at(at))
}
