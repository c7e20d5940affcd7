//! Typed access to ledger state.
//!
//! Entity records are written only through [`put_versioned`], which refuses
//! the write when the stored version moved on since the caller read it.
//!
//! Inside one invocation the read and the write see the same state, so for
//! live entry points the check always passes. Concurrent writers to the same
//! record are serialized by the host, which rejects transactions whose
//! footprints conflict. [`put_versioned`] catches proposals built from an
//! earlier read, such as a record fetched in one call and resubmitted with
//! its version in a later one.

use common::{compare_and_swap, ttl, Versioned};
use soroban_sdk::{Address, Env, IntoVal, String, TryFromVal, Val, Vec};

use crate::errors::ContractError;
use crate::types::{BreakGlassRequest, Bundle, ConsentRecord, DataKey};

pub fn get<V>(env: &Env, key: &DataKey) -> Option<V>
where
    V: TryFromVal<Env, Val>,
{
    env.storage().persistent().get(key)
}

/// Writes `value` under `key` if the stored record is still at
/// `expected_version`, returning the record as stored.
pub fn put_versioned<V>(
    env: &Env,
    key: &DataKey,
    expected_version: u64,
    value: V,
) -> Result<V, ContractError>
where
    V: Versioned + IntoVal<Env, Val> + TryFromVal<Env, Val>,
{
    let stored: Option<V> = env.storage().persistent().get(key);
    let next = compare_and_swap(stored.as_ref(), expected_version, value)?;
    env.storage().persistent().set(key, &next);
    ttl::extend_persistent(env, key);
    Ok(next)
}

pub fn put<V>(env: &Env, key: &DataKey, value: &V)
where
    V: IntoVal<Env, Val>,
{
    env.storage().persistent().set(key, value);
    ttl::extend_persistent(env, key);
}

pub fn has(env: &Env, key: &DataKey) -> bool {
    env.storage().persistent().has(key)
}

pub fn remove(env: &Env, key: &DataKey) {
    env.storage().persistent().remove(key);
}

// ── Entity lookups ───────────────────────────────────────────────────────────

pub fn bundle(env: &Env, bundle_id: &String) -> Option<Bundle> {
    get(env, &DataKey::Bundle(bundle_id.clone()))
}

pub fn consent(env: &Env, bundle_id: &String, grantee: &Address) -> Option<ConsentRecord> {
    get(env, &DataKey::Consent(bundle_id.clone(), grantee.clone()))
}

pub fn break_glass(env: &Env, request_id: u64) -> Option<BreakGlassRequest> {
    get(env, &DataKey::BreakGlass(request_id))
}

/// Request ids raised for one (bundle, requester) pair, oldest first.
pub fn break_glass_history(env: &Env, bundle_id: &String, requester: &Address) -> Vec<u64> {
    get(env, &DataKey::BreakGlassPair(bundle_id.clone(), requester.clone()))
        .unwrap_or(Vec::new(env))
}

pub fn owner_bundles(env: &Env, owner: &Address) -> Vec<String> {
    get(env, &DataKey::OwnerBundles(owner.clone())).unwrap_or(Vec::new(env))
}

// ── Instance counters ────────────────────────────────────────────────────────

/// Allocates the next break-glass request id, starting at 1.
pub fn next_request_id(env: &Env) -> u64 {
    let id: u64 = env
        .storage()
        .instance()
        .get(&DataKey::RequestCounter)
        .unwrap_or(0u64)
        + 1;
    env.storage().instance().set(&DataKey::RequestCounter, &id);
    id
}
