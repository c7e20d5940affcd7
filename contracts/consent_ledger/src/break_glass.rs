//! Break-glass manager.
//!
//! ```text
//! Requested ──approve──▶ Approved ──(now >= decided_at + ttl)──▶ Expired
//!     │
//!     ├──deny──▶ Denied
//!     └──(now >= pending_until)──▶ Expired
//! ```
//!
//! Both expiries are lazy: the stored status stays `Requested` or `Approved`
//! and [`BreakGlassRequest::status_at`] derives `Expired`.
//!
//! At most one request per (bundle, requester) is active at a time. Requests
//! for a pair are kept in creation order, and since an inactive request can
//! never become active again only the newest one needs checking.

use soroban_sdk::{Address, Env, String};

use crate::errors::ContractError;
use crate::store;
use crate::types::{BreakGlassRequest, BreakGlassStatus, Config, DataKey};

pub fn request(
    env: &Env,
    now: u64,
    config: &Config,
    requester: &Address,
    bundle_id: &String,
    justification: String,
    ttl_seconds: u64,
) -> Result<BreakGlassRequest, ContractError> {
    if store::bundle(env, bundle_id).is_none() {
        return Err(ContractError::BundleNotFound);
    }

    let mut history = store::break_glass_history(env, bundle_id, requester);
    if let Some(latest) = history.last().and_then(|id| store::break_glass(env, id)) {
        if latest.is_active_at(now) {
            return Err(ContractError::ActiveRequestExists);
        }
    }

    let request_id = store::next_request_id(env);
    let request = BreakGlassRequest {
        request_id,
        bundle_id: bundle_id.clone(),
        requester: requester.clone(),
        justification,
        requested_at: now,
        pending_until: now.saturating_add(config.pending_request_timeout),
        approver: None,
        decided_at: None,
        ttl_seconds,
        status: BreakGlassStatus::Requested,
        version: 0,
    };
    let stored = store::put_versioned(env, &DataKey::BreakGlass(request_id), 0, request)?;

    history.push_back(request_id);
    store::put(
        env,
        &DataKey::BreakGlassPair(bundle_id.clone(), requester.clone()),
        &history,
    );
    Ok(stored)
}

/// Records the single decision a request may receive.
///
/// The requester can never decide their own request. A request that was
/// already decided, or lapsed while pending, is left untouched.
pub fn decide(
    env: &Env,
    now: u64,
    approver: &Address,
    request_id: u64,
    approve: bool,
) -> Result<BreakGlassRequest, ContractError> {
    let current = store::break_glass(env, request_id).ok_or(ContractError::RequestNotFound)?;
    if &current.requester == approver {
        return Err(ContractError::SelfApproval);
    }

    match (current.status, current.status_at(now)) {
        (BreakGlassStatus::Requested, BreakGlassStatus::Requested) => {}
        (BreakGlassStatus::Requested, _) => return Err(ContractError::RequestLapsed),
        _ => return Err(ContractError::RequestNotPending),
    }

    let expected = current.version;
    let mut next = current;
    next.approver = Some(approver.clone());
    next.decided_at = Some(now);
    next.status = if approve {
        BreakGlassStatus::Approved
    } else {
        BreakGlassStatus::Denied
    };
    store::put_versioned(env, &DataKey::BreakGlass(request_id), expected, next)
}

pub fn get(env: &Env, request_id: u64) -> Result<BreakGlassRequest, ContractError> {
    store::break_glass(env, request_id).ok_or(ContractError::RequestNotFound)
}
