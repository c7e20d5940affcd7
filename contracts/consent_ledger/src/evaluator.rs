//! Access evaluator: the read-only oracle a key-management service consults
//! before releasing a decryption key.
//!
//! Decision order, first match wins:
//! 1. unknown bundle → `Deny(NoSuchBundle)`
//! 2. approved break-glass window covering `at` → `Allow(BreakGlass)`
//! 3. granted consent covering `at` → `Allow(Consent)`
//! 4. otherwise → `Deny(NoActiveGrant)`
//!
//! A pair opens a new request only after its previous one went inactive, so
//! the history is ordered by `requested_at` and its access windows never
//! overlap. The last request raised at or before `at` is therefore the only
//! one that can cover it, and the lookup reads `O(log n)` requests.

use soroban_sdk::{Address, Env, String};

use crate::store;
use crate::types::{AccessDecision, AllowReason, DenyReason};

pub fn evaluate(env: &Env, bundle_id: &String, subject: &Address, at: u64) -> AccessDecision {
    if store::bundle(env, bundle_id).is_none() {
        return AccessDecision::Deny(DenyReason::NoSuchBundle);
    }

    if break_glass_covers(env, bundle_id, subject, at) {
        return AccessDecision::Allow(AllowReason::BreakGlass);
    }

    let consented = store::consent(env, bundle_id, subject)
        .map(|record| record.allows_at(at))
        .unwrap_or(false);
    if consented {
        return AccessDecision::Allow(AllowReason::Consent);
    }

    AccessDecision::Deny(DenyReason::NoActiveGrant)
}

fn break_glass_covers(env: &Env, bundle_id: &String, subject: &Address, at: u64) -> bool {
    let history = store::break_glass_history(env, bundle_id, subject);
    let raised_by = |i: u32| {
        history
            .get(i)
            .and_then(|id| store::break_glass(env, id))
            .map(|request| request.requested_at <= at)
            .unwrap_or(false)
    };

    // Number of requests raised at or before `at`.
    let (mut lo, mut hi) = (0u32, history.len());
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if raised_by(mid) {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    if lo == 0 {
        return false;
    }

    history
        .get(lo - 1)
        .and_then(|id| store::break_glass(env, id))
        .map(|request| request.allows_at(at))
        .unwrap_or(false)
}
