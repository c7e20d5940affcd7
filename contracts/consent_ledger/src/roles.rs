//! # Identity attributes
//!
//! The identity provider is represented on-ledger by the contract admin. It
//! asserts two kinds of attribute that the dispatcher checks before any
//! manager runs:
//!
//! - **Roles**: `Clinician` may raise break-glass requests, `Approver` may
//!   decide them. A subject may hold both.
//! - **Delegations**: a delegate acts for a bundle owner (create bundles,
//!   grant and revoke consent) until the delegation's `expires_at`.
//!
//! ```text
//! owner ──delegates──▶ delegate        (expires_at, exclusive)
//! admin ──asserts────▶ Role(subject)   (until unset)
//! ```

use soroban_sdk::{Address, Env};

use crate::store;
use crate::types::{DataKey, Delegation, Role};

pub fn set_role(env: &Env, subject: &Address, role: Role, enabled: bool) {
    let key = DataKey::Role(subject.clone(), role);
    if enabled {
        store::put(env, &key, &true);
    } else {
        store::remove(env, &key);
    }
}

pub fn has_role(env: &Env, subject: &Address, role: Role) -> bool {
    store::has(env, &DataKey::Role(subject.clone(), role))
}

/// Records (or replaces) a delegation from `owner` to `delegate`.
pub fn register_delegate(
    env: &Env,
    owner: &Address,
    delegate: &Address,
    now: u64,
    expires_at: u64,
) -> Delegation {
    let delegation = Delegation {
        owner: owner.clone(),
        delegate: delegate.clone(),
        granted_at: now,
        expires_at,
    };
    store::put(
        env,
        &DataKey::Delegation(owner.clone(), delegate.clone()),
        &delegation,
    );
    delegation
}

/// Removes a delegation, returning `false` if none was stored.
pub fn revoke_delegate(env: &Env, owner: &Address, delegate: &Address) -> bool {
    let key = DataKey::Delegation(owner.clone(), delegate.clone());
    if !store::has(env, &key) {
        return false;
    }
    store::remove(env, &key);
    true
}

pub fn get_delegation(env: &Env, owner: &Address, delegate: &Address) -> Option<Delegation> {
    store::get(env, &DataKey::Delegation(owner.clone(), delegate.clone()))
}

/// `true` if `actor` is `owner`, or holds a delegation from `owner` that is
/// live at `now`.
pub fn acts_for(env: &Env, actor: &Address, owner: &Address, now: u64) -> bool {
    if actor == owner {
        return true;
    }
    get_delegation(env, owner, actor)
        .map(|d| d.is_live_at(now))
        .unwrap_or(false)
}
