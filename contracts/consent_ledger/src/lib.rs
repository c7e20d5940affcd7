#![no_std]
#![allow(clippy::too_many_arguments)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

//! # Consent Ledger
//!
//! Governs who may decrypt a patient's health-record bundle and keeps a
//! tamper-evident trail of every grant, revocation and emergency override.
//!
//! - **Bundle registry**: write-once metadata for off-ledger encrypted bundles.
//! - **Consent manager**: patient-granted, time-bounded access per grantee.
//! - **Break-glass manager**: emergency requests decided by an approver.
//! - **Access evaluator**: [`ConsentLedgerContract::evaluate_access`], the
//!   read-only oracle consulted before any key release.
//! - **Audit stream**: one hash-chained [`AuditEvent`] per committed
//!   transaction, accepted or rejected.
//!
//! All expiry is lazy: records are compared against the ledger timestamp of
//! the transaction, or the time passed to a query, when they are read.

pub mod audit;
pub mod break_glass;
pub mod bundle;
pub mod config;
pub mod consent;
pub mod dispatcher;
pub mod errors;
pub mod evaluator;
pub mod events;
pub mod roles;
pub mod store;
pub mod types;
pub mod validation;

use common::ttl;
use soroban_sdk::{contract, contractimpl, vec, Address, Env, String, Vec};

use crate::dispatcher::{address_string, id_string};
pub use crate::errors::{ContractError, ErrorKind};
pub use crate::types::*;

/// Bumped whenever the stored layout or the entry-point surface changes.
pub const CONTRACT_VERSION: u32 = 1;

#[contract]
pub struct ConsentLedgerContract;

#[contractimpl]
impl ConsentLedgerContract {
    // ── Lifecycle ────────────────────────────────────────────────────────────

    /// Initialize the contract. `admin` is the identity-provider bridge: it
    /// asserts roles and may register delegations. `None` selects the default
    /// configuration.
    pub fn initialize(
        env: Env,
        admin: Address,
        config: Option<Config>,
    ) -> Result<TxReceipt, ContractError> {
        admin.require_auth();
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(ContractError::AlreadyInitialized);
        }
        let config = config.unwrap_or_default();
        config.validate()?;

        env.storage().instance().set(&DataKey::Admin, &admin);
        config::store(&env, &config);
        env.storage().instance().set(&DataKey::Initialized, &true);
        ttl::extend_instance(&env);

        events::publish_initialized(&env, admin.clone(), config);

        let tx = dispatcher::context(&env, &admin);
        let subjects = vec![&env, address_string(&admin)];
        dispatcher::commit(&env, &tx, Operation::Initialize, subjects, || Ok(None))
    }

    pub fn get_admin(env: Env) -> Result<Address, ContractError> {
        dispatcher::admin(&env)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&DataKey::Initialized)
    }

    pub fn get_config(env: Env) -> Result<Config, ContractError> {
        config::load(&env)
    }

    pub fn version(_env: Env) -> u32 {
        CONTRACT_VERSION
    }

    /// Replace the configuration. Records already stored keep the windows
    /// they were created with.
    pub fn update_config(
        env: Env,
        caller: Address,
        config: Config,
    ) -> Result<TxReceipt, ContractError> {
        let tx = dispatcher::begin(&env, &caller)?;
        dispatcher::require_admin(&env, &tx)?;
        config.validate()?;

        let previous = config::load(&env)?;
        let subjects = vec![&env, address_string(&caller)];
        dispatcher::commit(&env, &tx, Operation::UpdateConfig, subjects, || {
            config::store(&env, &config);
            events::publish_config_updated(&env, caller.clone(), previous, config.clone());
            Ok(None)
        })
    }

    // ── Identity attributes ──────────────────────────────────────────────────

    pub fn set_role(
        env: Env,
        caller: Address,
        subject: Address,
        role: Role,
        enabled: bool,
    ) -> Result<TxReceipt, ContractError> {
        let tx = dispatcher::begin(&env, &caller)?;
        dispatcher::require_admin(&env, &tx)?;

        let subjects = vec![&env, address_string(&subject)];
        dispatcher::commit(&env, &tx, Operation::SetRole, subjects, || {
            roles::set_role(&env, &subject, role, enabled);
            Ok(None)
        })
    }

    pub fn has_role(env: Env, subject: Address, role: Role) -> bool {
        roles::has_role(&env, &subject, role)
    }

    /// Let `delegate` act for `owner` until `expires_at`. Callable by the
    /// owner, or by the admin asserting the delegation on the owner's behalf.
    pub fn register_delegate(
        env: Env,
        caller: Address,
        owner: Address,
        delegate: Address,
        expires_at: u64,
    ) -> Result<TxReceipt, ContractError> {
        let tx = dispatcher::begin(&env, &caller)?;
        validation::validate_delegation_expiry(tx.now, expires_at)?;
        if caller != owner {
            dispatcher::require_admin(&env, &tx).map_err(|_| ContractError::NotOwner)?;
        }

        let subjects = vec![&env, address_string(&owner), address_string(&delegate)];
        dispatcher::commit(&env, &tx, Operation::RegisterDelegate, subjects, || {
            roles::register_delegate(&env, &owner, &delegate, tx.now, expires_at);
            Ok(None)
        })
    }

    pub fn revoke_delegate(
        env: Env,
        caller: Address,
        owner: Address,
        delegate: Address,
    ) -> Result<TxReceipt, ContractError> {
        let tx = dispatcher::begin(&env, &caller)?;
        if caller != owner {
            dispatcher::require_admin(&env, &tx).map_err(|_| ContractError::NotOwner)?;
        }

        let subjects = vec![&env, address_string(&owner), address_string(&delegate)];
        dispatcher::commit(&env, &tx, Operation::RevokeDelegate, subjects, || {
            if !roles::revoke_delegate(&env, &owner, &delegate) {
                return Err(ContractError::DelegationNotFound);
            }
            Ok(None)
        })
    }

    pub fn get_delegation(env: Env, owner: Address, delegate: Address) -> Option<Delegation> {
        roles::get_delegation(&env, &owner, &delegate)
    }

    // ── Bundles ──────────────────────────────────────────────────────────────

    pub fn create_bundle(
        env: Env,
        caller: Address,
        id: String,
        owner: Address,
        bundle_type: String,
        storage_uri: String,
        content_hash: String,
        size_bytes: u64,
        archetype_id: String,
    ) -> Result<TxReceipt, ContractError> {
        let tx = dispatcher::begin(&env, &caller)?;
        validation::validate_identifier(&id)?;
        validation::validate_bundle_type(&bundle_type)?;
        validation::validate_storage_uri(&storage_uri)?;
        validation::validate_content_hash(&content_hash)?;
        validation::validate_size(size_bytes)?;
        validation::validate_identifier(&archetype_id)?;
        dispatcher::require_acts_for(&env, &tx, &owner)?;

        let subjects = vec![&env, id.clone(), address_string(&owner)];
        dispatcher::commit(&env, &tx, Operation::CreateBundle, subjects, || {
            bundle::create(
                &env,
                Bundle {
                    id,
                    owner,
                    bundle_type,
                    storage_uri,
                    content_hash,
                    size_bytes,
                    archetype_id,
                    created_at: tx.now,
                    version: 0,
                },
            )?;
            Ok(None)
        })
    }

    pub fn get_bundle(env: Env, bundle_id: String) -> Result<Bundle, ContractError> {
        bundle::get(&env, &bundle_id)
    }

    /// Bundle ids registered for `owner`, in creation order.
    pub fn get_owner_bundles(env: Env, owner: Address) -> Vec<String> {
        store::owner_bundles(&env, &owner)
    }

    pub fn get_bundle_version(env: Env, bundle_id: String) -> u64 {
        store::bundle(&env, &bundle_id)
            .map(|b| b.version)
            .unwrap_or(0)
    }

    // ── Consent ──────────────────────────────────────────────────────────────

    pub fn grant_consent(
        env: Env,
        caller: Address,
        bundle_id: String,
        grantee: Address,
        scope: ConsentScope,
        purpose: String,
        expires_at: u64,
    ) -> Result<TxReceipt, ContractError> {
        let tx = dispatcher::begin(&env, &caller)?;
        let config = config::load(&env)?;
        validation::validate_identifier(&bundle_id)?;
        validation::validate_purpose(&purpose)?;
        validation::validate_expiry(tx.now, expires_at, &config)?;

        let subjects = vec![&env, bundle_id.clone(), address_string(&grantee)];
        dispatcher::commit(&env, &tx, Operation::GrantConsent, subjects, || {
            let bundle = bundle::get(&env, &bundle_id)?;
            dispatcher::require_acts_for(&env, &tx, &bundle.owner)?;
            consent::grant(&env, tx.now, &bundle_id, &grantee, scope, purpose, expires_at)?;
            Ok(None)
        })
    }

    pub fn revoke_consent(
        env: Env,
        caller: Address,
        bundle_id: String,
        grantee: Address,
    ) -> Result<TxReceipt, ContractError> {
        let tx = dispatcher::begin(&env, &caller)?;
        validation::validate_identifier(&bundle_id)?;

        let subjects = vec![&env, bundle_id.clone(), address_string(&grantee)];
        dispatcher::commit(&env, &tx, Operation::RevokeConsent, subjects, || {
            let bundle = bundle::get(&env, &bundle_id)?;
            dispatcher::require_acts_for(&env, &tx, &bundle.owner)?;
            consent::revoke(&env, tx.now, &bundle_id, &grantee)?;
            Ok(None)
        })
    }

    pub fn get_consent(env: Env, bundle_id: String, grantee: Address) -> Option<ConsentRecord> {
        store::consent(&env, &bundle_id, &grantee)
    }

    /// Status of the pair's record as observed at `at_time`.
    pub fn consent_status(
        env: Env,
        bundle_id: String,
        grantee: Address,
        at_time: u64,
    ) -> Option<ConsentStatus> {
        consent::status_at(&env, &bundle_id, &grantee, at_time)
    }

    pub fn get_consent_version(env: Env, bundle_id: String, grantee: Address) -> u64 {
        store::consent(&env, &bundle_id, &grantee)
            .map(|r| r.version)
            .unwrap_or(0)
    }

    // ── Break-glass ──────────────────────────────────────────────────────────

    /// Raise an emergency request. The receipt's `request_id` identifies it.
    pub fn request_break_glass(
        env: Env,
        caller: Address,
        bundle_id: String,
        justification: String,
        ttl_seconds: u64,
    ) -> Result<TxReceipt, ContractError> {
        let tx = dispatcher::begin(&env, &caller)?;
        let config = config::load(&env)?;
        validation::validate_identifier(&bundle_id)?;
        validation::validate_justification(&justification)?;
        validation::validate_ttl(ttl_seconds, &config)?;
        dispatcher::require_role(&env, &tx, Role::Clinician)?;

        let subjects = vec![&env, bundle_id.clone(), address_string(&caller)];
        dispatcher::commit(&env, &tx, Operation::RequestBreakGlass, subjects, || {
            let request = break_glass::request(
                &env,
                tx.now,
                &config,
                &caller,
                &bundle_id,
                justification,
                ttl_seconds,
            )?;
            Ok(Some(request.request_id))
        })
    }

    pub fn approve_break_glass(
        env: Env,
        caller: Address,
        request_id: u64,
    ) -> Result<TxReceipt, ContractError> {
        Self::decide(env, caller, request_id, true)
    }

    pub fn deny_break_glass(
        env: Env,
        caller: Address,
        request_id: u64,
    ) -> Result<TxReceipt, ContractError> {
        Self::decide(env, caller, request_id, false)
    }

    pub fn get_break_glass(env: Env, request_id: u64) -> Result<BreakGlassRequest, ContractError> {
        break_glass::get(&env, request_id)
    }

    pub fn break_glass_status(
        env: Env,
        request_id: u64,
        at_time: u64,
    ) -> Result<BreakGlassStatus, ContractError> {
        break_glass::get(&env, request_id).map(|r| r.status_at(at_time))
    }

    /// Request ids raised by `requester` against `bundle_id`, oldest first.
    pub fn get_break_glass_history(env: Env, bundle_id: String, requester: Address) -> Vec<u64> {
        store::break_glass_history(&env, &bundle_id, &requester)
    }

    pub fn get_break_glass_version(env: Env, request_id: u64) -> u64 {
        store::break_glass(&env, request_id)
            .map(|r| r.version)
            .unwrap_or(0)
    }

    // ── Access evaluation ────────────────────────────────────────────────────

    /// Is `subject` authorized to access `bundle_id` at `at_time`? Never
    /// writes.
    pub fn evaluate_access(
        env: Env,
        bundle_id: String,
        subject: Address,
        at_time: u64,
    ) -> AccessDecision {
        evaluator::evaluate(&env, &bundle_id, &subject, at_time)
    }

    // ── Audit ────────────────────────────────────────────────────────────────

    pub fn audit_len(env: Env) -> u64 {
        audit::len(&env)
    }

    pub fn get_audit_event(env: Env, tx_id: u64) -> Option<AuditEvent> {
        audit::get(&env, tx_id)
    }

    /// Up to `limit` events starting at `from_tx_id` (at most
    /// [`audit::MAX_PAGE`] per call).
    pub fn get_audit_events(env: Env, from_tx_id: u64, limit: u32) -> Vec<AuditEvent> {
        audit::range(&env, from_tx_id, limit)
    }

    /// Verifies `[from_tx_id, to_tx_id]`, which may span at most
    /// [`audit::MAX_PAGE`] events. Longer streams are checked page by page:
    /// each page re-reads its predecessor's hash, so consecutive pages that
    /// all verify prove the whole chain.
    pub fn verify_audit_chain(
        env: Env,
        from_tx_id: u64,
        to_tx_id: u64,
    ) -> Result<bool, ContractError> {
        audit::verify_chain(&env, from_tx_id, to_tx_id)
    }
}

impl ConsentLedgerContract {
    fn decide(
        env: Env,
        caller: Address,
        request_id: u64,
        approve: bool,
    ) -> Result<TxReceipt, ContractError> {
        let tx = dispatcher::begin(&env, &caller)?;
        dispatcher::require_role(&env, &tx, Role::Approver)?;

        let operation = if approve {
            Operation::ApproveBreakGlass
        } else {
            Operation::DenyBreakGlass
        };
        let subjects = match store::break_glass(&env, request_id) {
            Some(request) => vec![
                &env,
                request.bundle_id,
                address_string(&request.requester),
                id_string(&env, request_id),
            ],
            None => vec![&env, id_string(&env, request_id)],
        };
        dispatcher::commit(&env, &tx, operation, subjects, || {
            break_glass::decide(&env, tx.now, &caller, request_id, approve)?;
            Ok(None)
        })
    }
}

#[cfg(test)]
mod test_audit;
