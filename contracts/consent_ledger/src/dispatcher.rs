//! Transaction dispatcher.
//!
//! Every mutating entry point runs the same pipeline:
//!
//! 1. [`begin`]: verify the caller's signature and that the contract is live.
//! 2. Shape validation and the authorization checks that need no entity state.
//! 3. [`commit`]: run exactly one manager operation and append exactly one
//!    audit event for its outcome.
//!
//! Errors from steps 1 and 2 abort the invocation, so the host discards every
//! write and no audit event exists for them. Inside step 3 a manager may still
//! return an authorization error once it has looked up the owning entity;
//! those abort too. Only domain rejections (not found, conflict, invalid
//! state) are committed, as a `Rejected` receipt plus its audit event.

use common::ttl;
use soroban_sdk::{Address, Env, String, Vec};

use crate::audit;
use crate::errors::ContractError;
use crate::roles;
use crate::types::{DataKey, Operation, Rejection, ResultStatus, Role, TxReceipt};

/// Verified facts about the transaction being executed.
#[derive(Clone, Debug)]
pub struct TxContext {
    pub caller: Address,
    /// Ledger close time; the only clock the state machine reads.
    pub now: u64,
    pub ledger_seq: u32,
}

pub fn begin(env: &Env, caller: &Address) -> Result<TxContext, ContractError> {
    caller.require_auth();
    ensure_initialized(env)?;
    ttl::extend_instance(env);
    Ok(context(env, caller))
}

pub(crate) fn context(env: &Env, caller: &Address) -> TxContext {
    TxContext {
        caller: caller.clone(),
        now: env.ledger().timestamp(),
        ledger_seq: env.ledger().sequence(),
    }
}

pub fn ensure_initialized(env: &Env) -> Result<(), ContractError> {
    if !env.storage().instance().has(&DataKey::Initialized) {
        return Err(ContractError::NotInitialized);
    }
    Ok(())
}

// ── Authorization ────────────────────────────────────────────────────────────

pub fn admin(env: &Env) -> Result<Address, ContractError> {
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(ContractError::NotInitialized)
}

pub fn require_admin(env: &Env, tx: &TxContext) -> Result<(), ContractError> {
    if admin(env)? != tx.caller {
        return Err(ContractError::NotAdmin);
    }
    Ok(())
}

/// Caller is `owner` or one of its live delegates.
pub fn require_acts_for(env: &Env, tx: &TxContext, owner: &Address) -> Result<(), ContractError> {
    if !roles::acts_for(env, &tx.caller, owner, tx.now) {
        return Err(ContractError::NotOwner);
    }
    Ok(())
}

pub fn require_role(env: &Env, tx: &TxContext, role: Role) -> Result<(), ContractError> {
    if roles::has_role(env, &tx.caller, role) {
        return Ok(());
    }
    Err(match role {
        Role::Clinician => ContractError::MissingClinicalRole,
        Role::Approver => ContractError::MissingApproverRole,
    })
}

// ── Commit ───────────────────────────────────────────────────────────────────

/// Runs `apply` and records its outcome.
///
/// `apply` returns the request id it allocated, if any; the id is appended to
/// `subject_ids` and echoed in the receipt. A manager must not write before
/// it has ruled out every domain rejection, since a rejection commits.
pub fn commit<F>(
    env: &Env,
    tx: &TxContext,
    operation: Operation,
    mut subject_ids: Vec<String>,
    apply: F,
) -> Result<TxReceipt, ContractError>
where
    F: FnOnce() -> Result<Option<u64>, ContractError>,
{
    match apply() {
        Ok(request_id) => {
            if let Some(id) = request_id {
                subject_ids.push_back(id_string(env, id));
            }
            let event = audit::append(
                env,
                &tx.caller,
                tx.now,
                tx.ledger_seq,
                operation,
                subject_ids,
                ResultStatus::Accepted,
                None,
            );
            Ok(TxReceipt {
                tx_id: event.tx_id,
                status: ResultStatus::Accepted,
                rejection: None,
                request_id,
            })
        }
        Err(err) if err.is_domain_rejection() => {
            let rejection = Rejection {
                kind: err.kind(),
                code: err as u32,
                reason: String::from_str(env, err.reason()),
            };
            let event = audit::append(
                env,
                &tx.caller,
                tx.now,
                tx.ledger_seq,
                operation,
                subject_ids,
                ResultStatus::Rejected,
                Some(rejection.clone()),
            );
            Ok(TxReceipt {
                tx_id: event.tx_id,
                status: ResultStatus::Rejected,
                rejection: Some(rejection),
                request_id: None,
            })
        }
        Err(err) => Err(err),
    }
}

// ── Subject ids ──────────────────────────────────────────────────────────────

pub fn address_string(address: &Address) -> String {
    address.to_string()
}

/// Decimal rendering of a numeric id.
pub fn id_string(env: &Env, id: u64) -> String {
    let mut buf = [0u8; 20];
    let mut pos = buf.len();
    let mut n = id;
    loop {
        pos -= 1;
        buf[pos] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    String::from_bytes(env, &buf[pos..])
}
