//! Append-only, hash-chained audit stream.
//!
//! Event `n` is stored under `DataKey::Audit(n)`; `n` doubles as the
//! transaction id, so emission order equals commit order. Every event commits
//! to its predecessor through `prev_hash`, starting from 32 zero bytes.

use soroban_sdk::xdr::ToXdr;
use soroban_sdk::{Address, Bytes, BytesN, Env, String, Vec};

use crate::errors::ContractError;
use crate::events;
use crate::store;
use crate::types::{AuditEvent, DataKey, Operation, Rejection, ResultStatus};

/// Largest page returned by [`range`] and longest span [`verify_chain`]
/// accepts. Each event is its own ledger entry, so a page must stay well under
/// the per-invocation footprint limit.
pub const MAX_PAGE: u32 = 64;

pub fn len(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::AuditLen)
        .unwrap_or(0u64)
}

fn head(env: &Env) -> BytesN<32> {
    env.storage()
        .instance()
        .get(&DataKey::AuditHead)
        .unwrap_or(BytesN::from_array(env, &[0u8; 32]))
}

pub fn get(env: &Env, tx_id: u64) -> Option<AuditEvent> {
    store::get(env, &DataKey::Audit(tx_id))
}

/// Appends one event and returns it with its assigned `tx_id` and hashes.
#[allow(clippy::too_many_arguments)]
pub fn append(
    env: &Env,
    actor: &Address,
    timestamp: u64,
    ledger_seq: u32,
    operation: Operation,
    subject_ids: Vec<String>,
    result_status: ResultStatus,
    rejection: Option<Rejection>,
) -> AuditEvent {
    let tx_id = len(env) + 1;
    let prev_hash = head(env);

    let mut event = AuditEvent {
        tx_id,
        timestamp,
        ledger_seq,
        actor: actor.clone(),
        operation,
        subject_ids,
        result_status,
        rejection,
        prev_hash: prev_hash.clone(),
        event_hash: prev_hash,
    };
    event.event_hash = hash_event(env, &event);

    store::put(env, &DataKey::Audit(tx_id), &event);
    env.storage().instance().set(&DataKey::AuditLen, &tx_id);
    env.storage()
        .instance()
        .set(&DataKey::AuditHead, &event.event_hash);

    events::publish_audit(env, &event);
    event
}

/// Events `from_tx_id..` in commit order, at most `limit` (capped at
/// [`MAX_PAGE`]).
pub fn range(env: &Env, from_tx_id: u64, limit: u32) -> Vec<AuditEvent> {
    let mut out = Vec::new(env);
    let total = len(env);
    let limit = limit.min(MAX_PAGE) as u64;
    let mut tx_id = from_tx_id.max(1);
    while tx_id <= total && (out.len() as u64) < limit {
        if let Some(event) = get(env, tx_id) {
            out.push_back(event);
        }
        tx_id += 1;
    }
    out
}

/// Recomputes every hash in `[from_tx_id, to_tx_id]` and checks the links.
///
/// An empty range verifies trivially; a range that reaches past the stream
/// does not. Spans longer than [`MAX_PAGE`] are refused with
/// `InvalidRange`.
pub fn verify_chain(env: &Env, from_tx_id: u64, to_tx_id: u64) -> Result<bool, ContractError> {
    if from_tx_id > to_tx_id {
        return Ok(true);
    }
    if to_tx_id - from_tx_id >= MAX_PAGE as u64 {
        return Err(ContractError::InvalidRange);
    }
    if from_tx_id == 0 || to_tx_id > len(env) {
        return Ok(false);
    }

    let mut expected_prev = if from_tx_id == 1 {
        BytesN::from_array(env, &[0u8; 32])
    } else {
        match get(env, from_tx_id - 1) {
            Some(event) => event.event_hash,
            None => return Ok(false),
        }
    };

    for tx_id in from_tx_id..=to_tx_id {
        let event = match get(env, tx_id) {
            Some(event) => event,
            None => return Ok(false),
        };
        if event.tx_id != tx_id
            || event.prev_hash != expected_prev
            || hash_event(env, &event) != event.event_hash
        {
            return Ok(false);
        }
        expected_prev = event.event_hash;
    }
    Ok(true)
}

/// sha256 over every field except `event_hash` itself.
pub fn hash_event(env: &Env, event: &AuditEvent) -> BytesN<32> {
    let mut payload = Bytes::new(env);
    payload.append(&Bytes::from_slice(env, &event.tx_id.to_be_bytes()));
    payload.append(&Bytes::from_slice(env, &event.timestamp.to_be_bytes()));
    payload.append(&Bytes::from_slice(env, &event.ledger_seq.to_be_bytes()));
    payload.append(&event.actor.clone().to_xdr(env));
    payload.append(&Bytes::from_slice(
        env,
        &(event.operation as u32).to_be_bytes(),
    ));
    for subject in event.subject_ids.iter() {
        payload.append(&subject.to_xdr(env));
    }
    payload.append(&Bytes::from_slice(
        env,
        &(event.result_status as u32).to_be_bytes(),
    ));
    let code = event.rejection.as_ref().map(|r| r.code).unwrap_or(0);
    payload.append(&Bytes::from_slice(env, &code.to_be_bytes()));
    payload.append(&Bytes::from_slice(env, &event.prev_hash.to_array()));
    env.crypto().sha256(&payload).into()
}
