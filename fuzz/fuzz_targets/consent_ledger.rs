#![no_main]

//! Fuzz harness for the consent ledger.
//!
//! Drives random transaction streams against one contract instance and
//! checks after every action:
//!
//! | Property            | Check                                              |
//! |---------------------|----------------------------------------------------|
//! | Audit completeness  | a receipt's `tx_id` is the new `audit_len`         |
//! | Atomic aborts       | an aborted call leaves `audit_len` unchanged       |
//! | Default deny        | `Allow` only with a live consent or approval       |
//! | Tamper evidence     | every page of the chain verifies at the end        |

use arbitrary::Arbitrary;
use consent_ledger::{
    audit, AccessDecision, AllowReason, ConsentLedgerContract, ConsentLedgerContractClient,
    ConsentScope, Role,
};
use libfuzzer_sys::fuzz_target;
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    Address, Env, String,
};

const HASH: &str = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";
const BUNDLES: [&str; 3] = ["rec-a", "rec-b", "rec-c"];

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    CreateBundle { actor: u8, bundle: u8 },
    Grant { actor: u8, bundle: u8, grantee: u8, duration: u32 },
    Revoke { actor: u8, bundle: u8, grantee: u8 },
    Request { actor: u8, bundle: u8, ttl: u32 },
    Approve { actor: u8, request_id: u8 },
    Deny { actor: u8, request_id: u8 },
    SetRole { subject: u8, approver: bool, enabled: bool },
    Delegate { owner: u8, delegate: u8, duration: u16 },
    AdvanceTime { delta: u16 },
}

fuzz_target!(|actions: Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(1_700_000_000);

    let contract_id = env.register(ConsentLedgerContract, ());
    let client = ConsentLedgerContractClient::new(&env, &contract_id);
    let admin = Address::generate(&env);
    if client.try_initialize(&admin, &None).is_err() {
        return;
    }

    let users: Vec<Address> = (0..5).map(|_| Address::generate(&env)).collect();
    client.set_role(&admin, &users[0], &Role::Clinician, &true);
    client.set_role(&admin, &users[1], &Role::Approver, &true);

    let user = |i: u8| &users[i as usize % users.len()];
    let bundle = |i: u8| String::from_str(&env, BUNDLES[i as usize % BUNDLES.len()]);
    let text = |s: &str| String::from_str(&env, s);

    for action in actions.into_iter().take(64) {
        let before = client.audit_len();
        let now = env.ledger().timestamp();

        let receipt = match action {
            FuzzAction::CreateBundle { actor, bundle: b } => client
                .try_create_bundle(
                    user(actor),
                    &bundle(b),
                    user(actor),
                    &text("imaging"),
                    &text("ipfs://bafy/record.enc"),
                    &text(HASH),
                    &4_096,
                    &text("openEHR-EHR-OBSERVATION.v1"),
                )
                .ok()
                .and_then(Result::ok),
            FuzzAction::Grant { actor, bundle: b, grantee, duration } => client
                .try_grant_consent(
                    user(actor),
                    &bundle(b),
                    user(grantee),
                    &ConsentScope::Read,
                    &text("treatment"),
                    &now.saturating_add(duration as u64),
                )
                .ok()
                .and_then(Result::ok),
            FuzzAction::Revoke { actor, bundle: b, grantee } => client
                .try_revoke_consent(user(actor), &bundle(b), user(grantee))
                .ok()
                .and_then(Result::ok),
            FuzzAction::Request { actor, bundle: b, ttl } => client
                .try_request_break_glass(user(actor), &bundle(b), &text("unresponsive"), &(ttl as u64))
                .ok()
                .and_then(Result::ok),
            FuzzAction::Approve { actor, request_id } => client
                .try_approve_break_glass(user(actor), &(request_id as u64))
                .ok()
                .and_then(Result::ok),
            FuzzAction::Deny { actor, request_id } => client
                .try_deny_break_glass(user(actor), &(request_id as u64))
                .ok()
                .and_then(Result::ok),
            FuzzAction::SetRole { subject, approver, enabled } => {
                let role = if approver { Role::Approver } else { Role::Clinician };
                client
                    .try_set_role(&admin, user(subject), &role, &enabled)
                    .ok()
                    .and_then(Result::ok)
            }
            FuzzAction::Delegate { owner, delegate, duration } => client
                .try_register_delegate(
                    user(owner),
                    user(owner),
                    user(delegate),
                    &now.saturating_add(duration as u64),
                )
                .ok()
                .and_then(Result::ok),
            FuzzAction::AdvanceTime { delta } => {
                env.ledger().set_timestamp(now.saturating_add(delta as u64));
                None
            }
        };

        // ── Post-action invariant checks ──
        let after = client.audit_len();
        match receipt {
            Some(receipt) => {
                assert_eq!(after, before + 1, "INVARIANT VIOLATION: receipt without one audit event");
                assert_eq!(receipt.tx_id, after, "INVARIANT VIOLATION: tx_id is not the audit sequence");
            }
            None => assert_eq!(after, before, "INVARIANT VIOLATION: aborted call left an audit event"),
        }

        let at = env.ledger().timestamp();
        for b in 0..BUNDLES.len() as u8 {
            for u in 0..users.len() as u8 {
                match client.evaluate_access(&bundle(b), user(u), &at) {
                    AccessDecision::Allow(AllowReason::Consent) => {
                        let record = client.get_consent(&bundle(b), user(u));
                        assert!(
                            record.map(|r| r.allows_at(at)).unwrap_or(false),
                            "INVARIANT VIOLATION: consent allow without a live grant"
                        );
                    }
                    AccessDecision::Allow(AllowReason::BreakGlass) => {
                        let live = client
                            .get_break_glass_history(&bundle(b), user(u))
                            .iter()
                            .any(|id| client.get_break_glass(&id).allows_at(at));
                        assert!(live, "INVARIANT VIOLATION: break-glass allow without approval");
                    }
                    AccessDecision::Deny(_) => {}
                }
            }
        }
    }

    let len = client.audit_len();
    let page = audit::MAX_PAGE as u64;
    let mut from = 1;
    while from <= len {
        let to = len.min(from + page - 1);
        assert!(client.verify_audit_chain(&from, &to), "INVARIANT VIOLATION: audit chain broken");
        from = to + 1;
    }
});
