use soroban_sdk::testutils::Address as _;
use soroban_sdk::{Address, BytesN};

use super::*;
use crate::test::{Setup, HASH, T0};

#[test]
fn test_every_committed_transaction_is_audited_in_order() {
    let setup = Setup::new();
    // initialize + two set_role calls
    assert_eq!(setup.client.audit_len(), 3);

    setup.create_bundle("b1");
    setup.grant("b1", &setup.doctor, T0 + 100);
    setup.revoke("b1", &setup.doctor);
    let request_id = setup.request("b1", 600);
    setup.client.approve_break_glass(&setup.approver, &request_id);

    assert_eq!(setup.client.audit_len(), 8);
    let events = setup.client.get_audit_events(&1, &100);
    assert_eq!(events.len(), 8);

    let expected = [
        Operation::Initialize,
        Operation::SetRole,
        Operation::SetRole,
        Operation::CreateBundle,
        Operation::GrantConsent,
        Operation::RevokeConsent,
        Operation::RequestBreakGlass,
        Operation::ApproveBreakGlass,
    ];
    for (i, op) in expected.iter().enumerate() {
        let event = events.get(i as u32).unwrap();
        assert_eq!(event.tx_id, i as u64 + 1);
        assert_eq!(event.operation, *op);
        assert_eq!(event.result_status, ResultStatus::Accepted);
        assert_eq!(event.rejection, None);
    }
}

#[test]
fn test_receipt_matches_audit_event() {
    let setup = Setup::new();
    setup.create_bundle("b1");
    let receipt = setup.client.request_break_glass(
        &setup.clinician,
        &setup.s("b1"),
        &setup.s("cardiac arrest"),
        &600,
    );

    let event = setup.client.get_audit_event(&receipt.tx_id).unwrap();
    assert_eq!(event.actor, setup.clinician);
    assert_eq!(event.timestamp, T0);
    assert_eq!(event.operation, Operation::RequestBreakGlass);
    assert_eq!(event.subject_ids.len(), 3);
    assert_eq!(event.subject_ids.get(0).unwrap(), setup.s("b1"));
    assert_eq!(event.subject_ids.get(2).unwrap(), setup.s("1"));
}

#[test]
fn test_rejection_is_audited_with_reason() {
    let setup = Setup::new();
    setup.create_bundle("b1");
    let receipt = setup.create_bundle("b1");

    let event = setup.client.get_audit_event(&receipt.tx_id).unwrap();
    assert_eq!(event.result_status, ResultStatus::Rejected);
    let rejection = event.rejection.unwrap();
    assert_eq!(rejection.kind, ErrorKind::Conflict);
    assert_eq!(rejection.code, ContractError::BundleExists as u32);
    assert_eq!(rejection.reason, setup.s(ContractError::BundleExists.reason()));
}

#[test]
fn test_validation_and_authorization_failures_are_not_audited() {
    let setup = Setup::new();
    setup.create_bundle("b1");
    let before = setup.client.audit_len();

    let _ = setup.client.try_create_bundle(
        &setup.patient,
        &setup.s("bad id"),
        &setup.patient,
        &setup.s("imaging"),
        &setup.s("s3://records/x.enc"),
        &setup.s(HASH),
        &1,
        &setup.s("arch-1"),
    );
    let _ = setup.client.try_revoke_consent(&setup.doctor, &setup.s("b1"), &setup.doctor);
    let _ = setup.client.try_approve_break_glass(&setup.doctor, &1);
    let _ = setup.client.try_set_role(&setup.doctor, &setup.doctor, &Role::Clinician, &true);

    assert_eq!(setup.client.audit_len(), before);
}

#[test]
fn test_chain_links_and_verifies() {
    let setup = Setup::new();
    setup.create_bundle("b1");
    setup.grant("b1", &setup.doctor, T0 + 100);
    setup.create_bundle("b1");

    let len = setup.client.audit_len();
    assert!(setup.client.verify_audit_chain(&1, &len));
    assert!(setup.client.verify_audit_chain(&2, &len));

    let first = setup.client.get_audit_event(&1).unwrap();
    assert_eq!(first.prev_hash, BytesN::from_array(&setup.env, &[0u8; 32]));
    for tx_id in 2..=len {
        let prev = setup.client.get_audit_event(&(tx_id - 1)).unwrap();
        let event = setup.client.get_audit_event(&tx_id).unwrap();
        assert_eq!(event.prev_hash, prev.event_hash);
    }
}

#[test]
fn test_chain_detects_tampering() {
    let setup = Setup::new();
    setup.create_bundle("b1");
    setup.grant("b1", &setup.doctor, T0 + 100);
    let len = setup.client.audit_len();

    let forger = Address::generate(&setup.env);
    setup.env.as_contract(&setup.client.address, || {
        let mut event = audit::get(&setup.env, 4).unwrap();
        event.actor = forger.clone();
        store::put(&setup.env, &DataKey::Audit(4), &event);
    });

    assert!(!setup.client.verify_audit_chain(&1, &len));
    assert!(setup.client.verify_audit_chain(&1, &3));
}

#[test]
fn test_chain_range_bounds() {
    let setup = Setup::new();
    let len = setup.client.audit_len();
    assert!(!setup.client.verify_audit_chain(&0, &len));
    assert!(!setup.client.verify_audit_chain(&1, &(len + 1)));
    assert!(setup.client.verify_audit_chain(&2, &1));
}

#[test]
fn test_audit_pages_are_capped() {
    let setup = Setup::new();
    for i in 0..120u32 {
        let subject = Address::generate(&setup.env);
        setup
            .client
            .set_role(&setup.admin, &subject, &Role::Clinician, &(i % 2 == 0));
    }
    assert_eq!(setup.client.get_audit_events(&1, &500).len(), audit::MAX_PAGE);
    assert_eq!(setup.client.get_audit_events(&120, &10).len(), 4);
    assert_eq!(setup.client.get_audit_events(&1_000, &10).len(), 0);
}

#[test]
fn test_long_chain_verifies_page_by_page() {
    let setup = Setup::new();
    for i in 0..130u32 {
        let subject = Address::generate(&setup.env);
        setup
            .client
            .set_role(&setup.admin, &subject, &Role::Approver, &(i % 3 != 0));
    }
    let len = setup.client.audit_len();
    assert!(len > 100);

    assert_eq!(
        setup.client.try_verify_audit_chain(&1, &len),
        Err(Ok(ContractError::InvalidRange))
    );
    let page = audit::MAX_PAGE as u64;
    assert!(setup.client.verify_audit_chain(&1, &page));
    assert_eq!(
        setup.client.try_verify_audit_chain(&1, &(page + 1)),
        Err(Ok(ContractError::InvalidRange))
    );

    let mut from = 1;
    let mut pages = 0;
    while from <= len {
        let to = len.min(from + page - 1);
        assert!(setup.client.verify_audit_chain(&from, &to));
        from = to + 1;
        pages += 1;
    }
    assert_eq!(pages, 3);
}

#[test]
fn test_tampering_shows_up_in_its_page_only() {
    let setup = Setup::new();
    for _ in 0..100u32 {
        let subject = Address::generate(&setup.env);
        setup
            .client
            .set_role(&setup.admin, &subject, &Role::Clinician, &true);
    }
    let len = setup.client.audit_len();
    let page = audit::MAX_PAGE as u64;

    let forger = Address::generate(&setup.env);
    setup.env.as_contract(&setup.client.address, || {
        let mut event = audit::get(&setup.env, page + 5).unwrap();
        event.actor = forger.clone();
        store::put(&setup.env, &DataKey::Audit(page + 5), &event);
    });

    assert!(setup.client.verify_audit_chain(&1, &page));
    assert!(!setup.client.verify_audit_chain(&(page + 1), &len));
}

#[test]
fn test_decision_events_name_bundle_and_requester() {
    let setup = Setup::new();
    setup.create_bundle("b1");
    let approved = setup.request("b1", 600);
    let approval = setup.client.approve_break_glass(&setup.approver, &approved);
    setup.advance(600);
    let denied = setup.request("b1", 600);
    let denial = setup.client.deny_break_glass(&setup.approver, &denied);

    for (receipt, request_id, operation) in [
        (approval, approved, Operation::ApproveBreakGlass),
        (denial, denied, Operation::DenyBreakGlass),
    ] {
        let event = setup.client.get_audit_event(&receipt.tx_id).unwrap();
        assert_eq!(event.operation, operation);
        assert_eq!(event.subject_ids.len(), 3);
        assert_eq!(event.subject_ids.get(0).unwrap(), setup.s("b1"));
        assert_eq!(
            event.subject_ids.get(1).unwrap(),
            dispatcher::address_string(&setup.clinician)
        );
        assert_eq!(
            event.subject_ids.get(2).unwrap(),
            dispatcher::id_string(&setup.env, request_id)
        );
    }
}

#[test]
fn test_decision_on_unknown_request_keeps_id_subject() {
    let setup = Setup::new();
    let receipt = setup.client.deny_break_glass(&setup.approver, &77);
    assert_eq!(receipt.status, ResultStatus::Rejected);

    let event = setup.client.get_audit_event(&receipt.tx_id).unwrap();
    assert_eq!(event.subject_ids.len(), 1);
    assert_eq!(event.subject_ids.get(0).unwrap(), setup.s("77"));
}
