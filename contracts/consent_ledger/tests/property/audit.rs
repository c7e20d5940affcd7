//! Property-based tests for the audit stream.
//!
//! Invariants tested:
//! - Every call that returns a receipt appends exactly one event; calls that
//!   fail validation or authorization append none
//! - Event ids are dense and match commit order
//! - The hash chain verifies after any sequence of transactions

use consent_ledger::{ConsentScope, ResultStatus, Role};
use proptest::prelude::*;
use soroban_sdk::testutils::Address as _;
use soroban_sdk::Address;

use crate::support::{Fixture, T0};

#[derive(Clone, Debug)]
enum Step {
    Create(u8),
    Grant(u8, u8, u64),
    Revoke(u8, u8),
    Request(u8, u64),
    Approve(u64),
    Deny(u64),
    GrantByStranger(u8),
    Advance(u64),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0u8..3).prop_map(Step::Create),
        (0u8..3, 0u8..2, 1u64..5_000).prop_map(|(b, g, d)| Step::Grant(b, g, d)),
        (0u8..3, 0u8..2).prop_map(|(b, g)| Step::Revoke(b, g)),
        (0u8..3, 0u64..5_000).prop_map(|(b, t)| Step::Request(b, t)),
        (1u64..6).prop_map(Step::Approve),
        (1u64..6).prop_map(Step::Deny),
        (0u8..3).prop_map(Step::GrantByStranger),
        (0u64..4_000).prop_map(Step::Advance),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_audit_completeness(steps in prop::collection::vec(step(), 1..25)) {
        let fx = Fixture::new();
        let grantees = [Address::generate(&fx.env), Address::generate(&fx.env)];
        let stranger = Address::generate(&fx.env);
        let bundle = |i: u8| fx.s(["b0", "b1", "b2"][i as usize]);

        let mut expected = fx.client.audit_len();
        let mut now = T0;

        for step in steps {
            let receipt = match step {
                Step::Create(b) => fx.client.try_create_bundle(
                    &fx.patient,
                    &bundle(b),
                    &fx.patient,
                    &fx.s("note"),
                    &fx.s("s3://b"),
                    &fx.s("9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"),
                    &1,
                    &fx.s("arch"),
                ),
                Step::Grant(b, g, d) => fx.client.try_grant_consent(
                    &fx.patient,
                    &bundle(b),
                    &grantees[g as usize],
                    &ConsentScope::Read,
                    &fx.s("care"),
                    &(now + d),
                ),
                Step::Revoke(b, g) => fx.client.try_revoke_consent(
                    &fx.patient,
                    &bundle(b),
                    &grantees[g as usize],
                ),
                Step::Request(b, ttl) => fx.client.try_request_break_glass(
                    &fx.clinician,
                    &bundle(b),
                    &fx.s("emergency"),
                    &ttl,
                ),
                Step::Approve(id) => fx.client.try_approve_break_glass(&fx.approver, &id),
                Step::Deny(id) => fx.client.try_deny_break_glass(&fx.approver, &id),
                Step::GrantByStranger(b) => fx.client.try_grant_consent(
                    &stranger,
                    &bundle(b),
                    &stranger,
                    &ConsentScope::ReadWrite,
                    &fx.s("curiosity"),
                    &(now + 10),
                ),
                Step::Advance(secs) => {
                    now += secs;
                    fx.set_time(now);
                    continue;
                }
            };

            if let Ok(Ok(receipt)) = receipt {
                expected += 1;
                prop_assert_eq!(receipt.tx_id, expected);
                let event = fx.client.get_audit_event(&receipt.tx_id).unwrap();
                prop_assert_eq!(event.result_status, receipt.status);
                if receipt.status == ResultStatus::Rejected {
                    prop_assert!(receipt.rejection.is_some());
                }
            }
            prop_assert_eq!(fx.client.audit_len(), expected);
        }

        let len = fx.client.audit_len();
        prop_assert!(fx.client.verify_audit_chain(&1, &len));
    }

    #[test]
    fn prop_admin_changes_are_audited(flips in prop::collection::vec(any::<bool>(), 1..10)) {
        let fx = Fixture::new();
        let subject = Address::generate(&fx.env);
        let before = fx.client.audit_len();

        for enabled in flips.iter() {
            fx.client.set_role(&fx.admin, &subject, &Role::Approver, enabled);
        }

        prop_assert_eq!(fx.client.audit_len(), before + flips.len() as u64);
        prop_assert_eq!(
            fx.client.has_role(&subject, &Role::Approver),
            *flips.last().unwrap()
        );
    }
}
