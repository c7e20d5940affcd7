//! Property-based tests for break-glass access.
//!
//! Invariants tested:
//! - Window exactness: an approval at `t0` with ttl `s` allows `[t0, t0 + s)`
//! - Single active request per (bundle, requester) until denied or expired

use consent_ledger::{AccessDecision, AllowReason, ContractError, DenyReason};
use proptest::prelude::*;

use crate::support::{Fixture, T0};

proptest! {
    #[test]
    fn prop_window_exactness(
        ttl in 60u64..=86_400u64,
        delay in 0u64..3_600u64,
    ) {
        let fx = Fixture::new();
        fx.create_bundle("b1");
        let receipt = fx.client.request_break_glass(
            &fx.clinician,
            &fx.s("b1"),
            &fx.s("trauma bay"),
            &ttl,
        );
        let request_id = receipt.request_id.unwrap();

        let t0 = T0 + delay;
        fx.set_time(t0);
        fx.client.approve_break_glass(&fx.approver, &request_id);

        let eval = |at: u64| fx.client.evaluate_access(&fx.s("b1"), &fx.clinician, &at);
        prop_assert_eq!(eval(t0), AccessDecision::Allow(AllowReason::BreakGlass));
        prop_assert_eq!(eval(t0 + ttl - 1), AccessDecision::Allow(AllowReason::BreakGlass));
        prop_assert_eq!(eval(t0 + ttl), AccessDecision::Deny(DenyReason::NoActiveGrant));
    }

    #[test]
    fn prop_single_active_request(
        ttl in 60u64..=7_200u64,
        deny in any::<bool>(),
    ) {
        let fx = Fixture::new();
        fx.create_bundle("b1");
        let request = || fx.client.request_break_glass(
            &fx.clinician,
            &fx.s("b1"),
            &fx.s("trauma bay"),
            &ttl,
        );

        let first = request().request_id.unwrap();
        let blocked = request();
        prop_assert_eq!(blocked.error(), Some(ContractError::ActiveRequestExists));

        if deny {
            fx.client.deny_break_glass(&fx.approver, &first);
        } else {
            fx.client.approve_break_glass(&fx.approver, &first);
            let still_blocked = request();
            prop_assert_eq!(still_blocked.error(), Some(ContractError::ActiveRequestExists));
            fx.set_time(T0 + ttl);
        }

        let next = request();
        prop_assert!(next.is_accepted());
        prop_assert_eq!(next.request_id, Some(first + 1));
    }
}
