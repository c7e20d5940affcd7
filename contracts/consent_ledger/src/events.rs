#![allow(deprecated)]

use soroban_sdk::{symbol_short, Address, Env, Symbol};

use crate::types::{AuditEvent, Config, Operation};

/// Event published when the contract is initialized.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub config: Config,
    pub timestamp: u64,
}

/// Event published when the admin replaces the configuration.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigUpdatedEvent {
    pub admin: Address,
    pub previous: Config,
    pub current: Config,
    pub timestamp: u64,
}

fn operation_symbol(op: Operation) -> Symbol {
    match op {
        Operation::Initialize => symbol_short!("INIT"),
        Operation::UpdateConfig => symbol_short!("CFG_UPD"),
        Operation::SetRole => symbol_short!("ROLE_SET"),
        Operation::RegisterDelegate => symbol_short!("DLG_REG"),
        Operation::RevokeDelegate => symbol_short!("DLG_REV"),
        Operation::CreateBundle => symbol_short!("BNDL_NEW"),
        Operation::GrantConsent => symbol_short!("CNS_GRNT"),
        Operation::RevokeConsent => symbol_short!("CNS_REV"),
        Operation::RequestBreakGlass => symbol_short!("BG_REQ"),
        Operation::ApproveBreakGlass => symbol_short!("BG_APPR"),
        Operation::DenyBreakGlass => symbol_short!("BG_DENY"),
    }
}

/// Publishes an event when the contract is initialized.
pub fn publish_initialized(env: &Env, admin: Address, config: Config) {
    let topics = (symbol_short!("INIT"),);
    let data = InitializedEvent {
        admin,
        config,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_config_updated(env: &Env, admin: Address, previous: Config, current: Config) {
    let topics = (symbol_short!("CFG_UPD"),);
    let data = ConfigUpdatedEvent {
        admin,
        previous,
        current,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

/// Streams one committed audit record to off-chain consumers.
pub fn publish_audit(env: &Env, event: &AuditEvent) {
    let topics = (symbol_short!("AUDIT"), operation_symbol(event.operation));
    env.events().publish(topics, event.clone());
}
