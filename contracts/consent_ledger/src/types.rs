use common::Versioned;
use soroban_sdk::{contracttype, Address, BytesN, String, Vec};

use crate::errors::{ContractError, ErrorKind};

/// Storage keys for the contract
///
/// Instance storage: `Admin`, `Config`, `Initialized`, `RequestCounter`,
/// `AuditLen`, `AuditHead`. Everything else is persistent.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    Admin,
    Config,
    Initialized,
    RequestCounter,
    AuditLen,
    AuditHead,
    Bundle(String),
    OwnerBundles(Address),
    Consent(String, Address),
    BreakGlass(u64),
    BreakGlassPair(String, Address),
    Role(Address, Role),
    Delegation(Address, Address),
    Audit(u64),
}

// ── Bundles ──────────────────────────────────────────────────────────────────

/// Metadata for one encrypted health-record package stored off-ledger.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Bundle {
    pub id: String,
    pub owner: Address,
    pub bundle_type: String,
    pub storage_uri: String,
    pub content_hash: String,
    pub size_bytes: u64,
    pub archetype_id: String,
    pub created_at: u64,
    pub version: u64,
}

// ── Consent ──────────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConsentScope {
    Read,
    ReadWrite,
}

/// `Expired` is never stored; it is derived from `expires_at` at read time.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConsentStatus {
    Granted,
    Revoked,
    Expired,
}

/// Current state of one (bundle, grantee) relationship.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConsentRecord {
    pub bundle_id: String,
    pub grantee: Address,
    pub scope: ConsentScope,
    pub purpose: String,
    pub granted_at: u64,
    pub expires_at: u64,
    pub status: ConsentStatus,
    pub version: u64,
}

impl ConsentRecord {
    /// Status as observed at `at`, applying lazy expiry.
    pub fn status_at(&self, at: u64) -> ConsentStatus {
        match self.status {
            ConsentStatus::Granted if at >= self.expires_at => ConsentStatus::Expired,
            status => status,
        }
    }

    /// A grant covers every instant before `expires_at` unless it was
    /// revoked.
    pub fn allows_at(&self, at: u64) -> bool {
        self.status == ConsentStatus::Granted && at < self.expires_at
    }
}

// ── Break-glass ──────────────────────────────────────────────────────────────

/// `Expired` is never stored; it is derived from the request's windows.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BreakGlassStatus {
    Requested,
    Approved,
    Denied,
    Expired,
}

/// One emergency-access workflow instance.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BreakGlassRequest {
    pub request_id: u64,
    pub bundle_id: String,
    pub requester: Address,
    pub justification: String,
    pub requested_at: u64,
    /// An undecided request lapses at this instant.
    pub pending_until: u64,
    pub approver: Option<Address>,
    pub decided_at: Option<u64>,
    pub ttl_seconds: u64,
    pub status: BreakGlassStatus,
    pub version: u64,
}

impl BreakGlassRequest {
    /// Effective access window `[decided_at, decided_at + ttl_seconds)` of an
    /// approved request.
    pub fn access_window(&self) -> Option<(u64, u64)> {
        match (self.status, self.decided_at) {
            (BreakGlassStatus::Approved, Some(start)) => {
                Some((start, start.saturating_add(self.ttl_seconds)))
            }
            _ => None,
        }
    }

    /// Status as observed at `at`, applying lazy expiry to both the pending
    /// window and the approved access window.
    pub fn status_at(&self, at: u64) -> BreakGlassStatus {
        match self.status {
            BreakGlassStatus::Requested if at >= self.pending_until => BreakGlassStatus::Expired,
            BreakGlassStatus::Approved => match self.access_window() {
                Some((_, end)) if at >= end => BreakGlassStatus::Expired,
                _ => BreakGlassStatus::Approved,
            },
            status => status,
        }
    }

    /// Pending, or approved and not yet expired.
    pub fn is_active_at(&self, at: u64) -> bool {
        matches!(
            self.status_at(at),
            BreakGlassStatus::Requested | BreakGlassStatus::Approved
        )
    }

    pub fn allows_at(&self, at: u64) -> bool {
        match self.access_window() {
            Some((start, end)) => start <= at && at < end,
            None => false,
        }
    }
}

// ── Identity attributes ──────────────────────────────────────────────────────

/// Role attributes asserted by the identity provider.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Role {
    /// May raise break-glass requests.
    Clinician,
    /// May approve or deny break-glass requests (e.g. head of department).
    Approver,
}

/// Permission for `delegate` to act as `owner` until `expires_at`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Delegation {
    pub owner: Address,
    pub delegate: Address,
    pub granted_at: u64,
    pub expires_at: u64,
}

impl Delegation {
    pub fn is_live_at(&self, at: u64) -> bool {
        at < self.expires_at
    }
}

// ── Configuration ────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub max_consent_duration: u64,
    pub min_break_glass_ttl: u64,
    pub max_break_glass_ttl: u64,
    pub pending_request_timeout: u64,
}

// ── Transactions and audit ───────────────────────────────────────────────────

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Operation {
    Initialize = 1,
    UpdateConfig = 2,
    SetRole = 3,
    RegisterDelegate = 4,
    RevokeDelegate = 5,
    CreateBundle = 10,
    GrantConsent = 20,
    RevokeConsent = 21,
    RequestBreakGlass = 30,
    ApproveBreakGlass = 31,
    DenyBreakGlass = 32,
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ResultStatus {
    Accepted = 1,
    Rejected = 2,
}

/// Why an authorized transaction was turned down by a manager.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Rejection {
    pub kind: ErrorKind,
    pub code: u32,
    pub reason: String,
}

/// Immutable audit record; one per committed transaction, in commit order.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuditEvent {
    pub tx_id: u64,
    pub timestamp: u64,
    pub ledger_seq: u32,
    pub actor: Address,
    pub operation: Operation,
    pub subject_ids: Vec<String>,
    pub result_status: ResultStatus,
    pub rejection: Option<Rejection>,
    pub prev_hash: BytesN<32>,
    pub event_hash: BytesN<32>,
}

/// Returned by every mutating entry point that got past validation and
/// authorization.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TxReceipt {
    pub tx_id: u64,
    pub status: ResultStatus,
    pub rejection: Option<Rejection>,
    /// Set by `request_break_glass` on success.
    pub request_id: Option<u64>,
}

impl TxReceipt {
    pub fn is_accepted(&self) -> bool {
        self.status == ResultStatus::Accepted
    }

    pub fn error(&self) -> Option<ContractError> {
        self.rejection
            .as_ref()
            .and_then(|r| ContractError::from_code(r.code))
    }

    /// Strict view of the receipt: the request id on success, the rejecting
    /// error otherwise.
    pub fn into_result(self) -> Result<Option<u64>, ContractError> {
        match self.error() {
            Some(err) => Err(err),
            None => Ok(self.request_id),
        }
    }
}

// ── Access decisions ─────────────────────────────────────────────────────────

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AllowReason {
    BreakGlass,
    Consent,
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DenyReason {
    NoSuchBundle,
    NoActiveGrant,
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AccessDecision {
    Allow(AllowReason),
    Deny(DenyReason),
}

// ── Versioning ───────────────────────────────────────────────────────────────

impl Versioned for Bundle {
    fn version(&self) -> u64 {
        self.version
    }

    fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }
}

impl Versioned for ConsentRecord {
    fn version(&self) -> u64 {
        self.version
    }

    fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }
}

impl Versioned for BreakGlassRequest {
    fn version(&self) -> u64 {
        self.version
    }

    fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }
}
