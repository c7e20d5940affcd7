use common::CommonError;
use soroban_sdk::{contracterror, contracttype};

/// Broad classes of failure. The class decides whether a failed transaction
/// aborts silently or is committed as an audited rejection.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ErrorKind {
    /// Contract not ready, or initialised twice.
    Lifecycle = 1,
    /// Malformed or missing arguments; rejected before any state read.
    Validation = 2,
    /// Caller lacks the required ownership or role attribute.
    Authorization = 3,
    /// Referenced bundle, consent, request or delegation is absent.
    NotFound = 4,
    /// Duplicate id, an already-active request, or a stale write.
    Conflict = 5,
    /// Operation is not legal for the current lifecycle state.
    InvalidState = 6,
}

/// Contract errors
///
/// # Code ranges
/// | Range     | Kind           |
/// |-----------|----------------|
/// | 1 – 9     | Lifecycle      |
/// | 100 – 199 | Validation     |
/// | 200 – 299 | Authorization  |
/// | 300 – 399 | NotFound       |
/// | 400 – 499 | Conflict       |
/// | 500 – 599 | InvalidState   |
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,

    InvalidIdentifier = 100,
    InvalidBundleType = 101,
    InvalidStorageUri = 102,
    InvalidContentHash = 103,
    InvalidSize = 104,
    InvalidPurpose = 105,
    InvalidExpiry = 106,
    InvalidTtl = 107,
    InvalidJustification = 108,
    InvalidConfig = 109,
    InvalidRange = 110,

    NotOwner = 200,
    NotAdmin = 201,
    MissingClinicalRole = 202,
    MissingApproverRole = 203,
    SelfApproval = 204,

    BundleNotFound = 300,
    ConsentNotFound = 301,
    RequestNotFound = 302,
    DelegationNotFound = 303,

    BundleExists = 400,
    ActiveRequestExists = 401,
    StaleVersion = 402,

    RequestNotPending = 500,
    RequestLapsed = 501,
}

impl ContractError {
    pub fn kind(&self) -> ErrorKind {
        match *self as u32 {
            0..=99 => ErrorKind::Lifecycle,
            100..=199 => ErrorKind::Validation,
            200..=299 => ErrorKind::Authorization,
            300..=399 => ErrorKind::NotFound,
            400..=499 => ErrorKind::Conflict,
            _ => ErrorKind::InvalidState,
        }
    }

    /// `true` for failures that reached a manager and must be committed as an
    /// audited rejection instead of aborting the transaction.
    ///
    /// A stale write is a conflict too, but it means the proposal was built
    /// from an outdated read: it aborts so the caller can resubmit.
    pub fn is_domain_rejection(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NotFound | ErrorKind::Conflict | ErrorKind::InvalidState
        ) && *self != ContractError::StaleVersion
    }

    /// Human-readable reason carried by receipts and audit events.
    pub fn reason(&self) -> &'static str {
        match self {
            ContractError::NotInitialized => "contract is not initialized",
            ContractError::AlreadyInitialized => "contract is already initialized",
            ContractError::InvalidIdentifier => "identifier must be 1-64 chars of [A-Za-z0-9._:-]",
            ContractError::InvalidBundleType => "bundle type must be 1-64 printable chars",
            ContractError::InvalidStorageUri => "storage uri must be 1-256 visible chars",
            ContractError::InvalidContentHash => "content hash must be 64 hex chars",
            ContractError::InvalidSize => "bundle size must be greater than zero",
            ContractError::InvalidPurpose => "purpose must be 1-128 printable chars",
            ContractError::InvalidExpiry => "expiry must be in the future and within the maximum consent duration",
            ContractError::InvalidTtl => "ttl is outside the configured break-glass bounds",
            ContractError::InvalidJustification => "justification must be 1-256 printable chars",
            ContractError::InvalidConfig => "configuration bounds are inconsistent",
            ContractError::InvalidRange => "audit range spans more events than one page",
            ContractError::NotOwner => "caller is neither the owner nor a live delegate",
            ContractError::NotAdmin => "caller is not the contract admin",
            ContractError::MissingClinicalRole => "caller does not hold the clinician role",
            ContractError::MissingApproverRole => "caller does not hold the approver role",
            ContractError::SelfApproval => "requester cannot decide their own request",
            ContractError::BundleNotFound => "bundle does not exist",
            ContractError::ConsentNotFound => "no consent record for this bundle and grantee",
            ContractError::RequestNotFound => "break-glass request does not exist",
            ContractError::DelegationNotFound => "no delegation for this owner and delegate",
            ContractError::BundleExists => "a bundle with this id already exists",
            ContractError::ActiveRequestExists => "an active break-glass request already exists for this bundle and requester",
            ContractError::StaleVersion => "record changed since it was read; resubmit",
            ContractError::RequestNotPending => "break-glass request has already been decided",
            ContractError::RequestLapsed => "break-glass request lapsed before a decision",
        }
    }

    /// Inverse of `as u32` for the codes a receipt can carry.
    pub fn from_code(code: u32) -> Option<ContractError> {
        let err = match code {
            300 => ContractError::BundleNotFound,
            301 => ContractError::ConsentNotFound,
            302 => ContractError::RequestNotFound,
            303 => ContractError::DelegationNotFound,
            400 => ContractError::BundleExists,
            401 => ContractError::ActiveRequestExists,
            500 => ContractError::RequestNotPending,
            501 => ContractError::RequestLapsed,
            _ => return None,
        };
        Some(err)
    }
}

impl From<CommonError> for ContractError {
    fn from(err: CommonError) -> Self {
        match err {
            CommonError::StaleVersion | CommonError::VersionOverflow => ContractError::StaleVersion,
        }
    }
}
