//! Shape checks run by the dispatcher before any state is read.

use common::text::{is_hex, is_identifier, is_printable, is_visible, matches};
use soroban_sdk::String;

use crate::errors::ContractError;
use crate::types::Config;

const MAX_ID_LEN: u32 = 64;
const MAX_TYPE_LEN: u32 = 64;
const MAX_URI_LEN: u32 = 256;
const CONTENT_HASH_LEN: u32 = 64;
const MAX_PURPOSE_LEN: u32 = 128;
const MAX_JUSTIFICATION_LEN: u32 = 256;

/// Bundle ids and archetype ids.
pub fn validate_identifier(id: &String) -> Result<(), ContractError> {
    if !matches(id, 1, MAX_ID_LEN, is_identifier) {
        return Err(ContractError::InvalidIdentifier);
    }
    Ok(())
}

pub fn validate_bundle_type(bundle_type: &String) -> Result<(), ContractError> {
    if !matches(bundle_type, 1, MAX_TYPE_LEN, is_printable) {
        return Err(ContractError::InvalidBundleType);
    }
    Ok(())
}

pub fn validate_storage_uri(uri: &String) -> Result<(), ContractError> {
    if !matches(uri, 1, MAX_URI_LEN, is_visible) {
        return Err(ContractError::InvalidStorageUri);
    }
    Ok(())
}

/// Hex-encoded SHA-256 digest.
pub fn validate_content_hash(hash: &String) -> Result<(), ContractError> {
    if !matches(hash, CONTENT_HASH_LEN, CONTENT_HASH_LEN, is_hex) {
        return Err(ContractError::InvalidContentHash);
    }
    Ok(())
}

pub fn validate_size(size_bytes: u64) -> Result<(), ContractError> {
    if size_bytes == 0 {
        return Err(ContractError::InvalidSize);
    }
    Ok(())
}

pub fn validate_purpose(purpose: &String) -> Result<(), ContractError> {
    if !matches(purpose, 1, MAX_PURPOSE_LEN, is_printable) {
        return Err(ContractError::InvalidPurpose);
    }
    Ok(())
}

pub fn validate_justification(justification: &String) -> Result<(), ContractError> {
    if !matches(justification, 1, MAX_JUSTIFICATION_LEN, is_printable) {
        return Err(ContractError::InvalidJustification);
    }
    Ok(())
}

/// A consent expiry must lie strictly after `now` and no further out than the
/// configured maximum duration.
pub fn validate_expiry(now: u64, expires_at: u64, config: &Config) -> Result<(), ContractError> {
    if expires_at <= now || expires_at - now > config.max_consent_duration {
        return Err(ContractError::InvalidExpiry);
    }
    Ok(())
}

pub fn validate_ttl(ttl_seconds: u64, config: &Config) -> Result<(), ContractError> {
    if !config.ttl_in_bounds(ttl_seconds) {
        return Err(ContractError::InvalidTtl);
    }
    Ok(())
}

/// Delegations only need to end in the future.
pub fn validate_delegation_expiry(now: u64, expires_at: u64) -> Result<(), ContractError> {
    if expires_at <= now {
        return Err(ContractError::InvalidExpiry);
    }
    Ok(())
}
