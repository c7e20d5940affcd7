use soroban_sdk::Env;

use crate::errors::ContractError;
use crate::types::{Config, DataKey};

/// Five years, in seconds.
pub const DEFAULT_MAX_CONSENT_DURATION: u64 = 157_680_000;
pub const DEFAULT_MIN_BREAK_GLASS_TTL: u64 = 60;
/// One day, in seconds.
pub const DEFAULT_MAX_BREAK_GLASS_TTL: u64 = 86_400;
/// One hour, in seconds.
pub const DEFAULT_PENDING_REQUEST_TIMEOUT: u64 = 3_600;

impl Default for Config {
    fn default() -> Self {
        Config {
            max_consent_duration: DEFAULT_MAX_CONSENT_DURATION,
            min_break_glass_ttl: DEFAULT_MIN_BREAK_GLASS_TTL,
            max_break_glass_ttl: DEFAULT_MAX_BREAK_GLASS_TTL,
            pending_request_timeout: DEFAULT_PENDING_REQUEST_TIMEOUT,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.max_consent_duration == 0
            || self.min_break_glass_ttl == 0
            || self.pending_request_timeout == 0
            || self.min_break_glass_ttl > self.max_break_glass_ttl
        {
            return Err(ContractError::InvalidConfig);
        }
        Ok(())
    }

    pub fn ttl_in_bounds(&self, ttl_seconds: u64) -> bool {
        (self.min_break_glass_ttl..=self.max_break_glass_ttl).contains(&ttl_seconds)
    }
}

pub fn load(env: &Env) -> Result<Config, ContractError> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(ContractError::NotInitialized)
}

pub fn store(env: &Env, config: &Config) {
    env.storage().instance().set(&DataKey::Config, config);
}
