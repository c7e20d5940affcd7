//! Storage TTL policy shared by every contract in the workspace.

use soroban_sdk::{Env, IntoVal, Val};

/// Entries whose remaining TTL drops below this many ledgers are extended.
pub const TTL_THRESHOLD: u32 = 5_184_000;
/// Target TTL (in ledgers) after an extension.
pub const TTL_EXTEND_TO: u32 = 10_368_000;

/// Extends the time-to-live (TTL) for a persistent storage key.
pub fn extend_persistent<K>(env: &Env, key: &K)
where
    K: IntoVal<Env, Val>,
{
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Extends the time-to-live (TTL) for instance storage.
pub fn extend_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
}
