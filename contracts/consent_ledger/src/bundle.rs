//! Bundle registry. Bundles are written once and never change afterwards.

use soroban_sdk::{Env, String};

use crate::errors::ContractError;
use crate::store;
use crate::types::{Bundle, DataKey};

/// Registers a new bundle. A second create on the same id is a conflict.
pub fn create(env: &Env, bundle: Bundle) -> Result<Bundle, ContractError> {
    let key = DataKey::Bundle(bundle.id.clone());
    if store::has(env, &key) {
        return Err(ContractError::BundleExists);
    }

    let stored = store::put_versioned(env, &key, 0, bundle)?;

    let mut owned = store::owner_bundles(env, &stored.owner);
    owned.push_back(stored.id.clone());
    store::put(env, &DataKey::OwnerBundles(stored.owner.clone()), &owned);

    Ok(stored)
}

pub fn get(env: &Env, bundle_id: &String) -> Result<Bundle, ContractError> {
    store::bundle(env, bundle_id).ok_or(ContractError::BundleNotFound)
}
