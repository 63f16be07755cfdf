//! Merging a full replacement list into a stored collection.
//!
//! Hourly and daily forecasts are always submitted as the complete list for a
//! location. Stored records whose identity is missing from the request are
//! deleted; every requested record is upserted.

use std::collections::HashSet;
use std::hash::Hash;

/// A record with a composite identity inside one location's collection.
pub trait Keyed {
    type Key: Copy + Eq + Hash + std::fmt::Debug;

    fn key(&self) -> Self::Key;
}

/// The changes needed to make the store match a request.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation<T: Keyed> {
    /// Identities present in the store but absent from the request, in store order.
    pub to_delete: Vec<T::Key>,
    /// Every requested record, in request order.
    pub to_upsert: Vec<T>,
}

/// Compute deletions and upserts. Only identities are compared.
pub fn reconcile<T: Keyed>(stored: &[T], requested: Vec<T>) -> Reconciliation<T> {
    let wanted: HashSet<T::Key> = requested.iter().map(Keyed::key).collect();

    let to_delete = stored
        .iter()
        .map(Keyed::key)
        .filter(|key| !wanted.contains(key))
        .collect();

    Reconciliation {
        to_delete,
        to_upsert: requested,
    }
}
