//! Country preference linking for schools.

use crate::models::{CountryId, SchoolId};
use crate::store::{AccountStore, StoreError};

/// Drop non-positive ids and repeats, keeping first occurrences in order.
#[must_use]
pub fn normalize_country_ids(country_ids: &[CountryId]) -> Vec<CountryId> {
    let mut seen = std::collections::HashSet::with_capacity(country_ids.len());
    country_ids
        .iter()
        .copied()
        .filter(|id| *id > 0 && seen.insert(*id))
        .collect()
}

/// Replace the school's preference set with `country_ids` (ranked by
/// position) and return the list as stored.
///
/// # Errors
///
/// Returns a store error if the replacement fails (e.g. unknown country).
pub async fn link_country_preferences(
    store: &dyn AccountStore,
    school_id: SchoolId,
    country_ids: &[CountryId],
) -> Result<Vec<CountryId>, StoreError> {
    let ranked = normalize_country_ids(country_ids);
    if ranked.len() != country_ids.len() {
        tracing::debug!(school_id, supplied = country_ids.len(), kept = ranked.len(), "dropped repeated country ids");
    }
    store.replace_country_preferences(school_id, &ranked).await?;
    Ok(ranked)
}

#[cfg(test)]
#[path = "preferences_test.rs"]
mod tests;
