//! Local free-text search over the roster.

use super::types::Mp;

/// Case-insensitive substring search across full name, constituency,
/// province, last name, and first name. A record matches when any one field
/// contains the query. Results keep roster order.
#[must_use]
pub fn search<'a>(roster: &'a [Mp], query: &str) -> Vec<&'a Mp> {
    let needle = query.to_lowercase();
    roster
        .iter()
        .filter(|mp| {
            [
                &mp.full_name,
                &mp.constituency,
                &mp.province,
                &mp.last_name,
                &mp.first_name,
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}
