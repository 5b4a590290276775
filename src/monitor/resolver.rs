//! Location resolution
//!
//! Validates the operator's requested location ids against the locations the
//! API actually knows about, once, before the polling loop starts.

use std::collections::{BTreeMap, BTreeSet};

use crate::client::TtpClient;
use crate::error::Result;
use crate::models::Location;
use crate::utils::error::ResolveError;

/// Fetch the API's location list and resolve `requested` against it
///
/// # Errors
///
/// - `Error::Fetch` if the location list cannot be retrieved
/// - `Error::Resolve` if any requested id is unknown
pub async fn resolve_remote(client: &TtpClient, requested: &[u32]) -> Result<Vec<Location>> {
    let known = client.fetch_locations().await?;
    tracing::debug!(known = known.len(), "Location list retrieved");

    Ok(resolve(requested.iter().copied(), &known)?)
}

/// Resolve requested ids into known locations
///
/// The result is sorted by id and independent of the order of either input.
/// Duplicate requested ids collapse into one entry.
///
/// # Errors
///
/// - `ResolveError::NoLocationsRequested` if `requested` is empty
/// - `ResolveError::LocationsNotFound` with every unknown id, ascending
pub fn resolve<I>(
    requested: I,
    known: &[Location],
) -> std::result::Result<Vec<Location>, ResolveError>
where
    I: IntoIterator<Item = u32>,
{
    let requested: BTreeSet<u32> = requested.into_iter().collect();
    if requested.is_empty() {
        return Err(ResolveError::NoLocationsRequested);
    }

    let by_id: BTreeMap<u32, &Location> = known.iter().map(|l| (l.id, l)).collect();

    let missing: Vec<u32> = requested
        .iter()
        .copied()
        .filter(|id| !by_id.contains_key(id))
        .collect();

    if !missing.is_empty() {
        return Err(ResolveError::LocationsNotFound { missing });
    }

    let resolved: Vec<Location> = requested
        .iter()
        .filter_map(|id| by_id.get(id).map(|l| (*l).clone()))
        .collect();

    for location in resolved.iter().filter(|l| !l.operational) {
        tracing::warn!(
            location_id = location.id,
            location = %location.label(),
            "Monitored location is not marked operational"
        );
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(id: u32) -> Location {
        Location {
            id,
            short_name: format!("L{id}"),
            operational: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_all_known() {
        let known = vec![location(3), location(1), location(2)];
        let resolved = resolve([2, 1], &known).unwrap();

        let ids: Vec<u32> = resolved.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_resolve_reports_missing_ids() {
        let known = vec![location(1), location(3)];
        let err = resolve([1, 2], &known).unwrap_err();

        assert_eq!(err, ResolveError::LocationsNotFound { missing: vec![2] });
    }

    #[test]
    fn test_resolve_missing_ids_are_ascending_and_deduplicated() {
        let known = vec![location(1)];
        let err = resolve([40, 7, 1, 40, 12], &known).unwrap_err();

        assert_eq!(
            err,
            ResolveError::LocationsNotFound {
                missing: vec![7, 12, 40]
            }
        );
    }

    #[test]
    fn test_resolve_is_order_independent() {
        let known_a = vec![location(1), location(2), location(3)];
        let known_b = vec![location(3), location(1), location(2)];

        let a = resolve([3, 1], &known_a).unwrap();
        let b = resolve([1, 3, 3], &known_b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_resolve_empty_request() {
        let known = vec![location(1)];
        let err = resolve(Vec::<u32>::new(), &known).unwrap_err();
        assert_eq!(err, ResolveError::NoLocationsRequested);
    }

    #[test]
    fn test_resolve_accepts_non_operational() {
        let mut closed = location(9);
        closed.operational = false;

        let resolved = resolve([9], &[closed]).unwrap();
        assert_eq!(resolved.len(), 1);
    }
}
