// ── Owned-number filtering ──
//
// Free-text filter for the "My Numbers" view. Pure: never touches the
// input, and filtering an already-filtered list with the same query is a
// no-op.

use std::borrow::Borrow;

use crate::model::OwnedPhoneNumber;

/// Numbers whose dialable number, friendly number, friendly name, or city
/// contains `query` (case-insensitive). Input order is preserved; a blank
/// query returns everything.
pub fn filter_owned<T>(numbers: &[T], query: &str) -> Vec<T>
where
    T: Borrow<OwnedPhoneNumber> + Clone,
{
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return numbers.to_vec();
    }
    numbers
        .iter()
        .filter(|n| matches_query((*n).borrow(), &needle))
        .cloned()
        .collect()
}

/// `needle` must already be lower-cased.
fn matches_query(number: &OwnedPhoneNumber, needle: &str) -> bool {
    let contains = |haystack: &str| haystack.to_lowercase().contains(needle);
    contains(&number.number.phone_number)
        || contains(&number.number.friendly_number)
        || number.friendly_name.as_deref().is_some_and(contains)
        || contains(&number.number.city)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::backend::memory::fixture_listings;

    fn owned() -> Vec<OwnedPhoneNumber> {
        let mut out: Vec<_> = fixture_listings("USD")
            .into_iter()
            .map(|n| OwnedPhoneNumber::purchased(n, chrono::Utc::now()))
            .collect();
        out[1].friendly_name = Some("Support Hotline".into());
        out
    }

    fn ids<T: Borrow<OwnedPhoneNumber>>(numbers: &[T]) -> Vec<String> {
        numbers.iter().map(|n| n.borrow().id().to_owned()).collect()
    }

    #[test]
    fn empty_query_is_identity() {
        let numbers = owned();
        assert_eq!(filter_owned(&numbers, ""), numbers);
        assert_eq!(filter_owned(&numbers, "   "), numbers);
    }

    #[test]
    fn matches_number_name_and_city_case_insensitively() {
        let numbers = owned();
        assert_eq!(ids(&filter_owned(&numbers, "hotline")), vec!["2"]);
        assert_eq!(ids(&filter_owned(&numbers, "TORONTO")), vec!["7"]);
        assert_eq!(ids(&filter_owned(&numbers, "212-555")), vec!["4"]);
        assert_eq!(ids(&filter_owned(&numbers, "+4420")), vec!["6"]);
    }

    #[test]
    fn preserves_order_and_is_idempotent() {
        let numbers = owned();
        let once = filter_owned(&numbers, "san francisco");
        assert_eq!(ids(&once), vec!["1", "2", "3", "5", "9"]);
        assert_eq!(filter_owned(&once, "san francisco"), once);
    }

    #[test]
    fn works_over_shared_snapshots() {
        let shared: Vec<Arc<OwnedPhoneNumber>> = owned().into_iter().map(Arc::new).collect();
        let hits = filter_owned(&shared, "sydney");
        assert_eq!(hits.len(), 1);
        assert!(Arc::ptr_eq(&hits[0], &shared[9]));
    }

    #[test]
    fn input_is_untouched() {
        let numbers = owned();
        let before = numbers.clone();
        let _ = filter_owned(&numbers, "415");
        assert_eq!(numbers, before);
    }
}
