//! First-seen deduplication of city records.

use std::collections::HashSet;

use crate::types::CityRecord;

/// Ordered, duplicate-free set of cities.
///
/// Records are only ever appended, through [`dedup`]; the key index always
/// holds exactly the identity keys of `records`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CityCollection {
    records: Vec<CityRecord>,
    keys: HashSet<String>,
}

impl CityCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[CityRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CityRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a CityCollection {
    type Item = &'a CityRecord;
    type IntoIter = std::slice::Iter<'a, CityRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Result of merging a batch into a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct DedupOutcome {
    pub merged: CityCollection,
    /// Records from the batch that made it into `merged`.
    pub added: usize,
}

/// Merge `incoming` after `existing`, keeping only the first record seen for
/// each identity key.
///
/// Invalid records (blank name or country) are dropped without counting;
/// duplicates inside `incoming` itself are dropped as well.
pub fn dedup<I>(existing: CityCollection, incoming: I) -> DedupOutcome
where
    I: IntoIterator<Item = CityRecord>,
{
    let mut merged = existing;
    let mut added = 0;

    for record in incoming {
        if let Err(e) = record.validate() {
            tracing::trace!("Dropping record: {}", e);
            continue;
        }

        let key = record.identity_key();
        if merged.keys.contains(&key) {
            tracing::trace!("Dropping duplicate city {}", key);
            continue;
        }

        merged.keys.insert(key);
        merged.records.push(record);
        added += 1;
    }

    DedupOutcome { merged, added }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(id: &str, name: &str, country: &str) -> CityRecord {
        CityRecord {
            id: id.to_string(),
            name: name.to_string(),
            country: country.to_string(),
            timezone: "Etc/UTC".to_string(),
            population: 1000,
            lat: 0.0,
            lon: 0.0,
        }
    }

    fn names(collection: &CityCollection) -> Vec<&str> {
        collection.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_merge_into_empty() {
        let outcome = dedup(
            CityCollection::new(),
            vec![city("1", "Paris", "France"), city("2", "Berlin", "Germany")],
        );
        assert_eq!(outcome.added, 2);
        assert_eq!(names(&outcome.merged), vec!["Paris", "Berlin"]);
    }

    #[test]
    fn test_existing_key_wins_case_insensitively() {
        let first = dedup(CityCollection::new(), vec![city("1", "Paris", "France")]).merged;
        let outcome = dedup(first, vec![city("99", "PARIS", "france")]);

        assert_eq!(outcome.added, 0);
        assert_eq!(outcome.merged.len(), 1);
        assert_eq!(outcome.merged.records()[0].id, "1");
    }

    #[test]
    fn test_duplicates_within_batch_keep_first() {
        let outcome = dedup(
            CityCollection::new(),
            vec![
                city("1", "Springfield", "United States"),
                city("2", "Springfield", "United States"),
                city("3", "Springfield", "Australia"),
            ],
        );
        assert_eq!(outcome.added, 2);
        let ids: Vec<&str> = outcome.merged.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_invalid_records_dropped_and_not_counted() {
        let outcome = dedup(
            CityCollection::new(),
            vec![
                city("1", "", "France"),
                city("2", "Lyon", ""),
                city("3", "Lyon", "France"),
            ],
        );
        assert_eq!(outcome.added, 1);
        assert_eq!(names(&outcome.merged), vec!["Lyon"]);
    }

    #[test]
    fn test_existing_order_preserved_before_new() {
        let base = dedup(
            CityCollection::new(),
            vec![city("1", "Oslo", "Norway"), city("2", "Rome", "Italy")],
        )
        .merged;
        let outcome = dedup(
            base,
            vec![city("3", "Cairo", "Egypt"), city("4", "Oslo", "Norway"), city("5", "Lima", "Peru")],
        );
        assert_eq!(names(&outcome.merged), vec!["Oslo", "Rome", "Cairo", "Lima"]);
        assert_eq!(outcome.added, 2);
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let once = dedup(
            CityCollection::new(),
            vec![city("1", "Quito", "Ecuador"), city("2", "quito", "Ecuador")],
        )
        .merged;
        let twice = dedup(once.clone(), Vec::new());

        assert_eq!(twice.added, 0);
        assert_eq!(twice.merged, once);
    }

    #[test]
    fn test_merge_never_shrinks_or_duplicates_keys() {
        let pages = vec![
            vec![city("1", "A", "X"), city("2", "B", "X")],
            vec![city("3", "b", "x"), city("4", "C", "X"), city("5", "", "X")],
            vec![city("6", "A", "Y"), city("7", "A", "X")],
        ];

        let mut collection = CityCollection::new();
        for page in pages {
            let before = collection.len();
            collection = dedup(collection, page).merged;
            assert!(collection.len() >= before);

            let keys: HashSet<String> = collection.iter().map(CityRecord::identity_key).collect();
            assert_eq!(keys.len(), collection.len());
        }
        assert_eq!(collection.len(), 4);
    }
}
