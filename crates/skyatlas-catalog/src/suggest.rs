//! Autocomplete suggestions over the loaded cities.

use crate::types::CityRecord;

/// Upper bound on suggestions shown under the search box.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

/// Cities whose name starts with `prefix`, ignoring case, in collection order.
///
/// A blank prefix suppresses suggestions entirely. `limit` is capped at
/// [`DEFAULT_SUGGESTION_LIMIT`].
pub fn suggest<'a, I>(records: I, prefix: &str, limit: usize) -> Vec<CityRecord>
where
    I: IntoIterator<Item = &'a CityRecord>,
{
    if prefix.trim().is_empty() {
        return Vec::new();
    }

    let needle = prefix.to_lowercase();
    records
        .into_iter()
        .filter(|city| city.name.to_lowercase().starts_with(&needle))
        .take(limit.min(DEFAULT_SUGGESTION_LIMIT))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cities(names: &[&str]) -> Vec<CityRecord> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| CityRecord {
                id: i.to_string(),
                name: name.to_string(),
                country: "Testland".to_string(),
                timezone: String::new(),
                population: 0,
                lat: 0.0,
                lon: 0.0,
            })
            .collect()
    }

    #[test]
    fn test_prefix_match_ignores_case() {
        let all = cities(&["Sandnes", "santiago", "Osaka", "SANTOS"]);
        let names: Vec<String> = suggest(&all, "san", 5).into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Sandnes", "santiago", "SANTOS"]);
    }

    #[test]
    fn test_prefix_is_not_substring() {
        let all = cities(&["Busan", "Sana'a"]);
        let names: Vec<String> = suggest(&all, "san", 5).into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Sana'a"]);
    }

    #[test]
    fn test_empty_prefix_suppresses() {
        let all = cities(&["Accra", "Athens"]);
        assert!(suggest(&all, "", 5).is_empty());
        assert!(suggest(&all, "   ", 5).is_empty());
    }

    #[test]
    fn test_never_more_than_five() {
        let all = cities(&["Ba", "Bb", "Bc", "Bd", "Be", "Bf", "Bg"]);
        assert_eq!(suggest(&all, "b", 5).len(), 5);
        assert_eq!(suggest(&all, "b", 50).len(), 5);
        assert_eq!(suggest(&all, "b", 2).len(), 2);

        let names: Vec<String> = suggest(&all, "B", 5).into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Ba", "Bb", "Bc", "Bd", "Be"]);
    }
}
