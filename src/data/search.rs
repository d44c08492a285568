//! Name and catalog-number lookup over the tracked objects

use std::collections::HashMap;

use regex::{Regex, RegexBuilder};

use crate::scene::{ObjectId, TrackedObject};

/// Default cap on results per query
pub const MAX_RESULTS: usize = 100;

/// Compiled-size cap for user-typed patterns
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// Search index for fast lookups
#[derive(Debug, Default)]
pub struct SearchIndex {
    /// Name (lowercased) -> objects with exactly that name
    name_index: HashMap<String, Vec<ObjectId>>,
    /// Catalog number -> objects carrying it
    catalog_index: HashMap<u32, Vec<ObjectId>>,
    /// (lowercased name, id), sorted by name
    sorted_by_name: Vec<(String, ObjectId)>,
}

impl SearchIndex {
    pub fn build(objects: &[TrackedObject]) -> Self {
        let mut name_index: HashMap<String, Vec<ObjectId>> = HashMap::new();
        let mut catalog_index: HashMap<u32, Vec<ObjectId>> = HashMap::new();
        let mut sorted_by_name = Vec::with_capacity(objects.len());

        for object in objects {
            let name_lower = object.name.to_lowercase();
            name_index
                .entry(name_lower.clone())
                .or_default()
                .push(object.id);
            if let Some(number) = object.catalog_number() {
                catalog_index.entry(number).or_default().push(object.id);
            }
            sorted_by_name.push((name_lower, object.id));
        }

        sorted_by_name.sort();

        log::debug!("Built search index with {} name entries", name_index.len());

        Self {
            name_index,
            catalog_index,
            sorted_by_name,
        }
    }

    pub fn len(&self) -> usize {
        self.sorted_by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted_by_name.is_empty()
    }

    /// Case-insensitive search. Exact name matches come first, then
    /// catalog-number matches for numeric queries, then names matching the
    /// query as a regular expression, in name order. A query that is not a
    /// valid pattern is matched literally. An empty query matches nothing.
    pub fn search(&self, query: &str, limit: usize) -> Vec<ObjectId> {
        let query = query.trim();
        let query_lower = query.to_lowercase();
        if query_lower.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut results: Vec<ObjectId> = Vec::new();
        let push = |id: ObjectId, results: &mut Vec<ObjectId>| {
            if results.len() < limit && !results.contains(&id) {
                results.push(id);
            }
        };

        if let Some(exact) = self.name_index.get(&query_lower) {
            for id in exact {
                push(*id, &mut results);
            }
        }

        if let Ok(number) = query_lower.parse::<u32>() {
            if let Some(ids) = self.catalog_index.get(&number) {
                for id in ids {
                    push(*id, &mut results);
                }
            }
        }

        let Some(pattern) = name_pattern(query) else {
            return results;
        };
        for (name, id) in &self.sorted_by_name {
            if results.len() >= limit {
                break;
            }
            if pattern.is_match(name) {
                push(*id, &mut results);
            }
        }

        results
    }
}

fn name_pattern(query: &str) -> Option<Regex> {
    let build = |pattern: &str| {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .size_limit(PATTERN_SIZE_LIMIT)
            .build()
    };
    match build(query) {
        Ok(pattern) => Some(pattern),
        Err(e) => {
            log::debug!("'{}' is not a valid pattern ({}), matching literally", query, e);
            build(&regex::escape(query))
                .map_err(|e| log::warn!("Cannot search for '{}': {}", query, e))
                .ok()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TleEntry;
    use crate::propagation::propagator::tests::{CANX5_L1, CANX5_L2, ISS_L1, ISS_L2};
    use crate::propagation::SatkitPropagator;

    fn object(id: u64, name: &str, lines: (&str, &str)) -> TrackedObject {
        let mut object = TrackedObject::new(
            ObjectId(id),
            TleEntry {
                name: name.into(),
                line1: lines.0.into(),
                line2: lines.1.into(),
            },
        );
        object.ensure_record(&SatkitPropagator);
        object
    }

    fn index() -> SearchIndex {
        SearchIndex::build(&[
            object(1, "ISS (ZARYA)", (ISS_L1, ISS_L2)),
            object(2, "CANX-5", (CANX5_L1, CANX5_L2)),
            object(3, "ISS DEB", ("1 x", "2 x")),
            object(4, "ISS", ("1 x", "2 x")),
        ])
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        assert!(index().search("", MAX_RESULTS).is_empty());
        assert!(index().search("   ", MAX_RESULTS).is_empty());
    }

    #[test]
    fn test_exact_match_first_then_substrings() {
        let results = index().search("iss", MAX_RESULTS);
        assert_eq!(results[0], ObjectId(4));
        assert_eq!(results.len(), 3);
        assert!(results.contains(&ObjectId(1)));
        assert!(results.contains(&ObjectId(3)));
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(index().search("CanX", MAX_RESULTS), vec![ObjectId(2)]);
    }

    #[test]
    fn test_catalog_number() {
        assert_eq!(index().search("25544", MAX_RESULTS), vec![ObjectId(1)]);
        assert_eq!(index().search(" 40056 ", MAX_RESULTS), vec![ObjectId(2)]);
    }

    #[test]
    fn test_limit() {
        let objects: Vec<TrackedObject> = (0..250)
            .map(|i| object(i, &format!("STARLINK-{i}"), ("1 x", "2 x")))
            .collect();
        let index = SearchIndex::build(&objects);
        assert_eq!(index.len(), 250);
        assert_eq!(index.search("starlink", MAX_RESULTS).len(), MAX_RESULTS);
        assert_eq!(index.search("starlink", 5).len(), 5);
    }

    #[test]
    fn test_pattern_query() {
        assert_eq!(index().search("ISS.*ZARYA", MAX_RESULTS), vec![ObjectId(1)]);
        assert_eq!(index().search("^can", MAX_RESULTS), vec![ObjectId(2)]);

        let anchored = index().search("^iss", MAX_RESULTS);
        assert_eq!(anchored.len(), 3);
        assert!(!anchored.contains(&ObjectId(2)));
        assert_eq!(index().search("deb$", MAX_RESULTS), vec![ObjectId(3)]);
    }

    #[test]
    fn test_invalid_pattern_matches_literally() {
        assert_eq!(index().search("iss (", MAX_RESULTS), vec![ObjectId(1)]);
        assert!(index().search("[", MAX_RESULTS).is_empty());
    }
}
