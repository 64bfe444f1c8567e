//! ranking records against what the user typed
use {
    crate::{
        data::{Dataset, TagRecord},
        utils::{locale_cmp, normalize},
    },
    std::sync::Arc,
};

/// the most suggestions ever returned for one query
pub const MAX_RESULTS: usize = 20;

/// a record matched by a query
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Suggestion {
    /// the matched record
    pub record: Arc<TagRecord>,
    /// lower is better: 0 exact, 1 prefix, 2+ substring at an offset
    pub score: usize,
}

impl Suggestion {
    /// the tag that gets inserted when this suggestion is picked
    pub fn tag(&self) -> &str {
        self.record.tag()
    }
}

/// score one synonym against an already normalized query
fn score_synonym(synonym: &str, query: &str) -> Option<usize> {
    if synonym.starts_with(query) {
        return Some(if synonym.len() == query.len() { 0 } else { 1 });
    }

    synonym
        .find(query)
        .map(|byte_offset| 2 + synonym[..byte_offset].chars().count())
}

/// the best score over all synonyms of a record, or `None` if nothing matches
pub fn score_record(record: &TagRecord, query: &str) -> Option<usize> {
    record
        .synonyms()
        .iter()
        .filter_map(|synonym| score_synonym(synonym, query))
        .min()
}

/// rank the dataset against a query, keeping at most `limit` results
pub fn suggest_with_limit(dataset: &Dataset, query: &str, limit: usize) -> Vec<Suggestion> {
    let query = normalize(query);
    if query.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut matches: Vec<Suggestion> = dataset
        .iter()
        .filter_map(|record| {
            score_record(record, &query).map(|score| Suggestion {
                record: Arc::clone(record),
                score,
            })
        })
        .collect();

    matches.sort_by(|a, b| {
        a.score
            .cmp(&b.score)
            .then_with(|| locale_cmp(a.record.tag(), b.record.tag()))
    });
    matches.truncate(limit);
    matches
}

/// rank the dataset against a query, keeping the top [`MAX_RESULTS`]
pub fn suggest(dataset: &Dataset, query: &str) -> Vec<Suggestion> {
    suggest_with_limit(dataset, query, MAX_RESULTS)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::data::{RecordFields, build_record},
    };

    fn dataset(tags: &[&str]) -> Dataset {
        tags.iter()
            .filter_map(|tag| build_record(tag, RecordFields::default()))
            .collect()
    }

    fn ranked(dataset: &Dataset, query: &str) -> Vec<(String, usize)> {
        suggest(dataset, query)
            .into_iter()
            .map(|s| (s.tag().to_string(), s.score))
            .collect()
    }

    #[test]
    fn test_exact_prefix_substring_order() {
        let ds = dataset(&["bobcat", "category", "cat"]);
        assert_eq!(
            ranked(&ds, "cat"),
            [
                ("cat".to_string(), 0),
                ("category".to_string(), 1),
                ("bobcat".to_string(), 5)
            ]
        );
    }

    #[test]
    fn test_empty_query_is_empty() {
        let many: Vec<String> = (0..500).map(|i| format!("tag{i}")).collect();
        let refs: Vec<&str> = many.iter().map(String::as_str).collect();
        let ds = dataset(&refs);

        assert!(suggest(&ds, "").is_empty());
        assert!(suggest(&ds, "   ").is_empty());
    }

    #[test]
    fn test_query_is_case_insensitive() {
        let ds = dataset(&["Blue_Sky"]);
        assert_eq!(ranked(&ds, "BLUE"), [("Blue_Sky".to_string(), 0)]);
        assert_eq!(ranked(&ds, "BLU"), [("Blue_Sky".to_string(), 1)]);
    }

    #[test]
    fn test_word_parts_match() {
        let ds = dataset(&["long_hair", "hairband"]);
        assert_eq!(
            ranked(&ds, "hair"),
            [("long_hair".to_string(), 0), ("hairband".to_string(), 1)]
        );
    }

    #[test]
    fn test_ties_sort_by_tag() {
        let ds = dataset(&["catnip", "Catfish", "catalog"]);
        let tags: Vec<_> = ranked(&ds, "cat").into_iter().map(|(t, _)| t).collect();
        assert_eq!(tags, ["catalog", "Catfish", "catnip"]);
    }

    #[test]
    fn test_results_are_capped() {
        let many: Vec<String> = (0..100).map(|i| format!("tag{i:03}")).collect();
        let refs: Vec<&str> = many.iter().map(String::as_str).collect();
        let ds = dataset(&refs);

        let results = suggest(&ds, "tag");
        assert_eq!(results.len(), MAX_RESULTS);
        assert_eq!(results[0].tag(), "tag000");
    }

    #[test]
    fn test_no_match_is_dropped() {
        let ds = dataset(&["dog"]);
        assert!(suggest(&ds, "cat").is_empty());
    }
}
