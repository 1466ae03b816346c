use std::collections::HashSet;

use crate::models::{ContentKind, DiscoveredCandidate, HistoryEntry};

/// Trailing window within which a shown title is not recommended again
pub const HISTORY_WINDOW_DAYS: i64 = 30;

/// Lowercase title set from recent history entries
pub fn recent_title_set(entries: &[HistoryEntry]) -> HashSet<String> {
    entries.iter().map(|e| e.title_key.to_lowercase()).collect()
}

/// Drops candidates whose title was shown within the trailing window
///
/// Pure set-difference on case-insensitive title text; kind is not
/// consulted and no partial matching is done.
pub fn filter_recent(
    candidates: Vec<DiscoveredCandidate>,
    recent_titles: &HashSet<String>,
) -> Vec<DiscoveredCandidate> {
    candidates
        .into_iter()
        .filter(|c| !recent_titles.contains(&c.title.to_lowercase()))
        .collect()
}

/// Collapses duplicates keyed by (lowercase title, kind); first wins
///
/// A later duplicate is dropped even when it carries higher confidence or
/// a stream link the first lacked.
pub fn dedupe(candidates: Vec<DiscoveredCandidate>) -> Vec<DiscoveredCandidate> {
    let mut seen: HashSet<(String, ContentKind)> = HashSet::new();

    candidates
        .into_iter()
        .filter(|c| seen.insert((c.title.to_lowercase(), c.kind)))
        .collect()
}

/// Orders candidates by data completeness, then confidence
///
/// Candidates with a stream reference sort first; within each group,
/// descending confidence. The sort is stable, so equal-confidence
/// candidates keep their arrival order.
pub fn rank(mut candidates: Vec<DiscoveredCandidate>) -> Vec<DiscoveredCandidate> {
    candidates.sort_by(|a, b| {
        b.stream_url
            .is_some()
            .cmp(&a.stream_url.is_some())
            .then(b.confidence.total_cmp(&a.confidence))
    });
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn candidate(title: &str, kind: ContentKind, confidence: f32) -> DiscoveredCandidate {
        DiscoveredCandidate {
            title: title.to_string(),
            kind,
            stream_url: None,
            provider: None,
            confidence,
        }
    }

    fn with_stream(mut c: DiscoveredCandidate, url: &str) -> DiscoveredCandidate {
        c.stream_url = Some(url.to_string());
        c
    }

    #[test]
    fn test_filter_recent_is_case_insensitive() {
        let entries = vec![HistoryEntry {
            title_key: "inception".to_string(),
            shown_count: 1,
            last_shown_at: Utc::now() - Duration::days(5),
        }];
        let recent = recent_title_set(&entries);

        let survivors = filter_recent(
            vec![
                candidate("INCEPTION", ContentKind::Movie, 0.9),
                candidate("Inception 2", ContentKind::Movie, 0.9),
            ],
            &recent,
        );

        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].title, "Inception 2");
    }

    #[test]
    fn test_filter_ignores_kind() {
        let recent: HashSet<String> = ["severance".to_string()].into_iter().collect();

        let survivors = filter_recent(
            vec![candidate("Severance", ContentKind::Movie, 0.9)],
            &recent,
        );
        assert!(survivors.is_empty());
    }

    #[test]
    fn test_dedupe_key_is_title_and_kind() {
        let deduped = dedupe(vec![
            candidate("Dune", ContentKind::Movie, 0.9),
            candidate("dune", ContentKind::Movie, 0.95),
            candidate("Dune", ContentKind::Tv, 0.8),
        ]);

        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].title, "Dune");
        assert_eq!(deduped[0].kind, ContentKind::Movie);
        assert_eq!(deduped[1].kind, ContentKind::Tv);
    }

    #[test]
    fn test_dedupe_first_wins_over_higher_confidence() {
        let deduped = dedupe(vec![
            candidate("Dune", ContentKind::Movie, 0.5),
            with_stream(candidate("Dune", ContentKind::Movie, 0.99), "https://x"),
        ]);

        assert_eq!(deduped.len(), 1);
        assert!((deduped[0].confidence - 0.5).abs() < f32::EPSILON);
        assert!(deduped[0].stream_url.is_none());
    }

    #[test]
    fn test_dedupe_is_idempotent() {
        let input = vec![
            candidate("A", ContentKind::Movie, 0.9),
            candidate("a", ContentKind::Movie, 0.8),
            candidate("B", ContentKind::Tv, 0.7),
        ];

        let once = dedupe(input);
        let twice = dedupe(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_rank_stream_reference_sorts_first() {
        let ranked = rank(vec![
            candidate("No Link", ContentKind::Movie, 0.99),
            with_stream(candidate("Linked", ContentKind::Movie, 0.5), "https://x"),
        ]);

        assert_eq!(ranked[0].title, "Linked");
        assert_eq!(ranked[1].title, "No Link");
    }

    #[test]
    fn test_rank_by_descending_confidence_within_group() {
        let ranked = rank(vec![
            candidate("Low", ContentKind::Movie, 0.6),
            candidate("High", ContentKind::Movie, 0.9),
            candidate("Mid", ContentKind::Movie, 0.7),
        ]);

        let titles: Vec<&str> = ranked.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["High", "Mid", "Low"]);
    }

    #[test]
    fn test_rank_is_stable_for_equal_confidence() {
        let ranked = rank(vec![
            candidate("First", ContentKind::Movie, 0.8),
            candidate("Second", ContentKind::Movie, 0.8),
        ]);

        assert_eq!(ranked[0].title, "First");
        assert_eq!(ranked[1].title, "Second");
    }
}
