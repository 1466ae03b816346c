use crate::models::{Preferences, TasteProfile};

/// Upper bound on discovery queries per request, to bound fan-out cost
pub const MAX_QUERIES: usize = 7;

const SIMILAR_TITLE_LIMIT: usize = 2;
const GENRE_LIMIT: usize = 2;

/// Generic queries used when the library is empty
///
/// None of these reference the user's library. The prompt text asks for
/// titles only and never names a streaming platform; service names in the
/// answer would pollute the candidate list.
pub fn cold_start_queries(per_type: i32) -> Vec<String> {
    vec![
        format!("List {per_type} highly rated movies released in the last two years."),
        format!("List {per_type} critically acclaimed TV series from the last two years."),
        format!("List {per_type} underrated hidden gem movies and TV shows."),
        format!("List {per_type} gripping thriller and action movies."),
    ]
}

/// Turns a taste profile into a bounded list of natural-language queries
///
/// Warm-start priority order: similar-to-liked titles, then per-genre
/// movie and TV queries, then one recent-releases query for the top genre.
/// Excess queries past the cap are dropped, not deferred.
pub fn generate_queries(profile: &TasteProfile, prefs: &Preferences) -> Vec<String> {
    let per_type = prefs.recommendations_per_type;

    if profile.is_empty {
        let mut queries = cold_start_queries(per_type);
        queries.truncate(MAX_QUERIES);
        return queries;
    }

    let mut queries = Vec::new();

    for title in profile.liked_titles.iter().take(SIMILAR_TITLE_LIMIT) {
        queries.push(format!(
            "List movies and TV shows similar to \"{title}\". Titles only."
        ));
    }

    for genre in profile.favorite_genres.iter().take(GENRE_LIMIT) {
        queries.push(format!("List the best {genre} movies of recent years."));
        queries.push(format!("List the best {genre} TV series of recent years."));
    }

    if let Some(top_genre) = profile.favorite_genres.first() {
        queries.push(format!(
            "List recently released {top_genre} movies and shows."
        ));
    }

    // Disliked titles are tracked in the profile but intentionally not
    // folded into query text yet.
    queries.truncate(MAX_QUERIES);
    queries
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn warm_profile(genres: &[&str], liked: &[&str]) -> TasteProfile {
        TasteProfile {
            favorite_genres: genres.iter().map(|s| s.to_string()).collect(),
            liked_titles: liked.iter().map(|s| s.to_string()).collect(),
            disliked_titles: vec![],
            movie_count: 3,
            tv_count: 2,
            is_empty: false,
        }
    }

    #[test]
    fn test_cold_start_emits_fixed_set() {
        let profile = TasteProfile {
            is_empty: true,
            ..TasteProfile::default()
        };

        let queries = generate_queries(&profile, &Preferences::default());
        let expected: HashSet<String> = cold_start_queries(12).into_iter().collect();
        let actual: HashSet<String> = queries.into_iter().collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_cold_start_ignores_library_fields() {
        // An is_empty profile with leftover fields still gets generic queries.
        let profile = TasteProfile {
            favorite_genres: vec!["Horror".to_string()],
            liked_titles: vec!["Alien".to_string()],
            is_empty: true,
            ..TasteProfile::default()
        };

        let queries = generate_queries(&profile, &Preferences::default());
        assert!(queries.iter().all(|q| !q.contains("Horror") && !q.contains("Alien")));
    }

    #[test]
    fn test_never_exceeds_cap() {
        let profile = warm_profile(
            &["Sci-Fi", "Drama", "Horror", "Comedy"],
            &["Dune", "Arrival", "Tenet", "Interstellar"],
        );

        let queries = generate_queries(&profile, &Preferences::default());
        assert!(queries.len() <= MAX_QUERIES);
    }

    #[test]
    fn test_warm_start_priority_order() {
        let profile = warm_profile(&["Sci-Fi", "Drama"], &["Dune", "Arrival"]);
        let queries = generate_queries(&profile, &Preferences::default());

        assert_eq!(queries.len(), 7);
        assert!(queries[0].contains("Dune"));
        assert!(queries[1].contains("Arrival"));
        assert!(queries[2].contains("Sci-Fi movies"));
        assert!(queries[3].contains("Sci-Fi TV series"));
        assert!(queries[4].contains("Drama movies"));
        assert!(queries[5].contains("Drama TV series"));
        assert!(queries[6].contains("recently released") || queries[6].contains("Sci-Fi"));
    }

    #[test]
    fn test_queries_never_name_platforms() {
        let profile = warm_profile(&["Drama"], &["The Wire"]);
        let mut queries = generate_queries(&profile, &Preferences::default());
        queries.extend(cold_start_queries(12));

        for platform in ["Netflix", "Hulu", "Tubi", "Pluto", "Disney", "Prime"] {
            assert!(
                queries.iter().all(|q| !q.contains(platform)),
                "query text must not name {platform}"
            );
        }
    }

    #[test]
    fn test_disliked_titles_not_in_query_text() {
        let mut profile = warm_profile(&["Drama"], &["The Wire"]);
        profile.disliked_titles = vec!["Morbius".to_string()];

        let queries = generate_queries(&profile, &Preferences::default());
        assert!(queries.iter().all(|q| !q.contains("Morbius")));
    }
}
