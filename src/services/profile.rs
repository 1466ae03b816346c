use std::collections::HashMap;

use crate::models::{ContentItem, ContentKind, Rating, TasteProfile};

const LIKED_THRESHOLD: i32 = 4;
const DISLIKED_THRESHOLD: i32 = 2;

/// Derives a compact preference summary from the library and ratings
///
/// Ratings that reference an item not present in the supplied library are
/// skipped. `is_empty` depends only on the library, not on rating count.
pub fn build_taste_profile(library: &[ContentItem], ratings: &[Rating]) -> TasteProfile {
    let mut profile = TasteProfile {
        is_empty: library.is_empty(),
        ..TasteProfile::default()
    };

    let by_id: HashMap<i64, &ContentItem> = library.iter().map(|item| (item.id, item)).collect();

    for item in library {
        match item.kind {
            ContentKind::Movie => profile.movie_count += 1,
            ContentKind::Tv => profile.tv_count += 1,
            ContentKind::Sports => {}
        }

        if let Some(genre) = &item.genre {
            if !genre.is_empty() && !profile.favorite_genres.iter().any(|g| g == genre) {
                profile.favorite_genres.push(genre.clone());
            }
        }
    }

    for rating in ratings {
        let Some(item) = by_id.get(&rating.content_id) else {
            continue;
        };

        if rating.score >= LIKED_THRESHOLD {
            profile.liked_titles.push(item.title.clone());
        } else if rating.score <= DISLIKED_THRESHOLD {
            profile.disliked_titles.push(item.title.clone());
        }
    }

    profile
}
