use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of content tracked by the system
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Movie,
    Tv,
    Sports,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Movie => "movie",
            ContentKind::Tv => "tv",
            ContentKind::Sports => "sports",
        }
    }

    /// Parses a stored or wire kind label; unrecognized labels map to movie
    pub fn parse(value: &str) -> Self {
        match value {
            "tv" | "series" | "tv_show" | "show" => ContentKind::Tv,
            "sports" => ContentKind::Sports,
            _ => ContentKind::Movie,
        }
    }
}

/// Origin of a content record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Recommendation,
    Manual,
    Seed,
    Search,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Recommendation => "recommendation",
            Provenance::Manual => "manual",
            Provenance::Seed => "seed",
            Provenance::Search => "search",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "recommendation" => Provenance::Recommendation,
            "seed" => Provenance::Seed,
            "search" => Provenance::Search,
            _ => Provenance::Manual,
        }
    }
}

/// A movie, TV show, or sports event known to the system
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentItem {
    pub id: i64,
    /// External catalog identifier; unique across items when present
    pub catalog_id: Option<i64>,
    pub title: String,
    pub kind: ContentKind,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    /// Playable stream reference; may be a direct link or a search link
    pub stream_url: Option<String>,
    pub overview: Option<String>,
    pub release_year: Option<i32>,
    pub runtime_minutes: Option<i32>,
    pub season_count: Option<i32>,
    pub episode_count: Option<i32>,
    pub genre: Option<String>,
    pub source: Provenance,
    pub in_library: bool,
    pub watch_count: i32,
    pub created_at: DateTime<Utc>,
    pub last_watched_at: Option<DateTime<Utc>>,
}

/// A 1-5 score attached to one content item; latest write wins
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    pub content_id: i64,
    pub score: i32,
    pub rated_at: DateTime<Utc>,
}

/// Record that a title was shown to the user, for repeat suppression
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    /// Lowercase title text; unique
    pub title_key: String,
    pub shown_count: i32,
    pub last_shown_at: DateTime<Utc>,
}

/// Single-row user preferences record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preferences {
    pub recommendations_per_type: i32,
    pub watch_region: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            recommendations_per_type: 12,
            watch_region: "US".to_string(),
        }
    }
}

/// Preference summary derived from the library and ratings per request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TasteProfile {
    pub favorite_genres: Vec<String>,
    pub liked_titles: Vec<String>,
    pub disliked_titles: Vec<String>,
    pub movie_count: usize,
    pub tv_count: usize,
    pub is_empty: bool,
}

/// A title proposed by the discovery stage, before enrichment
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredCandidate {
    pub title: String,
    pub kind: ContentKind,
    pub stream_url: Option<String>,
    pub provider: Option<String>,
    /// Confidence in [0, 1]
    pub confidence: f32,
}

/// A candidate merged with catalog metadata and resolved watch links
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichedCandidate {
    pub title: String,
    pub kind: ContentKind,
    pub catalog_id: Option<i64>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub overview: Option<String>,
    pub release_year: Option<i32>,
    pub runtime_minutes: Option<i32>,
    pub season_count: Option<i32>,
    pub episode_count: Option<i32>,
    pub genre: Option<String>,
    /// Best-effort watch and search links, deduplicated
    pub watch_urls: Vec<String>,
    pub provider: Option<String>,
    pub confidence: f32,
}

impl EnrichedCandidate {
    /// Bare record carrying only what the discovery stage knew
    ///
    /// Used when catalog enrichment finds no match; metadata fields stay
    /// absent but the candidate is still persisted and returned.
    pub fn bare(candidate: &DiscoveredCandidate) -> Self {
        Self {
            title: candidate.title.clone(),
            kind: candidate.kind,
            catalog_id: None,
            poster_url: None,
            backdrop_url: None,
            overview: None,
            release_year: None,
            runtime_minutes: None,
            season_count: None,
            episode_count: None,
            genre: None,
            watch_urls: candidate.stream_url.iter().cloned().collect(),
            provider: candidate.provider.clone(),
            confidence: candidate.confidence,
        }
    }
}

/// Response payload of the discover endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverResponse {
    pub success: bool,
    pub movies: Vec<EnrichedCandidate>,
    #[serde(rename = "tvShows")]
    pub tv_shows: Vec<EnrichedCandidate>,
    pub total: usize,
    pub timestamp: DateTime<Utc>,
}
