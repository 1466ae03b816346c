use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::ContentKind,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";

/// First search hit for a title in the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogMatch {
    pub id: i64,
    pub title: String,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub overview: Option<String>,
    pub release_year: Option<i32>,
    pub genre_ids: Vec<i64>,
}

/// Detail fields fetched per kind: runtime for movies, counts for tv
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogDetails {
    pub runtime_minutes: Option<i32>,
    pub season_count: Option<i32>,
    pub episode_count: Option<i32>,
}

/// A watch provider listed for a title in one region
#[derive(Debug, Clone, PartialEq)]
pub struct WatchProvider {
    pub name: String,
    pub link: Option<String>,
}

/// Catalog metadata source
///
/// Every operation covers one enrichment step; callers decide how a
/// failed step degrades.
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Searches by title and kind; returns the first match, if any
    async fn search(&self, title: &str, kind: ContentKind) -> AppResult<Option<CatalogMatch>>;

    /// Fetches kind-specific detail fields for a known catalog id
    async fn details(&self, id: i64, kind: ContentKind) -> AppResult<CatalogDetails>;

    /// Region-scoped watch-provider listings for a known catalog id
    async fn watch_providers(
        &self,
        id: i64,
        kind: ContentKind,
        region: &str,
    ) -> AppResult<Vec<WatchProvider>>;

    /// Combined movie+tv genre id → name lookup table
    async fn genre_names(&self) -> AppResult<HashMap<i64, String>>;
}

/// TMDB-style catalog client authenticated by API-key query parameter
pub struct TmdbCatalog {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    /// Genre table is fetched once and reused for the process lifetime
    genre_cache: RwLock<Option<Arc<HashMap<i64, String>>>>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: i64,
    // Movie hits carry "title"/"release_date", tv hits "name"/"first_air_date".
    #[serde(default, alias = "name")]
    title: Option<String>,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(default)]
    backdrop_path: Option<String>,
    #[serde(default, alias = "first_air_date")]
    release_date: Option<String>,
    #[serde(default)]
    genre_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    #[serde(default)]
    runtime: Option<i32>,
    #[serde(default)]
    number_of_seasons: Option<i32>,
    #[serde(default)]
    number_of_episodes: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct ProvidersResponse {
    #[serde(default)]
    results: HashMap<String, RegionProviders>,
}

#[derive(Debug, Default, Deserialize)]
struct RegionProviders {
    #[serde(default)]
    flatrate: Vec<ProviderEntry>,
    #[serde(default)]
    free: Vec<ProviderEntry>,
    #[serde(default)]
    ads: Vec<ProviderEntry>,
    #[serde(default)]
    link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderEntry {
    provider_name: String,
}

#[derive(Debug, Deserialize)]
struct GenreListResponse {
    #[serde(default)]
    genres: Vec<GenreEntry>,
}

#[derive(Debug, Deserialize)]
struct GenreEntry {
    id: i64,
    name: String,
}

fn kind_path(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Tv => "tv",
        _ => "movie",
    }
}

fn parse_year(date: Option<&str>) -> Option<i32> {
    date.and_then(|d| d.get(..4)).and_then(|y| y.parse().ok())
}

impl TmdbCatalog {
    pub fn new(api_key: String, api_url: String) -> Self {
        let http_client = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| HttpClient::new());

        Self {
            http_client,
            api_key,
            api_url,
            genre_cache: RwLock::new(None),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        extra_query: &[(&str, &str)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let mut query: Vec<(&str, &str)> = vec![("api_key", self.api_key.as_str())];
        query.extend_from_slice(extra_query);

        let response = self.http_client.get(&url).query(&query).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Catalog API returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    async fn fetch_genre_list(&self, kind: ContentKind) -> AppResult<Vec<GenreEntry>> {
        let path = format!("/genre/{}/list", kind_path(kind));
        let response: GenreListResponse = self.get_json(&path, &[]).await?;
        Ok(response.genres)
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbCatalog {
    async fn search(&self, title: &str, kind: ContentKind) -> AppResult<Option<CatalogMatch>> {
        let path = format!("/search/{}", kind_path(kind));
        let response: SearchResponse = self.get_json(&path, &[("query", title)]).await?;

        let hit = match response.results.into_iter().next() {
            Some(hit) => hit,
            None => {
                tracing::debug!(title = %title, "Catalog search found no match");
                return Ok(None);
            }
        };

        Ok(Some(CatalogMatch {
            id: hit.id,
            title: hit.title.unwrap_or_else(|| title.to_string()),
            poster_url: hit.poster_path.map(|p| format!("{IMAGE_BASE}{p}")),
            backdrop_url: hit.backdrop_path.map(|p| format!("{IMAGE_BASE}{p}")),
            overview: hit.overview.filter(|o| !o.is_empty()),
            release_year: parse_year(hit.release_date.as_deref()),
            genre_ids: hit.genre_ids,
        }))
    }

    async fn details(&self, id: i64, kind: ContentKind) -> AppResult<CatalogDetails> {
        let path = format!("/{}/{}", kind_path(kind), id);
        let response: DetailsResponse = self.get_json(&path, &[]).await?;

        Ok(match kind {
            ContentKind::Tv => CatalogDetails {
                runtime_minutes: None,
                season_count: response.number_of_seasons,
                episode_count: response.number_of_episodes,
            },
            _ => CatalogDetails {
                runtime_minutes: response.runtime,
                season_count: None,
                episode_count: None,
            },
        })
    }

    async fn watch_providers(
        &self,
        id: i64,
        kind: ContentKind,
        region: &str,
    ) -> AppResult<Vec<WatchProvider>> {
        let path = format!("/{}/{}/watch/providers", kind_path(kind), id);
        let response: ProvidersResponse = self.get_json(&path, &[]).await?;

        let Some(region_providers) = response.results.get(region) else {
            return Ok(Vec::new());
        };

        let link = region_providers.link.clone();
        let providers = region_providers
            .free
            .iter()
            .chain(&region_providers.ads)
            .chain(&region_providers.flatrate)
            .map(|entry| WatchProvider {
                name: entry.provider_name.clone(),
                link: link.clone(),
            })
            .collect();

        Ok(providers)
    }

    async fn genre_names(&self) -> AppResult<HashMap<i64, String>> {
        if let Some(cached) = self.genre_cache.read().await.as_ref() {
            return Ok(cached.as_ref().clone());
        }

        let mut table = HashMap::new();
        for entry in self.fetch_genre_list(ContentKind::Movie).await? {
            table.insert(entry.id, entry.name);
        }
        for entry in self.fetch_genre_list(ContentKind::Tv).await? {
            table.insert(entry.id, entry.name);
        }

        tracing::info!(genres = table.len(), "Loaded catalog genre table");

        let shared = Arc::new(table.clone());
        *self.genre_cache.write().await = Some(shared);

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_path() {
        assert_eq!(kind_path(ContentKind::Movie), "movie");
        assert_eq!(kind_path(ContentKind::Tv), "tv");
        assert_eq!(kind_path(ContentKind::Sports), "movie");
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year(Some("2021-10-22")), Some(2021));
        assert_eq!(parse_year(Some("")), None);
        assert_eq!(parse_year(None), None);
    }

    #[test]
    fn test_search_hit_movie_shape() {
        let json = r#"{
            "id": 438631,
            "title": "Dune",
            "overview": "Paul Atreides leads nomadic tribes.",
            "poster_path": "/poster.jpg",
            "release_date": "2021-10-22",
            "genre_ids": [878, 12]
        }"#;

        let hit: SearchHit = serde_json::from_str(json).unwrap();
        assert_eq!(hit.id, 438631);
        assert_eq!(hit.title.as_deref(), Some("Dune"));
        assert_eq!(hit.genre_ids, vec![878, 12]);
    }

    #[test]
    fn test_search_hit_tv_shape_uses_aliases() {
        let json = r#"{
            "id": 95396,
            "name": "Severance",
            "first_air_date": "2022-02-17"
        }"#;

        let hit: SearchHit = serde_json::from_str(json).unwrap();
        assert_eq!(hit.title.as_deref(), Some("Severance"));
        assert_eq!(parse_year(hit.release_date.as_deref()), Some(2022));
    }

    #[test]
    fn test_providers_response_shape() {
        let json = r#"{
            "results": {
                "US": {
                    "link": "https://example.com/watch",
                    "free": [{"provider_name": "Tubi TV"}],
                    "ads": [{"provider_name": "Pluto TV"}],
                    "flatrate": [{"provider_name": "Netflix"}]
                }
            }
        }"#;

        let response: ProvidersResponse = serde_json::from_str(json).unwrap();
        let us = response.results.get("US").unwrap();
        assert_eq!(us.free[0].provider_name, "Tubi TV");
        assert_eq!(us.ads[0].provider_name, "Pluto TV");
        assert_eq!(us.flatrate[0].provider_name, "Netflix");
    }

    #[test]
    fn test_details_response_tolerates_missing_fields() {
        let movie: DetailsResponse = serde_json::from_str(r#"{"runtime": 155}"#).unwrap();
        assert_eq!(movie.runtime, Some(155));
        assert_eq!(movie.number_of_seasons, None);

        let tv: DetailsResponse =
            serde_json::from_str(r#"{"number_of_seasons": 2, "number_of_episodes": 18}"#).unwrap();
        assert_eq!(tv.number_of_seasons, Some(2));
        assert_eq!(tv.number_of_episodes, Some(18));
    }
}
