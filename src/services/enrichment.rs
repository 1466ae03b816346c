use std::sync::Arc;

use crate::{
    models::{ContentKind, DiscoveredCandidate, EnrichedCandidate},
    services::catalog::{CatalogDetails, CatalogProvider, WatchProvider},
};

/// Known free/ad-supported services; only these survive provider filtering
const FREE_SERVICES: &[&str] = &[
    "Tubi",
    "Pluto TV",
    "The Roku Channel",
    "Freevee",
    "Crackle",
    "Plex",
    "YouTube",
];

/// Search-by-title URL prefixes for the top free platforms
const SEARCH_PLATFORMS: &[&str] = &[
    "https://tubitv.com/search/",
    "https://pluto.tv/search/details?query=",
    "https://www.youtube.com/results?search_query=",
];

/// Attaches catalog metadata and watch links to discovered candidates
///
/// Enrichment never fails: every sub-step degrades to an absent field and
/// a candidate the catalog does not know comes back as a bare record.
#[derive(Clone)]
pub struct Enricher {
    catalog: Arc<dyn CatalogProvider>,
    region: String,
}

impl Enricher {
    pub fn new(catalog: Arc<dyn CatalogProvider>, region: String) -> Self {
        Self { catalog, region }
    }

    /// Enriches all candidates concurrently, joined in input order
    pub async fn enrich_all(&self, candidates: Vec<DiscoveredCandidate>) -> Vec<EnrichedCandidate> {
        let mut tasks = Vec::new();

        for candidate in candidates {
            let enricher = self.clone();
            tasks.push(tokio::spawn(
                async move { enricher.enrich(&candidate).await },
            ));
        }

        let mut enriched = Vec::new();
        for task in tasks {
            match task.await {
                Ok(result) => enriched.push(result),
                Err(e) => tracing::warn!(error = %e, "Enrichment task join error"),
            }
        }

        enriched
    }

    /// Enriches one candidate; returns a bare record on any total miss
    pub async fn enrich(&self, candidate: &DiscoveredCandidate) -> EnrichedCandidate {
        let matched = match self.catalog.search(&candidate.title, candidate.kind).await {
            Ok(Some(matched)) => matched,
            Ok(None) => {
                return self.bare_with_search_urls(candidate);
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    title = %candidate.title,
                    "Catalog search failed; keeping bare candidate"
                );
                return self.bare_with_search_urls(candidate);
            }
        };

        let details = match self.catalog.details(matched.id, candidate.kind).await {
            Ok(details) => details,
            Err(e) => {
                tracing::warn!(error = %e, title = %candidate.title, "Detail fetch failed");
                CatalogDetails::default()
            }
        };

        let providers = match self
            .catalog
            .watch_providers(matched.id, candidate.kind, &self.region)
            .await
        {
            Ok(providers) => filter_free_providers(providers),
            Err(e) => {
                tracing::warn!(error = %e, title = %candidate.title, "Provider lookup failed");
                Vec::new()
            }
        };

        let genre = match self.catalog.genre_names().await {
            Ok(table) => matched
                .genre_ids
                .iter()
                .find_map(|id| table.get(id))
                .cloned(),
            Err(e) => {
                tracing::warn!(error = %e, title = %candidate.title, "Genre lookup failed");
                None
            }
        };

        let provider = providers.first();
        let watch_urls = synthesize_watch_urls(
            &candidate.title,
            candidate.stream_url.as_deref(),
            provider,
        );

        EnrichedCandidate {
            title: matched.title,
            kind: candidate.kind,
            catalog_id: Some(matched.id),
            poster_url: matched.poster_url,
            backdrop_url: matched.backdrop_url,
            overview: matched.overview,
            release_year: matched.release_year,
            runtime_minutes: details.runtime_minutes,
            season_count: details.season_count,
            episode_count: details.episode_count,
            genre,
            watch_urls,
            provider: provider
                .map(|p| p.name.clone())
                .or_else(|| candidate.provider.clone()),
            confidence: candidate.confidence,
        }
    }

    fn bare_with_search_urls(&self, candidate: &DiscoveredCandidate) -> EnrichedCandidate {
        let mut bare = EnrichedCandidate::bare(candidate);
        bare.watch_urls = synthesize_watch_urls(
            &candidate.title,
            candidate.stream_url.as_deref(),
            None,
        );
        bare
    }
}

/// Keeps only providers matching the free/ad-supported allow-list
pub fn filter_free_providers(providers: Vec<WatchProvider>) -> Vec<WatchProvider> {
    providers
        .into_iter()
        .filter(|p| {
            let name = p.name.to_lowercase();
            FREE_SERVICES
                .iter()
                .any(|service| name.contains(&service.to_lowercase()))
        })
        .collect()
}

/// Builds the deduplicated watch/search URL list for a title
///
/// Order: the candidate's own stream reference, a matched provider link,
/// then generic search URLs for the known free platforms.
pub fn synthesize_watch_urls(
    title: &str,
    stream_url: Option<&str>,
    provider: Option<&WatchProvider>,
) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();

    if let Some(url) = stream_url {
        if !url.is_empty() {
            urls.push(url.to_string());
        }
    }

    if let Some(link) = provider.and_then(|p| p.link.as_deref()) {
        urls.push(link.to_string());
    }

    let encoded = urlencoding::encode(title);
    for base in SEARCH_PLATFORMS {
        urls.push(format!("{base}{encoded}"));
    }

    let mut seen = std::collections::HashSet::new();
    urls.retain(|url| seen.insert(url.clone()));
    urls
}
