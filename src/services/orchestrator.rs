use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;

use crate::{
    config::{credential_missing, Config},
    db::Store,
    error::{AppError, AppResult},
    models::{ContentItem, ContentKind, DiscoverResponse, Preferences, Rating},
    services::{
        catalog::CatalogProvider,
        discovery::DiscoveryBackend,
        enrichment::Enricher,
        profile::build_taste_profile,
        queries::generate_queries,
        ranking::{dedupe, filter_recent, rank, recent_title_set, HISTORY_WINDOW_DAYS},
    },
};

/// Credentials the discover endpoint validates before any network call
#[derive(Clone)]
pub struct DiscoverySettings {
    pub search_credential: String,
    pub catalog_credential: String,
}

impl DiscoverySettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            search_credential: config.ai_api_key.clone(),
            catalog_credential: config.catalog_api_key.clone(),
        }
    }
}

/// Runs one end-to-end discovery request
///
/// Composes profile building, query generation, concurrent search,
/// history filtering, dedup/rank, concurrent enrichment, and persistence,
/// then partitions the final list by kind.
pub struct Orchestrator {
    store: Store,
    discovery: Arc<dyn DiscoveryBackend>,
    catalog: Arc<dyn CatalogProvider>,
    settings: DiscoverySettings,
}

impl Orchestrator {
    pub fn new(
        store: Store,
        discovery: Arc<dyn DiscoveryBackend>,
        catalog: Arc<dyn CatalogProvider>,
        settings: DiscoverySettings,
    ) -> Self {
        Self {
            store,
            discovery,
            catalog,
            settings,
        }
    }

    pub async fn discover(&self) -> AppResult<DiscoverResponse> {
        self.validate_credentials()?;

        // Each load tolerates storage absence independently.
        let library = self.store.library_items().await;
        let ratings = self.store.ratings().await;
        let prefs = self.store.preferences().await;
        let history = self.store.recent_history(HISTORY_WINDOW_DAYS).await;
        let recent = recent_title_set(&history);

        self.discover_with_inputs(&library, &ratings, &prefs, &recent)
            .await
    }

    /// Pipeline body, separated from storage loads
    pub async fn discover_with_inputs(
        &self,
        library: &[ContentItem],
        ratings: &[Rating],
        prefs: &Preferences,
        recent: &HashSet<String>,
    ) -> AppResult<DiscoverResponse> {
        let profile = build_taste_profile(library, ratings);
        let queries = generate_queries(&profile, prefs);

        tracing::info!(
            queries = queries.len(),
            cold_start = profile.is_empty,
            library_size = library.len(),
            "Starting discovery"
        );

        let candidates = self
            .discovery
            .discover_batch(&queries)
            .await
            .map_err(|e| {
                AppError::Discovery(format!("{} (library size {})", e, library.len()))
            })?;

        let survivors = rank(dedupe(filter_recent(candidates, recent)));

        let enricher = Enricher::new(self.catalog.clone(), prefs.watch_region.clone());
        let enriched = enricher.enrich_all(survivors).await;

        for item in &enriched {
            if let Err(e) = self.store.save_discovered(item).await {
                tracing::warn!(
                    error = %e,
                    title = %item.title,
                    "Failed to persist discovered item; skipping"
                );
            }
            if let Err(e) = self.store.record_shown(&item.title).await {
                tracing::warn!(error = %e, title = %item.title, "Failed to record history entry");
            }
        }

        let per_type = prefs.recommendations_per_type.max(0) as usize;
        let mut movies = Vec::new();
        let mut tv_shows = Vec::new();

        for item in enriched {
            match item.kind {
                ContentKind::Movie => movies.push(item),
                ContentKind::Tv => tv_shows.push(item),
                ContentKind::Sports => {}
            }
        }

        movies.truncate(per_type);
        tv_shows.truncate(per_type);
        let total = movies.len() + tv_shows.len();

        tracing::info!(movies = movies.len(), tv_shows = tv_shows.len(), "Discovery completed");

        Ok(DiscoverResponse {
            success: true,
            movies,
            tv_shows,
            total,
            timestamp: Utc::now(),
        })
    }

    fn validate_credentials(&self) -> AppResult<()> {
        if credential_missing(&self.settings.search_credential) {
            return Err(AppError::Configuration(
                "AI search API key is not configured; set AI_API_KEY".to_string(),
            ));
        }
        if credential_missing(&self.settings.catalog_credential) {
            return Err(AppError::Configuration(
                "Catalog API key is not configured; set CATALOG_API_KEY".to_string(),
            ));
        }
        Ok(())
    }
}
