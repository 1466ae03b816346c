use chrono::{DateTime, Duration, Utc};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};

use crate::{
    error::{AppError, AppResult},
    models::{ContentItem, ContentKind, EnrichedCandidate, HistoryEntry, Preferences, Provenance,
        Rating},
};

/// Raw content row as stored; kind and source are TEXT columns
#[derive(Debug, FromRow)]
struct ContentItemRow {
    id: i64,
    catalog_id: Option<i64>,
    title: String,
    kind: String,
    poster_url: Option<String>,
    backdrop_url: Option<String>,
    stream_url: Option<String>,
    overview: Option<String>,
    release_year: Option<i32>,
    runtime_minutes: Option<i32>,
    season_count: Option<i32>,
    episode_count: Option<i32>,
    genre: Option<String>,
    source: String,
    in_library: bool,
    watch_count: i32,
    created_at: DateTime<Utc>,
    last_watched_at: Option<DateTime<Utc>>,
}

impl From<ContentItemRow> for ContentItem {
    fn from(row: ContentItemRow) -> Self {
        ContentItem {
            id: row.id,
            catalog_id: row.catalog_id,
            title: row.title,
            kind: ContentKind::parse(&row.kind),
            poster_url: row.poster_url,
            backdrop_url: row.backdrop_url,
            stream_url: row.stream_url,
            overview: row.overview,
            release_year: row.release_year,
            runtime_minutes: row.runtime_minutes,
            season_count: row.season_count,
            episode_count: row.episode_count,
            genre: row.genre,
            source: Provenance::parse(&row.source),
            in_library: row.in_library,
            watch_count: row.watch_count,
            created_at: row.created_at,
            last_watched_at: row.last_watched_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct RatingRow {
    content_id: i64,
    score: i32,
    rated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct HistoryRow {
    title_key: String,
    shown_count: i32,
    last_shown_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct PreferencesRow {
    recommendations_per_type: i32,
    watch_region: String,
}

/// Fields for a manually entered content item
#[derive(Debug, Clone)]
pub struct NewItem {
    pub title: String,
    pub kind: ContentKind,
    pub stream_url: Option<String>,
    pub overview: Option<String>,
    pub release_year: Option<i32>,
    pub genre: Option<String>,
}

const ITEM_COLUMNS: &str = "id, catalog_id, title, kind, poster_url, backdrop_url, stream_url, \
     overview, release_year, runtime_minutes, season_count, episode_count, genre, source, \
     in_library, watch_count, created_at, last_watched_at";

/// Conflict target for a discovered insert
///
/// With a catalog id the unique catalog column dedupes; a bare record has
/// none, so it falls back to the partial title index on discovered rows.
fn discovered_conflict_clause(candidate: &EnrichedCandidate) -> &'static str {
    if candidate.catalog_id.is_some() {
        "ON CONFLICT (catalog_id) DO NOTHING"
    } else {
        "ON CONFLICT (lower(title), kind) \
         WHERE catalog_id IS NULL AND source = 'recommendation' DO NOTHING"
    }
}

/// Access to the persistent store
///
/// The pool is optional: when the database is unreachable every read
/// degrades to an empty/default result and every write returns
/// `StorageUnavailable`, so the process keeps serving.
#[derive(Clone)]
pub struct Store {
    pool: Option<PgPool>,
}

impl Store {
    /// Connects to PostgreSQL and applies migrations
    ///
    /// Connection failure yields a degraded store rather than an error.
    pub async fn connect(database_url: &str) -> Self {
        let pool = match PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
        {
            Ok(pool) => pool,
            Err(e) => {
                tracing::warn!(error = %e, "Database unreachable; running with degraded storage");
                return Self { pool: None };
            }
        };

        if let Err(e) = sqlx::migrate!().run(&pool).await {
            tracing::warn!(error = %e, "Migration failed; running with degraded storage");
            return Self { pool: None };
        }

        Self { pool: Some(pool) }
    }

    /// A store with no backing database; all reads are empty
    pub fn disconnected() -> Self {
        Self { pool: None }
    }

    pub fn is_connected(&self) -> bool {
        self.pool.is_some()
    }

    fn require_pool(&self) -> AppResult<&PgPool> {
        self.pool.as_ref().ok_or(AppError::StorageUnavailable)
    }

    // ---- reads (degrade to empty/default) ----

    /// Items the user has saved to their library
    pub async fn library_items(&self) -> Vec<ContentItem> {
        self.fetch_items(&format!(
            "SELECT {ITEM_COLUMNS} FROM content_items WHERE in_library = TRUE \
             ORDER BY created_at DESC"
        ))
        .await
    }

    /// Every item known to the system
    pub async fn all_items(&self) -> Vec<ContentItem> {
        self.fetch_items(&format!(
            "SELECT {ITEM_COLUMNS} FROM content_items ORDER BY created_at DESC"
        ))
        .await
    }

    async fn fetch_items(&self, sql: &str) -> Vec<ContentItem> {
        let Some(pool) = &self.pool else {
            return Vec::new();
        };

        match sqlx::query_as::<_, ContentItemRow>(sql).fetch_all(pool).await {
            Ok(rows) => rows.into_iter().map(ContentItem::from).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Content read failed; treating as empty");
                Vec::new()
            }
        }
    }

    pub async fn get_item(&self, id: i64) -> Option<ContentItem> {
        let pool = self.pool.as_ref()?;

        match sqlx::query_as::<_, ContentItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM content_items WHERE id = $1"
        ))
        .bind(id)
            .fetch_optional(pool)
            .await
        {
            Ok(row) => row.map(ContentItem::from),
            Err(e) => {
                tracing::warn!(error = %e, item_id = id, "Item read failed");
                None
            }
        }
    }

    /// Current ratings, one per content item
    pub async fn ratings(&self) -> Vec<Rating> {
        let Some(pool) = &self.pool else {
            return Vec::new();
        };

        match sqlx::query_as::<_, RatingRow>("SELECT content_id, score, rated_at FROM ratings")
            .fetch_all(pool)
            .await
        {
            Ok(rows) => rows
                .into_iter()
                .map(|r| Rating {
                    content_id: r.content_id,
                    score: r.score,
                    rated_at: r.rated_at,
                })
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Ratings read failed; treating as empty");
                Vec::new()
            }
        }
    }

    pub async fn preferences(&self) -> Preferences {
        let Some(pool) = &self.pool else {
            return Preferences::default();
        };

        match sqlx::query_as::<_, PreferencesRow>(
            "SELECT recommendations_per_type, watch_region FROM preferences WHERE id = 1",
        )
        .fetch_optional(pool)
        .await
        {
            Ok(Some(row)) => Preferences {
                recommendations_per_type: row.recommendations_per_type,
                watch_region: row.watch_region,
            },
            Ok(None) => Preferences::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Preferences read failed; using defaults");
                Preferences::default()
            }
        }
    }

    /// History entries shown within the trailing window
    pub async fn recent_history(&self, window_days: i64) -> Vec<HistoryEntry> {
        let Some(pool) = &self.pool else {
            return Vec::new();
        };

        let cutoff = Utc::now() - Duration::days(window_days);

        match sqlx::query_as::<_, HistoryRow>(
            "SELECT title_key, shown_count, last_shown_at FROM recommendation_history \
             WHERE last_shown_at > $1",
        )
        .bind(cutoff)
        .fetch_all(pool)
        .await
        {
            Ok(rows) => rows
                .into_iter()
                .map(|r| HistoryEntry {
                    title_key: r.title_key,
                    shown_count: r.shown_count,
                    last_shown_at: r.last_shown_at,
                })
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "History read failed; treating as empty");
                Vec::new()
            }
        }
    }

    // ---- writes (error without a pool) ----

    /// Inserts a manually entered item, outside the library by default
    pub async fn insert_manual_item(&self, item: NewItem) -> AppResult<ContentItem> {
        let pool = self.require_pool()?;

        let row = sqlx::query_as::<_, ContentItemRow>(&format!(
            "INSERT INTO content_items \
             (title, kind, stream_url, overview, release_year, genre, source) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(&item.title)
        .bind(item.kind.as_str())
        .bind(&item.stream_url)
        .bind(&item.overview)
        .bind(item.release_year)
        .bind(&item.genre)
        .bind(Provenance::Manual.as_str())
        .fetch_one(pool)
        .await?;

        Ok(row.into())
    }

    /// Sets or clears library membership; returns false when the item is unknown
    pub async fn set_library(&self, id: i64, in_library: bool) -> AppResult<bool> {
        let pool = self.require_pool()?;

        let result = sqlx::query("UPDATE content_items SET in_library = $2 WHERE id = $1")
            .bind(id)
            .bind(in_library)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Bumps the watch count and stamps the watch time
    pub async fn mark_watched(&self, id: i64) -> AppResult<bool> {
        let pool = self.require_pool()?;

        let result = sqlx::query(
            "UPDATE content_items SET watch_count = watch_count + 1, last_watched_at = now() \
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Writes the current rating for an item; latest write wins
    pub async fn upsert_rating(&self, content_id: i64, score: i32) -> AppResult<()> {
        let pool = self.require_pool()?;

        sqlx::query(
            "INSERT INTO ratings (content_id, score) VALUES ($1, $2) \
             ON CONFLICT (content_id) DO UPDATE SET score = EXCLUDED.score, rated_at = now()",
        )
        .bind(content_id)
        .bind(score)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Persists a discovered candidate outside the library
    ///
    /// Idempotent: a known catalog id leaves the existing row untouched,
    /// and a bare record (no catalog match) dedupes on its title text.
    pub async fn save_discovered(&self, candidate: &EnrichedCandidate) -> AppResult<()> {
        let pool = self.require_pool()?;

        sqlx::query(&format!(
            "INSERT INTO content_items \
             (catalog_id, title, kind, poster_url, backdrop_url, stream_url, overview, \
              release_year, runtime_minutes, season_count, episode_count, genre, source) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             {}",
            discovered_conflict_clause(candidate)
        ))
        .bind(candidate.catalog_id)
        .bind(&candidate.title)
        .bind(candidate.kind.as_str())
        .bind(&candidate.poster_url)
        .bind(&candidate.backdrop_url)
        .bind(candidate.watch_urls.first())
        .bind(&candidate.overview)
        .bind(candidate.release_year)
        .bind(candidate.runtime_minutes)
        .bind(candidate.season_count)
        .bind(candidate.episode_count)
        .bind(&candidate.genre)
        .bind(Provenance::Recommendation.as_str())
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Upserts a recommendation-history entry keyed by lowercase title
    pub async fn record_shown(&self, title: &str) -> AppResult<()> {
        let pool = self.require_pool()?;

        sqlx::query(
            "INSERT INTO recommendation_history (title_key) VALUES (lower($1)) \
             ON CONFLICT (title_key) DO UPDATE \
             SET shown_count = recommendation_history.shown_count + 1, last_shown_at = now()",
        )
        .bind(title)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn save_preferences(&self, prefs: &Preferences) -> AppResult<()> {
        let pool = self.require_pool()?;

        sqlx::query(
            "INSERT INTO preferences (id, recommendations_per_type, watch_region) \
             VALUES (1, $1, $2) \
             ON CONFLICT (id) DO UPDATE \
             SET recommendations_per_type = EXCLUDED.recommendations_per_type, \
                 watch_region = EXCLUDED.watch_region",
        )
        .bind(prefs.recommendations_per_type)
        .bind(&prefs.watch_region)
        .execute(pool)
        .await?;

        Ok(())
    }
}
