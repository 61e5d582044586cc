use crate::cache::{channel_cache_key, keyword_cache_key, trending_cache_key, ResultCache};
use crate::client::{PlatformSearch, VideoPlatformClient};
use crate::clock::Clock;
use crate::error::{HotFinderError, Result};
use crate::filter::apply_filters;
use crate::mapper::{extract_channel_ids, extract_video_ids, map_channel_items, map_video_items};
use crate::models::{ChannelRecord, FilterConfiguration, SearchKind, VideoRecord};
use crate::preferences::Preferences;
use crate::ranking::{assign_rankings, sort_records, SortKey, SortOrder};
use crate::scoring::{annotate_hot_scores, compute_hot_score};
use log::{debug, info, warn};
use std::sync::Arc;

/// Channel lookups resolve at most this many candidates.
const MAX_CHANNEL_CANDIDATES: usize = 5;

/// Fallbacks for request hints the caller leaves out.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchDefaults {
    pub region_code: String,
    pub relevance_language: String,
    pub max_results: u32,
    pub trending_category: String,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        SearchDefaults {
            region_code: "KR".to_string(),
            relevance_language: "ko".to_string(),
            max_results: 25,
            trending_category: "0".to_string(),
        }
    }
}

/// Per-request options for video searches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOptions {
    pub filters: FilterConfiguration,
    pub sort_key: SortKey,
    pub sort_order: SortOrder,
    pub region_code: Option<String>,
    pub max_results: Option<u32>,
}

pub struct SearchOrchestrator {
    client: Arc<dyn VideoPlatformClient>,
    clock: Arc<dyn Clock>,
    defaults: SearchDefaults,
    video_cache: ResultCache<Vec<VideoRecord>>,
    channel_cache: ResultCache<Vec<ChannelRecord>>,
    preferences: Option<Arc<Preferences>>,
}

impl SearchOrchestrator {
    pub fn new(
        client: Arc<dyn VideoPlatformClient>,
        clock: Arc<dyn Clock>,
        defaults: SearchDefaults,
    ) -> Self {
        SearchOrchestrator {
            client,
            video_cache: ResultCache::new(clock.clone()),
            channel_cache: ResultCache::new(clock.clone()),
            clock,
            defaults,
            preferences: None,
        }
    }

    /// Record searches into the given preferences.
    pub fn with_preferences(mut self, preferences: Arc<Preferences>) -> Self {
        self.preferences = Some(preferences);
        self
    }

    /// Keyword search through the full pipeline: search, detail batch, map, filter,
    /// score, sort, rank.
    pub async fn search_keyword(
        &self,
        keyword: &str,
        options: &SearchOptions,
    ) -> Result<Vec<VideoRecord>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(HotFinderError::InvalidQuery(
                "keyword must not be empty".to_string(),
            ));
        }
        info!("Keyword search: '{keyword}' {:?}", options.filters);

        let region = options
            .region_code
            .clone()
            .unwrap_or_else(|| self.defaults.region_code.clone());
        let max_results = options.max_results.unwrap_or(self.defaults.max_results);

        let cache_key = keyword_cache_key(
            keyword,
            &options.filters,
            options.sort_key,
            options.sort_order,
            &region,
            max_results,
        );
        if let Some(cached) = self.video_cache.get(&cache_key) {
            debug!("Cache hit for '{cache_key}'");
            self.remember(keyword, SearchKind::Keyword);
            return Ok(cached);
        }

        let request = PlatformSearch {
            region_code: Some(region),
            relevance_language: Some(
                options
                    .filters
                    .language_filter()
                    .unwrap_or(self.defaults.relevance_language.as_str())
                    .to_string(),
            ),
            ..PlatformSearch::videos(keyword, max_results)
        };

        let search_response = self.client.search(&request).await?;
        let video_ids = extract_video_ids(&search_response)?;
        if video_ids.is_empty() {
            info!("No videos found for '{keyword}'");
            self.video_cache.set(&cache_key, Vec::new());
            self.remember(keyword, SearchKind::Keyword);
            return Ok(Vec::new());
        }

        let details = self.client.video_details(&video_ids).await?;
        let records = map_video_items(&details)?;
        let results = self.rank_pipeline(records, options)?;

        self.video_cache.set(&cache_key, results.clone());
        self.remember(keyword, SearchKind::Keyword);
        info!("Keyword search for '{keyword}' returned {} videos", results.len());
        Ok(results)
    }

    /// Resolve a channel handle (with or without `@`) to channel records.
    pub async fn search_channel(&self, handle: &str) -> Result<Vec<ChannelRecord>> {
        let handle = handle.trim();
        if handle.trim_start_matches('@').is_empty() {
            return Err(HotFinderError::InvalidQuery(
                "channel handle must not be empty".to_string(),
            ));
        }
        info!("Channel search: '{handle}'");

        let cache_key = channel_cache_key(handle);
        if let Some(cached) = self.channel_cache.get(&cache_key) {
            debug!("Cache hit for '{cache_key}'");
            self.remember(handle, SearchKind::Channel);
            return Ok(cached);
        }

        let normalized = if handle.starts_with('@') {
            handle.to_string()
        } else {
            format!("@{handle}")
        };

        let search_response = self
            .client
            .search(&PlatformSearch::channels(
                &normalized,
                MAX_CHANNEL_CANDIDATES as u32,
            ))
            .await?;
        let mut channel_ids = extract_channel_ids(&search_response)?;
        channel_ids.truncate(MAX_CHANNEL_CANDIDATES);

        if channel_ids.is_empty() {
            info!("No channels found for '{handle}'");
            self.channel_cache.set(&cache_key, Vec::new());
            self.remember(handle, SearchKind::Channel);
            return Ok(Vec::new());
        }

        let details = self.client.channel_details(&channel_ids).await?;
        let channels = map_channel_items(&details)?;

        self.channel_cache.set(&cache_key, channels.clone());
        self.remember(handle, SearchKind::Channel);
        info!("Channel search for '{handle}' returned {} channels", channels.len());
        Ok(channels)
    }

    pub async fn analyze_channel(&self, channel_id: &str) -> Result<ChannelRecord> {
        info!("Analyzing channel {channel_id}");
        let details = self
            .client
            .channel_details(&[channel_id.to_string()])
            .await?;

        map_channel_items(&details)?
            .into_iter()
            .next()
            .ok_or_else(|| HotFinderError::NotFound(format!("channel '{channel_id}'")))
    }

    /// Most-popular chart in platform order, with hot scores attached.
    pub async fn trending_videos(
        &self,
        region_code: Option<&str>,
        category_id: Option<&str>,
    ) -> Result<Vec<VideoRecord>> {
        let region = region_code.unwrap_or(self.defaults.region_code.as_str());
        let category = category_id.unwrap_or(self.defaults.trending_category.as_str());
        info!("Fetching trending videos for {region}/{category}");

        let cache_key = trending_cache_key(region, category);
        if let Some(cached) = self.video_cache.get(&cache_key) {
            debug!("Cache hit for '{cache_key}'");
            return Ok(cached);
        }

        let response = self
            .client
            .most_popular(region, category, self.defaults.max_results)
            .await?;
        let mut records = map_video_items(&response)?;
        annotate_hot_scores(&mut records, self.clock.now())?;

        self.video_cache.set(&cache_key, records.clone());
        info!("Trending fetch returned {} videos", records.len());
        Ok(records)
    }

    /// Trending videos for the options' region, run through filter, score and sort.
    pub async fn popular_videos(&self, options: &SearchOptions) -> Result<Vec<VideoRecord>> {
        let trending = self
            .trending_videos(options.region_code.as_deref(), None)
            .await?;
        self.rank_pipeline(trending, options)
    }

    pub async fn video_details(&self, video_id: &str) -> Result<Option<VideoRecord>> {
        let details = self.client.video_details(&[video_id.to_string()]).await?;
        let mut records = map_video_items(&details)?;
        if records.is_empty() {
            return Ok(None);
        }

        let mut record = records.swap_remove(0);
        match compute_hot_score(&record, self.clock.now()) {
            Ok(score) => record.hot_score = Some(score),
            Err(e) => warn!("Leaving video {video_id} unscored: {e}"),
        }
        Ok(Some(record))
    }

    /// One-result probe search. A rejected or absent key reads as `false`.
    pub async fn validate_api_key(&self) -> Result<bool> {
        match self.client.search(&PlatformSearch::videos("test", 1)).await {
            Ok(_) => Ok(true),
            Err(HotFinderError::KeyInvalid | HotFinderError::MissingCredential) => {
                warn!("API key was rejected");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Suggestions from earlier keyword searches; empty without preferences.
    pub fn search_suggestions(&self, query: &str) -> Vec<String> {
        self.preferences
            .as_ref()
            .map(|prefs| prefs.suggestions(query))
            .unwrap_or_default()
    }

    pub fn clear_cache(&self) {
        self.video_cache.clear();
        self.channel_cache.clear();
        info!("Search cache cleared");
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    fn rank_pipeline(
        &self,
        records: Vec<VideoRecord>,
        options: &SearchOptions,
    ) -> Result<Vec<VideoRecord>> {
        let now = self.clock.now();

        let mut filtered = apply_filters(&records, &options.filters, now);
        annotate_hot_scores(&mut filtered, now)?;

        let mut sorted = sort_records(&filtered, options.sort_key, options.sort_order, now);
        assign_rankings(&mut sorted);
        Ok(sorted)
    }

    fn remember(&self, query: &str, kind: SearchKind) {
        if let Some(prefs) = &self.preferences {
            if let Err(e) = prefs.record_search(query, kind) {
                warn!("Failed to record search history for '{query}': {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::VideoType;
    use crate::preferences::MemoryPreferenceStore;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::{json, Value};
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedClient {
        search: Value,
        videos: Value,
        channels: Value,
        popular: Value,
        failure: Option<HotFinderError>,
        calls: Mutex<Vec<String>>,
        searches: Mutex<Vec<PlatformSearch>>,
    }

    impl ScriptedClient {
        fn reply(&self, call: String, body: &Value) -> Result<Value> {
            self.calls.lock().unwrap().push(call);
            match &self.failure {
                Some(e) => Err(e.clone()),
                None => Ok(body.clone()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl VideoPlatformClient for ScriptedClient {
        async fn search(&self, request: &PlatformSearch) -> Result<Value> {
            self.searches.lock().unwrap().push(request.clone());
            self.reply(format!("search:{}", request.query), &self.search)
        }

        async fn video_details(&self, ids: &[String]) -> Result<Value> {
            self.reply(format!("videos:{}", ids.join(",")), &self.videos)
        }

        async fn channel_details(&self, ids: &[String]) -> Result<Value> {
            self.reply(format!("channels:{}", ids.join(",")), &self.channels)
        }

        async fn most_popular(&self, region: &str, category: &str, _max: u32) -> Result<Value> {
            self.reply(format!("popular:{region}:{category}"), &self.popular)
        }
    }

    fn start() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn video(id: &str, views: u64, likes: u64, published: &str, duration: &str, lang: &str) -> Value {
        json!({
            "id": id,
            "snippet": {
                "title": format!("Video {id}"),
                "channelTitle": "Chan",
                "publishedAt": published,
                "defaultLanguage": lang,
                "thumbnails": { "medium": { "url": format!("https://img/{id}.jpg") } }
            },
            "statistics": {
                "viewCount": views.to_string(),
                "likeCount": likes.to_string(),
                "commentCount": "100"
            },
            "contentDetails": { "duration": duration }
        })
    }

    fn keyword_client() -> ScriptedClient {
        ScriptedClient {
            search: json!({ "items": [
                { "id": { "videoId": "a" } },
                { "id": { "videoId": "b" } },
                { "id": { "videoId": "c" } }
            ]}),
            videos: json!({ "items": [
                video("a", 50_000, 1_000, "2024-06-01T02:00:00Z", "PT4M", "ko"),
                video("b", 200_000, 10_000, "2024-05-31T12:00:00Z", "PT45S", "ko"),
                video("c", 1_000, 10, "2024-06-01T11:00:00Z", "PT10M", "en")
            ]}),
            ..ScriptedClient::default()
        }
    }

    fn orchestrator(client: Arc<ScriptedClient>) -> (SearchOrchestrator, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start()));
        (
            SearchOrchestrator::new(client, clock.clone(), SearchDefaults::default()),
            clock,
        )
    }

    fn ids(records: &[VideoRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    fn hot_first() -> SearchOptions {
        SearchOptions {
            sort_key: SortKey::HotScore,
            ..SearchOptions::default()
        }
    }

    #[tokio::test]
    async fn keyword_search_scores_sorts_and_ranks() {
        let client = Arc::new(keyword_client());
        let (orchestrator, _) = orchestrator(client.clone());

        let results = orchestrator.search_keyword("rust", &hot_first()).await.unwrap();

        assert_eq!(ids(&results), vec!["b", "a", "c"]);
        let rankings: Vec<Option<usize>> = results.iter().map(|r| r.ranking).collect();
        assert_eq!(rankings, vec![Some(1), Some(2), Some(3)]);
        assert!(results.iter().all(|r| r.hot_score.is_some()));
        assert_eq!(client.calls(), vec!["search:rust", "videos:a,b,c"]);
    }

    #[tokio::test]
    async fn keyword_search_applies_filters_before_ranking() {
        let client = Arc::new(keyword_client());
        let (orchestrator, _) = orchestrator(client.clone());

        let shorts = SearchOptions {
            filters: FilterConfiguration {
                video_type: VideoType::Shorts,
                ..FilterConfiguration::default()
            },
            ..hot_first()
        };
        let results = orchestrator.search_keyword("rust", &shorts).await.unwrap();
        assert_eq!(ids(&results), vec!["b"]);
        assert_eq!(results[0].ranking, Some(1));

        let english = SearchOptions {
            filters: FilterConfiguration {
                language: Some("en".to_string()),
                ..FilterConfiguration::default()
            },
            ..hot_first()
        };
        let results = orchestrator.search_keyword("rust", &english).await.unwrap();
        assert_eq!(ids(&results), vec!["c"]);

        let searches = client.searches.lock().unwrap().clone();
        assert_eq!(searches[0].relevance_language.as_deref(), Some("ko"));
        assert_eq!(searches[1].relevance_language.as_deref(), Some("en"));
        assert_eq!(searches[0].region_code.as_deref(), Some("KR"));
    }

    #[tokio::test]
    async fn repeated_search_is_served_from_cache_until_expiry() {
        let client = Arc::new(keyword_client());
        let (orchestrator, clock) = orchestrator(client.clone());

        let first = orchestrator.search_keyword("rust", &hot_first()).await.unwrap();
        let second = orchestrator.search_keyword("rust", &hot_first()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(client.calls().len(), 2);

        // A different sort order is a different cache entry.
        let ascending = SearchOptions {
            sort_order: SortOrder::Asc,
            ..hot_first()
        };
        let reversed = orchestrator.search_keyword("rust", &ascending).await.unwrap();
        assert_eq!(ids(&reversed), vec!["c", "a", "b"]);
        assert_eq!(client.calls().len(), 4);

        clock.advance(Duration::minutes(5));
        orchestrator.search_keyword("rust", &hot_first()).await.unwrap();
        assert_eq!(client.calls().len(), 6);
    }

    #[tokio::test]
    async fn region_and_page_size_are_part_of_the_cache_key() {
        let client = Arc::new(keyword_client());
        let (orchestrator, _) = orchestrator(client.clone());

        let korea = hot_first();
        let us = SearchOptions {
            region_code: Some("US".to_string()),
            ..hot_first()
        };
        let larger_page = SearchOptions {
            max_results: Some(50),
            ..hot_first()
        };

        orchestrator.search_keyword("rust", &korea).await.unwrap();
        orchestrator.search_keyword("rust", &us).await.unwrap();
        orchestrator.search_keyword("rust", &larger_page).await.unwrap();
        orchestrator.search_keyword("rust", &us).await.unwrap();

        let searches = client.searches.lock().unwrap().clone();
        let sent: Vec<(Option<&str>, u32)> = searches
            .iter()
            .map(|s| (s.region_code.as_deref(), s.max_results))
            .collect();
        assert_eq!(sent, vec![(Some("KR"), 25), (Some("US"), 25), (Some("KR"), 50)]);
    }

    #[tokio::test]
    async fn empty_search_skips_detail_fetch() {
        let client = Arc::new(ScriptedClient {
            search: json!({ "items": [] }),
            ..ScriptedClient::default()
        });
        let (orchestrator, _) = orchestrator(client.clone());

        let results = orchestrator
            .search_keyword("nothing", &SearchOptions::default())
            .await
            .unwrap();
        assert!(results.is_empty());
        assert_eq!(client.calls(), vec!["search:nothing"]);
    }

    #[tokio::test]
    async fn blank_keyword_is_rejected_without_a_call() {
        let client = Arc::new(keyword_client());
        let (orchestrator, _) = orchestrator(client.clone());

        let result = orchestrator
            .search_keyword("   ", &SearchOptions::default())
            .await;
        assert!(matches!(result, Err(HotFinderError::InvalidQuery(_))));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn client_failures_propagate_unchanged() {
        let client = Arc::new(ScriptedClient {
            failure: Some(HotFinderError::QuotaExceeded),
            ..keyword_client()
        });
        let (orchestrator, _) = orchestrator(client);

        assert_eq!(
            orchestrator
                .search_keyword("rust", &SearchOptions::default())
                .await,
            Err(HotFinderError::QuotaExceeded)
        );
    }

    #[tokio::test]
    async fn unscorable_record_fails_the_search() {
        let client = Arc::new(ScriptedClient {
            search: json!({ "items": [{ "id": { "videoId": "x" } }] }),
            videos: json!({ "items": [{ "id": "x", "statistics": { "viewCount": "10" } }] }),
            ..ScriptedClient::default()
        });
        let (orchestrator, _) = orchestrator(client);

        let result = orchestrator
            .search_keyword("rust", &SearchOptions::default())
            .await;
        assert!(matches!(result, Err(HotFinderError::Computation(_))));
    }

    #[tokio::test]
    async fn channel_search_adds_handle_prefix() {
        let client = Arc::new(ScriptedClient {
            search: json!({ "items": [
                { "id": { "channelId": "UC1" }, "snippet": { "channelId": "UC1" } },
                { "id": { "channelId": "UC2" } }
            ]}),
            channels: json!({ "items": [
                { "id": "UC1", "snippet": { "title": "One" }, "statistics": { "subscriberCount": "10" } },
                { "id": "UC2", "snippet": { "title": "Two" }, "statistics": { "subscriberCount": "20" } }
            ]}),
            ..ScriptedClient::default()
        });
        let (orchestrator, _) = orchestrator(client.clone());

        let channels = orchestrator.search_channel("rustlang").await.unwrap();
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[1].subscriber_count, 20);

        orchestrator.search_channel("@rustlang").await.unwrap();
        assert_eq!(
            client.calls(),
            vec![
                "search:@rustlang",
                "channels:UC1,UC2",
                "search:@rustlang",
                "channels:UC1,UC2"
            ]
        );

        let searches = client.searches.lock().unwrap().clone();
        assert_eq!(searches[0].kind, crate::client::ResourceKind::Channel);
        assert_eq!(searches[0].max_results, 5);
    }

    #[tokio::test]
    async fn analyze_missing_channel_is_not_found() {
        let client = Arc::new(ScriptedClient {
            channels: json!({ "items": [] }),
            ..ScriptedClient::default()
        });
        let (orchestrator, _) = orchestrator(client);

        assert!(matches!(
            orchestrator.analyze_channel("UCnope").await,
            Err(HotFinderError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn popular_videos_filters_trending_chart() {
        let client = Arc::new(ScriptedClient {
            popular: keyword_client().videos,
            ..ScriptedClient::default()
        });
        let (orchestrator, _) = orchestrator(client.clone());

        let trending = orchestrator.trending_videos(None, None).await.unwrap();
        assert_eq!(ids(&trending), vec!["a", "b", "c"]);
        assert!(trending.iter().all(|r| r.hot_score.is_some()));

        let options = SearchOptions {
            filters: FilterConfiguration {
                min_views: Some(10_000),
                ..FilterConfiguration::default()
            },
            sort_key: SortKey::ViewCount,
            ..SearchOptions::default()
        };
        let popular = orchestrator.popular_videos(&options).await.unwrap();
        assert_eq!(ids(&popular), vec!["b", "a"]);

        // The second chart read came from cache.
        assert_eq!(client.calls(), vec!["popular:KR:0"]);
    }

    #[tokio::test]
    async fn video_details_is_none_for_unknown_id() {
        let client = Arc::new(ScriptedClient {
            videos: json!({ "items": [] }),
            ..ScriptedClient::default()
        });
        let (orchestrator, _) = orchestrator(client);
        assert_eq!(orchestrator.video_details("nope").await, Ok(None));
    }

    #[tokio::test]
    async fn searches_feed_history_and_suggestions() {
        let client = Arc::new(keyword_client());
        let clock = Arc::new(ManualClock::new(start()));
        let preferences = Arc::new(Preferences::new(
            Arc::new(MemoryPreferenceStore::new()),
            clock.clone(),
        ));
        let orchestrator =
            SearchOrchestrator::new(client, clock, SearchDefaults::default())
                .with_preferences(preferences.clone());

        orchestrator
            .search_keyword("rust async", &SearchOptions::default())
            .await
            .unwrap();
        orchestrator
            .search_keyword("rust async", &SearchOptions::default())
            .await
            .unwrap();

        assert_eq!(preferences.search_history().len(), 1);
        assert_eq!(orchestrator.search_suggestions("ASYNC"), vec!["rust async"]);
    }

    #[tokio::test]
    async fn key_validation_separates_rejection_from_outage() {
        let ok = Arc::new(keyword_client());
        assert_eq!(orchestrator(ok).0.validate_api_key().await, Ok(true));

        let rejected = Arc::new(ScriptedClient {
            failure: Some(HotFinderError::KeyInvalid),
            ..ScriptedClient::default()
        });
        assert_eq!(orchestrator(rejected).0.validate_api_key().await, Ok(false));

        let down = Arc::new(ScriptedClient {
            failure: Some(HotFinderError::Transport("connection reset".to_string())),
            ..ScriptedClient::default()
        });
        assert!(matches!(
            orchestrator(down).0.validate_api_key().await,
            Err(HotFinderError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn clear_cache_forces_refetch() {
        let client = Arc::new(keyword_client());
        let (orchestrator, _) = orchestrator(client.clone());

        orchestrator.search_keyword("rust", &hot_first()).await.unwrap();
        orchestrator.clear_cache();
        orchestrator.search_keyword("rust", &hot_first()).await.unwrap();
        assert_eq!(client.calls().len(), 4);
    }
}
