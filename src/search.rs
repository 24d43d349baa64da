use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use eyre::{Result, bail, eyre};
use log::{debug, info};
use serde::Deserialize;

use crate::VideoCandidate;
use crate::duration::parse_duration;

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";
const API_KEY_VAR: &str = "YOUTUBE_API_KEY";

/// Videos shorter than this rarely carry enough material for a post
pub const MIN_DURATION_SECONDS: u64 = 300;
const DESCRIPTION_CHARS: usize = 500;
const MAX_API_RESULTS: u32 = 50;

#[derive(Debug, Deserialize)]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: String,
    snippet: Snippet,
    #[serde(default)]
    statistics: Statistics,
    content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    #[serde(default)]
    description: String,
    published_at: DateTime<Utc>,
    channel_id: String,
    #[serde(default)]
    channel_title: String,
}

/// The Data API reports counts as decimal strings
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: String,
}

fn count(value: &Option<String>) -> u64 {
    value.as_deref().and_then(|v| v.parse().ok()).unwrap_or(0)
}

fn shorten_description(description: &str) -> String {
    if description.chars().count() > DESCRIPTION_CHARS {
        format!("{}...", crate::truncate_chars(description, DESCRIPTION_CHARS))
    } else {
        description.to_string()
    }
}

impl From<VideoItem> for VideoCandidate {
    fn from(item: VideoItem) -> Self {
        VideoCandidate {
            id: item.id,
            title: item.snippet.title,
            description: shorten_description(&item.snippet.description),
            published_at: item.snippet.published_at,
            channel_id: item.snippet.channel_id,
            channel_title: item.snippet.channel_title,
            duration_seconds: parse_duration(&item.content_details.duration),
            view_count: count(&item.statistics.view_count),
            like_count: count(&item.statistics.like_count),
            comment_count: count(&item.statistics.comment_count),
        }
    }
}

/// RFC 3339 lower bound for `publishedAfter`, `days_back` days before `now`
fn published_after(now: DateTime<Utc>, days_back: i64) -> Result<String> {
    if days_back < 1 {
        bail!("days_back must be at least 1 (got {days_back})");
    }
    let since = TimeDelta::try_days(days_back)
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| eyre!("days_back of {days_back} reaches before the earliest representable date"))?;
    Ok(since.to_rfc3339_opts(SecondsFormat::Secs, true))
}

fn candidates_from(videos: VideoListResponse) -> Vec<VideoCandidate> {
    videos
        .items
        .into_iter()
        .map(VideoCandidate::from)
        .filter(|v| {
            let keep = v.duration_seconds >= MIN_DURATION_SECONDS;
            if !keep {
                debug!("Skipping {} ({}s, too short)", v.id, v.duration_seconds);
            }
            keep
        })
        .collect()
}

/// YouTube Data API v3 client. Holds the credential so scoring code never sees it.
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    api_key: String,
}

impl SearchClient {
    pub fn new(http: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
        }
    }

    pub fn from_env(http: reqwest::Client) -> Result<Self> {
        let api_key = std::env::var(API_KEY_VAR)
            .map_err(|_| eyre!("{API_KEY_VAR} environment variable not set (required for video search)"))?;
        Ok(Self::new(http, api_key))
    }

    /// Search recent, medium-length HD videos on `topic`, in the API's relevance order
    pub async fn search(
        &self,
        topic: &str,
        max_results: u32,
        days_back: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<VideoCandidate>> {
        let since = published_after(now, days_back)?;
        let max_results = max_results.clamp(1, MAX_API_RESULTS).to_string();
        debug!("Searching for '{topic}' published after {since}");

        let resp = self
            .http
            .get(format!("{API_BASE}/search"))
            .query(&[
                ("part", "snippet"),
                ("q", topic),
                ("type", "video"),
                ("order", "relevance"),
                ("maxResults", max_results.as_str()),
                ("publishedAfter", since.as_str()),
                ("videoDuration", "medium"),
                ("videoDefinition", "high"),
                ("safeSearch", "moderate"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("YouTube search returned {status}: {body}");
        }
        let found: SearchListResponse = resp.json().await?;

        let ids: Vec<String> = found.items.into_iter().filter_map(|i| i.id.video_id).collect();
        if ids.is_empty() {
            info!("No videos found for '{topic}'");
            return Ok(Vec::new());
        }

        let videos: VideoListResponse = self
            .http
            .get(format!("{API_BASE}/videos"))
            .query(&[
                ("part", "snippet,statistics,contentDetails"),
                ("id", ids.join(",").as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let candidates = candidates_from(videos);
        info!("Search '{topic}': {} ids, {} candidates", ids.len(), candidates.len());
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_json(id: &str, duration: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "snippet": {
                "title": "Rust in Production",
                "description": "A talk",
                "publishedAt": "2025-08-01T10:00:00Z",
                "channelId": "UCabc",
                "channelTitle": "RustConf"
            },
            "statistics": {"viewCount": "120000", "likeCount": "4000"},
            "contentDetails": {"duration": duration}
        })
    }

    #[test]
    fn test_candidates_from_video_list() {
        let json = serde_json::json!({
            "items": [video_json("aaaaaaaaaaa", "PT12M30S"), video_json("bbbbbbbbbbb", "PT4M59S")]
        });
        let videos: VideoListResponse = serde_json::from_value(json).unwrap();
        let candidates = candidates_from(videos);

        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];
        assert_eq!(c.id, "aaaaaaaaaaa");
        assert_eq!(c.duration_seconds, 750);
        assert_eq!(c.view_count, 120_000);
        assert_eq!(c.like_count, 4_000);
        assert_eq!(c.comment_count, 0);
        assert_eq!(c.channel_title, "RustConf");
        assert_eq!(c.published_at.to_rfc3339(), "2025-08-01T10:00:00+00:00");
    }

    #[test]
    fn test_missing_statistics_default_to_zero() {
        let mut json = video_json("ccccccccccc", "PT20M");
        json.as_object_mut().unwrap().remove("statistics");
        let item: VideoItem = serde_json::from_value(json).unwrap();
        let c = VideoCandidate::from(item);
        assert_eq!(c.view_count, 0);
        assert_eq!(c.duration_seconds, 1200);
    }

    #[test]
    fn test_long_description_is_shortened() {
        let long = "x".repeat(600);
        let short = shorten_description(&long);
        assert_eq!(short.chars().count(), 503);
        assert!(short.ends_with("..."));
        assert_eq!(shorten_description("brief"), "brief");
    }

    fn fixed_now() -> DateTime<Utc> {
        use chrono::TimeZone;
        Utc.with_ymd_and_hms(2025, 8, 12, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_published_after_window() {
        assert_eq!(published_after(fixed_now(), 30).unwrap(), "2025-07-13T00:00:00Z");
        assert!(published_after(fixed_now(), 0).is_err());
        assert!(published_after(fixed_now(), -7).is_err());
        assert!(published_after(fixed_now(), 200_000_000).is_err());
        assert!(published_after(fixed_now(), i64::MAX).is_err());
    }

    #[tokio::test]
    async fn test_search_rejects_bad_window_before_any_request() {
        let client = SearchClient::new(reqwest::Client::new(), "test-key");
        let overflow = client.search("rust", 10, 200_000_000, fixed_now()).await;
        assert!(overflow.unwrap_err().to_string().contains("200000000"));
        let negative = client.search("rust", 10, -3, fixed_now()).await;
        assert!(negative.unwrap_err().to_string().contains("at least 1"));
    }

    #[test]
    fn test_search_response_skips_non_video_ids() {
        let json = serde_json::json!({
            "items": [{"id": {"videoId": "aaaaaaaaaaa"}}, {"id": {"channelId": "UCx"}}]
        });
        let resp: SearchListResponse = serde_json::from_value(json).unwrap();
        let ids: Vec<String> = resp.items.into_iter().filter_map(|i| i.id.video_id).collect();
        assert_eq!(ids, vec!["aaaaaaaaaaa".to_string()]);
    }
}
