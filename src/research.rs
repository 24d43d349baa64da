//! Topic research: search, rank, select, fetch captions and digest each chosen video.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use eyre::Result;
use log::{debug, info, warn};
use serde::Serialize;

use crate::cache::TranscriptCache;
use crate::duration::format_duration;
use crate::relevance::{self, RankedVideo};
use crate::search::SearchClient;
use crate::summarize::{self, Digest};
use crate::{Transcript, youtube};

pub const DEFAULT_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone)]
pub struct ResearchOptions {
    pub lang: String,
    pub max_results: u32,
    pub days_back: i64,
    pub max_videos: usize,
    pub max_summary_length: usize,
    pub attempts: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResearchedVideo {
    #[serde(flatten)]
    pub ranked: RankedVideo,
    pub url: String,
    pub duration_formatted: String,
    pub digest: Digest,
}

/// Outcome of researching a topic. Empty or failed searches are `NoContent`, never an error,
/// so the caller can skip the topic or retry with a broader query.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Research {
    Found {
        query: String,
        searched_at: DateTime<Utc>,
        total_found: usize,
        videos: Vec<ResearchedVideo>,
    },
    NoContent {
        query: String,
        reason: String,
    },
}

/// Retry an async operation with exponential backoff
pub async fn retry<F, Fut, T>(max_attempts: u32, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(e) if attempt + 1 >= max_attempts => return Err(e),
            Err(e) => {
                let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                debug!("Attempt {} failed: {e}, retrying in {delay:?}", attempt + 1);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// Keep the `max` best ranked videos
pub fn select(mut ranked: Vec<RankedVideo>, max: usize) -> Vec<RankedVideo> {
    ranked.truncate(max);
    ranked
}

/// Fetch captions, consulting the cache first when one is supplied
pub async fn fetch_transcript(
    http: &reqwest::Client,
    cache: Option<&TranscriptCache>,
    video_id: &str,
    lang: &str,
    attempts: u32,
) -> Result<Transcript> {
    if let Some(hit) = cache.and_then(|c| c.load(video_id, lang)) {
        return Ok(hit);
    }
    let transcript = retry(attempts, || youtube::fetch_captions(http, video_id, lang)).await?;
    if let Some(cache) = cache {
        if let Err(e) = cache.store(&transcript, lang) {
            warn!("Could not cache transcript for {video_id}: {e}");
        }
    }
    Ok(transcript)
}

/// Digest every selected video, routing fetch failures into the description fallback
pub fn assemble(
    query: &str,
    searched_at: DateTime<Utc>,
    total_found: usize,
    fetched: Vec<(RankedVideo, Result<Transcript>)>,
    max_summary_length: usize,
) -> Research {
    let videos = fetched
        .into_iter()
        .map(|(ranked, transcript)| {
            let digest = summarize::digest_or_fallback(transcript, &ranked.video.description, max_summary_length);
            ResearchedVideo {
                url: ranked.video.url(),
                duration_formatted: format_duration(ranked.video.duration_seconds),
                ranked,
                digest,
            }
        })
        .collect();
    Research::Found {
        query: query.to_string(),
        searched_at,
        total_found,
        videos,
    }
}

pub async fn research(
    http: &reqwest::Client,
    search: &SearchClient,
    cache: Option<&TranscriptCache>,
    topic: &str,
    opts: &ResearchOptions,
    now: DateTime<Utc>,
) -> Research {
    let candidates = match retry(opts.attempts, || search.search(topic, opts.max_results, opts.days_back, now)).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Search for '{topic}' failed: {e}");
            return Research::NoContent {
                query: topic.to_string(),
                reason: format!("search failed: {e}"),
            };
        }
    };
    if candidates.is_empty() {
        return Research::NoContent {
            query: topic.to_string(),
            reason: "no videos matched the search filters".to_string(),
        };
    }

    let total_found = candidates.len();
    let selected = select(relevance::rank(candidates, topic, now), opts.max_videos);
    info!("Researching {} of {total_found} videos for '{topic}'", selected.len());

    let mut fetched = Vec::with_capacity(selected.len());
    for ranked in selected {
        let transcript = fetch_transcript(http, cache, &ranked.video.id, &opts.lang, opts.attempts).await;
        if let Err(ref e) = transcript {
            info!("No transcript for {}: {e}", ranked.video.id);
        }
        fetched.push((ranked, transcript));
    }

    assemble(topic, now, total_found, fetched, opts.max_summary_length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarize::SourceType;
    use crate::{Segment, TranscriptSource, VideoCandidate};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 12, 0, 0, 0).unwrap()
    }

    fn ranked(id: &str, score: f64, description: &str) -> RankedVideo {
        RankedVideo {
            video: VideoCandidate {
                id: id.to_string(),
                title: format!("Video {id}"),
                description: description.to_string(),
                published_at: now(),
                channel_id: "UC1".to_string(),
                channel_title: "Chan".to_string(),
                duration_seconds: 905,
                view_count: 1,
                like_count: 0,
                comment_count: 0,
            },
            relevance_score: score,
        }
    }

    #[test]
    fn test_select_keeps_top_n() {
        let picked = select(vec![ranked("a", 3.0, ""), ranked("b", 2.0, ""), ranked("c", 1.0, "")], 2);
        let ids: Vec<&str> = picked.iter().map(|r| r.video.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(select(Vec::new(), 3).is_empty());
    }

    #[test]
    fn test_assemble_mixes_transcripts_and_fallbacks() {
        let transcript = Transcript {
            video_id: "a".to_string(),
            title: "Video a".to_string(),
            description: String::new(),
            language: "en".to_string(),
            source: TranscriptSource::Manual,
            segments: vec![Segment {
                text: "The key idea is ownership.".to_string(),
                start: 0.0,
                duration: 4.0,
            }],
        };
        let fetched = vec![
            (ranked("a", 50.0, "desc a"), Ok(transcript)),
            (ranked("b", 40.0, ""), Err(eyre::eyre!("captions disabled"))),
        ];

        let Research::Found { videos, total_found, .. } = assemble("rust", now(), 7, fetched, 1000) else {
            panic!("expected found");
        };
        assert_eq!(total_found, 7);
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].digest.source_type, SourceType::Manual);
        assert_eq!(videos[0].duration_formatted, "15:05");
        assert_eq!(videos[0].url, "https://www.youtube.com/watch?v=a");
        assert_eq!(videos[1].digest.source_type, SourceType::DescriptionFallback);
        assert_eq!(videos[1].digest.quality.score, 0);
        assert!(!videos[1].digest.quality.recommended_for_blog);
    }

    #[test]
    fn test_research_serializes_with_status_tag() {
        let none = Research::NoContent {
            query: "obscure".to_string(),
            reason: "no videos matched the search filters".to_string(),
        };
        let json = serde_json::to_value(&none).unwrap();
        assert_eq!(json["status"], "no-content");
        assert_eq!(json["query"], "obscure");

        let found = assemble("rust", now(), 1, vec![(ranked("a", 1.0, "d"), Err(eyre::eyre!("x")))], 100);
        let json = serde_json::to_value(&found).unwrap();
        assert_eq!(json["status"], "found");
        assert_eq!(json["videos"][0]["id"], "a");
        assert_eq!(json["videos"][0]["relevance_score"], 1.0);
        assert_eq!(json["videos"][0]["digest"]["sourceType"], "description-fallback");
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_attempts() {
        let calls = std::cell::Cell::new(0);
        let result: Result<()> = retry(2, || {
            calls.set(calls.get() + 1);
            async { Err(eyre::eyre!("nope")) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn test_retry_returns_first_success() {
        let result = retry(3, || async { Ok::<_, eyre::Report>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }
}
