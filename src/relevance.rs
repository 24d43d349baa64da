use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::VideoCandidate;

const TITLE_WEIGHT: f64 = 40.0;
const POPULARITY_CAP: f64 = 20.0;
const ENGAGEMENT_CAP: f64 = 20.0;

/// Individual contributions to a relevance score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub title_match: f64,
    pub popularity: f64,
    pub engagement: f64,
    pub duration_fit: f64,
    pub recency: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.title_match + self.popularity + self.engagement + self.duration_fit + self.recency
    }
}

/// A candidate paired with its relevance score
#[derive(Debug, Clone, Serialize)]
pub struct RankedVideo {
    #[serde(flatten)]
    pub video: VideoCandidate,
    pub relevance_score: f64,
}

/// Score every component for `video` against `query` as of `now`
pub fn breakdown(video: &VideoCandidate, query: &str, now: DateTime<Utc>) -> ScoreBreakdown {
    ScoreBreakdown {
        title_match: title_match(&video.title, query),
        popularity: popularity(video.view_count),
        engagement: engagement(video.view_count, video.like_count, video.comment_count),
        duration_fit: duration_fit(video.duration_seconds),
        recency: recency(video.published_at, now),
    }
}

pub fn score(video: &VideoCandidate, query: &str, now: DateTime<Utc>) -> f64 {
    breakdown(video, query, now).total()
}

/// Rank candidates by descending score. Equal scores keep fetch order.
pub fn rank(candidates: Vec<VideoCandidate>, query: &str, now: DateTime<Utc>) -> Vec<RankedVideo> {
    let mut ranked: Vec<RankedVideo> = candidates
        .into_iter()
        .map(|video| {
            let relevance_score = score(&video, query, now);
            RankedVideo { video, relevance_score }
        })
        .collect();
    ranked.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    ranked
}

fn title_match(title: &str, query: &str) -> f64 {
    let title = title.to_lowercase();
    let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
    if terms.is_empty() {
        return 0.0;
    }
    let matched = terms.iter().filter(|t| title.contains(t.as_str())).count();
    matched as f64 / terms.len() as f64 * TITLE_WEIGHT
}

fn popularity(views: u64) -> f64 {
    if views > 10_000 {
        (views as f64 / 50_000.0).min(POPULARITY_CAP)
    } else {
        0.0
    }
}

fn engagement(views: u64, likes: u64, comments: u64) -> f64 {
    if views == 0 {
        return 0.0;
    }
    let rate = (likes as f64 + 2.0 * comments as f64) / views as f64;
    (rate * 1_000_000.0).min(ENGAGEMENT_CAP)
}

fn duration_fit(seconds: u64) -> f64 {
    match seconds {
        600..=1800 => 10.0,
        300..=599 => 7.0,
        s if s > 1800 => 5.0,
        _ => 0.0,
    }
}

fn recency(published_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let days_old = (now - published_at).num_days();
    if days_old <= 7 {
        10.0
    } else if days_old <= 30 {
        5.0
    } else {
        0.0
    }
}
