pub mod cache;
pub mod config;
pub mod duration;
pub mod output;
pub mod quality;
pub mod relevance;
pub mod research;
pub mod search;
pub mod seo;
pub mod structure;
pub mod summarize;
pub mod youtube;

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A single captioned segment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// Kind of caption track the transcript came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TranscriptSource {
    Manual,
    AutoGenerated,
}

/// Complete transcript for a video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub video_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub language: String,
    pub source: TranscriptSource,
    pub segments: Vec<Segment>,
}

impl std::fmt::Display for TranscriptSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptSource::Manual => write!(f, "manual"),
            TranscriptSource::AutoGenerated => write!(f, "auto-generated"),
        }
    }
}

/// A video returned by search, with the statistics used for ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoCandidate {
    pub id: String,
    pub title: String,
    pub description: String,
    pub published_at: DateTime<Utc>,
    pub channel_id: String,
    #[serde(default)]
    pub channel_title: String,
    pub duration_seconds: u64,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
}

impl VideoCandidate {
    pub fn url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }
}

static VIDEO_ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^([a-zA-Z0-9_-]{11})$",
        r"youtube\.com/watch\?.*v=([a-zA-Z0-9_-]{11})",
        r"youtu\.be/([a-zA-Z0-9_-]{11})",
        r"youtube\.com/embed/([a-zA-Z0-9_-]{11})",
        r"youtube\.com/shorts/([a-zA-Z0-9_-]{11})",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Extract video ID from a bare ID or any of the common YouTube URL shapes
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    VIDEO_ID_PATTERNS
        .iter()
        .find_map(|re| re.captures(input).map(|caps| caps[1].to_string()))
}

/// Truncate to at most `max` chars without splitting a code point
pub(crate) fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Truncate to at most `max` chars, backing off to the last space when one exists
pub(crate) fn truncate_at_word(s: &str, max: usize) -> &str {
    let cut = truncate_chars(s, max);
    if cut.len() == s.len() {
        return cut;
    }
    match cut.rfind(' ') {
        Some(idx) if idx > 0 => cut[..idx].trim_end(),
        _ => cut,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id_shapes() {
        let id = "dQw4w9WgXcQ";
        for input in [
            "dQw4w9WgXcQ",
            "  dQw4w9WgXcQ\n",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=120",
            "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
        ] {
            assert_eq!(extract_video_id(input).as_deref(), Some(id), "{input}");
        }
    }

    #[test]
    fn test_extract_video_id_rejects_garbage() {
        for input in ["", "not-a-valid-id", "https://vimeo.com/123456789"] {
            assert_eq!(extract_video_id(input), None, "{input}");
        }
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_truncate_at_word() {
        assert_eq!(truncate_at_word("hello brave new world", 14), "hello brave");
        assert_eq!(truncate_at_word("short", 10), "short");
        assert_eq!(truncate_at_word("unbroken", 4), "unbr");
    }

    #[test]
    fn test_transcript_source_display() {
        assert_eq!(TranscriptSource::Manual.to_string(), "manual");
        assert_eq!(TranscriptSource::AutoGenerated.to_string(), "auto-generated");
    }
}
