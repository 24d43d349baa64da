//! Reduce a transcript to a bounded digest of summary, insights, topics, quotes and statistics.
//!
//! Every entry point returns a `Digest`; fetch failures and unusable transcripts fall back to
//! the video description instead of surfacing an error.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;
use serde::Serialize;

use crate::quality::{self, QualityReport};
use crate::structure::{split_sentences, split_sentences_with_endings};
use crate::{Segment, Transcript, TranscriptSource, truncate_at_word, truncate_chars};

pub const DEFAULT_MAX_SUMMARY_LENGTH: usize = 1000;

const MAX_INSIGHTS: usize = 5;
const MAX_TOPICS: usize = 10;
const MAX_QUOTES: usize = 3;
const MAX_STATISTICS: usize = 5;
const INSIGHT_MAX_CHARS: usize = 200;
const STATISTIC_CONTEXT_CHARS: usize = 50;

const INSIGHT_KEYWORDS: &[&str] = &[
    "important",
    "key",
    "tip",
    "mistake",
    "remember",
    "crucial",
    "essential",
    "secret",
    "avoid",
    "recommend",
    "best practice",
    "lesson",
];

const QUOTE_INDICATORS: &[&str] = &[
    "\"",
    "\u{201c}",
    "i believe",
    "in my opinion",
    "i think",
    "the truth is",
    "as they say",
    "according to",
];

const SUMMARY_SIGNALS: &[&str] = &[
    "important",
    "key",
    "main",
    "essential",
    "summary",
    "conclusion",
    "overall",
    "first",
    "finally",
    "remember",
    "because",
    "therefore",
];

const STOP_WORDS: &[&str] = &[
    "that", "this", "with", "have", "from", "they", "will", "what", "when", "your", "there",
    "their", "about", "would", "which", "were", "been", "just", "like", "into", "than", "then",
    "them", "these", "those", "some", "more", "very", "also", "only", "even", "because", "could",
    "should", "really", "going", "want", "know", "here", "where", "while", "other", "thing",
    "things", "make", "does", "doing", "well", "yeah", "okay", "right", "gonna", "actually",
    "something", "over", "much", "many", "need", "think", "said", "says", "being", "after",
    "before", "through", "same", "each", "every", "always", "never",
];

static ANNOTATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\]]*\]").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static TOPIC_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[a-z]{4,}\b").unwrap());
static STATISTIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)\$\d[\d,]*(?:\.\d+)?(?:\s*(?:million|billion|thousand|k)\b)?",
        r"|\b\d+(?:\.\d+)?\s*%",
        r"|\b\d+(?:\.\d+)?\s*(?:percent|million|billion|thousand|years?|months?|weeks?|days?|hours?|times)\b",
    ))
    .unwrap()
});

/// Where a digest's content came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceType {
    Manual,
    AutoGenerated,
    DescriptionFallback,
    ErrorFallback,
}

impl From<TranscriptSource> for SourceType {
    fn from(source: TranscriptSource) -> Self {
        match source {
            TranscriptSource::Manual => SourceType::Manual,
            TranscriptSource::AutoGenerated => SourceType::AutoGenerated,
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceType::Manual => write!(f, "manual"),
            SourceType::AutoGenerated => write!(f, "auto-generated"),
            SourceType::DescriptionFallback => write!(f, "description-fallback"),
            SourceType::ErrorFallback => write!(f, "error-fallback"),
        }
    }
}

/// Condensed representation of one video's spoken content
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Digest {
    pub summary: String,
    pub word_count: usize,
    pub duration_seconds: f64,
    pub key_insights: Vec<String>,
    pub topics: Vec<String>,
    pub quotes: Vec<String>,
    pub statistics: Vec<String>,
    pub source_type: SourceType,
    pub quality: QualityReport,
}

/// Build a digest from a fetch result, falling back to `description` when the fetch failed
/// or produced no usable text.
pub fn digest_or_fallback(fetched: eyre::Result<Transcript>, description: &str, max_summary_length: usize) -> Digest {
    match fetched {
        Ok(transcript) => {
            let description = if description.trim().is_empty() {
                transcript.description.as_str()
            } else {
                description
            };
            let text = clean_text(&transcript.segments);
            if text.is_empty() {
                warn!("Transcript for {} has no usable text, using description", transcript.video_id);
                return digest_from_description(description, SourceType::ErrorFallback, max_summary_length);
            }
            digest_segments(&transcript.segments, transcript.source.into(), max_summary_length)
        }
        Err(e) => {
            debug!("Transcript unavailable ({e}), using description");
            digest_from_description(description, SourceType::DescriptionFallback, max_summary_length)
        }
    }
}

fn joined_text(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_annotations(text: &str) -> String {
    let stripped = ANNOTATION.replace_all(text, "");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

/// Join segment texts, drop bracketed annotations and collapse whitespace
pub fn clean_text(segments: &[Segment]) -> String {
    strip_annotations(&joined_text(segments))
}

/// Digest an ordered segment sequence. `word_count` covers the raw captions, annotations included.
pub fn digest_segments(segments: &[Segment], source_type: SourceType, max_summary_length: usize) -> Digest {
    let raw_text = joined_text(segments);
    let full_text = strip_annotations(&raw_text);
    let sentences = split_sentences(&full_text);
    let duration_seconds = segments.last().map(|s| s.start + s.duration).unwrap_or(0.0);

    Digest {
        summary: build_summary(&split_sentences_with_endings(&full_text), max_summary_length),
        word_count: raw_text.split_whitespace().count(),
        duration_seconds,
        key_insights: extract_insights(&sentences),
        topics: extract_topics(&full_text),
        quotes: extract_quotes(&sentences),
        statistics: extract_statistics(&full_text),
        source_type,
        quality: quality::assess(segments),
    }
}

/// Digest built from a video description alone
pub fn digest_from_description(description: &str, source_type: SourceType, max_summary_length: usize) -> Digest {
    let description = description.trim();
    let key_insights = description
        .lines()
        .map(str::trim)
        .filter(|line| {
            let len = line.chars().count();
            (20..=200).contains(&len) && !line.starts_with("http")
        })
        .take(MAX_INSIGHTS)
        .map(str::to_string)
        .collect();

    let word_count = description.split_whitespace().count();
    let quality = if description.is_empty() {
        QualityReport::fixed(0, 0, "No transcript or description available")
    } else {
        QualityReport::fixed(50, word_count, "No transcript available, digest built from description")
    };

    Digest {
        summary: truncate_chars(description, max_summary_length).to_string(),
        word_count,
        duration_seconds: 0.0,
        key_insights,
        topics: Vec::new(),
        quotes: Vec::new(),
        statistics: Vec::new(),
        source_type,
        quality,
    }
}

fn extract_insights(sentences: &[&str]) -> Vec<String> {
    sentences
        .iter()
        .filter(|s| s.chars().count() >= 20)
        .filter(|s| {
            let lower = s.to_lowercase();
            INSIGHT_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .take(MAX_INSIGHTS)
        .map(|s| truncate_chars(s, INSIGHT_MAX_CHARS).to_string())
        .collect()
}

fn extract_topics(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let stop: HashSet<&str> = STOP_WORDS.iter().copied().collect();

    // first-seen order is kept so the stable sort breaks ties by encounter
    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for m in TOPIC_WORD.find_iter(&lower) {
        let word = m.as_str();
        if stop.contains(word) {
            continue;
        }
        match index.get(word) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(word, counts.len());
                counts.push((word, 1));
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(MAX_TOPICS)
        .map(|(w, _)| w.to_string())
        .collect()
}

fn extract_quotes(sentences: &[&str]) -> Vec<String> {
    sentences
        .iter()
        .filter(|s| (30..=150).contains(&s.chars().count()))
        .filter(|s| {
            let lower = s.to_lowercase();
            QUOTE_INDICATORS.iter().any(|q| lower.contains(q))
        })
        .take(MAX_QUOTES)
        .map(|s| s.to_string())
        .collect()
}

fn extract_statistics(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut stats = Vec::new();
    for m in STATISTIC.find_iter(text) {
        let start = text[..m.start()]
            .char_indices()
            .rev()
            .nth(STATISTIC_CONTEXT_CHARS - 1)
            .map(|(i, _)| i)
            .unwrap_or(0);
        let end = text[m.end()..]
            .char_indices()
            .nth(STATISTIC_CONTEXT_CHARS)
            .map(|(i, _)| m.end() + i)
            .unwrap_or(text.len());
        let context = text[start..end].trim().to_string();
        if seen.insert(context.clone()) {
            stats.push(context);
            if stats.len() == MAX_STATISTICS {
                break;
            }
        }
    }
    stats
}

fn sentence_score(index: usize, total: usize, sentence: &str) -> usize {
    let mut score = 0;
    let position = index as f64;
    if position < total as f64 * 0.2 {
        score += 2;
    }
    if position >= total as f64 * 0.8 {
        score += 1;
    }
    let lower = sentence.to_lowercase();
    score + SUMMARY_SIGNALS.iter().filter(|w| lower.contains(*w)).count()
}

fn build_summary(sentences: &[&str], max_len: usize) -> String {
    let total = sentences.len();
    let mut scored: Vec<(usize, &str)> = sentences
        .iter()
        .enumerate()
        .map(|(i, s)| (sentence_score(i, total, s), *s))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let mut summary = String::new();
    let mut len = 0;
    for (_, sentence) in &scored {
        let piece = if sentence.ends_with(['.', '!', '?']) {
            sentence.to_string()
        } else {
            format!("{sentence}.")
        };
        let added = piece.chars().count() + usize::from(!summary.is_empty());
        if len + added > max_len {
            break;
        }
        if !summary.is_empty() {
            summary.push(' ');
        }
        summary.push_str(&piece);
        len += added;
    }

    // unpunctuated captions can form one sentence longer than the whole budget
    if summary.is_empty() {
        if let Some((_, top)) = scored.first() {
            summary = truncate_at_word(top, max_len).to_string();
        }
    }
    summary
}
