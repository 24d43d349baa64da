use std::collections::HashSet;

use serde::Serialize;

use crate::Segment;

/// Minimum score at which a transcript is considered usable for drafting
pub const RECOMMENDED_THRESHOLD: u32 = 50;

const SHORT_SEGMENT_CHARS: usize = 10;
const FILLER_MARKERS: &[&str] = &["[music]", "[applause]", "[inaudible]", "um,", "uh,", "..."];

/// How usable a transcript is as source material
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub score: u32,
    pub word_count: usize,
    pub segment_count: usize,
    pub issues: Vec<String>,
    pub recommended_for_blog: bool,
}

impl QualityReport {
    pub(crate) fn fixed(score: u32, word_count: usize, issue: &str) -> Self {
        Self {
            score,
            word_count,
            segment_count: 0,
            issues: vec![issue.to_string()],
            recommended_for_blog: score >= RECOMMENDED_THRESHOLD,
        }
    }
}

/// Score a raw segment sequence, starting at 100 and subtracting per detected problem
pub fn assess(segments: &[Segment]) -> QualityReport {
    if segments.is_empty() {
        return QualityReport::fixed(0, 0, "No transcript data");
    }

    let mut issues = Vec::new();
    let mut score: i32 = 100;

    let short = segments
        .iter()
        .filter(|s| s.text.chars().count() < SHORT_SEGMENT_CHARS)
        .count();
    if short as f64 > segments.len() as f64 * 0.3 {
        issues.push("Many short transcript segments detected".to_string());
        score -= 20;
    }

    let text = segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    let words: Vec<&str> = text.split_whitespace().collect();
    let unique: HashSet<&str> = words.iter().copied().collect();
    if (unique.len() as f64) < words.len() as f64 * 0.3 {
        issues.push("High repetition detected".to_string());
        score -= 15;
    }

    let word_count = words.len();
    if word_count < 500 {
        issues.push("Transcript too short for substantial content".to_string());
        score -= 25;
    } else if word_count > 5000 {
        issues.push("Very long transcript - may need summarization".to_string());
        score -= 5;
    }

    let filler: usize = FILLER_MARKERS.iter().map(|m| text.matches(m).count()).sum();
    if filler > 20 {
        issues.push("High number of transcript errors detected".to_string());
        score -= 10;
    }

    let score = score.max(0) as u32;
    QualityReport {
        score,
        word_count,
        segment_count: segments.len(),
        issues,
        recommended_for_blog: score >= RECOMMENDED_THRESHOLD,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Segments of ten distinct words each, long enough to avoid the short-segment penalty
    pub(crate) fn unique_segments(count: usize) -> Vec<Segment> {
        (0..count)
            .map(|i| Segment {
                text: (0..10).map(|j| format!("w{i}x{j}")).collect::<Vec<_>>().join(" "),
                start: i as f64 * 3.0,
                duration: 3.0,
            })
            .collect()
    }

    #[test]
    fn test_empty_transcript() {
        let report = assess(&[]);
        assert_eq!(report.score, 0);
        assert!(!report.recommended_for_blog);
        assert_eq!(report.issues, vec!["No transcript data".to_string()]);
    }

    #[test]
    fn test_clean_transcript_scores_full() {
        let report = assess(&unique_segments(100));
        assert_eq!(report.word_count, 1000);
        assert_eq!(report.score, 100);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_short_transcript_penalty_is_exactly_25() {
        let report = assess(&unique_segments(40));
        assert_eq!(report.word_count, 400);
        assert_eq!(report.score, 75);
        assert!(report.recommended_for_blog);
    }

    #[test]
    fn test_long_transcript_scores_95() {
        let report = assess(&unique_segments(600));
        assert_eq!(report.word_count, 6000);
        assert_eq!(report.score, 95);
        assert_eq!(report.issues.len(), 1);
    }

    #[test]
    fn test_repetition_and_short_segments() {
        let segments: Vec<Segment> = (0..60)
            .map(|i| Segment {
                text: "um, yeah".to_string(),
                start: i as f64,
                duration: 1.0,
            })
            .collect();
        let report = assess(&segments);
        // short segments, repetition, too short, filler
        assert_eq!(report.score, 100 - 20 - 15 - 25 - 10);
        assert!(!report.recommended_for_blog);
    }

    #[test]
    fn test_filler_markers_case_insensitive() {
        let mut segments = unique_segments(60);
        for seg in segments.iter_mut().take(21) {
            seg.text.push_str(" [Music]");
        }
        let report = assess(&segments);
        assert_eq!(report.score, 90);
    }
}
