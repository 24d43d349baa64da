use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

pub const DEFAULT_TARGET_READ_TIME: u32 = 8;
const WORDS_PER_MINUTE: usize = 200;

static SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+").unwrap());
static H1: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^# .+").unwrap());
static H2: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^## .+").unwrap());
static H3: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^### .+").unwrap());
static H4: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#### .+").unwrap());
static NEWLINE_BEFORE_HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n+(#+ )").unwrap());
static HEADING_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^(#+ [^\n]+)\n+").unwrap());
static EXCESS_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HeadingCounts {
    pub h1: usize,
    pub h2: usize,
    pub h3: usize,
    pub h4: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingLevel {
    #[serde(rename = "very easy")]
    VeryEasy,
    Easy,
    #[serde(rename = "fairly easy")]
    FairlyEasy,
    Standard,
    #[serde(rename = "fairly difficult")]
    FairlyDifficult,
    Difficult,
    #[serde(rename = "very difficult")]
    VeryDifficult,
    Unreadable,
}

impl ReadingLevel {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 90.0 => ReadingLevel::VeryEasy,
            s if s >= 80.0 => ReadingLevel::Easy,
            s if s >= 70.0 => ReadingLevel::FairlyEasy,
            s if s >= 60.0 => ReadingLevel::Standard,
            s if s >= 50.0 => ReadingLevel::FairlyDifficult,
            s if s >= 30.0 => ReadingLevel::Difficult,
            _ => ReadingLevel::VeryDifficult,
        }
    }
}

impl std::fmt::Display for ReadingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ReadingLevel::VeryEasy => "very easy",
            ReadingLevel::Easy => "easy",
            ReadingLevel::FairlyEasy => "fairly easy",
            ReadingLevel::Standard => "standard",
            ReadingLevel::FairlyDifficult => "fairly difficult",
            ReadingLevel::Difficult => "difficult",
            ReadingLevel::VeryDifficult => "very difficult",
            ReadingLevel::Unreadable => "unreadable",
        };
        write!(f, "{label}")
    }
}

/// Flesch reading-ease approximation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Readability {
    pub score: f64,
    pub level: ReadingLevel,
    pub avg_sentence_length: f64,
    pub avg_syllables_per_word: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureReport {
    pub word_count: usize,
    pub character_count: usize,
    pub paragraph_count: usize,
    pub sentence_count: usize,
    pub estimated_read_time: usize,
    pub headings: HeadingCounts,
    pub avg_sentence_length: f64,
    pub avg_paragraph_length: f64,
    pub readability: Readability,
}

/// Split on runs of `.`, `!` and `?`, dropping empty pieces
pub fn split_sentences(text: &str) -> Vec<&str> {
    SENTENCE_END
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Like `split_sentences`, but each sentence keeps its closing punctuation run. A trailing
/// fragment with no terminator is returned bare.
pub fn split_sentences_with_endings(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut from = 0;
    for end in SENTENCE_END.find_iter(text) {
        if !text[from..end.start()].trim().is_empty() {
            out.push(text[from..end.end()].trim());
        }
        from = end.end();
    }
    let tail = text[from..].trim();
    if !tail.is_empty() {
        out.push(tail);
    }
    out
}

fn paragraphs(content: &str) -> Vec<&str> {
    content
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

pub fn count_headings(content: &str) -> HeadingCounts {
    HeadingCounts {
        h1: H1.find_iter(content).count(),
        h2: H2.find_iter(content).count(),
        h3: H3.find_iter(content).count(),
        h4: H4.find_iter(content).count(),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn average_words(pieces: &[&str]) -> f64 {
    if pieces.is_empty() {
        return 0.0;
    }
    let words: usize = pieces.iter().map(|p| p.split_whitespace().count()).sum();
    words as f64 / pieces.len() as f64
}

fn syllables(word: &str) -> usize {
    let word = word
        .trim_matches(|c: char| matches!(c, '.' | ',' | '!' | '?' | '"' | ';'))
        .to_lowercase();
    word.chars().filter(|c| "aeiouy".contains(*c)).count().max(1)
}

pub fn readability(sentences: &[&str], word_count: usize) -> Readability {
    if sentences.is_empty() || word_count == 0 {
        return Readability {
            score: 0.0,
            level: ReadingLevel::Unreadable,
            avg_sentence_length: 0.0,
            avg_syllables_per_word: 0.0,
        };
    }

    let avg_sentence_length = word_count as f64 / sentences.len() as f64;
    let syllable_count: usize = sentences
        .iter()
        .flat_map(|s| s.split_whitespace())
        .map(syllables)
        .sum();
    let avg_syllables_per_word = syllable_count as f64 / word_count as f64;

    let ease = (206.835 - 1.015 * avg_sentence_length - 84.6 * avg_syllables_per_word).clamp(0.0, 100.0);
    Readability {
        score: round1(ease),
        level: ReadingLevel::from_score(ease),
        avg_sentence_length: round1(avg_sentence_length),
        avg_syllables_per_word: round1(avg_syllables_per_word),
    }
}

/// Word, sentence, paragraph, heading and readability metrics for a markdown draft
pub fn analyze(content: &str) -> StructureReport {
    let word_count = content.split_whitespace().count();
    let sentences = split_sentences(content);
    let paragraphs = paragraphs(content);

    StructureReport {
        word_count,
        character_count: content.chars().count(),
        paragraph_count: paragraphs.len(),
        sentence_count: sentences.len(),
        estimated_read_time: word_count.div_ceil(WORDS_PER_MINUTE),
        headings: count_headings(content),
        avg_sentence_length: round1(average_words(&sentences)),
        avg_paragraph_length: round1(average_words(&paragraphs)),
        readability: readability(&sentences, word_count),
    }
}

/// Advisory improvements for a draft aimed at `target_read_time` minutes
pub fn suggestions(report: &StructureReport, target_read_time: u32) -> Vec<String> {
    let mut out = Vec::new();
    let target_words = target_read_time as usize * WORDS_PER_MINUTE;
    let words = report.word_count as f64;

    if words < target_words as f64 * 0.8 {
        out.push(format!(
            "Content is too short ({} words). Target: {target_words} words for {target_read_time}-minute read.",
            report.word_count
        ));
    } else if words > target_words as f64 * 1.2 {
        out.push(format!(
            "Content might be too long ({} words). Consider condensing for {target_read_time}-minute read.",
            report.word_count
        ));
    }

    match report.headings.h1 {
        0 => out.push("Add a main H1 heading for better structure.".to_string()),
        1 => {}
        _ => out.push("Consider using only one H1 heading per post.".to_string()),
    }
    if report.headings.h2 < 3 {
        out.push("Add more H2 sections (3-6 recommended) for better content organization.".to_string());
    }

    if report.avg_paragraph_length > 100.0 {
        out.push(format!(
            "Break up long paragraphs (current average: {:.1} words). Aim for 50-80 words per paragraph.",
            report.avg_paragraph_length
        ));
    }
    if report.avg_sentence_length > 25.0 {
        out.push(format!(
            "Consider shorter sentences (current average: {:.1} words). Aim for 15-20 words per sentence.",
            report.avg_sentence_length
        ));
    }
    if report.readability.score < 50.0 {
        out.push(format!(
            "Content readability is {} (score: {}). Consider simpler language and shorter sentences.",
            report.readability.level, report.readability.score
        ));
    }
    out
}

/// Normalize blank lines around headings and collapse runs of empty lines
pub fn tidy_markdown(content: &str) -> String {
    let spaced = NEWLINE_BEFORE_HEADING.replace_all(content, "\n\n$1");
    let spaced = HEADING_LINE.replace_all(&spaced, "$1\n\n");
    EXCESS_NEWLINES.replace_all(&spaced, "\n\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DRAFT: &str = "# Title\n\nRust is fast. It is safe!\n\n## Why\n\nOwnership rules are simple?\n\n## How\n\nRead the book.";

    #[test]
    fn test_basic_counts() {
        let report = analyze(DRAFT);
        assert_eq!(report.headings, HeadingCounts { h1: 1, h2: 2, h3: 0, h4: 0 });
        assert_eq!(report.paragraph_count, 6);
        assert_eq!(report.estimated_read_time, 1);
        assert_eq!(report.word_count, 19);
    }

    #[test]
    fn test_heading_prefix_requires_line_start() {
        let counts = count_headings("text # not a heading\n### Real\n#### Deep\n#NoSpace");
        assert_eq!(counts, HeadingCounts { h1: 0, h2: 0, h3: 1, h4: 1 });
    }

    #[test]
    fn test_split_sentences() {
        assert_eq!(split_sentences("One. Two!! Three?  "), vec!["One", "Two", "Three"]);
        assert!(split_sentences("...").is_empty());
    }

    #[test]
    fn test_split_sentences_with_endings() {
        assert_eq!(
            split_sentences_with_endings("One. Two!! Three?  trailing"),
            vec!["One.", "Two!!", "Three?", "trailing"]
        );
        assert!(split_sentences_with_endings(" ... ").is_empty());
        assert_eq!(
            split_sentences_with_endings("One. Two!! Three?").len(),
            split_sentences("One. Two!! Three?").len()
        );
    }

    #[test]
    fn test_read_time_rounds_up() {
        let content = vec!["word"; 201].join(" ");
        assert_eq!(analyze(&content).estimated_read_time, 2);
        assert_eq!(analyze("").estimated_read_time, 0);
    }

    #[test]
    fn test_readability_empty_is_unreadable() {
        let report = analyze("");
        assert_eq!(report.readability.score, 0.0);
        assert_eq!(report.readability.level, ReadingLevel::Unreadable);
    }

    #[test]
    fn test_readability_clamped_for_pathological_input() {
        let easy = analyze("a b. c d. e f. g h.");
        assert_eq!(easy.readability.score, 100.0);
        assert_eq!(easy.readability.level, ReadingLevel::VeryEasy);

        let long_word = format!("{}.", "aeiou".repeat(40));
        let hard = analyze(&long_word);
        assert_eq!(hard.readability.score, 0.0);
        assert_eq!(hard.readability.level, ReadingLevel::VeryDifficult);
    }

    #[test]
    fn test_reading_level_thresholds() {
        assert_eq!(ReadingLevel::from_score(90.0), ReadingLevel::VeryEasy);
        assert_eq!(ReadingLevel::from_score(89.9), ReadingLevel::Easy);
        assert_eq!(ReadingLevel::from_score(70.0), ReadingLevel::FairlyEasy);
        assert_eq!(ReadingLevel::from_score(60.0), ReadingLevel::Standard);
        assert_eq!(ReadingLevel::from_score(50.0), ReadingLevel::FairlyDifficult);
        assert_eq!(ReadingLevel::from_score(30.0), ReadingLevel::Difficult);
        assert_eq!(ReadingLevel::from_score(29.9), ReadingLevel::VeryDifficult);
    }

    #[test]
    fn test_analyze_is_idempotent() {
        assert_eq!(analyze(DRAFT), analyze(DRAFT));
    }

    #[test]
    fn test_suggestions_for_short_draft() {
        let report = analyze(DRAFT);
        let tips = suggestions(&report, 8);
        assert!(tips.iter().any(|t| t.starts_with("Content is too short (19 words)")));
        assert!(tips.iter().any(|t| t.starts_with("Add more H2 sections")));
        assert!(!tips.iter().any(|t| t.contains("H1")));
    }

    #[test]
    fn test_suggestions_for_well_sized_draft() {
        let body = vec!["Short words here now."; 400].join(" ");
        let content = format!("# T\n\n## A\n\n## B\n\n## C\n\n{body}");
        let report = analyze(&content);
        let tips = suggestions(&report, 8);
        assert!(!tips.iter().any(|t| t.contains("too short") || t.contains("too long")));
        assert!(!tips.iter().any(|t| t.contains("H2")));
    }

    #[test]
    fn test_tidy_markdown() {
        let raw = "Intro text\n# Title\nBody\n\n\n\n## Section\nMore";
        assert_eq!(tidy_markdown(raw), "Intro text\n\n# Title\n\nBody\n\n## Section\n\nMore");
    }

    #[test]
    fn test_reading_level_serializes_with_spaces() {
        let json = serde_json::to_string(&ReadingLevel::FairlyDifficult).unwrap();
        assert_eq!(json, "\"fairly difficult\"");
    }
}
