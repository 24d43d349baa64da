//! Keyword, heading and structure checks for a draft, rolled up into a 100-point score.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::structure::count_headings;
use crate::{truncate_at_word, truncate_chars};

const MAX_SCORE: u32 = 100;
const FIRST_PARAGRAPH_CHARS: usize = 200;
const META_DESCRIPTION_CHARS: usize = 150;
const TITLE_TAG_CHARS: usize = 60;

static LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap());
static EXTERNAL_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(https?://[^)]+\)").unwrap());
static MARKDOWN_PUNCT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[#*`\[\]()]").unwrap());

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordStats {
    pub in_title: bool,
    pub density_percent: f64,
    pub count: usize,
    pub in_first_paragraph: bool,
    pub is_focus_keyword: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadingSummary {
    pub h1_count: usize,
    pub h2_count: usize,
    pub h3_count: usize,
    pub proper_hierarchy: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentChecks {
    pub has_introduction: bool,
    pub has_conclusion: bool,
    pub internal_links: usize,
    pub external_links: usize,
    pub images_mentioned: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoAnalysis {
    pub word_count: usize,
    pub title_length: usize,
    pub keyword_analysis: BTreeMap<String, KeywordStats>,
    pub headings: HeadingSummary,
    pub content_structure: ContentChecks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_score(score: u32) -> Self {
        match score {
            80.. => Grade::A,
            70..=79 => Grade::B,
            60..=69 => Grade::C,
            50..=59 => Grade::D,
            _ => Grade::F,
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoScore {
    pub score: u32,
    pub max_score: u32,
    pub grade: Grade,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaTags {
    pub title: String,
    pub meta_description: String,
    pub og_title: String,
    pub og_description: String,
    pub twitter_title: String,
    pub twitter_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoReport {
    pub title: String,
    pub focus_keyword: Option<String>,
    pub target_keywords: Vec<String>,
    pub analysis: SeoAnalysis,
    pub meta_tags: MetaTags,
    pub suggestions: Vec<String>,
    pub score: SeoScore,
}

fn normalize_keyword(keyword: &str) -> Option<String> {
    let keyword = keyword.trim().to_lowercase();
    (!keyword.is_empty()).then_some(keyword)
}

/// Trim and lowercase keywords, dropping blanks and repeats
pub fn normalize_keywords<S: AsRef<str>>(keywords: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for keyword in keywords.iter().filter_map(|k| normalize_keyword(k.as_ref())) {
        if !out.contains(&keyword) {
            out.push(keyword);
        }
    }
    out
}

/// Parse a comma separated keyword list, lowercased, blanks dropped
pub fn parse_keywords(raw: &str) -> Vec<String> {
    normalize_keywords(&raw.split(',').collect::<Vec<_>>())
}

/// Full SEO report for `content` published under `title`
pub fn evaluate(content: &str, title: &str, keywords: &[String], focus_keyword: Option<&str>) -> SeoReport {
    let focus = focus_keyword.and_then(normalize_keyword);
    let keywords = normalize_keywords(keywords);
    let analysis = analyze(content, title, &keywords, focus.as_deref());

    SeoReport {
        title: title.to_string(),
        meta_tags: meta_tags(content, title, focus.as_deref()),
        suggestions: suggestions(&analysis),
        score: score(&analysis),
        focus_keyword: focus,
        target_keywords: keywords,
        analysis,
    }
}

fn keyword_stats(keyword: &str, content_lower: &str, title_lower: &str, word_count: usize, is_focus: bool) -> KeywordStats {
    let count = content_lower.matches(keyword).count();
    let density = if word_count > 0 {
        count as f64 / word_count as f64 * 100.0
    } else {
        0.0
    };
    KeywordStats {
        in_title: title_lower.contains(keyword),
        density_percent: (density * 100.0).round() / 100.0,
        count,
        in_first_paragraph: truncate_chars(content_lower, FIRST_PARAGRAPH_CHARS).contains(keyword),
        is_focus_keyword: is_focus,
    }
}

/// Keyword and structure checks. Keywords are matched case-insensitively.
pub fn analyze(content: &str, title: &str, keywords: &[String], focus_keyword: Option<&str>) -> SeoAnalysis {
    let content_lower = content.to_lowercase();
    let title_lower = title.to_lowercase();
    let word_count = content.split_whitespace().count();
    let focus = focus_keyword.and_then(normalize_keyword);

    let mut keyword_analysis = BTreeMap::new();
    if let Some(ref focus) = focus {
        keyword_analysis.insert(
            focus.clone(),
            keyword_stats(focus, &content_lower, &title_lower, word_count, true),
        );
    }
    for keyword in normalize_keywords(keywords) {
        if focus.as_ref() == Some(&keyword) {
            continue;
        }
        let stats = keyword_stats(&keyword, &content_lower, &title_lower, word_count, false);
        keyword_analysis.insert(keyword, stats);
    }

    let counts = count_headings(content);
    let headings = HeadingSummary {
        h1_count: counts.h1,
        h2_count: counts.h2,
        h3_count: counts.h3,
        proper_hierarchy: counts.h1 == 1 && counts.h2 >= 2,
    };

    let content_structure = ContentChecks {
        has_introduction: content.chars().count() > 300,
        has_conclusion: content_lower.contains("conclusion") || content_lower.contains("summary"),
        internal_links: LINK.find_iter(content).count(),
        external_links: EXTERNAL_LINK.find_iter(content).count(),
        images_mentioned: content.matches("![").count()
            + content.matches("[image").count()
            + content.matches("[Image").count(),
    };

    SeoAnalysis {
        word_count,
        title_length: title.chars().count(),
        keyword_analysis,
        headings,
        content_structure,
    }
}

fn word_count_points(words: usize) -> u32 {
    match words {
        1500..=2500 => 15,
        1000..=1499 | 2501..=3000 => 10,
        800..=999 => 5,
        _ => 0,
    }
}

fn title_points(length: usize) -> u32 {
    match length {
        40..=60 => 10,
        30..=39 | 61..=70 => 7,
        _ => 0,
    }
}

fn keyword_points(analysis: &SeoAnalysis) -> u32 {
    let Some(focus) = analysis.keyword_analysis.values().find(|k| k.is_focus_keyword) else {
        return 0;
    };
    let mut points = 0;
    if focus.in_title {
        points += 8;
    }
    if (0.5..=2.0).contains(&focus.density_percent) {
        points += 10;
    }
    if focus.in_first_paragraph {
        points += 7;
    }
    points.min(25)
}

fn heading_points(headings: &HeadingSummary) -> u32 {
    if headings.proper_hierarchy {
        15
    } else if headings.h1_count == 1 {
        10
    } else if headings.h2_count >= 2 {
        8
    } else {
        0
    }
}

fn structure_points(checks: &ContentChecks) -> u32 {
    let mut points = 0;
    if checks.has_introduction {
        points += 5;
    }
    if checks.has_conclusion {
        points += 5;
    }
    if checks.internal_links > 0 {
        points += 8;
    }
    if checks.images_mentioned > 0 {
        points += 7;
    }
    points
}

fn bonus_points(analysis: &SeoAnalysis) -> u32 {
    let mut points = 0;
    if analysis.content_structure.external_links > 0 {
        points += 5;
    }
    if analysis.headings.h3_count > 0 {
        points += 5;
    }
    points
}

pub fn score(analysis: &SeoAnalysis) -> SeoScore {
    let total = word_count_points(analysis.word_count)
        + title_points(analysis.title_length)
        + keyword_points(analysis)
        + heading_points(&analysis.headings)
        + structure_points(&analysis.content_structure)
        + bonus_points(analysis);
    let score = total.min(MAX_SCORE);
    SeoScore {
        score,
        max_score: MAX_SCORE,
        grade: Grade::from_score(score),
        percentage: (score as f64 / MAX_SCORE as f64 * 1000.0).round() / 10.0,
    }
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Meta description from the first paragraph, at most 150 chars
pub fn meta_description(content: &str) -> String {
    let first = match content.split_once("\n\n") {
        Some((first, _)) => first,
        None => truncate_chars(content, 300),
    };
    let clean = MARKDOWN_PUNCT.replace_all(first, "");
    let clean = clean.trim();
    if clean.chars().count() <= META_DESCRIPTION_CHARS {
        return clean.to_string();
    }
    format!("{}...", truncate_at_word(clean, META_DESCRIPTION_CHARS - 3))
}

pub fn meta_tags(content: &str, title: &str, focus_keyword: Option<&str>) -> MetaTags {
    let description = meta_description(content);

    let mut title_tag = match focus_keyword {
        Some(focus) if !title.to_lowercase().contains(focus) => format!("{title} - {}", title_case(focus)),
        _ => title.to_string(),
    };
    if title_tag.chars().count() > TITLE_TAG_CHARS {
        title_tag = format!("{}...", truncate_chars(title, TITLE_TAG_CHARS - 3));
    }

    MetaTags {
        title: title_tag,
        meta_description: description.clone(),
        og_title: title.to_string(),
        og_description: description.clone(),
        twitter_title: title.to_string(),
        twitter_description: description,
    }
}

pub fn suggestions(analysis: &SeoAnalysis) -> Vec<String> {
    let mut out = Vec::new();

    let words = analysis.word_count;
    if words < 1000 {
        out.push(format!("Content is short ({words} words). Consider expanding to 1,500+ words for better SEO."));
    } else if words > 3000 {
        out.push(format!(
            "Content is very long ({words} words). Consider breaking into multiple posts or adding subheadings."
        ));
    }

    let title_length = analysis.title_length;
    if title_length < 30 {
        out.push(format!("Title is short ({title_length} characters). Optimize for 50-60 characters."));
    } else if title_length > 70 {
        out.push(format!("Title is long ({title_length} characters). Consider shortening to under 60 characters."));
    }

    for (keyword, stats) in analysis.keyword_analysis.iter().filter(|(_, s)| s.is_focus_keyword) {
        if !stats.in_title {
            out.push(format!("Focus keyword '{keyword}' not found in title. Consider adding it."));
        }
        if stats.density_percent < 0.5 {
            out.push(format!(
                "Focus keyword '{keyword}' density is low ({}%). Aim for 0.5-2%.",
                stats.density_percent
            ));
        } else if stats.density_percent > 3.0 {
            out.push(format!(
                "Focus keyword '{keyword}' density is high ({}%). Consider reducing to avoid over-optimization.",
                stats.density_percent
            ));
        }
        if !stats.in_first_paragraph {
            out.push(format!("Focus keyword '{keyword}' not found in first paragraph. Consider adding it early."));
        }
    }

    match analysis.headings.h1_count {
        0 => out.push("Add an H1 heading for better structure.".to_string()),
        1 => {}
        _ => out.push("Use only one H1 heading per post.".to_string()),
    }
    if analysis.headings.h2_count < 2 {
        out.push("Add more H2 headings (2-6 recommended) to improve content structure.".to_string());
    }

    if analysis.content_structure.internal_links == 0 {
        out.push("Add internal links to other relevant content.".to_string());
    }
    if analysis.content_structure.images_mentioned == 0 {
        out.push("Add images to improve engagement and SEO.".to_string());
    }
    out
}
