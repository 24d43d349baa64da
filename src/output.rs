use eyre::Result;
use serde::Serialize;

use crate::duration::format_duration;
use crate::relevance::RankedVideo;
use crate::research::Research;
use crate::seo::SeoReport;
use crate::structure::StructureReport;
use crate::summarize::Digest;

/// Pretty JSON for any report
pub fn render_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Blank line, `heading:`, then one indented bullet per item. Nothing when empty.
fn bullets(heading: &str, items: &[String]) -> Vec<String> {
    if items.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![String::new(), format!("{heading}:")];
    lines.extend(items.iter().map(|item| format!("  - {item}")));
    lines
}

pub fn render_ranked(videos: &[RankedVideo]) -> String {
    videos
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let v = &r.video;
            format!(
                "{:>2}. [{:5.1}] {} ({}, {} views)\n    {}",
                i + 1,
                r.relevance_score,
                v.title,
                format_duration(v.duration_seconds),
                v.view_count,
                v.url(),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_digest(digest: &Digest) -> String {
    let mut lines = vec![format!(
        "Source: {} | Words: {} | Duration: {} | Quality: {}/100{}",
        digest.source_type,
        digest.word_count,
        format_duration(digest.duration_seconds as u64),
        digest.quality.score,
        if digest.quality.recommended_for_blog { "" } else { " (not recommended)" },
    )];
    if !digest.summary.is_empty() {
        lines.push(String::new());
        lines.push(digest.summary.clone());
    }
    lines.extend(bullets("Key insights", &digest.key_insights));
    if !digest.topics.is_empty() {
        lines.push(String::new());
        lines.push(format!("Topics: {}", digest.topics.join(", ")));
    }
    lines.extend(bullets("Quotes", &digest.quotes));
    lines.extend(bullets("Statistics", &digest.statistics));
    lines.extend(bullets("Issues", &digest.quality.issues));
    lines.join("\n")
}

pub fn render_research(research: &Research) -> String {
    match research {
        Research::NoContent { query, reason } => format!("No content for '{query}': {reason}"),
        Research::Found {
            query,
            total_found,
            videos,
            ..
        } => {
            let header = format!("Research for '{query}': {} of {total_found} videos", videos.len());
            let sections = videos.iter().map(|v| {
                format!(
                    "== {} [{:.1}]\n{}\n{}",
                    v.ranked.video.title,
                    v.ranked.relevance_score,
                    v.url,
                    render_digest(&v.digest)
                )
            });
            std::iter::once(header).chain(sections).collect::<Vec<_>>().join("\n\n")
        }
    }
}

pub fn render_structure(report: &StructureReport, suggestions: &[String]) -> String {
    let h = &report.headings;
    let mut lines = vec![
        format!(
            "Words: {} | Sentences: {} | Paragraphs: {} | Read time: {} min",
            report.word_count, report.sentence_count, report.paragraph_count, report.estimated_read_time,
        ),
        format!("Headings: h1={} h2={} h3={} h4={}", h.h1, h.h2, h.h3, h.h4),
        format!(
            "Avg sentence: {:.1} words | Avg paragraph: {:.1} words",
            report.avg_sentence_length, report.avg_paragraph_length,
        ),
        format!("Readability: {:.1} ({})", report.readability.score, report.readability.level),
    ];
    lines.extend(bullets("Suggestions", suggestions));
    lines.join("\n")
}

pub fn render_seo(report: &SeoReport) -> String {
    let mut lines = vec![
        format!(
            "SEO score: {}/{} ({})",
            report.score.score, report.score.max_score, report.score.grade
        ),
        format!("Title tag: {}", report.meta_tags.title),
        format!("Meta description: {}", report.meta_tags.meta_description),
    ];
    lines.extend(report.analysis.keyword_analysis.iter().map(|(keyword, stats)| {
        format!(
            "Keyword '{keyword}'{}: {} hits, {:.2}% density, in title: {}, early: {}",
            if stats.is_focus_keyword { " (focus)" } else { "" },
            stats.count,
            stats.density_percent,
            stats.in_title,
            stats.in_first_paragraph,
        )
    }));
    lines.extend(bullets("Suggestions", &report.suggestions));
    lines.join("\n")
}
