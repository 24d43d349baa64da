use std::path::{Path, PathBuf};

use chrono::Utc;
use eyre::{Result, WrapErr, eyre};
use log::{debug, info, warn};

mod cli;

use cli::{Cli, Command, OutputFormat};
use ytpress::cache::TranscriptCache;
use ytpress::config::Config;
use ytpress::research::{self, DEFAULT_ATTEMPTS, ResearchOptions};
use ytpress::search::SearchClient;
use ytpress::{output, relevance, seo, structure, summarize};

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytpress.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytpress")
        .join("logs")
}

fn build_after_help() -> String {
    let key_line = if std::env::var_os("YOUTUBE_API_KEY").is_some() {
        "  \x1b[32m✅\x1b[0m YOUTUBE_API_KEY".to_string()
    } else {
        "  \x1b[31m❌\x1b[0m YOUTUBE_API_KEY (not set, needed for search and research)".to_string()
    };

    format!(
        "\nENVIRONMENT:\n{key_line}\n\nConfig is read from: {}\nLogs are written to: {}",
        ytpress::config::config_path().display(),
        log_dir().join("ytpress.log").display()
    )
}

fn read_draft(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).wrap_err_with(|| format!("reading {}", path.display()))
}

fn transcript_cache(no_cache: bool, config: &Config) -> Option<TranscriptCache> {
    let cache = (!no_cache && config.cache_transcripts()).then(TranscriptCache::default_location);
    if let Some(ref c) = cache {
        debug!("Transcript cache: {}", c.dir().display());
    }
    cache
}

async fn run(cli: &Cli, config: &Config, format: OutputFormat) -> Result<String> {
    let http = reqwest::Client::new();
    let now = Utc::now();
    let json = format == OutputFormat::Json;

    match &cli.command {
        Command::Search { topic, .. } => {
            let search = SearchClient::from_env(http)?;
            let (max_results, days_back) = (config.max_results(), config.days_back());
            let candidates =
                research::retry(DEFAULT_ATTEMPTS, || search.search(topic, max_results, days_back, now)).await?;
            let ranked = relevance::rank(candidates, topic, now);
            if json {
                output::render_json(&ranked)
            } else if ranked.is_empty() {
                Ok(format!("No videos found for '{topic}'"))
            } else {
                Ok(output::render_ranked(&ranked))
            }
        }

        Command::Research { topic, no_cache, .. } => {
            let search = SearchClient::from_env(http.clone())?;
            let opts = ResearchOptions {
                lang: config.lang().to_string(),
                max_results: config.max_results(),
                days_back: config.days_back(),
                max_videos: config.max_videos(),
                max_summary_length: config.max_summary_length(),
                attempts: DEFAULT_ATTEMPTS,
            };
            debug!("Research options: {opts:?}");
            let cache = transcript_cache(*no_cache, config);
            let outcome = research::research(&http, &search, cache.as_ref(), topic, &opts, now).await;
            if json {
                output::render_json(&outcome)
            } else {
                Ok(output::render_research(&outcome))
            }
        }

        Command::Digest {
            url,
            description,
            no_cache,
            ..
        } => {
            let video_id = ytpress::extract_video_id(url).ok_or_else(|| {
                eyre!(
                    "could not extract video ID from: {url}\n\nSupported formats:\n  https://www.youtube.com/watch?v=ID\n  https://youtu.be/ID\n  https://www.youtube.com/embed/ID\n  https://www.youtube.com/shorts/ID\n  <11-character video ID>"
                )
            })?;
            let lang = config.lang();
            let cache = transcript_cache(*no_cache, config);

            let fetched = research::fetch_transcript(&http, cache.as_ref(), &video_id, lang, DEFAULT_ATTEMPTS).await;
            match &fetched {
                Ok(t) if cli.verbose => eprintln!(
                    "Video: {} ({})\nSource: {}\nLanguage: {}\nSegments: {}",
                    t.title,
                    t.video_id,
                    t.source,
                    t.language,
                    t.segments.len()
                ),
                Err(e) => {
                    warn!("Transcript fetch for {video_id} failed: {e}");
                    if cli.verbose {
                        eprintln!("Transcript unavailable: {e}\nFalling back to description...");
                    }
                }
                _ => {}
            }

            let max_len = config.max_summary_length();
            let digest = summarize::digest_or_fallback(fetched, description, max_len);
            if json {
                output::render_json(&digest)
            } else {
                Ok(output::render_digest(&digest))
            }
        }

        Command::Analyze { file, .. } => {
            let content = read_draft(file)?;
            let target = config.target_read_time();
            let report = structure::analyze(&content);
            let suggestions = structure::suggestions(&report, target);
            if json {
                output::render_json(&serde_json::json!({
                    "structure": report,
                    "targetReadTime": target,
                    "suggestions": suggestions,
                }))
            } else {
                Ok(output::render_structure(&report, &suggestions))
            }
        }

        Command::Seo {
            file,
            title,
            keywords,
            focus,
        } => {
            let content = read_draft(file)?;
            let keywords = seo::parse_keywords(keywords);
            let report = seo::evaluate(&content, title, &keywords, focus.as_deref());
            if json {
                output::render_json(&report)
            } else {
                Ok(output::render_seo(&report))
            }
        }

        Command::Tidy { file } => Ok(structure::tidy_markdown(&read_draft(file)?)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // Load config file (non-fatal if missing/invalid)
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Ignoring config: {e}");
        if cli.verbose {
            eprintln!("Ignoring invalid config: {e}");
        }
        Config::default()
    });
    if cli.verbose {
        let config_path = ytpress::config::config_path();
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
    }

    // CLI flags take priority over config defaults
    cli.command.apply_overrides(&mut config)?;
    let format = cli.format.unwrap_or(match config.default_format.as_deref() {
        Some("json") => OutputFormat::Json,
        _ => OutputFormat::Text,
    });

    let rendered = run(&cli, &config, format).await?;

    if let Some(ref path) = cli.output {
        std::fs::write(path, &rendered)?;
        if cli.verbose {
            eprintln!("Output written to: {}", path.display());
        }
    } else {
        println!("{rendered}");
    }

    Ok(())
}
