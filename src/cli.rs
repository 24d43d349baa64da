use clap::{Parser, Subcommand};
use eyre::Result;
use std::path::PathBuf;
use ytpress::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(
    name = "ytpress",
    about = "Research YouTube videos for a topic and score blog drafts",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format: text or json (defaults to config, then text)
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Write output to file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Show config and progress details on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Search for videos on a topic and rank them by relevance
    Search {
        topic: String,

        /// Number of results requested from the API (1-50)
        #[arg(long)]
        max_results: Option<u32>,

        /// Only consider videos published in the last N days
        #[arg(long)]
        days_back: Option<i64>,
    },

    /// Search, rank and digest the best videos for a topic
    Research {
        topic: String,

        /// Number of top-ranked videos to digest
        #[arg(short = 'n', long)]
        max_videos: Option<usize>,

        /// Number of results requested from the API (1-50)
        #[arg(long)]
        max_results: Option<u32>,

        /// Only consider videos published in the last N days
        #[arg(long)]
        days_back: Option<i64>,

        /// Preferred caption language
        #[arg(short, long)]
        lang: Option<String>,

        /// Character budget for each summary
        #[arg(long)]
        max_summary_length: Option<usize>,

        /// Bypass the transcript cache
        #[arg(long)]
        no_cache: bool,
    },

    /// Digest a single video from its URL or ID
    Digest {
        /// YouTube video URL or video ID
        url: String,

        /// Preferred caption language
        #[arg(short, long)]
        lang: Option<String>,

        /// Description used when no transcript is available
        #[arg(short, long, default_value = "")]
        description: String,

        /// Character budget for the summary
        #[arg(long)]
        max_summary_length: Option<usize>,

        /// Bypass the transcript cache
        #[arg(long)]
        no_cache: bool,
    },

    /// Analyze the structure and readability of a markdown draft
    Analyze {
        /// Markdown file to analyze
        file: PathBuf,

        /// Target read time in minutes
        #[arg(short, long)]
        target_read_time: Option<u32>,
    },

    /// Score a markdown draft for SEO and generate meta tags
    Seo {
        /// Markdown file to score
        file: PathBuf,

        /// Post title
        #[arg(short, long)]
        title: String,

        /// Comma separated target keywords
        #[arg(short, long, default_value = "")]
        keywords: String,

        /// Primary focus keyword
        #[arg(long)]
        focus: Option<String>,
    },

    /// Normalize heading spacing and blank lines in a markdown draft
    Tidy {
        /// Markdown file to tidy
        file: PathBuf,
    },
}

impl Command {
    /// Fold flag overrides into `config` and re-run its validation, so flags obey the same
    /// bounds as the config file
    pub fn apply_overrides(&self, config: &mut Config) -> Result<()> {
        fn set<T: Clone>(slot: &mut Option<T>, flag: &Option<T>) {
            if flag.is_some() {
                slot.clone_from(flag);
            }
        }

        match self {
            Command::Search {
                max_results, days_back, ..
            } => {
                set(&mut config.max_results, max_results);
                set(&mut config.days_back, days_back);
            }
            Command::Research {
                max_videos,
                max_results,
                days_back,
                lang,
                max_summary_length,
                ..
            } => {
                set(&mut config.max_videos_per_topic, max_videos);
                set(&mut config.max_results, max_results);
                set(&mut config.days_back, days_back);
                set(&mut config.default_lang, lang);
                set(&mut config.max_summary_length, max_summary_length);
            }
            Command::Digest {
                lang, max_summary_length, ..
            } => {
                set(&mut config.default_lang, lang);
                set(&mut config.max_summary_length, max_summary_length);
            }
            Command::Analyze { target_read_time, .. } => set(&mut config.target_read_time, target_read_time),
            Command::Seo { .. } | Command::Tidy { .. } => {}
        }
        config.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seo_command() {
        let cli = Cli::try_parse_from([
            "ytpress", "seo", "post.md", "--title", "Rust Tips", "-k", "rust,tips", "--focus", "rust", "-f", "json",
        ])
        .unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Json));
        match cli.command {
            Command::Seo { file, title, keywords, focus } => {
                assert_eq!(file, PathBuf::from("post.md"));
                assert_eq!(title, "Rust Tips");
                assert_eq!(keywords, "rust,tips");
                assert_eq!(focus.as_deref(), Some("rust"));
            }
            _ => panic!("expected seo command"),
        }
    }

    #[test]
    fn test_parse_research_defaults() {
        let cli = Cli::try_parse_from(["ytpress", "research", "rust async"]).unwrap();
        assert!(cli.format.is_none());
        match cli.command {
            Command::Research { topic, max_videos, no_cache, .. } => {
                assert_eq!(topic, "rust async");
                assert!(max_videos.is_none());
                assert!(!no_cache);
            }
            _ => panic!("expected research command"),
        }
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let cli = Cli::try_parse_from(["ytpress", "research", "rust", "-n", "5", "--days-back", "7", "-l", "de"]).unwrap();
        let mut config = Config::parse("max_results = 20\ndays_back = 60").unwrap();
        cli.command.apply_overrides(&mut config).unwrap();
        assert_eq!(config.max_videos(), 5);
        assert_eq!(config.days_back(), 7);
        assert_eq!(config.max_results(), 20);
        assert_eq!(config.lang(), "de");
    }

    #[test]
    fn test_out_of_range_overrides_rejected() {
        for args in [
            vec!["ytpress", "search", "rust", "--days-back=-5"],
            vec!["ytpress", "search", "rust", "--days-back", "0"],
            vec!["ytpress", "search", "rust", "--max-results", "51"],
            vec!["ytpress", "research", "rust", "--max-videos", "0"],
            vec!["ytpress", "analyze", "post.md", "-t", "2"],
        ] {
            let cli = Cli::try_parse_from(args.clone()).unwrap();
            assert!(cli.command.apply_overrides(&mut Config::default()).is_err(), "{args:?}");
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
