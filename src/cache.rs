use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use log::debug;

use crate::Transcript;

/// On-disk store of fetched transcripts, one JSON file per video and language
#[derive(Debug, Clone)]
pub struct TranscriptCache {
    dir: PathBuf,
}

impl TranscriptCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn default_location() -> Self {
        Self::new(
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from(".cache"))
                .join("ytpress")
                .join("transcripts"),
        )
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, video_id: &str, lang: &str) -> PathBuf {
        self.dir.join(format!("{video_id}-{lang}.json"))
    }

    /// Missing and unreadable entries are both treated as a miss
    pub fn load(&self, video_id: &str, lang: &str) -> Option<Transcript> {
        let path = self.path(video_id, lang);
        let data = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&data) {
            Ok(transcript) => {
                debug!("Cache hit: {}", path.display());
                Some(transcript)
            }
            Err(e) => {
                debug!("Ignoring corrupt cache entry {}: {e}", path.display());
                None
            }
        }
    }

    /// Store under the requested language so later lookups with the same request hit
    pub fn store(&self, transcript: &Transcript, lang: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .wrap_err_with(|| format!("creating cache dir {}", self.dir.display()))?;
        let path = self.path(&transcript.video_id, lang);
        std::fs::write(&path, serde_json::to_string_pretty(transcript)?)?;
        debug!("Cached transcript: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Segment, TranscriptSource};

    fn sample() -> Transcript {
        Transcript {
            video_id: "dQw4w9WgXcQ".to_string(),
            title: "Sample".to_string(),
            description: "About things".to_string(),
            language: "en-GB".to_string(),
            source: TranscriptSource::Manual,
            segments: vec![Segment {
                text: "Hello there".to_string(),
                start: 0.0,
                duration: 1.5,
            }],
        }
    }

    #[test]
    fn test_store_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = TranscriptCache::new(tmp.path().join("nested"));
        cache.store(&sample(), "en").unwrap();

        let loaded = cache.load("dQw4w9WgXcQ", "en").unwrap();
        assert_eq!(loaded.title, "Sample");
        assert_eq!(loaded.language, "en-GB");
        assert_eq!(loaded.source, TranscriptSource::Manual);
        assert_eq!(loaded.segments.len(), 1);
        assert!(cache.load("dQw4w9WgXcQ", "fr").is_none());
    }

    #[test]
    fn test_corrupt_entry_is_a_miss() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = TranscriptCache::new(tmp.path());
        std::fs::write(tmp.path().join("abc-en.json"), "{not json").unwrap();
        assert!(cache.load("abc", "en").is_none());
    }
}
