use eyre::{Result, bail};
use log::debug;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use regex::Regex;
use serde::Deserialize;

use crate::{Segment, Transcript, TranscriptSource};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// English variants tried when the preferred language has no track
const FALLBACK_LANGS: &[&str] = &["en", "en-US", "en-GB"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    captions: Option<CaptionsData>,
    video_details: Option<VideoDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoDetails {
    title: Option<String>,
    short_description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionsData {
    player_captions_tracklist_renderer: Option<CaptionTracklist>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTracklist {
    caption_tracks: Option<Vec<CaptionTrack>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: String,
    /// `asr` marks speech-recognition tracks
    kind: Option<String>,
}

impl CaptionTrack {
    fn source(&self) -> TranscriptSource {
        match self.kind.as_deref() {
            Some("asr") => TranscriptSource::AutoGenerated,
            _ => TranscriptSource::Manual,
        }
    }
}

/// GET a page as text with a browser user agent
async fn get_text(client: &reqwest::Client, url: &str) -> Result<String> {
    let resp = client.get(url).header("User-Agent", USER_AGENT).send().await?;
    Ok(resp.error_for_status()?.text().await?)
}

/// POST to the InnerTube player endpoint as the web client would
async fn player(client: &reqwest::Client, api_key: &str, video_id: &str, lang: &str) -> Result<PlayerResponse> {
    let url = format!("https://www.youtube.com/youtubei/v1/player?key={api_key}&prettyPrint=false");
    let client_context = serde_json::json!({
        "hl": lang,
        "gl": "US",
        "clientName": "WEB",
        "clientVersion": "2.20241126.01.00",
    });
    let resp = client
        .post(&url)
        .header("User-Agent", USER_AGENT)
        .json(&serde_json::json!({ "context": { "client": client_context }, "videoId": video_id }))
        .send()
        .await?;
    Ok(resp.error_for_status()?.json().await?)
}

/// Fetch a video's caption track through the InnerTube player API.
///
/// Errors cover captions being disabled, no track existing, and any network or parse
/// failure. Callers route all of them into the description fallback.
pub async fn fetch_captions(client: &reqwest::Client, video_id: &str, lang: &str) -> Result<Transcript> {
    debug!("Fetching captions for {video_id} (lang={lang})");
    let watch_page = get_text(client, &format!("https://www.youtube.com/watch?v={video_id}")).await?;
    let PlayerResponse { captions, video_details } =
        player(client, &extract_api_key(&watch_page)?, video_id, lang).await?;

    let (title, description) = match video_details {
        Some(details) => (
            details.title.unwrap_or_default(),
            details.short_description.unwrap_or_default(),
        ),
        None => (String::new(), String::new()),
    };
    let tracks = captions
        .and_then(|c| c.player_captions_tracklist_renderer)
        .and_then(|r| r.caption_tracks)
        .unwrap_or_default();

    let Some(track) = choose_track(&tracks, lang) else {
        bail!("no captions available for video {video_id}");
    };
    debug!("Using caption track: lang={} kind={:?}", track.language_code, track.kind);

    let segments = parse_caption_xml(&get_text(client, &track.base_url).await?)?;
    if segments.is_empty() {
        bail!("caption track for {video_id} is empty");
    }

    Ok(Transcript {
        video_id: video_id.to_string(),
        title,
        description,
        language: track.language_code.clone(),
        source: track.source(),
        segments,
    })
}

/// Preferred language first (manual before generated), then English variants, then anything
fn choose_track<'a>(tracks: &'a [CaptionTrack], lang: &str) -> Option<&'a CaptionTrack> {
    let first_in = |code: &str, manual_only: bool| {
        tracks
            .iter()
            .find(|t| t.language_code == code && (!manual_only || t.source() == TranscriptSource::Manual))
    };
    first_in(lang, true)
        .or_else(|| first_in(lang, false))
        .or_else(|| FALLBACK_LANGS.iter().find_map(|code| first_in(*code, false)))
        .or_else(|| tracks.first())
}

fn extract_api_key(html: &str) -> Result<String> {
    let patterns = [r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#, r#"innertubeApiKey\s*[=:]\s*"([^"]+)""#];
    for pattern in patterns {
        if let Some(caps) = Regex::new(pattern)?.captures(html) {
            return Ok(caps[1].to_string());
        }
    }
    bail!("could not extract InnerTube API key from watch page");
}

fn cue_attr(cue: &BytesStart, name: &str) -> Option<f64> {
    let attr = cue.try_get_attribute(name).ok().flatten()?;
    String::from_utf8_lossy(&attr.value).parse().ok()
}

/// Parse timedtext XML into segments, skipping cues without a start time or text
fn parse_caption_xml(xml: &str) -> Result<Vec<Segment>> {
    let mut reader = Reader::from_str(xml);
    let mut segments = Vec::new();
    let mut pending: Option<(f64, f64)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(cue)) if cue.name().as_ref() == b"text" => {
                // tracks occasionally omit dur on the final cue
                pending = cue_attr(&cue, "start").map(|start| (start, cue_attr(&cue, "dur").unwrap_or(0.0)));
            }
            Ok(Event::Text(body)) => {
                let Some((start, duration)) = pending.take() else {
                    continue;
                };
                let unescaped = body.unescape().unwrap_or_default();
                let text = html_escape::decode_html_entities(&unescaped).trim().to_string();
                if !text.is_empty() {
                    segments.push(Segment { text, start, duration });
                }
            }
            Ok(Event::Eof) => return Ok(segments),
            Err(e) => bail!("malformed caption XML at byte {}: {e}", reader.buffer_position()),
            Ok(_) => {}
        }
    }
}
