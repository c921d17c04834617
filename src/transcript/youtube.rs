//! YouTube captions via yt-dlp.
//!
//! yt-dlp lists the caption tracks of a video; the chosen track is downloaded
//! in YouTube's `json3` timed-text format and parsed into segments.

use super::{Transcript, TranscriptSegment, TranscriptSource};
use crate::config::TranscriptSettings;
use crate::error::{AskTubeError, Result};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

fn video_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").expect("Invalid regex"))
}

/// Extract a video ID from a YouTube URL or a bare ID.
///
/// Accepts `youtu.be/<id>`, `youtube.com/watch?v=<id>`, `/embed/<id>`,
/// `/shorts/<id>` and `/live/<id>`, with or without scheme, `www.` or `m.`.
pub fn parse_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if video_id_regex().is_match(input) {
        return Some(input.to_string());
    }

    let url = Url::parse(input)
        .or_else(|_| Url::parse(&format!("https://{}", input)))
        .ok()?;
    let host = url.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    let host = host.strip_prefix("m.").unwrap_or(host);

    let candidate = match host {
        "youtu.be" => url.path_segments()?.next().map(str::to_string),
        "youtube.com" | "music.youtube.com" => {
            let mut segments = url.path_segments()?;
            match segments.next() {
                Some("watch") => url
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned()),
                Some("embed") | Some("shorts") | Some("live") | Some("v") => {
                    segments.next().map(str::to_string)
                }
                _ => None,
            }
        }
        _ => None,
    }?;

    video_id_regex().is_match(&candidate).then_some(candidate)
}

/// Caption track metadata as reported by `yt-dlp --dump-json`.
#[derive(Debug, Deserialize)]
struct VideoInfo {
    title: Option<String>,
    #[serde(default)]
    subtitles: Option<HashMap<String, Vec<TrackFormat>>>,
    #[serde(default)]
    automatic_captions: Option<HashMap<String, Vec<TrackFormat>>>,
}

#[derive(Debug, Clone, Deserialize)]
struct TrackFormat {
    ext: Option<String>,
    url: Option<String>,
}

/// A caption track chosen for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionTrack {
    /// Language code of the track.
    pub language: String,
    /// Whether YouTube generated the track automatically.
    pub is_generated: bool,
    /// Download URL of the json3 rendition.
    pub url: String,
}

/// Original caption tracks keyed by language code.
///
/// yt-dlp lists every machine translation target under `automatic_captions`
/// with a `tlang` parameter, and keys the untranslated speech track `<lang>-orig`.
fn caption_tracks(
    tracks: &Option<HashMap<String, Vec<TrackFormat>>>,
) -> HashMap<String, Vec<&TrackFormat>> {
    let mut by_language: HashMap<String, Vec<&TrackFormat>> = HashMap::new();

    for (key, formats) in tracks.iter().flatten() {
        if key == "live_chat" {
            continue;
        }

        let originals: Vec<&TrackFormat> = formats.iter().filter(|f| !is_translation(f)).collect();
        if originals.is_empty() {
            continue;
        }

        let language = key.strip_suffix("-orig").unwrap_or(key);
        if key.ends_with("-orig") || !by_language.contains_key(language) {
            by_language.insert(language.to_string(), originals);
        }
    }

    by_language
}

fn is_translation(format: &TrackFormat) -> bool {
    format
        .url
        .as_deref()
        .and_then(|url| Url::parse(url).ok())
        .is_some_and(|url| url.query_pairs().any(|(key, _)| key == "tlang"))
}

/// Pick the first preferred language, manual captions before generated ones.
fn select_track(video_id: &str, info: &VideoInfo, languages: &[String]) -> Result<CaptionTrack> {
    let manual = caption_tracks(&info.subtitles);
    let generated = caption_tracks(&info.automatic_captions);

    if manual.is_empty() && generated.is_empty() {
        return Err(AskTubeError::CaptionsDisabled(video_id.to_string()));
    }

    for language in languages {
        for (tracks, is_generated) in [(&manual, false), (&generated, true)] {
            let Some(formats) = tracks.get(language.as_str()) else {
                continue;
            };

            let url = formats
                .iter()
                .find(|f| f.ext.as_deref() == Some("json3"))
                .and_then(|f| f.url.clone())
                .ok_or_else(|| {
                    AskTubeError::TranscriptSource(format!(
                        "No json3 captions offered for {} in '{}'",
                        video_id, language
                    ))
                })?;

            return Ok(CaptionTrack {
                language: language.clone(),
                is_generated,
                url,
            });
        }
    }

    let mut available: Vec<String> = manual.keys().chain(generated.keys()).cloned().collect();
    available.sort();
    available.dedup();

    Err(AskTubeError::NoTranscriptInLanguage {
        video_id: video_id.to_string(),
        requested: languages.to_vec(),
        available,
    })
}

#[derive(Debug, Deserialize)]
struct Json3 {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    d_duration_ms: u64,
    segs: Option<Vec<Json3Seg>>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

/// Parse a json3 timed-text document into segments, skipping empty events.
fn parse_json3(body: &str) -> Result<Vec<TranscriptSegment>> {
    let document: Json3 = serde_json::from_str(body)?;

    let segments = document
        .events
        .into_iter()
        .filter_map(|event| {
            let raw: String = event.segs?.into_iter().map(|s| s.utf8).collect();
            let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
            if text.is_empty() {
                return None;
            }
            Some(TranscriptSegment::new(
                event.t_start_ms as f64 / 1000.0,
                event.d_duration_ms as f64 / 1000.0,
                text,
            ))
        })
        .collect();

    Ok(segments)
}

/// Map a failed yt-dlp run to the transcript error taxonomy.
fn classify_failure(video_id: &str, stderr: &str) -> AskTubeError {
    let lower = stderr.to_lowercase();
    let unavailable = [
        "video unavailable",
        "private video",
        "has been removed",
        "is not available",
        "has been terminated",
        "members-only",
    ];

    if unavailable.iter().any(|needle| lower.contains(needle)) {
        AskTubeError::VideoUnavailable(format!("{}: {}", video_id, stderr.trim()))
    } else {
        AskTubeError::TranscriptSource(format!(
            "yt-dlp failed for {}: {}",
            video_id,
            stderr.trim()
        ))
    }
}

/// Transcript source backed by the yt-dlp command-line tool.
pub struct YtDlpTranscriptSource {
    program: String,
    http: reqwest::Client,
}

impl YtDlpTranscriptSource {
    /// Create a source using `yt-dlp` from `PATH`.
    pub fn from_settings(settings: &TranscriptSettings) -> Result<Self> {
        Self::with_program(
            "yt-dlp",
            Duration::from_secs(settings.download_timeout_secs),
        )
    }

    /// Use a specific yt-dlp executable and caption download timeout.
    pub fn with_program(program: &str, download_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(download_timeout)
            .build()
            .map_err(|e| AskTubeError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            program: program.to_string(),
            http,
        })
    }

    /// Fetch caption track metadata using yt-dlp.
    async fn fetch_info(&self, video_id: &str) -> Result<VideoInfo> {
        let url = format!("https://www.youtube.com/watch?v={}", video_id);

        let output = tokio::process::Command::new(&self.program)
            .args(["--dump-json", "--no-download", "--no-warnings", &url])
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    AskTubeError::ToolNotFound(self.program.clone())
                } else {
                    AskTubeError::TranscriptSource(format!("Failed to run yt-dlp: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_failure(video_id, &stderr));
        }

        let json_str = String::from_utf8_lossy(&output.stdout);
        serde_json::from_str(&json_str).map_err(|e| {
            AskTubeError::TranscriptSource(format!("Failed to parse yt-dlp output: {}", e))
        })
    }

    /// Download a caption track body.
    async fn download(&self, url: &str) -> Result<String> {
        let body = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}

#[async_trait]
impl TranscriptSource for YtDlpTranscriptSource {
    #[instrument(skip(self, languages))]
    async fn fetch(&self, video_id: &str, languages: &[String]) -> Result<Transcript> {
        info!("Fetching caption tracks for {}", video_id);
        let info = self.fetch_info(video_id).await?;
        let track = select_track(video_id, &info, languages)?;

        debug!(
            "Downloading {} captions (generated: {})",
            track.language, track.is_generated
        );
        let body = self.download(&track.url).await?;
        let segments = parse_json3(&body)?;
        info!("Fetched {} caption segments", segments.len());

        Ok(Transcript::new(video_id.to_string(), track.language, segments)
            .with_title(info.title)
            .generated(track.is_generated))
    }
}
