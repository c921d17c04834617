//! Deterministic stand-ins for the hosted services, used by unit tests.

use crate::config::GenerationPrompt;
use crate::embedding::Embedder;
use crate::error::{AskTubeError, Result};
use crate::rag::AnswerGenerator;
use crate::transcript::{Transcript, TranscriptSegment, TranscriptSource};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub const SCENARIO: &str =
    "The sky is blue. The grass is green. Water boils at 100 degrees Celsius.";

const CONCEPTS: [&[&str]; 4] = [
    &["blue", "green", "red"],
    &["sky", "grass", "tree"],
    &[
        "temperature",
        "boil",
        "boils",
        "boiling",
        "degrees",
        "celsius",
        "hot",
        "cold",
    ],
    &["water"],
];

/// Counts keyword hits per concept.
#[derive(Default)]
pub struct KeywordEmbedder {
    calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub const DIMENSIONS: usize = CONCEPTS.len();

    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn vector(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; Self::DIMENSIONS];
        for token in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            for (dim, words) in CONCEPTS.iter().enumerate() {
                if words.contains(&token) {
                    vector[dim] += 1.0;
                }
            }
        }
        vector
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::vector(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        Self::DIMENSIONS
    }
}

/// Always fails.
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(AskTubeError::Embedding("service unavailable".to_string()))
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(AskTubeError::Embedding("service unavailable".to_string()))
    }

    fn dimensions(&self) -> usize {
        KeywordEmbedder::DIMENSIONS
    }
}

/// Returns a fixed answer and records every prompt.
pub struct RecordingGenerator {
    answer: String,
    prompts: Mutex<Vec<GenerationPrompt>>,
}

impl RecordingGenerator {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<GenerationPrompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnswerGenerator for RecordingGenerator {
    async fn generate(&self, prompt: &GenerationPrompt) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.clone());
        Ok(self.answer.clone())
    }
}

/// Serves transcripts from memory, keyed by video ID.
#[derive(Default)]
pub struct StaticTranscriptSource {
    texts: HashMap<String, String>,
    delay: Option<Duration>,
}

impl StaticTranscriptSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_video(mut self, video_id: &str, text: &str) -> Self {
        self.texts.insert(video_id.to_string(), text.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl TranscriptSource for StaticTranscriptSource {
    async fn fetch(&self, video_id: &str, languages: &[String]) -> Result<Transcript> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let text = self
            .texts
            .get(video_id)
            .ok_or_else(|| AskTubeError::VideoUnavailable(video_id.to_string()))?;

        let segments = if text.is_empty() {
            Vec::new()
        } else {
            vec![TranscriptSegment::new(0.0, 10.0, text.clone())]
        };
        let language = languages.first().cloned().unwrap_or_else(|| "en".to_string());

        Ok(Transcript::new(video_id.to_string(), language, segments))
    }
}

/// Body of an OpenAI rate-limit response.
pub const RATE_LIMIT_BODY: &str = r#"{"error":{"message":"Rate limit reached for requests","type":"requests","param":null,"code":"rate_limit_exceeded"}}"#;

/// Serve the same HTTP error to every request on a local port.
///
/// Returns an OpenAI-style base URL and the number of requests received.
pub async fn error_server(status: &'static str, body: &'static str) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = requests.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                read_request(&mut socket).await;
                let response = format!(
                    "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (format!("http://{}/v1", addr), requests)
}

async fn read_request(socket: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let body_len = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                return;
            }
        }
    }
}
