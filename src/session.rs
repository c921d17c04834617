//! Session orchestration for AskTube.
//!
//! A session holds at most one transcript and the index built from it, and
//! moves through `Empty -> TranscriptLoaded -> Indexed`. Failed operations
//! leave the session exactly as it was.

use crate::chunking::{chunk_with, ChunkingConfig};
use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{AskTubeError, Result};
use crate::rag::{assemble_context, Answer, AnswerGenerator, OpenAIGenerator, Retriever};
use crate::transcript::{parse_video_id, Transcript, TranscriptSource, YtDlpTranscriptSource};
use crate::vector_index::{SearchResult, VectorIndex};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Observable lifecycle stage of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Empty,
    TranscriptLoaded,
    Indexed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Empty => write!(f, "empty"),
            SessionStatus::TranscriptLoaded => write!(f, "transcript loaded"),
            SessionStatus::Indexed => write!(f, "indexed"),
        }
    }
}

enum SessionState {
    Empty,
    TranscriptLoaded {
        transcript: Arc<Transcript>,
    },
    Indexed {
        transcript: Arc<Transcript>,
        index: Arc<VectorIndex>,
    },
}

/// One user's question-answering session over a single video.
pub struct Session {
    id: Uuid,
    source: Arc<dyn TranscriptSource>,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn AnswerGenerator>,
    retriever: Retriever,
    prompts: Prompts,
    chunking: ChunkingConfig,
    languages: Vec<String>,
    timeout: Option<Duration>,
    state: SessionState,
}

impl Session {
    /// Create a session backed by yt-dlp and the OpenAI API.
    pub fn new(settings: &Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let source: Arc<dyn TranscriptSource> =
            Arc::new(YtDlpTranscriptSource::from_settings(&settings.transcript)?);
        let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::from_settings(settings)?);
        let generator: Arc<dyn AnswerGenerator> =
            Arc::new(OpenAIGenerator::from_settings(settings)?);

        info!(
            "Using {} for embeddings and {} for answers",
            settings.embedding.model, settings.generation.model
        );

        Self::with_components(settings, prompts, source, embedder, generator)
    }

    /// Create a session with custom components.
    pub fn with_components(
        settings: &Settings,
        prompts: Prompts,
        source: Arc<dyn TranscriptSource>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn AnswerGenerator>,
    ) -> Result<Self> {
        settings.validate()?;
        prompts.validate()?;

        let retriever = Retriever::new(embedder.clone(), settings.retrieval.k)?
            .with_min_score(settings.retrieval.min_score);

        Ok(Self {
            id: Uuid::new_v4(),
            source,
            embedder,
            generator,
            retriever,
            prompts,
            chunking: settings.chunking.to_config(),
            languages: settings.transcript.languages.clone(),
            timeout: settings.operation_timeout(),
            state: SessionState::Empty,
        })
    }

    /// Override the per-operation timeout.
    pub fn with_operation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn status(&self) -> SessionStatus {
        match self.state {
            SessionState::Empty => SessionStatus::Empty,
            SessionState::TranscriptLoaded { .. } => SessionStatus::TranscriptLoaded,
            SessionState::Indexed { .. } => SessionStatus::Indexed,
        }
    }

    /// The loaded transcript, if any.
    pub fn transcript(&self) -> Option<Arc<Transcript>> {
        match &self.state {
            SessionState::Empty => None,
            SessionState::TranscriptLoaded { transcript }
            | SessionState::Indexed { transcript, .. } => Some(transcript.clone()),
        }
    }

    /// The current index, only present once built.
    pub fn index(&self) -> Option<Arc<VectorIndex>> {
        match &self.state {
            SessionState::Indexed { index, .. } => Some(index.clone()),
            _ => None,
        }
    }

    /// Number of retrieved chunks per question.
    pub fn k(&self) -> usize {
        self.retriever.k()
    }

    /// Change the number of retrieved chunks per question.
    pub fn set_k(&mut self, k: usize) -> Result<()> {
        self.retriever = Retriever::new(self.embedder.clone(), k)?
            .with_min_score(self.retriever.min_score());
        Ok(())
    }

    /// Fetch the transcript for a video URL, replacing any previous one.
    ///
    /// Any existing index is discarded on success.
    #[instrument(skip(self), fields(session = %self.id))]
    pub async fn fetch_transcript(&mut self, url: &str) -> Result<Arc<Transcript>> {
        let video_id = parse_video_id(url).ok_or_else(|| {
            AskTubeError::InvalidInput(format!("Not a YouTube video URL or ID: {}", url))
        })?;

        let transcript = with_timeout(
            self.timeout,
            self.source.fetch(&video_id, &self.languages),
        )
        .await?;

        info!(
            "Loaded transcript for {} ({} characters, language {})",
            transcript.video_id,
            transcript.text().chars().count(),
            transcript.language
        );

        let transcript = Arc::new(transcript);
        self.state = SessionState::TranscriptLoaded {
            transcript: transcript.clone(),
        };
        Ok(transcript)
    }

    /// Chunk and embed the loaded transcript. Returns the number of chunks.
    #[instrument(skip(self), fields(session = %self.id))]
    pub async fn build_index(&mut self) -> Result<usize> {
        let transcript = self.transcript().ok_or_else(|| {
            AskTubeError::InvalidState("Fetch a transcript before building the index".to_string())
        })?;

        let chunks = chunk_with(transcript.text(), &self.chunking)?;
        debug!(
            "Split transcript into {} chunks ({})",
            chunks.len(),
            self.chunking.strategy
        );

        let index = with_timeout(
            self.timeout,
            VectorIndex::build(chunks, self.embedder.as_ref()),
        )
        .await?;

        let count = index.len();
        self.state = SessionState::Indexed {
            transcript,
            index: Arc::new(index),
        };
        Ok(count)
    }

    /// Answer a question from the indexed transcript.
    #[instrument(skip(self), fields(session = %self.id))]
    pub async fn ask(&self, question: &str) -> Result<Answer> {
        let index = self.indexed()?;
        let question = Self::check_question(question)?;

        with_timeout(self.timeout, async {
            let chunks = self.retriever.retrieve(&index, question).await?;
            let context = assemble_context(&chunks);

            if context.trim().is_empty() {
                info!("No relevant transcript content for question");
                return Ok(Answer::NoRelevantContent);
            }

            let prompt = self.prompts.rag_prompt(&context, question);
            let text = self.generator.generate(&prompt).await?;

            Ok(Answer::Grounded {
                text,
                context,
                sources: chunks,
            })
        })
        .await
    }

    /// Scored retrieval without generation.
    #[instrument(skip(self), fields(session = %self.id))]
    pub async fn search(&self, question: &str) -> Result<Vec<SearchResult>> {
        let index = self.indexed()?;
        let question = Self::check_question(question)?;

        with_timeout(self.timeout, self.retriever.retrieve_scored(&index, question)).await
    }

    fn indexed(&self) -> Result<Arc<VectorIndex>> {
        self.index().ok_or_else(|| {
            AskTubeError::InvalidState(format!(
                "Build the index before asking questions (session is {})",
                self.status()
            ))
        })
    }

    fn check_question(question: &str) -> Result<&str> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AskTubeError::InvalidInput(
                "Question must not be empty".to_string(),
            ));
        }
        Ok(question)
    }
}

/// Run a future with an optional time limit.
async fn with_timeout<T, F>(limit: Option<Duration>, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, future)
            .await
            .map_err(|_| AskTubeError::Timeout(limit))?,
        None => future.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        FailingEmbedder, KeywordEmbedder, RecordingGenerator, StaticTranscriptSource, SCENARIO,
    };

    const VIDEO: &str = "dQw4w9WgXcQ";
    const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
    const OTHER_URL: &str = "https://youtu.be/aaaaaaaaaaa";

    fn scenario_settings() -> Settings {
        let mut settings = Settings::default();
        settings.chunking.max_size = 30;
        settings.chunking.overlap = 5;
        settings
    }

    struct Fixture {
        session: Session,
        embedder: Arc<KeywordEmbedder>,
        generator: Arc<RecordingGenerator>,
    }

    fn fixture(source: StaticTranscriptSource) -> Fixture {
        let embedder = Arc::new(KeywordEmbedder::new());
        let generator = Arc::new(RecordingGenerator::new("100 degrees Celsius."));
        let session = Session::with_components(
            &scenario_settings(),
            Prompts::default(),
            Arc::new(source),
            embedder.clone(),
            generator.clone(),
        )
        .unwrap();

        Fixture {
            session,
            embedder,
            generator,
        }
    }

    fn scenario_source() -> StaticTranscriptSource {
        StaticTranscriptSource::new()
            .with_video(VIDEO, SCENARIO)
            .with_video("aaaaaaaaaaa", "Red trees grow near hot water.")
    }

    #[tokio::test]
    async fn test_new_session_is_empty() {
        let f = fixture(scenario_source());
        assert_eq!(f.session.status(), SessionStatus::Empty);
        assert!(f.session.transcript().is_none());
        assert!(f.session.index().is_none());
    }

    #[tokio::test]
    async fn test_operations_out_of_order_are_rejected() {
        let mut f = fixture(scenario_source());

        assert!(matches!(
            f.session.build_index().await,
            Err(AskTubeError::InvalidState(_))
        ));
        assert!(matches!(
            f.session.ask("anything?").await,
            Err(AskTubeError::InvalidState(_))
        ));

        f.session.fetch_transcript(URL).await.unwrap();
        assert!(matches!(
            f.session.ask("anything?").await,
            Err(AskTubeError::InvalidState(_))
        ));
        assert!(matches!(
            f.session.search("anything?").await,
            Err(AskTubeError::InvalidState(_))
        ));
        assert_eq!(f.session.status(), SessionStatus::TranscriptLoaded);
    }

    #[tokio::test]
    async fn test_end_to_end_grounded_answer() {
        let mut f = fixture(scenario_source());

        let transcript = f.session.fetch_transcript(URL).await.unwrap();
        assert_eq!(transcript.video_id, VIDEO);
        assert_eq!(f.session.status(), SessionStatus::TranscriptLoaded);

        let count = f.session.build_index().await.unwrap();
        assert_eq!(count, 3);
        assert_eq!(f.session.status(), SessionStatus::Indexed);

        let answer = f
            .session
            .ask("At what temperature does water boil?")
            .await
            .unwrap();

        assert!(answer.is_grounded());
        assert_eq!(answer.text(), "100 degrees Celsius.");
        assert_eq!(answer.sources()[0].text, "100 degrees Celsius.");

        let prompts = f.generator.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].system.starts_with(crate::config::GROUNDING_RULES));
        assert!(prompts[0].user.contains("100 degrees Celsius"));
        assert!(prompts[0]
            .user
            .contains("Question: At what temperature does water boil?"));
    }

    #[tokio::test]
    async fn test_search_returns_scores_in_rank_order() {
        let mut f = fixture(scenario_source());
        f.session.fetch_transcript(URL).await.unwrap();
        f.session.build_index().await.unwrap();

        let results = f
            .session
            .search("At what temperature does water boil?")
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].chunk.ordinal, 2);
        assert!(results[0].score >= results[1].score);
        assert!(results[1].score >= results[2].score);
        assert!(f.generator.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_empty_transcript_answers_without_generator() {
        let mut f = fixture(StaticTranscriptSource::new().with_video(VIDEO, ""));

        f.session.fetch_transcript(URL).await.unwrap();
        assert_eq!(f.session.build_index().await.unwrap(), 0);

        let answer = f.session.ask("What is this about?").await.unwrap();
        assert_eq!(answer, Answer::NoRelevantContent);
        assert!(!answer.is_grounded());
        assert!(f.generator.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_empty_question_is_rejected() {
        let mut f = fixture(scenario_source());
        f.session.fetch_transcript(URL).await.unwrap();
        f.session.build_index().await.unwrap();

        assert!(matches!(
            f.session.ask("   ").await,
            Err(AskTubeError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_url_leaves_state_unchanged() {
        let mut f = fixture(scenario_source());
        assert!(matches!(
            f.session.fetch_transcript("https://example.com/video").await,
            Err(AskTubeError::InvalidInput(_))
        ));
        assert_eq!(f.session.status(), SessionStatus::Empty);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_index() {
        let mut f = fixture(scenario_source());
        f.session.fetch_transcript(URL).await.unwrap();
        f.session.build_index().await.unwrap();

        let result = f.session.fetch_transcript("bbbbbbbbbbb").await;
        assert!(matches!(result, Err(AskTubeError::VideoUnavailable(_))));
        assert_eq!(f.session.status(), SessionStatus::Indexed);
        assert_eq!(f.session.transcript().unwrap().video_id, VIDEO);
    }

    #[tokio::test]
    async fn test_failed_build_leaves_state_unchanged() {
        let generator = Arc::new(RecordingGenerator::new("unused"));
        let mut session = Session::with_components(
            &scenario_settings(),
            Prompts::default(),
            Arc::new(scenario_source()),
            Arc::new(FailingEmbedder),
            generator,
        )
        .unwrap();

        session.fetch_transcript(URL).await.unwrap();
        assert!(matches!(
            session.build_index().await,
            Err(AskTubeError::Embedding(_))
        ));
        assert_eq!(session.status(), SessionStatus::TranscriptLoaded);
        assert!(session.index().is_none());
    }

    #[tokio::test]
    async fn test_refetch_discards_index() {
        let mut f = fixture(scenario_source());
        f.session.fetch_transcript(URL).await.unwrap();
        f.session.build_index().await.unwrap();

        f.session.fetch_transcript(OTHER_URL).await.unwrap();
        assert_eq!(f.session.status(), SessionStatus::TranscriptLoaded);
        assert!(f.session.index().is_none());
        assert_eq!(f.session.transcript().unwrap().video_id, "aaaaaaaaaaa");
    }

    #[tokio::test]
    async fn test_rebuild_replaces_index() {
        let mut f = fixture(scenario_source());
        f.session.fetch_transcript(URL).await.unwrap();
        f.session.build_index().await.unwrap();
        let first = f.session.index().unwrap();

        f.session.build_index().await.unwrap();
        let second = f.session.index().unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), second.len());
        assert_eq!(f.embedder.calls(), 2);
    }

    #[tokio::test]
    async fn test_timeout_leaves_state_unchanged() {
        let source = scenario_source().with_delay(Duration::from_millis(500));
        let mut f = fixture(source);
        f.session = f
            .session
            .with_operation_timeout(Some(Duration::from_millis(20)));

        let result = f.session.fetch_transcript(URL).await;
        assert!(matches!(result, Err(AskTubeError::Timeout(_))));
        assert_eq!(f.session.status(), SessionStatus::Empty);
    }

    #[tokio::test]
    async fn test_set_k_limits_sources() {
        let mut f = fixture(scenario_source());
        f.session.fetch_transcript(URL).await.unwrap();
        f.session.build_index().await.unwrap();

        f.session.set_k(1).unwrap();
        assert_eq!(f.session.k(), 1);
        let answer = f
            .session
            .ask("At what temperature does water boil?")
            .await
            .unwrap();
        assert_eq!(answer.sources().len(), 1);
        assert!(matches!(f.session.set_k(0), Err(AskTubeError::Config(_))));
    }
}
