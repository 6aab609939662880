//! Pipeline — sequences extraction → retrieval → composition.
//!
//! State machine: Idle → Extracting → Extracted → Retrieving → Composing →
//! Composed, with a terminal Failed reachable from any non-terminal state.
//! A new `submit` from Composed or Failed restarts at Extracting, discarding
//! prior job and email state. There are no automatic retries between stages;
//! a Failed state requires explicit re-submission by the caller.

pub mod handlers;

use std::sync::Arc;

use tracing::info;

use crate::composer::EmailComposer;
use crate::errors::AppError;
use crate::extraction::{JobExtractor, JobRecord};
use crate::portfolio::PortfolioIndex;

/// Number of portfolio links retrieved per extracted skill.
pub const TOP_K_PER_SKILL: usize = 2;

#[derive(Debug)]
pub enum PipelineState {
    Idle,
    Extracting,
    Extracted(JobRecord),
    Retrieving,
    Composing,
    Composed { job: JobRecord, email: String },
    Failed(AppError),
}

/// One user session's pipeline. The job record and generated email are owned
/// by this instance and discarded on re-submission; the portfolio index is
/// the only cross-session resource.
pub struct Pipeline {
    extractor: JobExtractor,
    index: Arc<PortfolioIndex>,
    composer: EmailComposer,
    state: PipelineState,
}

impl Pipeline {
    pub fn new(extractor: JobExtractor, index: Arc<PortfolioIndex>, composer: EmailComposer) -> Self {
        Self {
            extractor,
            index,
            composer,
            state: PipelineState::Idle,
        }
    }

    #[allow(dead_code)]
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// The generated email, visible only in the Composed state.
    #[allow(dead_code)]
    pub fn email(&self) -> Option<&str> {
        match &self.state {
            PipelineState::Composed { email, .. } => Some(email),
            _ => None,
        }
    }

    /// Runs the extraction stage for `url`, discarding any prior state.
    pub async fn submit(&mut self, url: &str) -> &PipelineState {
        self.state = PipelineState::Extracting;
        info!("Pipeline: extracting {}", url);

        self.state = match self.extractor.extract(url).await {
            Ok(job) => PipelineState::Extracted(job),
            Err(e) => PipelineState::Failed(e),
        };
        &self.state
    }

    /// Runs retrieval and composition for the extracted job record.
    /// Valid only from the Extracted state.
    pub async fn generate(&mut self) -> &PipelineState {
        let job = match std::mem::replace(&mut self.state, PipelineState::Retrieving) {
            PipelineState::Extracted(job) => job,
            other => {
                self.state = PipelineState::Failed(AppError::Validation(format!(
                    "Cannot generate from state {} — submit a job URL first",
                    state_name(&other)
                )));
                return &self.state;
            }
        };

        info!("Pipeline: retrieving links for {} skills", job.skills.len());
        let links = match self.index.query(&job.skills, TOP_K_PER_SKILL).await {
            Ok(links) => links,
            Err(e) => {
                self.state = PipelineState::Failed(e);
                return &self.state;
            }
        };

        self.state = PipelineState::Composing;
        info!("Pipeline: composing email with {} links", links.len());

        self.state = match self.composer.compose(&job, &links).await {
            Ok(email) => PipelineState::Composed { job, email },
            Err(e) => PipelineState::Failed(e),
        };
        &self.state
    }
}

fn state_name(state: &PipelineState) -> &'static str {
    match state {
        PipelineState::Idle => "Idle",
        PipelineState::Extracting => "Extracting",
        PipelineState::Extracted(_) => "Extracted",
        PipelineState::Retrieving => "Retrieving",
        PipelineState::Composing => "Composing",
        PipelineState::Composed { .. } => "Composed",
        PipelineState::Failed(_) => "Failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::extraction::page_loader::{Document, PageLoader};
    use crate::llm_client::{Completion, LlmError};
    use crate::portfolio::embedder::{EmbedError, Embedder};
    use crate::portfolio::PortfolioEntry;

    // ── Stubs ───────────────────────────────────────────────────────────────

    struct StubLoader {
        text: Option<&'static str>,
    }

    #[async_trait]
    impl PageLoader for StubLoader {
        async fn load(&self, url: &str) -> Result<Vec<Document>, AppError> {
            match self.text {
                Some(text) => Ok(vec![Document {
                    url: url.to_string(),
                    text: text.to_string(),
                }]),
                None => Err(AppError::Fetch(format!("{url} is unreachable"))),
            }
        }
    }

    /// Answers the extraction prompt with a job record and every other
    /// prompt with an email body, counting composition calls.
    struct ScriptedCompletion {
        job_json: &'static str,
        email: &'static str,
        compose_calls: AtomicUsize,
    }

    impl ScriptedCompletion {
        fn new(job_json: &'static str, email: &'static str) -> Self {
            Self {
                job_json,
                email,
                compose_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Completion for ScriptedCompletion {
        async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
            if prompt.contains("Extract the following as JSON") {
                Ok(self.job_json.to_string())
            } else {
                self.compose_calls.fetch_add(1, Ordering::SeqCst);
                Ok(self.email.to_string())
            }
        }
    }

    struct CountingEmbedder {
        vocab: Vec<&'static str>,
        calls: AtomicUsize,
    }

    impl CountingEmbedder {
        fn stacks() -> Self {
            Self {
                vocab: vec!["python", "django", "react", "node"],
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts
                .iter()
                .map(|text| {
                    let lower = text.to_lowercase();
                    self.vocab
                        .iter()
                        .map(|term| if lower.contains(term) { 1.0 } else { 0.0 })
                        .collect()
                })
                .collect())
        }
    }

    // ── Fixtures ────────────────────────────────────────────────────────────

    const BACKEND_JOB_JSON: &str = r#"{
        "role": "Backend Engineer",
        "description": "Scale our Django-based platform.",
        "skills": ["Python"]
    }"#;

    const EMAIL_TEXT: &str =
        "Subject: Backend engineering at scale\n\nSee our Django work at https://x/py.\n\nMohan";

    fn sample_corpus() -> Vec<PortfolioEntry> {
        vec![
            PortfolioEntry {
                id: "1".to_string(),
                tag_text: "Python, Django".to_string(),
                link: "https://x/py".to_string(),
            },
            PortfolioEntry {
                id: "2".to_string(),
                tag_text: "React, Node".to_string(),
                link: "https://x/js".to_string(),
            },
        ]
    }

    struct Harness {
        pipeline: Pipeline,
        llm: Arc<ScriptedCompletion>,
        embedder: Arc<CountingEmbedder>,
    }

    async fn harness(loader: StubLoader, llm: ScriptedCompletion) -> Harness {
        let llm = Arc::new(llm);
        let embedder = Arc::new(CountingEmbedder::stacks());
        let index = Arc::new(PortfolioIndex::new(embedder.clone()));
        index.seed(sample_corpus()).await.unwrap();
        let seed_calls = embedder.calls.swap(0, Ordering::SeqCst);
        assert_eq!(seed_calls, 1);

        let extractor = JobExtractor::new(Arc::new(loader), llm.clone());
        let composer = EmailComposer::new(llm.clone());
        Harness {
            pipeline: Pipeline::new(extractor, index, composer),
            llm,
            embedder,
        }
    }

    // ── Tests ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let mut h = harness(
            StubLoader {
                text: Some("We are hiring a Backend Engineer. Python required."),
            },
            ScriptedCompletion::new(BACKEND_JOB_JSON, EMAIL_TEXT),
        )
        .await;

        let state = h.pipeline.submit("https://jobs.example/backend").await;
        match state {
            PipelineState::Extracted(job) => {
                assert_eq!(job.role, "Backend Engineer");
                assert_eq!(job.skills, vec!["Python"]);
            }
            other => panic!("expected Extracted, got {other:?}"),
        }

        h.pipeline.generate().await;
        let email = h.pipeline.email().expect("pipeline should be Composed");
        assert!(!email.is_empty());
        assert!(email.contains("https://x/py"));
        // The email is prose, not a bare JSON payload.
        assert!(serde_json::from_str::<serde_json::Value>(email).is_err());
    }

    #[tokio::test]
    async fn test_fetch_failure_never_touches_index_or_composer() {
        let mut h = harness(
            StubLoader { text: None },
            ScriptedCompletion::new(BACKEND_JOB_JSON, EMAIL_TEXT),
        )
        .await;

        let state = h.pipeline.submit("https://jobs.example/dead").await;
        assert!(matches!(
            state,
            PipelineState::Failed(AppError::Fetch(_))
        ));

        assert_eq!(h.embedder.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.llm.compose_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_resubmission_discards_prior_email() {
        let mut h = harness(
            StubLoader {
                text: Some("Backend Engineer posting"),
            },
            ScriptedCompletion::new(BACKEND_JOB_JSON, EMAIL_TEXT),
        )
        .await;

        h.pipeline.submit("https://jobs.example/1").await;
        h.pipeline.generate().await;
        assert!(h.pipeline.email().is_some());

        // New submission: stale email is no longer visible.
        let state = h.pipeline.submit("https://jobs.example/2").await;
        assert!(matches!(state, PipelineState::Extracted(_)));
        assert!(h.pipeline.email().is_none());

        // And a fresh Composed state makes a new email visible again.
        h.pipeline.generate().await;
        assert!(h.pipeline.email().is_some());
    }

    #[tokio::test]
    async fn test_resubmission_recovers_from_failed() {
        let mut h = harness(
            StubLoader { text: None },
            ScriptedCompletion::new(BACKEND_JOB_JSON, EMAIL_TEXT),
        )
        .await;

        let state = h.pipeline.submit("https://jobs.example/dead").await;
        assert!(matches!(state, PipelineState::Failed(_)));

        // No automatic retry happened; an explicit re-submit runs extraction
        // again from scratch.
        let state = h.pipeline.submit("https://jobs.example/dead").await;
        assert!(matches!(state, PipelineState::Failed(AppError::Fetch(_))));
    }

    #[tokio::test]
    async fn test_generate_without_extracted_job_fails() {
        let mut h = harness(
            StubLoader {
                text: Some("posting"),
            },
            ScriptedCompletion::new(BACKEND_JOB_JSON, EMAIL_TEXT),
        )
        .await;

        let state = h.pipeline.generate().await;
        assert!(matches!(
            state,
            PipelineState::Failed(AppError::Validation(_))
        ));
        assert_eq!(h.llm.compose_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_skills_still_compose() {
        let mut h = harness(
            StubLoader {
                text: Some("posting"),
            },
            ScriptedCompletion::new(
                r#"{"role": "Manager", "description": "People role.", "skills": []}"#,
                EMAIL_TEXT,
            ),
        )
        .await;

        h.pipeline.submit("https://jobs.example/mgr").await;
        h.pipeline.generate().await;
        // Zero query texts retrieve zero links, but composition still runs.
        assert!(h.pipeline.email().is_some());
        assert_eq!(h.llm.compose_calls.load(Ordering::SeqCst), 1);
    }
}
