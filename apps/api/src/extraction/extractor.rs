//! Structured Extractor — turns a job posting URL into a `JobRecord`.
//!
//! Flow: fetch page → build extraction prompt → completion call →
//!       strict JSON parse. Malformed completion text is a hard failure;
//!       no fence-stripping or repair heuristics are applied, so bad LLM
//!       output can never leak wrong data into the outreach email.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::AppError;
use crate::extraction::page_loader::PageLoader;
use crate::extraction::prompts::EXTRACT_PROMPT_TEMPLATE;
use crate::llm_client::Completion;

/// Structured extraction of one job posting. Immutable once created.
///
/// All three keys are required in the completion JSON — a missing key fails
/// deserialization. `skills` may be empty but is always present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub role: String,
    pub description: String,
    pub skills: Vec<String>,
}

/// Extraction stage. Holds the page loader and completion client seams.
pub struct JobExtractor {
    loader: Arc<dyn PageLoader>,
    llm: Arc<dyn Completion>,
}

impl JobExtractor {
    pub fn new(loader: Arc<dyn PageLoader>, llm: Arc<dyn Completion>) -> Self {
        Self { loader, llm }
    }

    /// Fetches `url` and extracts a `JobRecord` from its first document.
    ///
    /// Later documents from a paginated fetch are ignored — the upstream
    /// source is a single job-posting page.
    pub async fn extract(&self, url: &str) -> Result<JobRecord, AppError> {
        let documents = self.loader.load(url).await?;

        let first = documents
            .first()
            .ok_or_else(|| AppError::Fetch(format!("{url} yielded no documents")))?;
        debug!(
            "Using first of {} fetched documents: {}",
            documents.len(),
            first.url
        );

        let prompt = EXTRACT_PROMPT_TEMPLATE.replace("{page_text}", &first.text);

        let completion = self
            .llm
            .complete(&prompt)
            .await
            .map_err(|e| AppError::Extraction(format!("Extraction completion failed: {e}")))?;

        let job = parse_job_record(&completion)?;

        info!(
            "Extracted job: role={:?}, {} skills",
            job.role,
            job.skills.len()
        );
        Ok(job)
    }
}

/// Strict parse of the completion text. The text must be exactly one JSON
/// object with the keys `role`, `description`, `skills` — anything else
/// (prose, markdown fences, missing keys) is a `Parse` failure.
fn parse_job_record(completion: &str) -> Result<JobRecord, AppError> {
    serde_json::from_str(completion)
        .map_err(|e| AppError::Parse(format!("Completion was not a valid job record: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::extraction::page_loader::Document;
    use crate::llm_client::LlmError;

    struct StubLoader {
        documents: Vec<Document>,
    }

    #[async_trait]
    impl PageLoader for StubLoader {
        async fn load(&self, _url: &str) -> Result<Vec<Document>, AppError> {
            Ok(self.documents.clone())
        }
    }

    struct FailingLoader;

    #[async_trait]
    impl PageLoader for FailingLoader {
        async fn load(&self, url: &str) -> Result<Vec<Document>, AppError> {
            Err(AppError::Fetch(format!("{url} is unreachable")))
        }
    }

    struct StubCompletion {
        response: String,
        calls: AtomicUsize,
        last_prompt: Mutex<String>,
    }

    impl StubCompletion {
        fn new(response: &str) -> Self {
            Self {
                response: response.to_string(),
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(String::new()),
            }
        }
    }

    #[async_trait]
    impl Completion for StubCompletion {
        async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = prompt.to_string();
            Ok(self.response.clone())
        }
    }

    fn doc(text: &str) -> Document {
        Document {
            url: "https://jobs.example/1".to_string(),
            text: text.to_string(),
        }
    }

    const VALID_COMPLETION: &str =
        r#"{"role": "Backend Engineer", "description": "Build APIs", "skills": ["Python"]}"#;

    #[tokio::test]
    async fn test_extract_parses_valid_completion() {
        let llm = Arc::new(StubCompletion::new(VALID_COMPLETION));
        let extractor = JobExtractor::new(
            Arc::new(StubLoader {
                documents: vec![doc("We need a Python backend engineer.")],
            }),
            llm,
        );

        let job = extractor.extract("https://jobs.example/1").await.unwrap();
        assert_eq!(job.role, "Backend Engineer");
        assert_eq!(job.skills, vec!["Python"]);
    }

    #[tokio::test]
    async fn test_only_first_document_is_used() {
        let llm = Arc::new(StubCompletion::new(VALID_COMPLETION));
        let extractor = JobExtractor::new(
            Arc::new(StubLoader {
                documents: vec![doc("FIRST PAGE TEXT"), doc("SECOND PAGE TEXT")],
            }),
            llm.clone(),
        );

        extractor.extract("https://jobs.example/1").await.unwrap();

        let prompt = llm.last_prompt.lock().unwrap().clone();
        assert!(prompt.contains("FIRST PAGE TEXT"));
        assert!(!prompt.contains("SECOND PAGE TEXT"));
    }

    #[tokio::test]
    async fn test_zero_documents_is_a_fetch_error() {
        let llm = Arc::new(StubCompletion::new(VALID_COMPLETION));
        let extractor = JobExtractor::new(Arc::new(StubLoader { documents: vec![] }), llm.clone());

        let err = extractor.extract("https://jobs.example/1").await.unwrap_err();
        assert!(matches!(err, AppError::Fetch(_)));
        // The completion client must never be invoked for a failed fetch.
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unreachable_url_propagates_fetch_error() {
        let llm = Arc::new(StubCompletion::new(VALID_COMPLETION));
        let extractor = JobExtractor::new(Arc::new(FailingLoader), llm.clone());

        let err = extractor.extract("https://jobs.example/dead").await.unwrap_err();
        assert!(matches!(err, AppError::Fetch(_)));
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_markdown_fenced_completion_is_a_parse_error() {
        // Strict policy: no fence-stripping, even when the JSON inside is fine.
        let fenced = "Sure! ```json\n{\"role\": \"Engineer\", \"description\": \"d\", \"skills\": []}\n```";
        let llm = Arc::new(StubCompletion::new(fenced));
        let extractor = JobExtractor::new(
            Arc::new(StubLoader {
                documents: vec![doc("posting")],
            }),
            llm,
        );

        let err = extractor.extract("https://jobs.example/1").await.unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }

    #[tokio::test]
    async fn test_missing_description_is_a_parse_error() {
        let incomplete = r#"{"role": "Engineer", "skills": ["Go"]}"#;
        let llm = Arc::new(StubCompletion::new(incomplete));
        let extractor = JobExtractor::new(
            Arc::new(StubLoader {
                documents: vec![doc("posting")],
            }),
            llm,
        );

        let err = extractor.extract("https://jobs.example/1").await.unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }

    #[test]
    fn test_skills_may_be_empty_but_never_absent() {
        let job = parse_job_record(r#"{"role": "r", "description": "d", "skills": []}"#).unwrap();
        assert!(job.skills.is_empty());

        let err = parse_job_record(r#"{"role": "r", "description": "d"}"#).unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }

    #[test]
    fn test_prompt_template_demands_bare_json() {
        assert!(EXTRACT_PROMPT_TEMPLATE.contains("Only return valid JSON"));
        assert!(EXTRACT_PROMPT_TEMPLATE.contains("no markdown"));
    }
}
