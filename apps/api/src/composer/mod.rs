//! Email Composer — turns a job record plus retrieved links into an email.
//!
//! The completion text is returned verbatim. Subject line, greeting, and
//! signature are the model's responsibility, not the composer's — no
//! post-processing, truncation, or structural validation happens here.

pub mod prompts;

use std::sync::Arc;

use tracing::info;

use crate::composer::prompts::EMAIL_PROMPT_TEMPLATE;
use crate::errors::AppError;
use crate::extraction::JobRecord;
use crate::llm_client::Completion;
use crate::portfolio::RetrievedLink;

pub struct EmailComposer {
    llm: Arc<dyn Completion>,
}

impl EmailComposer {
    pub fn new(llm: Arc<dyn Completion>) -> Self {
        Self { llm }
    }

    /// Builds the generation prompt and returns the raw completion text.
    ///
    /// `links` arrive in retrieval order and may contain duplicates across
    /// skill queries — they are passed through as-is.
    pub async fn compose(
        &self,
        job: &JobRecord,
        links: &[RetrievedLink],
    ) -> Result<String, AppError> {
        let prompt = build_email_prompt(job, links);

        let email = self
            .llm
            .complete(&prompt)
            .await
            .map_err(|e| AppError::Generation(format!("Email completion failed: {e}")))?;

        info!(
            "Composed email for role {:?} referencing {} links",
            job.role,
            links.len()
        );
        Ok(email)
    }
}

/// Fills the email template with the job description and the link list.
fn build_email_prompt(job: &JobRecord, links: &[RetrievedLink]) -> String {
    let link_list = links
        .iter()
        .map(|l| l.link.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    EMAIL_PROMPT_TEMPLATE
        .replace("{job_description}", &job.description)
        .replace("{link_list}", &link_list)
}
