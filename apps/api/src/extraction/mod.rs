// Stage 1: Structured extraction.
// Fetches a job posting page, asks the LLM for a fixed-schema JSON record,
// and parses it strictly. All LLM calls go through llm_client.

pub mod extractor;
pub mod page_loader;
pub mod prompts;

pub use extractor::{JobExtractor, JobRecord};
pub use page_loader::{Document, HttpPageLoader, PageLoader};
