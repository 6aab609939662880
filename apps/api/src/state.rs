use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::pipeline::Pipeline;

/// Shared application state injected into all route handlers via Axum
/// extractors.
///
/// The pipeline is one process-wide session: the service serves a single
/// operator producing one email at a time, so the extracted job record
/// lives in the session between the extract and generate calls. The
/// clients and index inside it are the process-wide singletons —
/// constructed once at startup, construction failure is fatal.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Mutex<Pipeline>>,
    /// Runtime settings, kept for handlers that need them.
    #[allow(dead_code)]
    pub config: Config,
}
