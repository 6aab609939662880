use anyhow::{Context, Result};

/// Default User-Agent for job page fetches. Some job boards refuse
/// requests without a browser-like agent.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36";

/// Application configuration loaded from environment variables.
/// Missing credentials fail startup — before any pipeline stage can run.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: String,
    pub embeddings_api_key: String,
    pub embeddings_base_url: String,
    pub embedding_model: String,
    pub portfolio_csv_path: String,
    pub user_agent: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            groq_api_key: require_env("GROQ_API_KEY")?,
            embeddings_api_key: require_env("EMBEDDINGS_API_KEY")?,
            embeddings_base_url: std::env::var("EMBEDDINGS_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            embedding_model: std::env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| "text-embedding-3-small".to_string()),
            portfolio_csv_path: std::env::var("PORTFOLIO_CSV_PATH")
                .unwrap_or_else(|_| "resources/portfolios.csv".to_string()),
            user_agent: std::env::var("USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
