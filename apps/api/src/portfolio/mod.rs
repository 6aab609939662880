// Stage 2: Portfolio retrieval.
// An embedding-backed nearest-neighbor store over (skill-tag, link) pairs,
// seeded once from the portfolio CSV.

pub mod embedder;
pub mod index;
pub mod source;

pub use embedder::{Embedder, HttpEmbedder};
pub use index::{PortfolioIndex, RetrievedLink};
pub use source::{load_portfolio, PortfolioEntry};
