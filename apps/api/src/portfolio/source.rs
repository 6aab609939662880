//! Portfolio source — reads the tabular corpus the index is seeded from.
//!
//! One CSV row = one `PortfolioEntry`. Row order is significant: it defines
//! the stable tie-break order for seeding and for similarity ties.

use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// One indexed (skill-tag, reference-link) pair representing prior work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioEntry {
    pub id: String,
    pub tag_text: String,
    pub link: String,
}

/// Raw CSV row shape. Column headers match the source table exactly.
#[derive(Debug, Deserialize)]
struct PortfolioRow {
    #[serde(rename = "Tech stacks")]
    tech_stacks: String,
    #[serde(rename = "Portfolio link")]
    portfolio_link: String,
}

/// Loads the portfolio corpus from a CSV file, preserving row order.
pub fn load_portfolio(path: &Path) -> Result<Vec<PortfolioEntry>, AppError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| {
        AppError::IndexUnavailable(format!(
            "Cannot read portfolio source {}: {e}",
            path.display()
        ))
    })?;

    let mut entries = Vec::new();
    for row in reader.deserialize::<PortfolioRow>() {
        let row = row.map_err(|e| {
            AppError::IndexUnavailable(format!("Malformed portfolio row: {e}"))
        })?;
        entries.push(PortfolioEntry {
            id: Uuid::new_v4().to_string(),
            tag_text: row.tech_stacks,
            link: row.portfolio_link,
        });
    }

    Ok(entries)
}
