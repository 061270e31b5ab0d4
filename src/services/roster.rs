//! Delegate roster export.
//!
//! One CSV line per delegate: name, committee, country, school. No header
//! row; the file is opened in spreadsheets that staff already label.

use crate::models::RosterRow;
use crate::store::{ConferenceStore, StoreError};

pub const ROSTER_FILENAME: &str = "delegateroster.csv";

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv buffer flush failed: {0}")]
    Flush(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Encode rows as RFC 4180 CSV.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn render_csv(rows: &[RosterRow]) -> Result<Vec<u8>, RosterError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.write_record([&row.delegate, &row.committee, &row.country, &row.school])?;
    }
    writer
        .into_inner()
        .map_err(|e| RosterError::Flush(e.error().to_string()))
}

/// Load the roster from the store and encode it.
///
/// # Errors
///
/// Returns a store or encoding error.
pub async fn export(store: &dyn ConferenceStore) -> Result<Vec<u8>, RosterError> {
    let rows = store.delegate_roster().await?;
    tracing::info!(delegates = rows.len(), "roster exported");
    render_csv(&rows)
}

#[cfg(test)]
#[path = "roster_test.rs"]
mod tests;
