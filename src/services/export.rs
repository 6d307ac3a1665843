// src/services/export.rs

//! CSV rendering of frequency tables.

use crate::error::{AppError, ErrorKind, Result};
use crate::models::FrequencyTable;
use crate::services::RedditGateway;

const HEADER: [&str; 2] = ["Subreddit", "Frequency"];
const VERBOSE_HEADER: [&str; 4] = ["Subreddit", "Frequency", "NSFW", "Subscribers"];

/// Renders a [`FrequencyTable`] as CSV.
///
/// In verbose mode each row also carries the subreddit's NSFW flag and
/// subscriber count, looked up one subreddit at a time.
pub struct CsvExporter<'a> {
    metadata: Option<&'a dyn RedditGateway>,
}

impl<'a> CsvExporter<'a> {
    /// Two-column exporter.
    pub fn new() -> Self {
        Self { metadata: None }
    }

    /// Four-column exporter that looks metadata up through `gateway`.
    pub fn verbose(gateway: &'a dyn RedditGateway) -> Self {
        Self {
            metadata: Some(gateway),
        }
    }

    /// Render the table, one row per subreddit in table order.
    pub async fn render(&self, table: &FrequencyTable) -> Result<Vec<u8>> {
        let mut wtr = csv::Writer::from_writer(Vec::new());

        match self.metadata {
            None => wtr.write_record(HEADER)?,
            Some(_) => wtr.write_record(VERBOSE_HEADER)?,
        }

        for (name, frequency) in table.iter().filter(|(_, count)| *count > 0) {
            let frequency = frequency.to_string();
            let Some(gateway) = self.metadata else {
                wtr.write_record([name, frequency.as_str()])?;
                continue;
            };

            let (nsfw, subscribers) = match gateway.subreddit_info(name).await {
                Ok(info) => (info.over18.to_string(), info.subscribers.to_string()),
                // Private and banned subreddits hide their metadata.
                Err(e) if e.kind() == ErrorKind::Forbidden => {
                    log::warn!("No metadata for r/{}: {}", name, e);
                    (String::new(), String::new())
                }
                Err(e) => return Err(e),
            };
            wtr.write_record([name, frequency.as_str(), nsfw.as_str(), subscribers.as_str()])?;
        }

        wtr.into_inner()
            .map_err(|e| AppError::from(e.into_error()))
    }
}

impl Default for CsvExporter<'_> {
    fn default() -> Self {
        Self::new()
    }
}
