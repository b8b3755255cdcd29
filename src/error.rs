use std::path::PathBuf;

use thiserror::Error;

/// Failure taxonomy for the scraping and tracking core.
///
/// Per-item and per-search failures (`Fetch`, `Parse`, `MissingField`) are
/// logged at the poll loop and the cycle moves on; `Persistence` is fatal.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Network failure, timeout, or non-200 status while fetching a page.
    #[error("could not fetch {url}: {detail}")]
    Fetch { url: String, detail: String },

    /// A response body or a numeric field could not be parsed.
    #[error("could not parse {what}: {detail}")]
    Parse { what: &'static str, detail: String },

    /// A required element is missing from an item page, which usually means
    /// the page did not render the expected item layout.
    #[error("missing {0} on item page")]
    MissingField(&'static str),

    /// The scraped-URL store could not be opened or written.
    #[error("scraped-url store at {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
