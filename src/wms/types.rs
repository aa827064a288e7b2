//! Types for the paginated fetch engine

use crate::error::Error;
use serde::Deserialize;

/// One record returned by the API. The fetch engine never inspects record
/// contents; downstream shaping decides what to do with them.
pub type Record = serde_json::Value;

/// JSON shape of one entity page: `{"page_count": int, "results": [...]}`
///
/// `page_count` is read only from the page-1 response; later pages may
/// disagree and are not reconciled.
#[derive(Debug, Clone, Deserialize)]
pub struct PageResponse {
    #[serde(default = "default_page_count")]
    pub page_count: u32,

    #[serde(default)]
    pub results: Vec<Record>,
}

fn default_page_count() -> u32 {
    1
}

/// Terminal outcome of one page task
///
/// `Exhausted` and `Failed` both contribute zero records to the aggregate,
/// but are logged distinctly: exhaustion means the retry budget ran out on
/// transient errors, failure means a permanent (4xx) error seen once.
#[derive(Debug)]
pub enum PageOutcome {
    /// Page fetched; records in API-returned order
    Fetched(Vec<Record>),

    /// Retry budget exhausted on transient errors
    Exhausted { attempts: u32, last_error: Error },

    /// Permanent error, never retried
    Failed(Error),
}
