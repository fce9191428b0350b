//! External source boundary: fetch posts for a query, then run them through
//! the classifier as one batch.

use tracing::debug;

use crate::pipelines::sentiment::batch::{classify_batch, BatchItem, BatchResult};
use crate::pipelines::sentiment::pipeline::TextClassifier;
use crate::{Result, SentimentError};

/// Default number of items fetched per query.
pub const DEFAULT_FETCH_LIMIT: usize = 30;
/// Lower bound applied to caller-supplied limits.
pub const MIN_FETCH_LIMIT: usize = 10;
/// Upper bound applied to caller-supplied limits.
pub const MAX_FETCH_LIMIT: usize = 100;

/// A searchable external text source (social-media search, scraper, ...).
///
/// Implementations normalize whatever they fetch into [`BatchItem`]s, with
/// source-specific fields (score, url, subreddit) in the metadata bag.
pub trait ExternalSource {
    /// Fetch up to `limit` items for `query`, in source order.
    ///
    /// May return fewer items than requested. "No results" is an empty
    /// vector, never an error; errors mean the source itself was unreachable
    /// or rejected the query.
    fn fetch(&self, query: &str, limit: usize) -> Result<Vec<BatchItem>>;
}

/// Fetch posts for `query` and classify them as one batch.
///
/// The limit defaults to [`DEFAULT_FETCH_LIMIT`] and is clamped to
/// [`MIN_FETCH_LIMIT`]..=[`MAX_FETCH_LIMIT`]. An empty fetch yields an empty
/// [`BatchResult`] (check [`BatchResult::is_empty`]), not an error; fetch
/// failures propagate as [`SentimentError::SourceFetch`].
pub fn classify_query<C, S>(
    classifier: &C,
    source: &S,
    query: &str,
    limit: Option<usize>,
) -> Result<BatchResult>
where
    C: TextClassifier,
    S: ExternalSource,
{
    let query = query.trim();
    if query.is_empty() {
        return Err(SentimentError::Validation(
            "query cannot be empty".to_string(),
        ));
    }

    let limit = limit
        .unwrap_or(DEFAULT_FETCH_LIMIT)
        .clamp(MIN_FETCH_LIMIT, MAX_FETCH_LIMIT);
    let items = source.fetch(query, limit)?;
    if items.is_empty() {
        debug!(query, "source returned no items");
    }
    classify_batch(classifier, items)
}
