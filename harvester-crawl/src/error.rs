use thiserror::Error;

/// Errors raised while extracting, persisting, or indexing a single crawl.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("no content extracted")]
    NoContent,

    #[error("object store error: {0}")]
    ObjectStore(#[from] harvester_state::StateError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_extraction_errors() {
        let err = CrawlError::Extraction("timed out".into());
        assert_eq!(err.to_string(), "extraction failed: timed out");
    }
}
