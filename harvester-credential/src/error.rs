use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential provider request failed: {0}")]
    Provider(String),

    #[error("no credential has been fetched yet")]
    NotYetFetched,
}
