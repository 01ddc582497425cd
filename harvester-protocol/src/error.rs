#[derive(Debug, Clone, thiserror::Error)]
pub enum ProtocolError {
    #[error("message body is not a valid job envelope: {0}")]
    Malformed(String),
    #[error("unknown job type: {0}")]
    UnknownType(String),
}
