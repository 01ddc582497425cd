//! Identifiers that end up embedded in object-store keys or state-table
//! primary keys. Validation here is the single place that stands between a
//! config-supplied task id and a path-traversal in the object store.

/// A validated feed/task identifier.
///
/// Task ids come from operator-supplied configuration (`POST /crawl/rss`, the
/// config importer) and are later interpolated directly into object-store
/// key prefixes, so they're validated the same way a filename would be.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(String);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TaskIdError {
    #[error("task id is empty")]
    Empty,
    #[error("task id contains a path separator or traversal sequence")]
    PathTraversal,
    #[error("task id contains a character outside [A-Za-z0-9_-]")]
    InvalidCharacter,
}

impl TaskId {
    pub fn new(raw: impl Into<String>) -> Result<Self, TaskIdError> {
        let raw = raw.into();

        if raw.is_empty() {
            return Err(TaskIdError::Empty);
        }

        if raw.contains('/') || raw.contains('\\') || raw.contains("..") {
            return Err(TaskIdError::PathTraversal);
        }

        if !raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(TaskIdError::InvalidCharacter);
        }

        Ok(Self(raw))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for TaskId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for TaskId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_task_ids() {
        assert!(TaskId::new("reuters-world").is_ok());
        assert!(TaskId::new("task_123").is_ok());
    }

    #[test]
    fn rejects_path_traversal() {
        assert_eq!(TaskId::new("../etc/passwd"), Err(TaskIdError::PathTraversal));
        assert_eq!(TaskId::new("foo/bar"), Err(TaskIdError::PathTraversal));
        assert_eq!(
            TaskId::new("..\\windows\\system32"),
            Err(TaskIdError::PathTraversal)
        );
    }

    #[test]
    fn rejects_empty_and_invalid_characters() {
        assert_eq!(TaskId::new(""), Err(TaskIdError::Empty));
        assert_eq!(
            TaskId::new("task with spaces"),
            Err(TaskIdError::InvalidCharacter)
        );
    }
}
