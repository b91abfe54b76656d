//! Error types for gitdirclone.

use reqwest::StatusCode;
use thiserror::Error;

/// The main error type for directory cloning operations.
#[derive(Error, Debug)]
pub enum DirCloneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Authentication failed: the GitHub token was rejected")]
    Unauthorized,

    #[error("GitHub API rate limit exceeded{}", reset_suffix(.reset))]
    RateLimited { reset: Option<u64> },

    #[error("GitHub API request failed ({status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("Invalid repository '{0}': expected <owner>/<repo>")]
    InvalidRepo(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("'{path}' is not a directory")]
    NotADirectory { path: String },

    #[error("Malformed entry '{path}': {message}")]
    MalformedEntry { path: String, message: String },

    #[error("Failed to fetch directory {path}: {source}")]
    Directory {
        path: String,
        #[source]
        source: Box<DirCloneError>,
    },
}

impl DirCloneError {
    /// Attach the remote directory being processed, unless a deeper directory
    /// has already been attached.
    pub fn in_directory(self, path: impl Into<String>) -> Self {
        match self {
            err @ Self::Directory { .. } => err,
            other => Self::Directory {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }

    /// The underlying error with any directory context stripped.
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Directory { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Whether the remote resource did not exist (or was hidden from us).
    pub fn is_not_found(&self) -> bool {
        matches!(self.root_cause(), Self::NotFound { .. })
    }

    /// An extra line of advice to show alongside the error, if any.
    pub fn hint(&self) -> Option<&'static str> {
        match self.root_cause() {
            Self::NotFound { .. } => Some(
                "The repository may be private. Configure a token with `gitdirclone config --token <TOKEN>`.",
            ),
            Self::RateLimited { .. } => Some(
                "Unauthenticated requests have a low rate limit. Configure a token with `gitdirclone config --token <TOKEN>`.",
            ),
            Self::Unauthorized => Some(
                "Update the token with `gitdirclone config --token <TOKEN>` or remove it with `gitdirclone config --remove`.",
            ),
            _ => None,
        }
    }

    /// Return the CLI exit code for this error.
    pub fn exit_code(&self) -> u8 {
        1
    }
}

fn reset_suffix(reset: &Option<u64>) -> String {
    reset
        .map(|r| format!(" (resets at unix time {r})"))
        .unwrap_or_default()
}

/// A specialized Result type for directory cloning operations.
pub type Result<T> = std::result::Result<T, DirCloneError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn not_found() -> DirCloneError {
        DirCloneError::NotFound {
            resource: "/repos/octocat/secret/contents/src".into(),
        }
    }

    #[test]
    fn test_in_directory_wraps_once() {
        let err = not_found().in_directory("src/inner").in_directory("src");

        match &err {
            DirCloneError::Directory { path, .. } => assert_eq!(path, "src/inner"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().starts_with("Failed to fetch directory src/inner: Not found"));
    }

    #[test]
    fn test_not_found_hint_mentions_token() {
        let err = not_found().in_directory("src");

        assert!(err.is_not_found());
        let hint = err.hint().unwrap();
        assert!(hint.contains("config --token"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_rate_limit_message() {
        let err = DirCloneError::RateLimited {
            reset: Some(1_700_000_000),
        };
        assert!(err.to_string().contains("1700000000"));
        assert!(err.hint().is_some());

        let err = DirCloneError::RateLimited { reset: None };
        assert_eq!(err.to_string(), "GitHub API rate limit exceeded");
    }

    #[test]
    fn test_io_error_has_no_hint() {
        let err = DirCloneError::from(std::io::Error::other("disk full")).in_directory("docs");

        assert!(!err.is_not_found());
        assert!(err.hint().is_none());
        assert_eq!(err.exit_code(), 1);
    }
}
