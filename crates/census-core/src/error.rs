use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by House Census.
#[derive(Error, Debug)]
pub enum CensusError {
    /// The character dataset could not be retrieved over HTTP.
    #[error("HTTP request to {url} failed: {message}")]
    Http { url: String, message: String },

    /// A response body or file was not a JSON array of records.
    #[error("Failed to decode records: {0}")]
    Decode(#[from] serde_json::Error),

    /// A local dataset file could not be opened or read.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A user-supplied date or date range could not be understood.
    #[error("Invalid date range input: {0}")]
    InvalidRange(String),
}

/// Convenience alias used throughout the census crates.
pub type Result<T> = std::result::Result<T, CensusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_http() {
        let err = CensusError::Http {
            url: "https://example.test/api".to_string(),
            message: "status 503".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "HTTP request to https://example.test/api failed: status 503"
        );
    }

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = CensusError::FileRead {
            path: PathBuf::from("/data/characters.json"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/data/characters.json"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_invalid_range() {
        let err = CensusError::InvalidRange("2020-13-01".to_string());
        assert_eq!(err.to_string(), "Invalid date range input: 2020-13-01");
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("[oops").unwrap_err();
        let err: CensusError = json_err.into();
        assert!(err.to_string().contains("Failed to decode records"));
    }
}
