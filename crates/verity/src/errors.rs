use thiserror::Error;

/// Failures talking to the upstream model.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Server error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Failed to parse response chunk: {0}")]
    Parse(String),

    #[error("Model API error: {0}")]
    Api(String),
}

pub type GenerationResult<T> = Result<T, GenerationError>;

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::Request(err.to_string())
    }
}

impl From<serde_json::Error> for GenerationError {
    fn from(err: serde_json::Error) -> Self {
        GenerationError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let err = GenerationError::Status {
            status: 429,
            body: "quota exceeded".to_string(),
        };
        assert_eq!(err.to_string(), "Server error 429: quota exceeded");
    }

    #[test]
    fn test_from_serde_error() {
        let err: GenerationError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, GenerationError::Parse(_)));
    }
}
