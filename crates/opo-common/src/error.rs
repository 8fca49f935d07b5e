//! Error types for opo

use thiserror::Error;

/// Result type alias for opo operations
pub type Result<T> = std::result::Result<T, OpoError>;

/// Unified error type for all opo operations
#[derive(Error, Debug, Clone)]
pub enum OpoError {
    /// Nothing usable was configured; raised before any connection is opened
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("MongoDB error: {0}")]
    MongoDB(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl OpoError {
    /// Returns true for the configuration kind, false for operational failures
    pub fn is_config(&self) -> bool {
        matches!(self, OpoError::Config(_))
    }
}

impl From<std::io::Error> for OpoError {
    fn from(err: std::io::Error) -> Self {
        OpoError::Io(err.to_string())
    }
}

// MongoDB-specific error conversions (when mongodb-errors feature is enabled)
#[cfg(feature = "mongodb-errors")]
impl From<mongodb::error::Error> for OpoError {
    fn from(err: mongodb::error::Error) -> Self {
        OpoError::MongoDB(err.to_string())
    }
}

#[cfg(feature = "mongodb-errors")]
impl From<bson::ser::Error> for OpoError {
    fn from(err: bson::ser::Error) -> Self {
        OpoError::Serialization(format!("BSON serialization error: {}", err))
    }
}

#[cfg(feature = "mongodb-errors")]
impl From<bson::de::Error> for OpoError {
    fn from(err: bson::de::Error) -> Self {
        OpoError::Deserialization(format!("BSON deserialization error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_config() {
        let err = OpoError::Config("no DB_URL found".to_string());
        assert_eq!(err.to_string(), "Configuration error: no DB_URL found");
    }

    #[test]
    fn test_error_display_mongodb() {
        let err = OpoError::MongoDB("connection refused".to_string());
        assert_eq!(err.to_string(), "MongoDB error: connection refused");
    }

    #[test]
    fn test_error_display_connection() {
        let err = OpoError::Connection("Ping failed: timeout".to_string());
        assert_eq!(err.to_string(), "Connection error: Ping failed: timeout");
    }

    #[test]
    fn test_error_display_validation() {
        let err = OpoError::Validation("unknown topic type".to_string());
        assert_eq!(err.to_string(), "Validation error: unknown topic type");
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdout closed");
        let err: OpoError = io.into();
        assert!(matches!(err, OpoError::Io(_)));
        assert_eq!(err.to_string(), "I/O error: stdout closed");
    }

    #[test]
    fn test_is_config() {
        assert!(OpoError::Config("missing".to_string()).is_config());
        assert!(!OpoError::MongoDB("boom".to_string()).is_config());
        assert!(!OpoError::Connection("boom".to_string()).is_config());
        assert!(!OpoError::Io("boom".to_string()).is_config());
    }

    #[test]
    fn test_result_type_err() {
        let result: Result<u64> = Err(OpoError::Database("count failed".to_string()));
        assert!(result.is_err());
    }
}
