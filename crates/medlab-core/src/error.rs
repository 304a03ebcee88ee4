use thiserror::Error;

/// Core error types for MedLAB+ domain rules
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Unknown {field} value: {value}")]
    UnknownValue { field: &'static str, value: String },
}

impl CoreError {
    /// Create a new UnknownValue error
    pub fn unknown_value(field: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownValue {
            field,
            value: value.into(),
        }
    }
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_value_display() {
        let err = CoreError::unknown_value("status", "ARCHIVED");
        assert_eq!(err.to_string(), "Unknown status value: ARCHIVED");
    }
}
