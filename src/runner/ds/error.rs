use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum JErrorType {
    #[error("Uncaught reference error: {0}.")]
    ReferenceError(String),
    #[error("Uncaught type error: {0}.")]
    TypeError(String),
    #[error("Uncaught range error: {0}.")]
    RangeError(String),
}
impl JErrorType {
    pub fn message(&self) -> &str {
        match self {
            JErrorType::ReferenceError(m)
            | JErrorType::TypeError(m)
            | JErrorType::RangeError(m) => m,
        }
    }

    pub fn is_type_error(&self) -> bool {
        matches!(self, JErrorType::TypeError(_))
    }

    pub fn is_range_error(&self) -> bool {
        matches!(self, JErrorType::RangeError(_))
    }

    pub fn is_reference_error(&self) -> bool {
        matches!(self, JErrorType::ReferenceError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_rendering() {
        let e = JErrorType::TypeError("x is not a function".to_string());
        assert_eq!(e.to_string(), "Uncaught type error: x is not a function.");
        assert_eq!(e.message(), "x is not a function");
        assert!(e.is_type_error());
        assert!(!e.is_range_error());
    }
}
