// ABOUTME: Error types for pagefold including the ErrorCode enum and TransformError struct.
// ABOUTME: Provides categorized errors with convenience constructors and boolean helpers.

use std::fmt;

/// Error codes representing different categories of transform failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidArgument,
    Markup,
    Config,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidArgument => "invalid argument",
            ErrorCode::Markup => "markup error",
            ErrorCode::Config => "config error",
        };
        write!(f, "{}", s)
    }
}

/// The error type for every pagefold operation.
#[derive(Debug, thiserror::Error)]
pub struct TransformError {
    pub code: ErrorCode,
    /// Operation that failed, e.g. `retag` or `split`.
    pub op: String,
    /// What was wrong, usually naming the offending argument.
    pub detail: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

pub type Result<T> = std::result::Result<T, TransformError>;

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pagefold: {}: {}: {}", self.op, self.code, self.detail)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl TransformError {
    /// Create an InvalidArgument error.
    pub fn invalid_argument(
        op: impl Into<String>,
        detail: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code: ErrorCode::InvalidArgument,
            op: op.into(),
            detail: detail.into(),
            source,
        }
    }

    /// Create a Markup error.
    pub fn markup(
        op: impl Into<String>,
        detail: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code: ErrorCode::Markup,
            op: op.into(),
            detail: detail.into(),
            source,
        }
    }

    /// Create a Config error.
    pub fn config(
        op: impl Into<String>,
        detail: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code: ErrorCode::Config,
            op: op.into(),
            detail: detail.into(),
            source,
        }
    }

    /// Error for a required argument that was not supplied.
    pub fn missing(op: impl Into<String>, name: &str) -> Self {
        Self::invalid_argument(op, format!("missing required argument `{}`", name), None)
    }

    /// Returns true if this is an InvalidArgument error.
    pub fn is_invalid_argument(&self) -> bool {
        self.code == ErrorCode::InvalidArgument
    }

    /// Returns true if this is a Markup error.
    pub fn is_markup(&self) -> bool {
        self.code == ErrorCode::Markup
    }

    /// Returns true if this is a Config error.
    pub fn is_config(&self) -> bool {
        self.code == ErrorCode::Config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_op_code_and_detail() {
        let err = TransformError::invalid_argument("retag", "bad tag name `1x`", None);
        assert_eq!(
            err.to_string(),
            "pagefold: retag: invalid argument: bad tag name `1x`"
        );
    }

    #[test]
    fn display_appends_source() {
        let err = TransformError::config(
            "pipeline",
            "cannot parse pipeline",
            Some(anyhow::anyhow!("expected value at line 1")),
        );
        assert!(err.to_string().ends_with(": expected value at line 1"));
        assert!(err.is_config());
        assert!(!err.is_markup());
    }

    #[test]
    fn missing_names_the_argument() {
        let err = TransformError::missing("wrap", "markup");
        assert!(err.is_invalid_argument());
        assert!(err.detail.contains("`markup`"));
    }
}
