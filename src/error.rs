//! Application error type.
//!
//! Every failure carries an [`ErrorKind`] which decides the process exit code.
//! Nothing is retried: errors bubble up to `app::run` and end the run.

/// Broad failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid command-line value.
    Usage,
    /// A required column is missing or holds a value of the wrong type.
    Schema,
    /// Network/HTTP failure, unreadable file, or malformed JSON.
    Fetch,
    /// A filter or aggregation produced zero rows.
    EmptyResult,
    /// Terminal or export-file failure.
    Io,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Usage => 2,
            ErrorKind::Schema => 3,
            ErrorKind::Fetch => 4,
            ErrorKind::EmptyResult => 5,
            ErrorKind::Io => 6,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Usage, message)
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Schema, message)
    }

    pub fn fetch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Fetch, message)
    }

    pub fn empty(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::EmptyResult, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct_per_kind() {
        let kinds = [
            ErrorKind::Usage,
            ErrorKind::Schema,
            ErrorKind::Fetch,
            ErrorKind::EmptyResult,
            ErrorKind::Io,
        ];
        let mut codes: Vec<u8> = kinds.iter().map(|k| k.exit_code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
        assert!(codes.iter().all(|&c| c != 0));
    }

    #[test]
    fn display_is_the_message() {
        let err = AppError::empty("No rows in window 2020-08.");
        assert_eq!(err.to_string(), "No rows in window 2020-08.");
        assert_eq!(err.kind(), ErrorKind::EmptyResult);
        assert_eq!(err.exit_code(), 5);
    }
}
