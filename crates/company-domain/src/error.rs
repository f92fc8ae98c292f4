//! Error taxonomy for the directory
//!
//! `DirectoryError` is what callers see: a stable kind plus a short
//! message. `RepositoryError` is what the outbound ports report; the
//! use case layer decides how each one maps onto a `DirectoryError`.

/// Stable error kinds surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InvalidArgument,
    PermissionDenied,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::AlreadyExists => "already_exists",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::PermissionDenied => "permission_denied",
            ErrorKind::Internal => "internal",
        }
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors returned by directory operations
///
/// `Internal` never carries the underlying cause, only a public message.
/// An `Internal` error after a mutation does NOT mean nothing happened:
/// a failed shared-cache invalidation is reported this way after the
/// canonical write already committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    NotFound { message: String },
    AlreadyExists { message: String },
    InvalidArgument { message: String },
    PermissionDenied { message: String },
    Internal { message: String },
}

impl DirectoryError {
    pub fn not_found(message: impl Into<String>) -> Self {
        DirectoryError::NotFound {
            message: message.into(),
        }
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        DirectoryError::AlreadyExists {
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        DirectoryError::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        DirectoryError::PermissionDenied {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        DirectoryError::Internal {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DirectoryError::NotFound { .. } => ErrorKind::NotFound,
            DirectoryError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            DirectoryError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            DirectoryError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            DirectoryError::Internal { .. } => ErrorKind::Internal,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            DirectoryError::NotFound { message }
            | DirectoryError::AlreadyExists { message }
            | DirectoryError::InvalidArgument { message }
            | DirectoryError::PermissionDenied { message }
            | DirectoryError::Internal { message } => message,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl core::fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.kind(), self.message())
    }
}

impl std::error::Error for DirectoryError {}

/// Errors that can occur inside an outbound port
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Record not found
    NotFound { id: String },
    /// Failed to read or persist
    PersistenceError { message: String },
    /// A remote collaborator (resolver, shared cache) failed
    Remote { service: String, message: String },
}

impl core::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RepositoryError::NotFound { id } => {
                write!(f, "Record not found: {}", id)
            }
            RepositoryError::PersistenceError { message } => {
                write!(f, "Persistence error: {}", message)
            }
            RepositoryError::Remote { service, message } => {
                write!(f, "{} error: {}", service, message)
            }
        }
    }
}

impl std::error::Error for RepositoryError {}
