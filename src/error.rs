//! Error types for resourcery
//!
//! Every fatal condition in this crate surfaces as the single [`Error`]
//! type, so callers can catch one thing. Incident severities decide at
//! runtime whether an anomaly becomes an `Error` at all (see
//! [`crate::report`]).

use std::fmt;

/// Result type alias for resourcery operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for resourcery operations
#[derive(Debug, Clone)]
pub struct Error {
    /// The kind of error that occurred
    pub kind: ErrorKind,
    /// Dotted resource key or category the error relates to, if any
    pub resource: Option<String>,
    /// Actionable help message
    pub help: Option<String>,
    /// Underlying cause (as string for Clone compatibility)
    pub cause: Option<String>,
}

/// Categories of errors that can occur
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A source file exists but its content failed to parse
    Parse,
    /// A source file could not be read
    Io,
    /// The requested key was not found in any discovered file
    NotFound { resource: String },
    /// The requested key contains a wildcard character
    WildcardLookup { resource: String },
    /// No parser is registered for a file extension
    MissingParser { extension: String },
    /// A typed getter could not coerce the resolved value
    TypeCoercion,
    /// An incident escalated to fatal severity
    Incident { name: &'static str },
}

impl Error {
    /// Create a new parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Parse,
            resource: None,
            help: None,
            cause: Some(message.into()),
        }
    }

    /// Create an I/O error for an unreadable source file
    pub fn io(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Io,
            resource: Some(path.into()),
            help: None,
            cause: Some(message.into()),
        }
    }

    /// Create a not found error naming the requested key
    pub fn not_found(resource: impl Into<String>) -> Self {
        let key = resource.into();
        Self {
            kind: ErrorKind::NotFound {
                resource: key.clone(),
            },
            resource: Some(key.clone()),
            help: Some(format!(
                "Check that '{}' is defined in one of the discovered resource files",
                key
            )),
            cause: None,
        }
    }

    /// Create a wildcard lookup error
    pub fn wildcard_lookup(resource: impl Into<String>) -> Self {
        let key = resource.into();
        Self {
            kind: ErrorKind::WildcardLookup {
                resource: key.clone(),
            },
            resource: Some(key),
            help: Some("Wildcard lookups are not supported; request a fully qualified key".into()),
            cause: None,
        }
    }

    /// Create a missing parser error for a file extension
    pub fn missing_parser(extension: impl Into<String>, path: impl Into<String>) -> Self {
        let ext = extension.into();
        Self {
            kind: ErrorKind::MissingParser {
                extension: ext.clone(),
            },
            resource: Some(path.into()),
            help: Some(format!(
                "Register a parser for '{}' with ResourceManager::register_parser",
                ext
            )),
            cause: None,
        }
    }

    /// Create a type coercion error
    pub fn type_coercion(
        resource: impl Into<String>,
        expected: impl Into<String>,
        got: impl Into<String>,
    ) -> Self {
        Self {
            kind: ErrorKind::TypeCoercion,
            resource: Some(resource.into()),
            help: Some(format!(
                "Ensure the value can be converted to {}",
                expected.into()
            )),
            cause: Some(format!("Got: {}", got.into())),
        }
    }

    /// Create an error for an incident escalated to fatal severity
    ///
    /// Embedded newlines in the message are re-indented so multi-line
    /// incident text stays readable under the incident name.
    pub fn incident(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Incident { name },
            resource: None,
            help: None,
            cause: Some(message.into().replace('\n', "\n    ")),
        }
    }

    /// Add resource context to the error
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Add help message to the error
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::Parse => write!(f, "Parse error")?,
            ErrorKind::Io => write!(f, "I/O error")?,
            ErrorKind::NotFound { resource } => {
                write!(f, "Could not find resource: {}", resource)?
            }
            ErrorKind::WildcardLookup { resource } => {
                write!(f, "No wildcard search allowed: {}", resource)?
            }
            ErrorKind::MissingParser { extension } => {
                write!(f, "No parser found for: '{}'", extension)?
            }
            ErrorKind::TypeCoercion => write!(f, "Type coercion failed")?,
            ErrorKind::Incident { name } => write!(f, "{}", name)?,
        }

        if let Some(resource) = &self.resource {
            write!(f, "\n  Resource: {}", resource)?;
        }

        if let Some(cause) = &self.cause {
            write!(f, "\n  {}", cause)?;
        }

        if let Some(help) = &self.help {
            write!(f, "\n  Help: {}", help)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}
