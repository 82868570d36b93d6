//! Error and result type for URI templates.

use thiserror::Error;
use urikit_components::error::UriError;

/// Type alias for `Result` with default error `TemplateError`.
///
/// Can be used like `std::result::Result` as well.
pub type Result<T, E = TemplateError> = std::result::Result<T, E>;

/// An error raised while compiling or expanding a URI template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A variable ends with `:` but specifies no regular expression.
    #[error("No custom regular expression specified after ':' in \"{0}\"")]
    EmptyCustomRegex(String),
    /// A custom regular expression is not valid.
    #[error("Invalid custom regular expression: {0}")]
    InvalidPattern(#[from] regex::Error),
    /// A base URL lacks a scheme or a host, or has a query or a fragment.
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// The rejected base URL.
        url: String,
        /// Why it was rejected.
        reason: &'static str,
    },
    /// An error from the underlying URI components.
    #[error(transparent)]
    Uri(#[from] UriError),
}

impl From<oxiri::IriParseError> for TemplateError {
    fn from(other: oxiri::IriParseError) -> Self {
        TemplateError::Uri(other.into())
    }
}
