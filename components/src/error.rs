//! Error and result type for URI components.

use crate::encoding::ComponentKind;
use thiserror::Error;

/// Type alias for `Result` with default error `UriError`.
///
/// Can be used like `std::result::Result` as well.
pub type Result<T, E = UriError> = std::result::Result<T, E>;

/// An error raised while parsing, building, expanding or encoding URI components.
#[derive(Debug, Error)]
pub enum UriError {
    /// The given text does not match the URI grammar.
    #[error("[{0}] is not a valid URI")]
    MalformedUri(String),
    /// The given text is not an absolute `http` or `https` URL.
    #[error("[{0}] is not a valid HTTP URL")]
    InvalidHttpUrl(String),
    /// A named variable source has no value for the given name.
    #[error("Map has no value for '{0}'")]
    MissingVariable(String),
    /// A positional variable source ran out of values.
    #[error("Not enough variable values available to expand '{0}'")]
    InsufficientVariables(String),
    /// Expansion was attempted on components that are already fully encoded.
    #[error("URI components already encoded, and could not possibly contain '{{' or '}}'")]
    AlreadyEncoded,
    /// A component claimed to be encoded contains an illegal character.
    #[error("Invalid character in {component:?} component: '{value}'")]
    InvalidCharacter {
        /// The component in which the character was found.
        component: ComponentKind,
        /// The offending component value.
        value: String,
    },
    /// A percent-encoded sequence could not be decoded.
    #[error("Invalid encoded sequence in '{0}'")]
    InvalidEncodedSequence(String),
    /// A port is not a number (it might be an unexpanded template variable).
    #[error("The port '{0}' is not a number")]
    InvalidPort(String),
    /// The rendered text was rejected by the URI reference parser.
    #[error("Invalid URI: {0}")]
    InvalidUri(#[from] oxiri::IriParseError),
}
