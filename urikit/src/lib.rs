//! This crate aims to provide a comprehensive toolkit
//! for working with URIs and URI templates in Rust.
//!
//! A URI is decomposed into [components](components::UriComponents),
//! which are either *opaque* (e.g. `mailto:joe@example.com`)
//! or *hierarchical* (scheme, user info, host, port, path, query and fragment).
//! Components may contain `{variable}` placeholders,
//! to be expanded with values taken from a map or from a sequence.
//! Each component is percent-encoded according to its own rules,
//! as specified by [RFC 3986].
//!
//! [RFC 3986]: https://tools.ietf.org/html/rfc3986
//!
//! # Getting Started
//!
//! ```
//! use urikit::components::{PositionalVariables, UriComponentsBuilder};
//! use urikit::template::UriTemplate;
//!
//! let uri = UriComponentsBuilder::from_uri_string("http://example.com/hotels/{hotel}")?
//!     .query_param("lang", ["en"])
//!     .build_and_expand(PositionalVariables::new(["42"]))?
//!     .encode();
//! assert_eq!(uri.to_string(), "http://example.com/hotels/42?lang=en");
//!
//! let template = UriTemplate::new("http://example.com/hotels/{hotel:[0-9]+}{rest}")?;
//! let vars = template.match_uri(&uri.to_string());
//! assert_eq!(vars["hotel"], "42");
//! assert_eq!(vars["rest"], "?lang=en");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! This crate is merely a re-export of the crates composing urikit.

pub use urikit_components as components;
pub use urikit_template as template;
