//! This crate is part of [urikit],
//! a toolkit for URIs and URI templates in Rust.
//!
//! It provides the [`UriComponents`] model
//! (opaque or hierarchical, possibly containing `{variable}` placeholders),
//! a [`UriComponentsBuilder`] to parse or assemble them,
//! and the [percent-encoding](encoding) rules of
//! [\[RFC 3986\]](https://tools.ietf.org/html/rfc3986) for each component.
//!
//! ```
//! # use urikit_components::UriComponents;
//! # use std::collections::HashMap;
//! let template = UriComponents::parse("http://example.com/hotels/{hotel}/bookings/{booking}")?;
//! let vars: HashMap<_, _> = [("hotel", "Rest & Relax"), ("booking", "42")].into_iter().collect();
//! let uri = template.encode_template().expand(&vars)?;
//! assert_eq!(uri.to_string(), "http://example.com/hotels/Rest%20%26%20Relax/bookings/42");
//! # Ok::<(), urikit_components::error::UriError>(())
//! ```
//!
//! [urikit]: https://docs.rs/urikit/latest/urikit/

#![deny(missing_docs)]

mod builder;
mod components;
pub mod encoding;
pub mod error;
mod expand;
mod forwarded;
mod parser;
mod path;
mod query;
mod variables;

pub use self::builder::*;
pub use self::components::*;
pub use self::expand::expand_uri_component;
pub use self::path::PathComponent;
pub use self::query::QueryParams;
pub use self::variables::*;

#[cfg(test)]
fn test_setup() {
    TEST_SETUP.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

#[cfg(test)]
static TEST_SETUP: std::sync::Once = std::sync::Once::new();
