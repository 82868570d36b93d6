//! This crate is part of [urikit],
//! a toolkit for URIs and URI templates in Rust.
//!
//! It provides [`UriTemplate`], which expands variables into a URI
//! and matches URIs back against the template,
//! and [`UriTemplateHandler`], which expands templates
//! relative to a base URL, with default variable values and configurable encoding.
//!
//! ```
//! # use urikit_template::UriTemplate;
//! let template = UriTemplate::new("/items/{id:[0-9]+}")?;
//! assert!(template.matches("/items/42"));
//! assert!(!template.matches("/items/abc"));
//! # Ok::<(), urikit_template::error::TemplateError>(())
//! ```
//!
//! [urikit]: https://docs.rs/urikit/latest/urikit/

#![deny(missing_docs)]

pub mod error;
mod handler;
mod uri_template;

pub use self::handler::*;
pub use self::uri_template::*;

#[cfg(feature = "serde")]
mod _serde;

#[cfg(test)]
fn test_setup() {
    TEST_SETUP.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

#[cfg(test)]
static TEST_SETUP: std::sync::Once = std::sync::Once::new();
