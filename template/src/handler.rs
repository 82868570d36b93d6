//! I define [`UriTemplateHandler`],
//! which expands URI templates according to a reusable configuration.
use crate::error::{Result, TemplateError};
use oxiri::IriRef;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};
use urikit_components::{
    PositionalVariables, TemplateValue, UriComponents, UriComponentsBuilder, UriTemplateVariables,
};

/// Expands URI templates into URIs, with
/// * an optional base URL, prepended to expanded URIs that have no host;
/// * default variable values, overridden by the values passed to [`expand`](Self::expand);
/// * a strict encoding mode, where every character of a value outside the unreserved set
///   is encoded;
/// * a path parsing mode, where the path of the template is split into segments,
///   so that `/` in values gets encoded.
///
/// When strict encoding is enabled, path parsing is ignored.
///
/// ```
/// # use urikit_template::UriTemplateHandler;
/// # use std::collections::HashMap;
/// let handler = UriTemplateHandler::new()
///     .with_base_url("http://example.com/api")?
///     .with_strict_encoding(true);
/// let vars: HashMap<_, _> = [("hotel", "Rest & Relax")].into_iter().collect();
/// let uri = handler.expand("/hotels/{hotel}", &vars)?;
/// assert_eq!(uri.as_str(), "http://example.com/api/hotels/Rest%20%26%20Relax");
/// # Ok::<(), urikit_template::error::TemplateError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct UriTemplateHandler {
    base_url: Option<String>,
    default_variables: HashMap<String, TemplateValue>,
    strict_encoding: bool,
    parse_path: bool,
}

impl UriTemplateHandler {
    /// A handler without base URL nor default variables, with both modes disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL, consuming and returning `self`.
    ///
    /// # Errors
    /// See [`set_base_url`](Self::set_base_url).
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.set_base_url(Some(base_url))?;
        Ok(self)
    }

    /// Set the default variable values, consuming and returning `self`.
    pub fn with_default_variables<I, K, V>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<TemplateValue>,
    {
        self.set_default_variables(variables);
        self
    }

    /// Enable or disable strict encoding, consuming and returning `self`.
    pub fn with_strict_encoding(mut self, strict_encoding: bool) -> Self {
        self.set_strict_encoding(strict_encoding);
        self
    }

    /// Enable or disable path parsing, consuming and returning `self`.
    pub fn with_parse_path(mut self, parse_path: bool) -> Self {
        self.set_parse_path(parse_path);
        self
    }

    /// Set or remove the base URL.
    ///
    /// # Errors
    /// Fails if `base_url` has no scheme or no host,
    /// or if it has a query or a fragment.
    pub fn set_base_url(&mut self, base_url: Option<&str>) -> Result<()> {
        self.base_url = match base_url {
            Some(url) => {
                check_base_url(url)?;
                Some(url.to_string())
            }
            None => None,
        };
        Ok(())
    }

    /// Replace the default variable values.
    pub fn set_default_variables<I, K, V>(&mut self, variables: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<TemplateValue>,
    {
        self.default_variables = variables
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
    }

    /// Enable or disable strict encoding.
    ///
    /// This supersedes [path parsing](Self::set_parse_path).
    pub fn set_strict_encoding(&mut self, strict_encoding: bool) {
        self.strict_encoding = strict_encoding;
    }

    /// Enable or disable path parsing.
    ///
    /// This has no effect while [strict encoding](Self::set_strict_encoding) is enabled.
    pub fn set_parse_path(&mut self, parse_path: bool) {
        self.parse_path = parse_path;
    }

    /// The base URL, if any.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// The default variable values.
    pub fn default_variables(&self) -> &HashMap<String, TemplateValue> {
        &self.default_variables
    }

    /// Whether strict encoding is enabled.
    pub fn is_strict_encoding(&self) -> bool {
        self.strict_encoding
    }

    /// Whether path parsing is enabled.
    pub fn should_parse_path(&self) -> bool {
        self.parse_path
    }

    /// Expand `template` with the values of `variables`,
    /// falling back to the default variable values.
    ///
    /// # Errors
    /// Fails if a variable has no value,
    /// or if the result is not a valid URI reference.
    pub fn expand<K, V, S>(&self, template: &str, variables: &HashMap<K, V, S>) -> Result<IriRef<String>>
    where
        K: Borrow<str> + Hash + Eq,
        V: Clone + Into<TemplateValue>,
        S: BuildHasher,
    {
        if self.default_variables.is_empty() {
            return self.expand_internal(template, variables);
        }
        let mut merged = self.default_variables.clone();
        merged.extend(
            variables
                .iter()
                .map(|(k, v)| (k.borrow().to_string(), v.clone().into())),
        );
        self.expand_internal(template, &merged)
    }

    /// Expand `template` with `values`, consumed in order of appearance of the variables.
    ///
    /// Default variable values are not used.
    ///
    /// # Errors
    /// Fails if there are fewer values than variable occurrences,
    /// or if the result is not a valid URI reference.
    pub fn expand_positional<I>(&self, template: &str, values: I) -> Result<IriRef<String>>
    where
        I: IntoIterator,
        I::Item: Into<TemplateValue>,
    {
        self.expand_internal(template, PositionalVariables::new(values))
    }

    fn expand_internal<V: UriTemplateVariables>(&self, template: &str, vars: V) -> Result<IriRef<String>> {
        let mut builder = self.init_builder(template)?;
        let components = if self.strict_encoding {
            builder.encode_template().build_and_expand(vars)?
        } else {
            builder.build_and_expand(vars)?.encode()
        };
        let url = self.insert_base_url(&components);
        log::debug!("expanded {template:?} to {url:?}");
        Ok(IriRef::parse(url)?)
    }

    fn init_builder(&self, template: &str) -> Result<UriComponentsBuilder> {
        let mut builder = UriComponentsBuilder::from_uri_string(template)?;
        if self.parse_path && !self.strict_encoding {
            let segments = builder.build().path_segments();
            builder.replace_path("");
            builder.path_segment(segments);
        }
        Ok(builder)
    }

    fn insert_base_url(&self, components: &UriComponents) -> String {
        let url = components.to_uri_string();
        match &self.base_url {
            Some(base_url) if components.host().is_none() => format!("{base_url}{url}"),
            _ => url,
        }
    }
}

fn check_base_url(url: &str) -> Result<()> {
    let invalid = |reason: &'static str| TemplateError::InvalidBaseUrl {
        url: url.to_string(),
        reason,
    };
    let components = UriComponents::parse(url)?;
    if components.scheme().is_none() {
        return Err(invalid("no scheme"));
    }
    if components.host().map_or(true, str::is_empty) {
        return Err(invalid("no host"));
    }
    // an empty query or fragment is dropped by the parser
    if components.query().is_some() || url.contains('?') {
        return Err(invalid("query not allowed"));
    }
    if components.fragment().is_some() || url.contains('#') {
        return Err(invalid("fragment not allowed"));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;
    use urikit_components::error::UriError;

    fn vars<'a>(pairs: &[(&'a str, &'a str)]) -> HashMap<&'a str, &'a str> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn plain() {
        crate::test_setup();
        let handler = UriTemplateHandler::new();
        let uri = handler
            .expand("http://example.com/hotels/{hotel}", &vars(&[("hotel", "a b")]))
            .unwrap();
        assert_eq!(uri.as_str(), "http://example.com/hotels/a%20b");
    }

    #[test]
    fn base_url_prepended() {
        let handler = UriTemplateHandler::new()
            .with_base_url("http://example.com/api")
            .unwrap();
        let uri = handler.expand_positional("/hotels/{hotel}", ["1"]).unwrap();
        assert_eq!(uri.as_str(), "http://example.com/api/hotels/1");
    }

    #[test]
    fn base_url_ignored_with_host() {
        let handler = UriTemplateHandler::new()
            .with_base_url("http://example.com/api")
            .unwrap();
        let uri = handler
            .expand_positional("https://other.org/{x}", ["1"])
            .unwrap();
        assert_eq!(uri.as_str(), "https://other.org/1");
    }

    #[test_case("/relative"; "no scheme")]
    #[test_case("mailto:joe@example.com"; "opaque")]
    #[test_case("http://example.com/?q=1"; "query")]
    #[test_case("http://example.com/#top"; "fragment")]
    #[test_case("http://example.com/?"; "empty query")]
    #[test_case("http://example.com/#"; "empty fragment")]
    fn invalid_base_url(base_url: &str) {
        let res = UriTemplateHandler::new().with_base_url(base_url);
        assert!(matches!(res, Err(TemplateError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn remove_base_url() {
        let mut handler = UriTemplateHandler::new()
            .with_base_url("http://example.com")
            .unwrap();
        handler.set_base_url(None).unwrap();
        assert_eq!(handler.base_url(), None);
    }

    #[test]
    fn default_variables() {
        let handler = UriTemplateHandler::new()
            .with_default_variables([("lang", "en"), ("hotel", "0")]);
        let uri = handler
            .expand("/hotels/{hotel}?lang={lang}", &vars(&[("hotel", "1")]))
            .unwrap();
        assert_eq!(uri.as_str(), "/hotels/1?lang=en");
    }

    #[test]
    fn missing_variable() {
        let handler = UriTemplateHandler::new();
        let res = handler.expand("/hotels/{hotel}", &vars(&[]));
        assert!(matches!(
            res,
            Err(TemplateError::Uri(UriError::MissingVariable(n))) if n == "hotel"
        ));
    }

    #[test]
    fn insufficient_values() {
        let handler = UriTemplateHandler::new();
        let res = handler.expand_positional("/{a}/{b}", ["1"]);
        assert!(matches!(
            res,
            Err(TemplateError::Uri(UriError::InsufficientVariables(n))) if n == "b"
        ));
    }

    #[test_case(false, false, "/items/a/b%20c"; "lenient")]
    #[test_case(false, true, "/items/a%2Fb%20c"; "parse path")]
    #[test_case(true, false, "/items/a%2Fb%20c"; "strict")]
    #[test_case(true, true, "/items/a%2Fb%20c"; "strict supersedes parse path")]
    fn encoding_modes(strict: bool, parse_path: bool, expected: &str) {
        let handler = UriTemplateHandler::new()
            .with_strict_encoding(strict)
            .with_parse_path(parse_path);
        let uri = handler
            .expand("/items/{item}", &vars(&[("item", "a/b c")]))
            .unwrap();
        assert_eq!(uri.as_str(), expected);
    }

    #[test]
    fn strict_encodes_delimiters_in_query() {
        let handler = UriTemplateHandler::new().with_strict_encoding(true);
        let uri = handler
            .expand_positional("/search?q={q}&page=1", ["a&b=c"])
            .unwrap();
        assert_eq!(uri.as_str(), "/search?q=a%26b%3Dc&page=1");
    }

    #[test]
    fn accessors() {
        let handler = UriTemplateHandler::new()
            .with_strict_encoding(true)
            .with_default_variables([("a", 1)]);
        assert!(handler.is_strict_encoding());
        assert!(!handler.should_parse_path());
        assert_eq!(handler.default_variables()["a"], TemplateValue::new(1));
    }
}
