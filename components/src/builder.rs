//! A mutable builder of [`UriComponents`].
use crate::components::{EncodeState, HierarchicalUriComponents, OpaqueUriComponents, UriComponents};
use crate::error::Result;
use crate::parser::{parse_http_url, parse_query, parse_uri, split_authority};
use crate::path::{CompositePathBuilder, PathComponent};
use crate::query::QueryParams;
use crate::variables::UriTemplateVariables;
use oxiri::IriRef;
use std::ops::Deref;

/// Accumulates URI components, to be frozen with [`build`](UriComponentsBuilder::build).
///
/// The builder is either hierarchical or opaque:
/// setting any hierarchical component clears the scheme-specific part,
/// and setting the scheme-specific part clears all hierarchical components.
///
/// ```
/// # use urikit_components::UriComponentsBuilder;
/// let uri = UriComponentsBuilder::new()
///     .scheme("https")
///     .host("example.com")
///     .path("/hotels/")
///     .path_segment(["{hotel}"])
///     .query_param("lang", ["en"])
///     .encode_template()
///     .build_and_expand(&[("hotel", "Rest & Relax")].into_iter().collect::<std::collections::HashMap<_, _>>())?;
/// assert_eq!(uri.to_string(), "https://example.com/hotels/Rest%20%26%20Relax?lang=en");
/// # Ok::<(), urikit_components::error::UriError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct UriComponentsBuilder {
    scheme: Option<String>,
    ssp: Option<String>,
    user_info: Option<String>,
    host: Option<String>,
    port: Option<String>,
    path: CompositePathBuilder,
    query_params: QueryParams,
    fragment: Option<String>,
    encode_template: bool,
}

impl UriComponentsBuilder {
    /// Build an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a builder initialized with the given path.
    pub fn from_path(path: &str) -> Self {
        let mut builder = Self::new();
        builder.path(path);
        builder
    }

    /// Build a builder initialized with the components of `uri`,
    /// which may contain template placeholders.
    ///
    /// # Errors
    /// Fails if `uri` does not match the URI grammar.
    pub fn from_uri_string(uri: &str) -> Result<Self> {
        let mut builder = Self::new();
        parse_uri(&mut builder, uri)?;
        Ok(builder)
    }

    /// Build a builder initialized with the components of `http_url`,
    /// which must be an absolute `http` or `https` URL with a host.
    ///
    /// The scheme is lower-cased.
    ///
    /// # Errors
    /// Fails if `http_url` is not such a URL.
    pub fn from_http_url(http_url: &str) -> Result<Self> {
        let mut builder = Self::new();
        parse_http_url(&mut builder, http_url)?;
        Ok(builder)
    }

    /// Build a builder initialized with the components of a parsed URI reference.
    pub fn from_uri<T: Deref<Target = str>>(uri: &IriRef<T>) -> Self {
        let mut builder = Self::new();
        builder.uri(uri);
        builder
    }

    /// Initialize all components from a parsed URI reference.
    ///
    /// Only the components present in `uri` override those of this builder,
    /// except for the path, which is replaced if `uri` has one.
    pub fn uri<T: Deref<Target = str>>(&mut self, uri: &IriRef<T>) -> &mut Self {
        if let Some(scheme) = uri.scheme() {
            self.scheme(scheme);
        }
        let opaque =
            uri.scheme().is_some() && uri.authority().is_none() && !uri.path().starts_with('/');
        if opaque {
            let text = uri.as_str();
            let start = uri.scheme().map_or(0, |s| s.len() + 1);
            let end = text.len() - uri.fragment().map_or(0, |f| f.len() + 1);
            self.scheme_specific_part(&text[start..end]);
        } else {
            if let Some((user_info, host, port)) = uri.authority().and_then(split_authority) {
                if let Some(user_info) = user_info {
                    self.user_info(user_info);
                }
                self.host(host);
                if let Some(port) = port {
                    self.port(port);
                }
            }
            if !uri.path().is_empty() {
                self.replace_path(uri.path());
            }
            if let Some(query) = uri.query().filter(|q| !q.is_empty()) {
                self.replace_query(query);
            }
        }
        if let Some(fragment) = uri.fragment() {
            self.fragment(fragment);
        }
        self
    }

    /// Initialize all components from existing components.
    pub fn uri_components(&mut self, components: &UriComponents) -> &mut Self {
        components.copy_to_builder(self);
        self
    }

    /// Set the scheme.
    pub fn scheme<S: Into<String>>(&mut self, scheme: S) -> &mut Self {
        self.scheme = Some(scheme.into());
        self
    }

    /// Set the scheme-specific part, switching to opaque components.
    pub fn scheme_specific_part<S: Into<String>>(&mut self, ssp: S) -> &mut Self {
        self.ssp = Some(ssp.into());
        self.reset_hierarchical_components();
        self
    }

    /// Set the user info.
    pub fn user_info<S: Into<String>>(&mut self, user_info: S) -> &mut Self {
        self.user_info = Some(user_info.into());
        self.reset_scheme_specific_part();
        self
    }

    /// Set the host. IPv6 literals must keep their brackets.
    pub fn host<S: Into<String>>(&mut self, host: S) -> &mut Self {
        self.host = Some(host.into());
        self.reset_scheme_specific_part();
        self
    }

    /// Set the port as text, which may be a template placeholder such as `{port}`.
    pub fn port<S: Into<String>>(&mut self, port: S) -> &mut Self {
        self.port = Some(port.into());
        self.reset_scheme_specific_part();
        self
    }

    /// Set or clear the port.
    pub fn port_number(&mut self, port: Option<u16>) -> &mut Self {
        self.port = port.map(|p| p.to_string());
        self.reset_scheme_specific_part();
        self
    }

    /// Append to the path.
    ///
    /// When appended after path segments, a leading `/` is added if missing.
    /// Double slashes are collapsed.
    pub fn path(&mut self, path: &str) -> &mut Self {
        self.path.add_path(path);
        self.reset_scheme_specific_part();
        self
    }

    /// Replace the path; an empty `path` removes it.
    pub fn replace_path(&mut self, path: &str) -> &mut Self {
        self.path = CompositePathBuilder::default();
        self.path(path)
    }

    /// Append path segments.
    ///
    /// Each segment is encoded individually, so that it may not introduce a `/`.
    /// Blank segments are ignored.
    pub fn path_segment<I, T>(&mut self, segments: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.path.add_path_segments(segments);
        self.reset_scheme_specific_part();
        self
    }

    pub(crate) fn path_component(&mut self, path: &PathComponent) -> &mut Self {
        match path {
            PathComponent::Empty => {}
            PathComponent::FullPath(full) => {
                self.path(full);
            }
            PathComponent::Segments(segments) => {
                self.path_segment(segments);
            }
            PathComponent::Composite(children) => {
                for child in children {
                    self.path_component(child);
                }
            }
        }
        self
    }

    /// Append the parameters of a query string, such as `a=1&b&c=`.
    pub fn query(&mut self, query: &str) -> &mut Self {
        for (name, value) in parse_query(query) {
            self.query_params.add(name, value);
        }
        self.reset_scheme_specific_part();
        self
    }

    /// Replace all query parameters by those of `query`; an empty `query` removes them.
    pub fn replace_query(&mut self, query: &str) -> &mut Self {
        self.query_params.clear();
        self.query(query)
    }

    /// Append values to the query parameter `name`.
    ///
    /// With no values, the parameter is added without a value (`?name`).
    pub fn query_param<N, I>(&mut self, name: N, values: I) -> &mut Self
    where
        N: Into<String>,
        I: IntoIterator,
        I::Item: ToString,
    {
        let name = name.into();
        let mut values = values.into_iter().peekable();
        if values.peek().is_none() {
            self.query_params.add(name, None::<String>);
        } else {
            for value in values {
                self.query_params.add(name.as_str(), Some(value.to_string()));
            }
        }
        self.reset_scheme_specific_part();
        self
    }

    /// Replace all values of the query parameter `name`.
    ///
    /// With no values, the parameter is removed.
    pub fn replace_query_param<N, I>(&mut self, name: N, values: I) -> &mut Self
    where
        N: Into<String>,
        I: IntoIterator,
        I::Item: ToString,
    {
        let name = name.into();
        self.query_params.remove(&name);
        let mut values = values.into_iter().peekable();
        if values.peek().is_some() {
            self.query_param(name, values);
        }
        self.reset_scheme_specific_part();
        self
    }

    /// Append all the given query parameters.
    pub fn query_params(&mut self, params: &QueryParams) -> &mut Self {
        self.query_params.add_all(params);
        self.reset_scheme_specific_part();
        self
    }

    /// Replace all query parameters.
    pub fn replace_query_params(&mut self, params: &QueryParams) -> &mut Self {
        self.query_params = params.clone();
        self.reset_scheme_specific_part();
        self
    }

    /// Set the fragment; an empty `fragment` removes it.
    pub fn fragment(&mut self, fragment: &str) -> &mut Self {
        self.fragment = (!fragment.is_empty()).then(|| fragment.to_string());
        self
    }

    /// Percent-encode the literal template text when building,
    /// and strictly encode variable values when expanding.
    pub fn encode_template(&mut self) -> &mut Self {
        self.encode_template = true;
        self
    }

    /// Freeze the current state into raw (not encoded) components,
    /// or template-encoded ones if [`encode_template`](Self::encode_template) was called.
    ///
    /// The builder remains usable.
    pub fn build(&self) -> UriComponents {
        let components = self.build_with_state(EncodeState::Raw);
        if self.encode_template {
            components.encode_template()
        } else {
            components
        }
    }

    /// Freeze the current state into components that are declared as already encoded.
    ///
    /// # Errors
    /// Fails if any component contains a character that is not legal for it.
    pub fn build_encoded(&self) -> Result<UriComponents> {
        let components = self.build_with_state(EncodeState::FullyEncoded);
        components.verify()?;
        Ok(components)
    }

    fn build_with_state(&self, encode_state: EncodeState) -> UriComponents {
        match &self.ssp {
            Some(ssp) => UriComponents::Opaque(OpaqueUriComponents::new(
                self.scheme.clone(),
                ssp.clone(),
                self.fragment.clone(),
            )),
            None => UriComponents::Hierarchical(HierarchicalUriComponents::new(
                self.scheme.clone(),
                self.user_info.clone(),
                self.host.clone(),
                self.port.clone(),
                self.path.build(),
                self.query_params.clone(),
                self.fragment.clone(),
                encode_state,
            )),
        }
    }

    /// Shortcut for `build().expand(vars)`.
    ///
    /// # Errors
    /// Fails if a variable has no value.
    pub fn build_and_expand<V: UriTemplateVariables>(&self, vars: V) -> Result<UriComponents> {
        self.build().expand(vars)
    }

    /// Shortcut for `build().encode().to_uri_string()`.
    pub fn to_uri_string(&self) -> String {
        self.build().encode().to_uri_string()
    }

    /// A deep copy of this builder, which may then diverge from it.
    pub fn clone_builder(&self) -> Self {
        self.clone()
    }

    pub(crate) fn scheme_value(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub(crate) fn port_value(&self) -> Option<&str> {
        self.port.as_deref()
    }

    pub(crate) fn clear_port(&mut self) -> &mut Self {
        self.port = None;
        self
    }

    fn reset_hierarchical_components(&mut self) {
        self.user_info = None;
        self.host = None;
        self.port = None;
        self.path = CompositePathBuilder::default();
        self.query_params.clear();
    }

    fn reset_scheme_specific_part(&mut self) {
        self.ssp = None;
    }
}
