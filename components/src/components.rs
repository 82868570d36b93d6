//! Immutable URI components, either opaque or hierarchical.
//!
//! All transformations ([`encode`](UriComponents::encode),
//! [`expand`](UriComponents::expand), [`normalize`](UriComponents::normalize))
//! return new values.
use crate::builder::UriComponentsBuilder;
use crate::encoding::{encode, encode_template, ComponentKind};
use crate::error::{Result, UriError};
use crate::expand::{expand_uri_component, StrictlyEncoded};
use crate::path::{verify, PathComponent};
use crate::query::QueryParams;
use crate::variables::UriTemplateVariables;
use oxiri::IriRef;
use std::fmt;
use std::str::FromStr;

static NO_QUERY_PARAMS: QueryParams = QueryParams::new();
static NO_PATH: PathComponent = PathComponent::Empty;

/// How far percent-encoding has been applied to hierarchical components.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum EncodeState {
    /// Nothing is encoded yet.
    #[default]
    Raw,
    /// Literal template text is encoded, but placeholders are not expanded yet.
    /// Expanding will strictly encode variable values.
    TemplateEncoded,
    /// Every component is encoded; no further encoding may be applied.
    FullyEncoded,
}

impl EncodeState {
    /// Whether every component is encoded.
    pub fn is_encoded(self) -> bool {
        self == EncodeState::FullyEncoded
    }
}

/// URI components: scheme, then either an opaque part or a hierarchical structure.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum UriComponents {
    /// e.g. `mailto:joe@example.com`
    Opaque(OpaqueUriComponents),
    /// e.g. `https://example.com/a/b?c=d#e`
    Hierarchical(HierarchicalUriComponents),
}

/// A scheme followed by an uninterpreted scheme-specific part.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct OpaqueUriComponents {
    scheme: Option<String>,
    ssp: String,
    fragment: Option<String>,
}

/// Scheme, authority, path, query and fragment.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct HierarchicalUriComponents {
    scheme: Option<String>,
    user_info: Option<String>,
    host: Option<String>,
    port: Option<String>,
    path: PathComponent,
    query_params: QueryParams,
    fragment: Option<String>,
    encode_state: EncodeState,
}

impl UriComponents {
    /// Parse `uri` into its components.
    pub fn parse(uri: &str) -> Result<Self> {
        Ok(UriComponentsBuilder::from_uri_string(uri)?.build())
    }

    /// The scheme, if any.
    pub fn scheme(&self) -> Option<&str> {
        match self {
            UriComponents::Opaque(o) => o.scheme.as_deref(),
            UriComponents::Hierarchical(h) => h.scheme.as_deref(),
        }
    }

    /// The scheme-specific part of opaque components.
    pub fn scheme_specific_part(&self) -> Option<&str> {
        match self {
            UriComponents::Opaque(o) => Some(&o.ssp),
            UriComponents::Hierarchical(_) => None,
        }
    }

    /// The user info, if any.
    pub fn user_info(&self) -> Option<&str> {
        self.hierarchical().and_then(|h| h.user_info.as_deref())
    }

    /// The host, if any. IPv6 literals keep their brackets.
    pub fn host(&self) -> Option<&str> {
        self.hierarchical().and_then(|h| h.host.as_deref())
    }

    /// The port, as text, since it may be a template placeholder.
    pub fn port(&self) -> Option<&str> {
        self.hierarchical().and_then(|h| h.port.as_deref())
    }

    /// The port, as a number.
    ///
    /// # Errors
    /// Fails if the port is not a number, e.g. an unexpanded placeholder.
    pub fn port_number(&self) -> Result<Option<u16>> {
        self.port()
            .map(|p| p.parse().map_err(|_| UriError::InvalidPort(p.to_string())))
            .transpose()
    }

    /// The path, if not empty.
    pub fn path(&self) -> Option<String> {
        self.hierarchical()
            .filter(|h| !h.path.is_empty())
            .map(|h| h.path.path())
    }

    /// The structured path (empty for opaque components).
    pub fn path_component(&self) -> &PathComponent {
        self.hierarchical().map_or(&NO_PATH, |h| &h.path)
    }

    /// The non-empty segments of the path.
    pub fn path_segments(&self) -> Vec<String> {
        self.path_component().path_segments()
    }

    /// The rendered query, if there are query parameters.
    pub fn query(&self) -> Option<String> {
        self.query_params().to_query_string()
    }

    /// The query parameters (empty for opaque components).
    pub fn query_params(&self) -> &QueryParams {
        self.hierarchical()
            .map_or(&NO_QUERY_PARAMS, |h| &h.query_params)
    }

    /// The fragment, if any.
    pub fn fragment(&self) -> Option<&str> {
        match self {
            UriComponents::Opaque(o) => o.fragment.as_deref(),
            UriComponents::Hierarchical(h) => h.fragment.as_deref(),
        }
    }

    /// Whether these are opaque components.
    pub fn is_opaque(&self) -> bool {
        matches!(self, UriComponents::Opaque(_))
    }

    /// The encoding state; opaque components are never encoded.
    pub fn encode_state(&self) -> EncodeState {
        self.hierarchical()
            .map_or(EncodeState::Raw, |h| h.encode_state)
    }

    /// Whether all components are already percent-encoded.
    pub fn is_encoded(&self) -> bool {
        self.encode_state().is_encoded()
    }

    fn hierarchical(&self) -> Option<&HierarchicalUriComponents> {
        match self {
            UriComponents::Opaque(_) => None,
            UriComponents::Hierarchical(h) => Some(h),
        }
    }

    /// Percent-encode every component according to its own rules.
    ///
    /// Encoding is applied at most once:
    /// components that are already (template-)encoded are returned as is.
    /// The scheme-specific part of opaque components is never encoded.
    pub fn encode(&self) -> Self {
        match self {
            UriComponents::Opaque(_) => self.clone(),
            UriComponents::Hierarchical(h) => UriComponents::Hierarchical(h.encode()),
        }
    }

    /// Percent-encode the literal text of every component,
    /// leaving template placeholders untouched.
    ///
    /// A subsequent [`expand`](UriComponents::expand) strictly encodes
    /// variable values, and yields fully encoded components.
    pub fn encode_template(&self) -> Self {
        match self {
            UriComponents::Opaque(_) => self.clone(),
            UriComponents::Hierarchical(h) => UriComponents::Hierarchical(h.encode_template()),
        }
    }

    /// Replace every template placeholder by the value provided by `vars`.
    ///
    /// # Errors
    /// Fails if a variable has no value,
    /// or if these components are already fully encoded.
    pub fn expand<V: UriTemplateVariables>(&self, mut vars: V) -> Result<Self> {
        match self {
            UriComponents::Opaque(o) => Ok(UriComponents::Opaque(o.expand(&mut vars)?)),
            UriComponents::Hierarchical(h) => match h.encode_state {
                EncodeState::FullyEncoded => Err(UriError::AlreadyEncoded),
                EncodeState::TemplateEncoded => {
                    let mut expanded = h.expand(&mut StrictlyEncoded(vars))?;
                    expanded.encode_state = EncodeState::FullyEncoded;
                    Ok(UriComponents::Hierarchical(expanded))
                }
                EncodeState::Raw => Ok(UriComponents::Hierarchical(h.expand(&mut vars)?)),
            },
        }
    }

    /// Remove `.` and `..` segments from the path.
    pub fn normalize(&self) -> Self {
        match self {
            UriComponents::Opaque(_) => self.clone(),
            UriComponents::Hierarchical(h) => {
                let path = clean_path(&h.path.path());
                UriComponents::Hierarchical(HierarchicalUriComponents {
                    path: if path.is_empty() {
                        PathComponent::Empty
                    } else {
                        PathComponent::FullPath(path)
                    },
                    ..h.clone()
                })
            }
        }
    }

    /// Check that every component only contains legal characters or `%XX` sequences.
    pub fn verify(&self) -> Result<()> {
        match self {
            UriComponents::Opaque(_) => Ok(()),
            UriComponents::Hierarchical(h) => h.verify(),
        }
    }

    /// Render these components as a string, without encoding them.
    pub fn to_uri_string(&self) -> String {
        match self {
            UriComponents::Opaque(o) => o.to_uri_string(),
            UriComponents::Hierarchical(h) => h.to_uri_string(),
        }
    }

    /// Convert to a URI reference, encoding the components first if needed.
    ///
    /// # Errors
    /// Fails if the rendered text is not a valid URI reference,
    /// e.g. because placeholders were left unexpanded.
    pub fn to_uri(&self) -> Result<IriRef<String>> {
        Ok(IriRef::parse(self.encode().to_uri_string())?)
    }

    /// A builder initialized with these components.
    pub fn to_builder(&self) -> UriComponentsBuilder {
        let mut builder = UriComponentsBuilder::new();
        builder.uri_components(self);
        builder
    }

    pub(crate) fn copy_to_builder(&self, builder: &mut UriComponentsBuilder) {
        match self {
            UriComponents::Opaque(o) => {
                if let Some(scheme) = &o.scheme {
                    builder.scheme(scheme.as_str());
                }
                builder.scheme_specific_part(o.ssp.as_str());
                if let Some(fragment) = &o.fragment {
                    builder.fragment(fragment.as_str());
                }
            }
            UriComponents::Hierarchical(h) => {
                if let Some(scheme) = &h.scheme {
                    builder.scheme(scheme.as_str());
                }
                if let Some(user_info) = &h.user_info {
                    builder.user_info(user_info.as_str());
                }
                if let Some(host) = &h.host {
                    builder.host(host.as_str());
                }
                if let Some(port) = &h.port {
                    builder.port(port.as_str());
                }
                builder.path_component(&h.path);
                if !h.query_params.is_empty() {
                    builder.query_params(&h.query_params);
                }
                if let Some(fragment) = &h.fragment {
                    builder.fragment(fragment.as_str());
                }
            }
        }
    }
}

impl fmt::Display for UriComponents {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_uri_string())
    }
}

impl FromStr for UriComponents {
    type Err = UriError;

    fn from_str(s: &str) -> Result<Self> {
        UriComponents::parse(s)
    }
}

//

impl OpaqueUriComponents {
    pub(crate) fn new(scheme: Option<String>, ssp: String, fragment: Option<String>) -> Self {
        OpaqueUriComponents {
            scheme,
            ssp,
            fragment,
        }
    }

    fn expand<V: UriTemplateVariables>(&self, vars: &mut V) -> Result<Self> {
        Ok(OpaqueUriComponents {
            scheme: expand_opt(&self.scheme, vars)?,
            ssp: expand_uri_component(&self.ssp, vars)?.into_owned(),
            fragment: expand_opt(&self.fragment, vars)?,
        })
    }

    fn to_uri_string(&self) -> String {
        let mut out = String::new();
        if let Some(scheme) = &self.scheme {
            out.push_str(scheme);
            out.push(':');
        }
        out.push_str(&self.ssp);
        if let Some(fragment) = &self.fragment {
            out.push('#');
            out.push_str(fragment);
        }
        out
    }
}

impl HierarchicalUriComponents {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        scheme: Option<String>,
        user_info: Option<String>,
        host: Option<String>,
        port: Option<String>,
        path: PathComponent,
        query_params: QueryParams,
        fragment: Option<String>,
        encode_state: EncodeState,
    ) -> Self {
        HierarchicalUriComponents {
            scheme,
            user_info,
            host,
            port,
            path,
            query_params,
            fragment,
            encode_state,
        }
    }

    fn encode(&self) -> Self {
        if self.encode_state != EncodeState::Raw {
            return self.clone();
        }
        let mut encoded = self.map_text(|text, kind| encode(text, kind).into_owned());
        encoded.path = self.path.encode();
        encoded.encode_state = EncodeState::FullyEncoded;
        encoded
    }

    fn encode_template(&self) -> Self {
        if self.encode_state != EncodeState::Raw {
            return self.clone();
        }
        let mut encoded = self.map_text(|text, kind| encode_template(text, kind).into_owned());
        encoded.path = self.path.encode_template();
        encoded.encode_state = EncodeState::TemplateEncoded;
        encoded
    }

    fn map_text<F: Fn(&str, ComponentKind) -> String>(&self, f: F) -> Self {
        let host_kind = self
            .host
            .as_deref()
            .map_or(ComponentKind::HostIpv4, ComponentKind::for_host);
        let map = |value: &Option<String>, kind| value.as_deref().map(|v| f(v, kind));
        HierarchicalUriComponents {
            scheme: map(&self.scheme, ComponentKind::Scheme),
            user_info: map(&self.user_info, ComponentKind::UserInfo),
            host: map(&self.host, host_kind),
            port: map(&self.port, ComponentKind::Port),
            path: self.path.clone(),
            query_params: self
                .query_params
                .map(|v| f(v, ComponentKind::QueryParam)),
            fragment: map(&self.fragment, ComponentKind::Fragment),
            encode_state: self.encode_state,
        }
    }

    fn expand<V: UriTemplateVariables>(&self, vars: &mut V) -> Result<Self> {
        Ok(HierarchicalUriComponents {
            scheme: expand_opt(&self.scheme, vars)?,
            user_info: expand_opt(&self.user_info, vars)?,
            host: expand_opt(&self.host, vars)?,
            port: expand_opt(&self.port, vars)?,
            path: self.path.expand(vars)?,
            query_params: self
                .query_params
                .try_map(|v| expand_uri_component(v, vars).map(|v| v.into_owned()))?,
            fragment: expand_opt(&self.fragment, vars)?,
            encode_state: EncodeState::Raw,
        })
    }

    fn verify(&self) -> Result<()> {
        let check = |value: &Option<String>, kind| value.as_deref().map_or(Ok(()), |v| verify(v, kind));
        check(&self.scheme, ComponentKind::Scheme)?;
        check(&self.user_info, ComponentKind::UserInfo)?;
        if let Some(host) = &self.host {
            verify(host, ComponentKind::for_host(host))?;
        }
        check(&self.port, ComponentKind::Port)?;
        self.path.verify()?;
        for text in self.query_params.texts() {
            verify(text, ComponentKind::QueryParam)?;
        }
        check(&self.fragment, ComponentKind::Fragment)
    }

    fn to_uri_string(&self) -> String {
        let mut out = String::new();
        if let Some(scheme) = &self.scheme {
            out.push_str(scheme);
            out.push(':');
        }
        if self.user_info.is_some() || self.host.is_some() {
            out.push_str("//");
            if let Some(user_info) = &self.user_info {
                out.push_str(user_info);
                out.push('@');
            }
            if let Some(host) = &self.host {
                out.push_str(host);
            }
            if let Some(port) = &self.port {
                out.push(':');
                out.push_str(port);
            }
        }
        let path = self.path.path();
        if !path.is_empty() {
            if !out.is_empty() && !path.starts_with('/') {
                out.push('/');
            }
            out.push_str(&path);
        }
        if let Some(query) = self.query_params.to_query_string() {
            out.push('?');
            out.push_str(&query);
        }
        if let Some(fragment) = &self.fragment {
            out.push('#');
            out.push_str(fragment);
        }
        out
    }
}

fn expand_opt<V>(value: &Option<String>, vars: &mut V) -> Result<Option<String>>
where
    V: UriTemplateVariables + ?Sized,
{
    value
        .as_deref()
        .map(|v| expand_uri_component(v, vars).map(|v| v.into_owned()))
        .transpose()
}

/// Remove `.` and `..` segments, as well as empty segments, from `path`.
///
/// Leading `..` segments of a relative path are kept,
/// those of an absolute path are dropped.
fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    let absolute = path.starts_with('/');
    let trailing_slash = path.ends_with('/') || path.ends_with("/.") || path.ends_with("/..");
    let mut stack: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match stack.last() {
                Some(&last) if last != ".." => {
                    stack.pop();
                }
                _ if !absolute => stack.push(".."),
                _ => {}
            },
            segment => stack.push(segment),
        }
    }
    let mut out = String::with_capacity(path.len());
    if absolute {
        out.push('/');
    }
    out.push_str(&stack.join("/"));
    if trailing_slash && !stack.is_empty() {
        out.push('/');
    }
    out
}
