//! Decomposition of URI strings into their components.
//!
//! NB: these grammars are deliberately lenient:
//! they accept template placeholders (e.g. `{port}`) in any position,
//! and leave the validation of characters to encoding or verification.
use crate::builder::UriComponentsBuilder;
use crate::error::{Result, UriError};
use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    /// Match any URI reference, capturing its components.
    pub(crate) static ref URI_PATTERN: Regex = Regex::new(r"(?x)^
        (?: # scheme
          ( [^:/?\#]+ )
          :
        )?
        (?: # authority
          //
          (?: # user info
            ( [^@\[/?\#]* )
            @
          )?
          ( # host
            \[ [0-9A-Fa-f:.]* [%0-9A-Za-z]* \]
          |
            [^\[/?\#:]*
          )
          (?: # port, checked by is_valid_port
            :
            ( \{ [^/?\#]+ \} | [^/?\#]* )
          )?
        )?
        ( [^?\#]* ) # path
        (?: # query
          \?
          ( [^\#]* )
        )?
        (?: # fragment
          \#
          ( .* )
        )?
    $").unwrap();

    /// Match an absolute `http` or `https` URL, capturing its components.
    pub(crate) static ref HTTP_URL_PATTERN: Regex = Regex::new(r"(?x)^
        ( (?i:https?) ) # scheme
        :
        (?: # authority
          //
          (?: # user info
            ( [^@\[/?\#]* )
            @
          )?
          ( # host
            \[ [0-9A-Fa-f:.]* [%0-9A-Za-z]* \]
          |
            [^\[/?\#:]*
          )
          (?: # port, checked by is_valid_port
            :
            ( \{ [^/?\#]+ \} | [^/?\#]* )
          )?
        )?
        ( [^?\#]* ) # path
        (?: # query
          \?
          ( [^\#]* )
        )?
        (?: # fragment
          \#
          ( .* )
        )?
    $").unwrap();

    /// Match an authority, capturing user info, host and port.
    pub(crate) static ref AUTHORITY_PATTERN: Regex = Regex::new(r"(?x)^
        (?: ( [^@\[/?\#]* ) @ )?
        ( \[ [0-9A-Fa-f:.]* [%0-9A-Za-z]* \] | [^\[/?\#:]* )
        (?: : ( [0-9]* ) )?
    $").unwrap();

    /// Match one `name(=value)?` pair of a query string.
    pub(crate) static ref QUERY_PARAM_PATTERN: Regex = Regex::new(r"([^&=]+)(=?)([^&]+)?").unwrap();
}

const SCHEME: usize = 1;
const USER_INFO: usize = 2;
const HOST: usize = 3;
const PORT: usize = 4;
const PATH: usize = 5;
const QUERY: usize = 6;
const FRAGMENT: usize = 7;

fn group<'t>(cap: &Captures<'t>, i: usize) -> Option<&'t str> {
    cap.get(i).map(|m| m.as_str())
}

/// Populate `builder` with the components of `uri`.
pub(crate) fn parse_uri(builder: &mut UriComponentsBuilder, uri: &str) -> Result<()> {
    let cap = URI_PATTERN
        .captures(uri)
        .ok_or_else(|| UriError::MalformedUri(uri.to_string()))?;
    let scheme = group(&cap, SCHEME).filter(|s| !s.is_empty());
    let fragment = group(&cap, FRAGMENT);
    if let Some(scheme) = scheme {
        builder.scheme(scheme);
        let rest = &uri[scheme.len()..];
        if !rest.starts_with(":/") {
            log::trace!("parsing {uri:?} as an opaque URI");
            let mut ssp = &rest[1..];
            if let Some(fragment) = fragment {
                ssp = &ssp[..ssp.len() - fragment.len() - 1];
            }
            builder.scheme_specific_part(ssp);
            if let Some(fragment) = fragment.filter(|f| !f.is_empty()) {
                builder.fragment(fragment);
            }
            return Ok(());
        }
    }
    log::trace!("parsing {uri:?} as a hierarchical URI");
    if !group(&cap, PORT).map_or(true, is_valid_port) {
        return Err(UriError::MalformedUri(uri.to_string()));
    }
    set_hierarchical(builder, &cap);
    Ok(())
}

/// Populate `builder` with the components of `http_url`,
/// which must be an absolute `http` or `https` URL.
pub(crate) fn parse_http_url(builder: &mut UriComponentsBuilder, http_url: &str) -> Result<()> {
    let cap = HTTP_URL_PATTERN
        .captures(http_url)
        .ok_or_else(|| UriError::InvalidHttpUrl(http_url.to_string()))?;
    if group(&cap, HOST).map_or(true, str::is_empty) {
        return Err(UriError::InvalidHttpUrl(http_url.to_string()));
    }
    if !group(&cap, PORT).map_or(true, is_valid_port) {
        return Err(UriError::MalformedUri(http_url.to_string()));
    }
    if let Some(scheme) = group(&cap, SCHEME) {
        builder.scheme(scheme.to_ascii_lowercase());
    }
    set_hierarchical(builder, &cap);
    Ok(())
}

/// A port is either a (possibly empty) sequence of digits or a template placeholder.
fn is_valid_port(port: &str) -> bool {
    port.bytes().all(|b| b.is_ascii_digit()) || (port.starts_with('{') && port.ends_with('}'))
}

fn set_hierarchical(builder: &mut UriComponentsBuilder, cap: &Captures) {
    if let Some(user_info) = group(cap, USER_INFO) {
        builder.user_info(user_info);
    }
    if let Some(host) = group(cap, HOST) {
        builder.host(host);
    }
    if let Some(port) = group(cap, PORT).filter(|p| !p.is_empty()) {
        builder.port(port);
    }
    if let Some(path) = group(cap, PATH) {
        builder.path(path);
    }
    if let Some(query) = group(cap, QUERY) {
        builder.query(query);
    }
    if let Some(fragment) = group(cap, FRAGMENT).filter(|f| !f.is_empty()) {
        builder.fragment(fragment);
    }
}

/// Split an authority into its user info, host and port.
pub(crate) fn split_authority(authority: &str) -> Option<(Option<&str>, &str, Option<&str>)> {
    let cap = AUTHORITY_PATTERN.captures(authority)?;
    Some((
        group(&cap, 1),
        group(&cap, 2).unwrap_or_default(),
        group(&cap, 3).filter(|p| !p.is_empty()),
    ))
}

/// Tokenize a query string into `(name, value)` pairs, in order of appearance.
///
/// `a` yields no value, while `a=` yields an empty value.
pub(crate) fn parse_query(query: &str) -> impl Iterator<Item = (&str, Option<&str>)> {
    QUERY_PARAM_PATTERN.captures_iter(query).filter_map(|cap| {
        let name = cap.get(1)?.as_str();
        let has_eq = cap.get(2).map_or(false, |m| !m.is_empty());
        let value = match cap.get(3) {
            Some(m) => Some(m.as_str()),
            None if has_eq => Some(""),
            None => None,
        };
        Some((name, value))
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    #[test_case("a=1&b=2", &[("a", Some("1")), ("b", Some("2"))]; "simple")]
    #[test_case("a&b=", &[("a", None), ("b", Some(""))]; "no value and empty value")]
    #[test_case("a=1&a=2", &[("a", Some("1")), ("a", Some("2"))]; "repeated")]
    #[test_case("a=1=2", &[("a", Some("1=2"))]; "equal in value")]
    #[test_case("&&a=1&", &[("a", Some("1"))]; "empty pairs ignored")]
    #[test_case("", &[]; "empty")]
    fn query(txt: &str, expected: &[(&str, Option<&str>)]) {
        let got: Vec<_> = parse_query(txt).collect();
        assert_eq!(got, expected);
    }

    #[test_case("user@host:8080", Some("user"), "host", Some("8080"); "full")]
    #[test_case("host", None, "host", None; "host only")]
    #[test_case("[::1]:80", None, "[::1]", Some("80"); "ipv6")]
    #[test_case("host:", None, "host", None; "empty port")]
    fn authority(txt: &str, user_info: Option<&str>, host: &str, port: Option<&str>) {
        assert_eq!(split_authority(txt), Some((user_info, host, port)));
    }

    #[test]
    fn uri_pattern_groups() {
        crate::test_setup();
        let cap = URI_PATTERN
            .captures("https://joe@example.com:{port}/a/b?q=1#frag")
            .unwrap();
        assert_eq!(group(&cap, SCHEME), Some("https"));
        assert_eq!(group(&cap, USER_INFO), Some("joe"));
        assert_eq!(group(&cap, HOST), Some("example.com"));
        assert_eq!(group(&cap, PORT), Some("{port}"));
        assert_eq!(group(&cap, PATH), Some("/a/b"));
        assert_eq!(group(&cap, QUERY), Some("q=1"));
        assert_eq!(group(&cap, FRAGMENT), Some("frag"));
    }

    #[test_case("http://host:abc/x"; "letters")]
    #[test_case("http://host:8a/"; "trailing letter")]
    #[test_case("//host:x"; "no scheme")]
    #[test_case("http://host:{port/x"; "unclosed placeholder")]
    fn malformed_port(uri: &str) {
        let res = parse_uri(&mut UriComponentsBuilder::new(), uri);
        assert!(matches!(res, Err(UriError::MalformedUri(u)) if u == uri));
    }

    #[test]
    fn malformed_port_in_http_url() {
        let res = parse_http_url(&mut UriComponentsBuilder::new(), "http://host:abc/x");
        assert!(matches!(res, Err(UriError::MalformedUri(_))));
    }

    #[test_case("http://host:8080/x", Some("8080"), "/x"; "digits")]
    #[test_case("http://host:{port}/x", Some("{port}"), "/x"; "placeholder")]
    #[test_case("http://host:/x", None, "/x"; "empty")]
    fn valid_port(uri: &str, port: Option<&str>, path: &str) {
        let components = UriComponentsBuilder::from_uri_string(uri).unwrap().build();
        assert_eq!(components.port(), port);
        assert_eq!(components.path().as_deref(), Some(path));
    }

    #[test]
    fn ipv6_with_zone() {
        let cap = URI_PATTERN.captures("http://[fe80::1%25eth0]:8080/").unwrap();
        assert_eq!(group(&cap, HOST), Some("[fe80::1%25eth0]"));
        assert_eq!(group(&cap, PORT), Some("8080"));
    }
}
