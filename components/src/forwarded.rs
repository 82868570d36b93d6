//! Adaptation of a builder to the `Forwarded` and `X-Forwarded-*` headers
//! set by reverse proxies.
//!
//! See [\[RFC 7239\]](https://tools.ietf.org/html/rfc7239).
use crate::builder::UriComponentsBuilder;
use crate::error::{Result, UriError};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref FORWARDED_HOST_PATTERN: Regex = Regex::new(r#"(?i:host)="?([^;,"]+)"?"#).unwrap();
    static ref FORWARDED_PROTO_PATTERN: Regex = Regex::new(r#"(?i:proto)="?([^;,"]+)"?"#).unwrap();
}

impl UriComponentsBuilder {
    /// Adapt the scheme, host and port of this builder
    /// to the forwarding headers found in `headers` (names are case-insensitive).
    ///
    /// A `Forwarded` header takes precedence;
    /// otherwise `X-Forwarded-Host`, `X-Forwarded-Port` and `X-Forwarded-Proto`
    /// are used independently.
    /// Only the first comma-separated element of each header is considered.
    /// The port is removed if it is the default port of the resulting scheme.
    ///
    /// # Errors
    /// Fails if a forwarded port is not a number.
    pub fn adapt_from_forwarded_headers<I, K, V>(&mut self, headers: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let headers: Vec<(String, String)> = headers
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_ascii_lowercase(), v.as_ref().to_string()))
            .collect();
        let first = |name: &str| {
            headers
                .iter()
                .find(|(k, _)| k == name)
                .and_then(|(_, v)| first_token(v))
        };

        if let Some(forwarded) = first("forwarded") {
            let host = FORWARDED_HOST_PATTERN.captures(forwarded).and_then(|c| c.get(1));
            let proto = FORWARDED_PROTO_PATTERN.captures(forwarded).and_then(|c| c.get(1));
            if host.is_none() && proto.is_none() {
                log::warn!("Ignoring Forwarded header without host nor proto: {forwarded:?}");
            }
            if let Some(host) = host {
                self.adapt_forwarded_host(host.as_str().trim())?;
            }
            if let Some(proto) = proto {
                self.scheme(proto.as_str().trim());
            }
        } else {
            if let Some(host) = first("x-forwarded-host") {
                self.adapt_forwarded_host(host)?;
            }
            if let Some(port) = first("x-forwarded-port") {
                self.port_number(Some(parse_port(port)?));
            }
            if let Some(proto) = first("x-forwarded-proto") {
                self.scheme(proto);
            }
        }

        let default_port = match self.scheme_value() {
            Some("http") => Some("80"),
            Some("https") => Some("443"),
            _ => None,
        };
        if default_port.is_some() && self.port_value() == default_port {
            self.clear_port();
        }
        Ok(self)
    }

    fn adapt_forwarded_host(&mut self, host: &str) -> Result<()> {
        match (host.rfind(':'), host.rfind(']')) {
            (Some(colon), bracket) if bracket.map_or(true, |b| colon > b) => {
                self.host(&host[..colon]);
                self.port_number(Some(parse_port(&host[colon + 1..])?));
            }
            _ => {
                self.host(host);
                self.port_number(None);
            }
        }
        Ok(())
    }
}

fn first_token(value: &str) -> Option<&str> {
    value.split(',').map(str::trim).find(|t| !t.is_empty())
}

fn parse_port(port: &str) -> Result<u16> {
    port.trim()
        .parse()
        .map_err(|_| UriError::InvalidPort(port.to_string()))
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    fn adapted(uri: &str, headers: &[(&str, &str)]) -> String {
        crate::test_setup();
        let mut builder = UriComponentsBuilder::from_http_url(uri).unwrap();
        builder.adapt_from_forwarded_headers(headers.iter().copied()).unwrap();
        builder.build().to_uri_string()
    }

    #[test_case(&[("Forwarded", r#"host="a.com""#), ("X-Forwarded-Host", "b.com")], "http://a.com/p"; "forwarded wins")]
    #[test_case(&[("Forwarded", "proto=https;host=a.com:8443, host=b.com")], "https://a.com:8443/p"; "forwarded first element only")]
    #[test_case(&[("forwarded", r#"for=192.0.2.60;proto=https;by=203.0.113.43"#)], "https://localhost:8080/p"; "forwarded proto only")]
    #[test_case(&[("X-Forwarded-Host", "b.com, c.com")], "http://b.com/p"; "x forwarded host clears port")]
    #[test_case(&[("X-Forwarded-Host", "b.com:9090")], "http://b.com:9090/p"; "x forwarded host with port")]
    #[test_case(&[("X-Forwarded-Host", "[::1]")], "http://[::1]/p"; "x forwarded ipv6 host")]
    #[test_case(&[("X-Forwarded-Host", "[::1]:81")], "http://[::1]:81/p"; "x forwarded ipv6 host with port")]
    #[test_case(&[("X-Forwarded-Proto", "https"), ("X-Forwarded-Port", "443")], "https://localhost/p"; "default https port removed")]
    #[test_case(&[("X-Forwarded-Port", "80")], "http://localhost/p"; "default http port removed")]
    #[test_case(&[("X-Forwarded-Proto", "https")], "https://localhost:8080/p"; "proto only")]
    #[test_case(&[], "http://localhost:8080/p"; "no headers")]
    fn adapt(headers: &[(&str, &str)], expected: &str) {
        assert_eq!(adapted("http://localhost:8080/p", headers), expected);
    }

    #[test]
    fn invalid_port() {
        let mut builder = UriComponentsBuilder::from_http_url("http://localhost/").unwrap();
        let res = builder.adapt_from_forwarded_headers([("X-Forwarded-Port", "abc")]);
        assert!(matches!(res, Err(UriError::InvalidPort(_))));
    }
}
