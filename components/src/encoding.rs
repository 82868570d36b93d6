//! Percent-encoding of URI components, as per
//! [\[RFC 3986\]](https://tools.ietf.org/html/rfc3986#section-2).
//!
//! Each [`ComponentKind`] has its own set of characters that may appear
//! unencoded in that position.
//! Every other byte of the UTF-8 representation is rendered as `%XX`,
//! with uppercase hexadecimal digits.
use crate::error::{Result, UriError};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::borrow::Cow;

// The sets below contain the ASCII characters that must be encoded;
// non-ASCII bytes are always encoded.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');
const SUB_DELIMS: &AsciiSet = &UNRESERVED
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=');
const PCHAR: &AsciiSet = &SUB_DELIMS.remove(b':').remove(b'@');
const SCHEME: &AsciiSet = &NON_ALPHANUMERIC.remove(b'+').remove(b'-').remove(b'.');
const AUTHORITY: &AsciiSet = &SUB_DELIMS.remove(b':').remove(b'@');
const USER_INFO: &AsciiSet = &SUB_DELIMS.remove(b':');
const HOST_IPV6: &AsciiSet = &SUB_DELIMS.remove(b'[').remove(b']').remove(b':');
const PORT: &AsciiSet = &digits_only();
const PATH: &AsciiSet = &PCHAR.remove(b'/');
const QUERY: &AsciiSet = &PCHAR.remove(b'/').remove(b'?');
const QUERY_PARAM: &AsciiSet = &QUERY.add(b'=').add(b'&');

const fn digits_only() -> AsciiSet {
    let mut set = NON_ALPHANUMERIC.add(b'A');
    let mut c = b'B';
    while c <= b'Z' {
        set = set.add(c);
        c += 1;
    }
    c = b'a';
    while c <= b'z' {
        set = set.add(c);
        c += 1;
    }
    set
}

/// The different components of a URI, each with its own legal characters.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ComponentKind {
    /// `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
    Scheme,
    /// `[ userinfo "@" ] host [ ":" port ]`
    Authority,
    /// `*( unreserved / pct-encoded / sub-delims / ":" )`
    UserInfo,
    /// `reg-name` or IPv4 address
    HostIpv4,
    /// `"[" IPv6address "]"`
    HostIpv6,
    /// `*DIGIT`
    Port,
    /// A full path, where `/` is legal
    Path,
    /// A single path segment, where `/` must be encoded
    PathSegment,
    /// A full query, where `=` and `&` are legal
    Query,
    /// A query parameter name or value, where `=` and `&` must be encoded
    QueryParam,
    /// `*( pchar / "/" / "?" )`
    Fragment,
    /// Only unreserved characters are legal
    Uri,
}

impl ComponentKind {
    /// Whether the given byte may appear unencoded in this component.
    pub fn is_allowed(self, b: u8) -> bool {
        match self {
            ComponentKind::Scheme => {
                b.is_ascii_alphanumeric() || b == b'+' || b == b'-' || b == b'.'
            }
            ComponentKind::Authority => {
                is_unreserved(b) || is_sub_delimiter(b) || b == b':' || b == b'@'
            }
            ComponentKind::UserInfo => is_unreserved(b) || is_sub_delimiter(b) || b == b':',
            ComponentKind::HostIpv4 => is_unreserved(b) || is_sub_delimiter(b),
            ComponentKind::HostIpv6 => {
                is_unreserved(b) || is_sub_delimiter(b) || b == b'[' || b == b']' || b == b':'
            }
            ComponentKind::Port => b.is_ascii_digit(),
            ComponentKind::Path => is_pchar(b) || b == b'/',
            ComponentKind::PathSegment => is_pchar(b),
            ComponentKind::Query | ComponentKind::Fragment => {
                is_pchar(b) || b == b'/' || b == b'?'
            }
            ComponentKind::QueryParam => {
                if b == b'=' || b == b'&' {
                    false
                } else {
                    is_pchar(b) || b == b'/' || b == b'?'
                }
            }
            ComponentKind::Uri => is_unreserved(b),
        }
    }

    /// The ASCII characters that must be percent-encoded in this component.
    fn encode_set(self) -> &'static AsciiSet {
        match self {
            ComponentKind::Scheme => SCHEME,
            ComponentKind::Authority => AUTHORITY,
            ComponentKind::UserInfo => USER_INFO,
            ComponentKind::HostIpv4 => SUB_DELIMS,
            ComponentKind::HostIpv6 => HOST_IPV6,
            ComponentKind::Port => PORT,
            ComponentKind::Path => PATH,
            ComponentKind::PathSegment => PCHAR,
            ComponentKind::Query | ComponentKind::Fragment => QUERY,
            ComponentKind::QueryParam => QUERY_PARAM,
            ComponentKind::Uri => UNRESERVED,
        }
    }

    /// The host kind suited to the given host text (bracketed literals are IPv6).
    pub fn for_host(host: &str) -> Self {
        if host.starts_with('[') {
            ComponentKind::HostIpv6
        } else {
            ComponentKind::HostIpv4
        }
    }
}

/// `ALPHA / DIGIT / "-" / "." / "_" / "~"`
pub fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'.' || b == b'_' || b == b'~'
}

/// `"!" / "$" / "&" / "'" / "(" / ")" / "*" / "+" / "," / ";" / "="`
pub fn is_sub_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'='
    )
}

/// `":" / "/" / "?" / "#" / "[" / "]" / "@"`
pub fn is_generic_delimiter(b: u8) -> bool {
    matches!(b, b':' | b'/' | b'?' | b'#' | b'[' | b']' | b'@')
}

fn is_pchar(b: u8) -> bool {
    is_unreserved(b) || is_sub_delimiter(b) || b == b':' || b == b'@'
}

/// Percent-encode every byte of `source` that is not legal in `kind`.
///
/// Already encoded sequences are *not* recognized:
/// a `%` in `source` is always encoded as `%25`.
pub fn encode(source: &str, kind: ComponentKind) -> Cow<'_, str> {
    utf8_percent_encode(source, kind.encode_set()).into()
}

/// Percent-encode every character outside the unreserved set.
///
/// This is the encoding applied to template variable values in strict mode,
/// so that a value can never introduce a character with reserved meaning.
pub fn encode_strict(source: &str) -> Cow<'_, str> {
    encode(source, ComponentKind::Uri)
}

/// Percent-encode the literal parts of a template for the given component,
/// leaving `{...}` placeholders (including nested braces) untouched.
pub fn encode_template(source: &str, kind: ComponentKind) -> Cow<'_, str> {
    if !source.contains('{') {
        return encode(source, kind);
    }
    let mut out = String::with_capacity(source.len());
    let mut level = 0_usize;
    let mut literal_start = 0;
    for (i, c) in source.char_indices() {
        match c {
            '{' => {
                if level == 0 {
                    out.push_str(&encode(&source[literal_start..i], kind));
                    literal_start = i;
                }
                level += 1;
            }
            '}' if level > 0 => {
                level -= 1;
                if level == 0 {
                    out.push_str(&source[literal_start..=i]);
                    literal_start = i + 1;
                }
            }
            _ => {}
        }
    }
    let tail = &source[literal_start..];
    if level > 0 {
        // unbalanced: the open placeholder is kept verbatim
        out.push_str(tail);
    } else {
        out.push_str(&encode(tail, kind));
    }
    Cow::Owned(out)
}

/// Decode the `%XX` sequences of `source`.
///
/// Fails if a sequence is truncated or not hexadecimal,
/// or if the decoded bytes are not valid UTF-8.
pub fn decode(source: &str) -> Result<Cow<'_, str>> {
    let invalid = || UriError::InvalidEncodedSequence(source.to_string());
    if !has_well_formed_escapes(source) {
        return Err(invalid());
    }
    percent_decode_str(source)
        .decode_utf8()
        .map_err(|_| invalid())
}

/// Check that `source` only contains characters legal in `kind`,
/// or well-formed `%XX` sequences.
pub fn is_valid_encoded(source: &str, kind: ComponentKind) -> bool {
    let bytes = source.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'%' {
            let well_formed = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !well_formed {
                return false;
            }
            i += 3;
        } else if kind.is_allowed(b) {
            i += 1;
        } else {
            return false;
        }
    }
    true
}

fn has_well_formed_escapes(source: &str) -> bool {
    let bytes = source.as_bytes();
    bytes.iter().enumerate().all(|(i, b)| {
        *b != b'%'
            || (bytes.get(i + 1).map_or(false, u8::is_ascii_hexdigit)
                && bytes.get(i + 2).map_or(false, u8::is_ascii_hexdigit))
    })
}
