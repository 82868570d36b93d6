//! Substitution of `{name}` placeholders in URI component text.
use crate::encoding::encode_strict;
use crate::error::Result;
use crate::variables::{TemplateValue, UriTemplateVariables};
use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;

lazy_static! {
    /// Match a template placeholder, capturing its content.
    pub(crate) static ref NAMES_PATTERN: Regex = Regex::new(r"\{([^/]+?)\}").unwrap();
}

/// Replace every placeholder of `source` by the value provided by `vars`.
///
/// The text after an optional `:` in a placeholder is a match pattern,
/// and is ignored here.
/// Substituted values are inserted literally,
/// and never re-interpreted as containing further placeholders.
pub fn expand_uri_component<'a, V>(source: &'a str, vars: &mut V) -> Result<Cow<'a, str>>
where
    V: UriTemplateVariables + ?Sized,
{
    if !source.contains('{') {
        return Ok(Cow::Borrowed(source));
    }
    let source = if source.contains(':') {
        sanitize_source(source)
    } else {
        Cow::Borrowed(source)
    };
    let mut out = String::with_capacity(source.len());
    let mut last = 0;
    for cap in NAMES_PATTERN.captures_iter(&source) {
        let (Some(whole), Some(inner)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        let name = variable_name(inner.as_str());
        if let Some(value) = vars.get_value(name)?.as_str() {
            out.push_str(&source[last..whole.start()]);
            out.push_str(value);
            last = whole.end();
        }
    }
    out.push_str(&source[last..]);
    Ok(Cow::Owned(out))
}

/// Remove nested braces, so that `{id:\d{3}}` is seen as a single placeholder.
pub(crate) fn sanitize_source(source: &str) -> Cow<'_, str> {
    let mut level = 0_i32;
    let mut out = String::with_capacity(source.len());
    for c in source.chars() {
        if c == '{' {
            level += 1;
        }
        if c == '}' {
            level -= 1;
        }
        if level > 1 || (level == 1 && c == '}') {
            continue;
        }
        out.push(c);
    }
    Cow::Owned(out)
}

fn variable_name(placeholder: &str) -> &str {
    match placeholder.find(':') {
        Some(idx) => &placeholder[..idx],
        None => placeholder,
    }
}

/// Wraps a variable source, strictly encoding every value it provides.
pub(crate) struct StrictlyEncoded<V>(pub V);

impl<V: UriTemplateVariables> UriTemplateVariables for StrictlyEncoded<V> {
    fn get_value(&mut self, name: &str) -> Result<TemplateValue> {
        Ok(match self.0.get_value(name)? {
            TemplateValue::Present(Some(value)) => {
                TemplateValue::Present(Some(encode_strict(&value).into_owned()))
            }
            other => other,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::UriError;
    use crate::variables::PositionalVariables;
    use std::collections::HashMap;
    use test_case::test_case;

    fn vars() -> HashMap<&'static str, TemplateValue> {
        [
            ("hotel", "Rest & Relax".into()),
            ("id", "42".into()),
            ("nothing", TemplateValue::Present(None)),
            ("skipped", TemplateValue::Skip),
            ("tricky", "$1 {id} \\".into()),
        ]
        .into_iter()
        .collect()
    }

    #[test_case("/hotels", "/hotels"; "no placeholder")]
    #[test_case("/hotels/{hotel}", "/hotels/Rest & Relax"; "single")]
    #[test_case("/{id}/{id}", "/42/42"; "repeated")]
    #[test_case("/items/{id:[0-9]+}", "/items/42"; "custom regex")]
    #[test_case("/items/{id:\\d{2}}", "/items/42"; "nested braces")]
    #[test_case("/a{nothing}b", "/ab"; "null value")]
    #[test_case("/{skipped}/{id}", "/{skipped}/42"; "skip value")]
    #[test_case("/{tricky}", "/$1 {id} \\"; "literal replacement")]
    fn named(source: &str, expected: &str) {
        let map = vars();
        assert_eq!(expand_uri_component(source, &mut &map).unwrap(), expected);
    }

    #[test]
    fn named_missing() {
        let map = vars();
        let res = expand_uri_component("/{unknown}", &mut &map);
        assert!(matches!(res, Err(UriError::MissingVariable(n)) if n == "unknown"));
    }

    #[test]
    fn positional() {
        let mut vars = PositionalVariables::new(["a", "b", "c"]);
        assert_eq!(
            expand_uri_component("/{x}/{y}/{x}", &mut vars).unwrap(),
            "/a/b/c"
        );
    }

    #[test]
    fn positional_insufficient() {
        let mut vars = PositionalVariables::new(["a"]);
        let res = expand_uri_component("/{x}/{y}", &mut vars);
        assert!(matches!(res, Err(UriError::InsufficientVariables(n)) if n == "y"));
    }

    #[test]
    fn strictly_encoded() {
        let map = vars();
        let mut vars = StrictlyEncoded(&map);
        assert_eq!(
            expand_uri_component("/hotels/{hotel}", &mut vars).unwrap(),
            "/hotels/Rest%20%26%20Relax"
        );
    }

    #[test]
    fn sanitize() {
        assert_eq!(sanitize_source("/{id:\\d{3}}/x"), "/{id:\\d}/x");
    }
}
