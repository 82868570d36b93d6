//! I define [`UriTemplate`],
//! which expands variables into a URI and matches URIs back to variable values.
use crate::error::{Result, TemplateError};
use oxiri::IriRef;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use urikit_components::{UriComponents, UriTemplateVariables};

/// A URI template, such as `http://example.com/hotels/{hotel}/bookings/{booking}`.
///
/// A variable may carry its own regular expression (e.g. `{id:[0-9]+}`),
/// which constrains [matching](UriTemplate::match_uri) and is ignored by
/// [expansion](UriTemplate::expand).
///
/// ```
/// # use urikit_template::UriTemplate;
/// # use std::collections::HashMap;
/// let template = UriTemplate::new("http://example.com/hotels/{hotel}/bookings/{booking}")?;
/// assert_eq!(template.variable_names(), ["hotel", "booking"]);
///
/// let vars: HashMap<_, _> = [("hotel", "1"), ("booking", "42")].into_iter().collect();
/// let uri = template.expand(&vars)?;
/// assert_eq!(uri.as_str(), "http://example.com/hotels/1/bookings/42");
///
/// let matched = template.match_uri(uri.as_str());
/// assert_eq!(matched["hotel"], "1");
/// assert_eq!(matched["booking"], "42");
/// # Ok::<(), urikit_template::error::TemplateError>(())
/// ```
#[derive(Clone, Debug)]
pub struct UriTemplate {
    source: String,
    components: UriComponents,
    variable_names: Vec<String>,
    match_regex: Regex,
    full_match_regex: Regex,
}

impl UriTemplate {
    /// Compile `source` into a template.
    ///
    /// # Errors
    /// Fails if a variable has an empty or invalid custom regular expression.
    pub fn new<T: Into<String>>(source: T) -> Result<Self> {
        let source = source.into();
        let (variable_names, pattern) = compile(&source)?;
        log::trace!("template {source:?} compiled to {pattern:?}");
        let match_regex = Regex::new(&pattern)?;
        let full_match_regex = Regex::new(&format!("^(?:{pattern})$"))?;
        let components = UriComponents::parse(&source)?;
        Ok(UriTemplate {
            source,
            components,
            variable_names,
            match_regex,
            full_match_regex,
        })
    }

    /// The text of this template.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The components parsed from this template.
    pub fn components(&self) -> &UriComponents {
        &self.components
    }

    /// The names of the variables, in order of appearance.
    ///
    /// A name appears as many times as the variable occurs in the template.
    pub fn variable_names(&self) -> &[String] {
        &self.variable_names
    }

    /// Replace every variable by the value provided by `vars`.
    ///
    /// The literal parts of the template are encoded according to their component,
    /// while every character of a value outside the unreserved set is encoded,
    /// so that values can not introduce delimiters in the result.
    ///
    /// # Errors
    /// Fails if a variable has no value,
    /// or if the expanded text is not a valid URI reference.
    pub fn expand<V: UriTemplateVariables>(&self, vars: V) -> Result<IriRef<String>> {
        Ok(self.components.encode_template().expand(vars)?.to_uri()?)
    }

    /// Whether the whole of `candidate` matches this template.
    pub fn matches(&self, candidate: &str) -> bool {
        self.full_match_regex.is_match(candidate)
    }

    /// Extract the value of each variable from `candidate`.
    ///
    /// The map is empty if `candidate` does not match.
    /// If a variable occurs several times, the last occurrence wins.
    pub fn match_uri(&self, candidate: &str) -> HashMap<String, String> {
        let mut result = HashMap::with_capacity(self.variable_names.len());
        if let Some(cap) = self.match_regex.captures(candidate) {
            for (i, name) in self.variable_names.iter().enumerate() {
                if let Some(m) = cap.name(&group_name(i)) {
                    result.insert(name.clone(), m.as_str().to_string());
                }
            }
        }
        result
    }
}

/// Compile a template into the list of its variable names
/// and a regular expression capturing each of them.
///
/// Capture groups are named after the position of the variable,
/// so that groups in custom regular expressions do not shift them.
fn compile(template: &str) -> Result<(Vec<String>, String)> {
    let mut names = Vec::new();
    let mut pattern = String::with_capacity(template.len() * 2);
    let mut buffer = String::new();
    let mut depth = 0_usize;
    for c in template.chars() {
        match c {
            '{' => {
                depth += 1;
                if depth == 1 {
                    pattern.push_str(&regex::escape(&buffer));
                    buffer.clear();
                    continue;
                }
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    let group = group_name(names.len());
                    match buffer.split_once(':') {
                        None => {
                            pattern.push_str(&format!("(?P<{group}>.*)"));
                            names.push(buffer.clone());
                        }
                        Some((_, "")) => {
                            return Err(TemplateError::EmptyCustomRegex(buffer));
                        }
                        Some((name, regex)) => {
                            pattern.push_str(&format!("(?P<{group}>{regex})"));
                            names.push(name.to_string());
                        }
                    }
                    buffer.clear();
                    continue;
                }
            }
            _ => {}
        }
        buffer.push(c);
    }
    if !buffer.is_empty() {
        pattern.push_str(&regex::escape(&buffer));
    }
    Ok((names, pattern))
}

fn group_name(index: usize) -> String {
    format!("v{index}")
}

impl fmt::Display for UriTemplate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for UriTemplate {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self> {
        UriTemplate::new(s)
    }
}

impl PartialEq for UriTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for UriTemplate {}

impl Hash for UriTemplate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;
    use urikit_components::{PositionalVariables, TemplateValue};

    const HOTELS: &str = "http://example.com/hotels/{hotel}/bookings/{booking}";

    #[test_case(HOTELS, &["hotel", "booking"]; "two variables")]
    #[test_case("/items/{id:[0-9]+}", &["id"]; "custom regex")]
    #[test_case("/items/{id:[0-9]{2}}/{x}", &["id", "x"]; "nested braces in regex")]
    #[test_case("/{a}/{a}", &["a", "a"]; "repeated")]
    #[test_case("/static", &[]; "no variable")]
    fn variable_names(template: &str, expected: &[&str]) {
        crate::test_setup();
        let template = UriTemplate::new(template).unwrap();
        assert_eq!(template.variable_names(), expected);
    }

    #[test]
    fn empty_custom_regex() {
        assert!(matches!(
            UriTemplate::new("/items/{id:}"),
            Err(TemplateError::EmptyCustomRegex(t)) if t == "id:",
        ));
    }

    #[test]
    fn invalid_custom_regex() {
        assert!(matches!(
            UriTemplate::new("/items/{id:[0-9}"),
            Err(TemplateError::InvalidPattern(_)),
        ));
    }

    #[test]
    fn expand_with_map() {
        let template = UriTemplate::new(HOTELS).unwrap();
        let vars: HashMap<_, _> = [("hotel", "Rest & Relax"), ("booking", "42")]
            .into_iter()
            .collect();
        assert_eq!(
            template.expand(&vars).unwrap().as_str(),
            "http://example.com/hotels/Rest%20%26%20Relax/bookings/42",
        );
    }

    #[test]
    fn expand_positional() {
        let template = UriTemplate::new(HOTELS).unwrap();
        let uri = template.expand(PositionalVariables::new(["1", "42"])).unwrap();
        assert_eq!(uri.as_str(), "http://example.com/hotels/1/bookings/42");
    }

    #[test]
    fn expand_custom_regex_ignored() {
        let template = UriTemplate::new("/items/{id:[0-9]+}").unwrap();
        let vars: HashMap<_, _> = [("id", TemplateValue::new(7))].into_iter().collect();
        assert_eq!(template.expand(&vars).unwrap().as_str(), "/items/7");
    }

    #[test]
    fn match_hotels() {
        let template = UriTemplate::new(HOTELS).unwrap();
        let matched = template.match_uri("http://example.com/hotels/1/bookings/42");
        assert_eq!(matched.len(), 2);
        assert_eq!(matched["hotel"], "1");
        assert_eq!(matched["booking"], "42");
    }

    #[test_case("/items/42", true; "digits")]
    #[test_case("/items/abc", false; "letters")]
    #[test_case("/items/42/more", false; "trailing text")]
    #[test_case("/prefix/items/42", false; "leading text")]
    fn matches_custom_regex(candidate: &str, expected: bool) {
        let template = UriTemplate::new("/items/{id:[0-9]+}").unwrap();
        assert_eq!(template.matches(candidate), expected);
    }

    #[test]
    fn match_groups_in_custom_regex() {
        let template = UriTemplate::new("/{date:([0-9]{4})-([0-9]{2})}/{slug}").unwrap();
        let matched = template.match_uri("/2024-05/hello");
        assert_eq!(matched["date"], "2024-05");
        assert_eq!(matched["slug"], "hello");
    }

    #[test]
    fn literal_metacharacters_are_quoted() {
        let template = UriTemplate::new("/search?q={q}&page=(1)").unwrap();
        assert!(template.matches("/search?q=rust&page=(1)"));
        assert!(!template.matches("/searchXq=rust&page=1"));
    }

    #[test]
    fn no_match_gives_empty_map() {
        let template = UriTemplate::new("/items/{id:[0-9]+}").unwrap();
        assert!(template.match_uri("/users/1").is_empty());
    }

    #[test]
    fn display_and_parse() {
        let template: UriTemplate = HOTELS.parse().unwrap();
        assert_eq!(template.to_string(), HOTELS);
        assert_eq!(template, UriTemplate::new(HOTELS).unwrap());
    }
}
