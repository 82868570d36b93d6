//! Ordered, multi-valued query parameters.
use crate::error::Result;
use std::fmt;

/// An ordered multimap of query parameters.
///
/// Keys keep the order of their first insertion,
/// and the values of a key keep their insertion order.
/// A `None` value renders as `?key`, while an empty value renders as `?key=`.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct QueryParams {
    entries: Vec<(String, Vec<Option<String>>)>,
}

impl QueryParams {
    /// Build an empty multimap.
    pub const fn new() -> Self {
        QueryParams {
            entries: Vec::new(),
        }
    }

    /// Whether there is no parameter at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct parameter names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Append a value for `name`.
    pub fn add<N, V>(&mut self, name: N, value: Option<V>)
    where
        N: Into<String>,
        V: Into<String>,
    {
        let name = name.into();
        let value = value.map(Into::into);
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((name, vec![value])),
        }
    }

    /// Append all the parameters of `other`, after those of `self`.
    pub fn add_all(&mut self, other: &QueryParams) {
        for (name, values) in other.iter() {
            for value in values {
                self.add(name, value.as_deref());
            }
        }
    }

    /// Remove all values of `name`, returning them if there were any.
    pub fn remove(&mut self, name: &str) -> Option<Vec<Option<String>>> {
        let idx = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(idx).1)
    }

    /// Remove all parameters.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// All values of `name`.
    pub fn get(&self, name: &str) -> Option<&[Option<String>]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| &values[..])
    }

    /// The first value of `name`, if any.
    ///
    /// The outer option is `None` if the parameter is absent,
    /// the inner one if it is present without a value.
    pub fn get_first(&self, name: &str) -> Option<Option<&str>> {
        self.get(name)
            .and_then(|values| values.first())
            .map(Option::as_deref)
    }

    /// Iterate over the parameter names and their values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Option<String>])> {
        self.entries.iter().map(|(n, v)| (n.as_str(), &v[..]))
    }

    /// Render as a query string, or `None` if there are no parameters.
    pub fn to_query_string(&self) -> Option<String> {
        let mut out = String::new();
        for (name, values) in self.iter() {
            if values.is_empty() {
                if !out.is_empty() {
                    out.push('&');
                }
                out.push_str(name);
            }
            for value in values {
                if !out.is_empty() {
                    out.push('&');
                }
                out.push_str(name);
                if let Some(value) = value {
                    out.push('=');
                    out.push_str(value);
                }
            }
        }
        (!out.is_empty()).then_some(out)
    }

    /// Every name and every present value, in order.
    pub(crate) fn texts(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().flat_map(|(name, values)| {
            std::iter::once(name.as_str()).chain(values.iter().filter_map(|v| v.as_deref()))
        })
    }

    /// Apply `f` to every name and every present value,
    /// rebuilding a multimap with the same structure.
    pub(crate) fn map<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&str) -> String,
    {
        let entries = self
            .entries
            .iter()
            .map(|(name, values)| {
                let name = f(name);
                let values = values.iter().map(|v| v.as_deref().map(&mut f)).collect();
                (name, values)
            })
            .collect();
        QueryParams { entries }
    }

    /// Same as [`map`](QueryParams::map), but `f` may fail.
    pub(crate) fn try_map<F>(&self, mut f: F) -> Result<Self>
    where
        F: FnMut(&str) -> Result<String>,
    {
        let mut entries = Vec::with_capacity(self.entries.len());
        for (name, values) in &self.entries {
            let name = f(name)?;
            let values = values
                .iter()
                .map(|v| v.as_deref().map(&mut f).transpose())
                .collect::<Result<Vec<_>>>()?;
            entries.push((name, values));
        }
        Ok(QueryParams { entries })
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.to_query_string().as_deref().unwrap_or(""))
    }
}

impl<N, V> FromIterator<(N, Option<V>)> for QueryParams
where
    N: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (N, Option<V>)>>(iter: T) -> Self {
        let mut params = QueryParams::new();
        for (name, value) in iter {
            params.add(name, value);
        }
        params
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn keeps_insertion_order() {
        let mut params = QueryParams::new();
        params.add("b", Some("1"));
        params.add("a", Some("2"));
        params.add("b", Some("3"));
        assert_eq!(params.len(), 2);
        assert_eq!(params.to_query_string().unwrap(), "b=1&b=3&a=2");
    }

    #[test]
    fn none_and_empty_values() {
        let params: QueryParams = [("a", None), ("b", Some(""))].into_iter().collect();
        assert_eq!(params.to_query_string().unwrap(), "a&b=");
        assert_eq!(params.get_first("a"), Some(None));
        assert_eq!(params.get_first("b"), Some(Some("")));
        assert_eq!(params.get_first("c"), None);
    }

    #[test]
    fn empty_renders_nothing() {
        assert_eq!(QueryParams::new().to_query_string(), None);
        assert_eq!(QueryParams::new().to_string(), "");
    }

    #[test]
    fn remove_and_add_all() {
        let mut params: QueryParams = [("a", Some("1")), ("b", Some("2"))].into_iter().collect();
        let other: QueryParams = [("a", Some("3"))].into_iter().collect();
        params.add_all(&other);
        assert_eq!(params.get("a").unwrap().len(), 2);
        assert_eq!(params.remove("a").unwrap().len(), 2);
        assert!(params.remove("a").is_none());
        assert_eq!(params.to_query_string().unwrap(), "b=2");
    }
}
