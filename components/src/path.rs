//! The path of hierarchical URI components,
//! and the builder accumulating it.
use crate::encoding::{encode, encode_template, is_valid_encoded, ComponentKind};
use crate::error::{Result, UriError};
use crate::expand::expand_uri_component;
use crate::variables::UriTemplateVariables;
use std::fmt;

/// The path of hierarchical URI components.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum PathComponent {
    /// No path at all.
    #[default]
    Empty,
    /// A slash-delimited path, possibly containing template placeholders.
    FullPath(String),
    /// A list of segments, none of which contains a `/`.
    Segments(Vec<String>),
    /// The concatenation of several path components.
    Composite(Vec<PathComponent>),
}

impl PathComponent {
    /// Render this component as a path string.
    pub fn path(&self) -> String {
        let mut out = String::new();
        self.write_path(&mut out);
        out
    }

    fn write_path(&self, out: &mut String) {
        match self {
            PathComponent::Empty => {}
            PathComponent::FullPath(path) => out.push_str(path),
            PathComponent::Segments(segments) => {
                out.push('/');
                out.push_str(&segments.join("/"));
            }
            PathComponent::Composite(children) => {
                for child in children {
                    child.write_path(out);
                }
            }
        }
    }

    /// The non-empty segments of this path.
    pub fn path_segments(&self) -> Vec<String> {
        match self {
            PathComponent::Empty => vec![],
            PathComponent::FullPath(path) => path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            PathComponent::Segments(segments) => segments.clone(),
            PathComponent::Composite(children) => {
                children.iter().flat_map(PathComponent::path_segments).collect()
            }
        }
    }

    /// Whether this component renders as the empty string.
    pub fn is_empty(&self) -> bool {
        match self {
            PathComponent::Empty => true,
            PathComponent::FullPath(path) => path.is_empty(),
            PathComponent::Segments(_) => false,
            PathComponent::Composite(children) => children.iter().all(PathComponent::is_empty),
        }
    }

    /// Percent-encode this path: full paths may keep their `/`,
    /// while segments are encoded individually.
    pub fn encode(&self) -> Self {
        self.map_text(|text, kind| encode(text, kind).into_owned())
    }

    /// Percent-encode the literal text of this path, leaving placeholders untouched.
    pub fn encode_template(&self) -> Self {
        self.map_text(|text, kind| encode_template(text, kind).into_owned())
    }

    fn map_text<F>(&self, f: F) -> Self
    where
        F: Fn(&str, ComponentKind) -> String + Copy,
    {
        match self {
            PathComponent::Empty => PathComponent::Empty,
            PathComponent::FullPath(path) => {
                PathComponent::FullPath(f(path, ComponentKind::Path))
            }
            PathComponent::Segments(segments) => PathComponent::Segments(
                segments
                    .iter()
                    .map(|s| f(s, ComponentKind::PathSegment))
                    .collect(),
            ),
            PathComponent::Composite(children) => {
                PathComponent::Composite(children.iter().map(|c| c.map_text(f)).collect())
            }
        }
    }

    /// Substitute template variables in this path.
    pub fn expand<V>(&self, vars: &mut V) -> Result<Self>
    where
        V: UriTemplateVariables + ?Sized,
    {
        Ok(match self {
            PathComponent::Empty => PathComponent::Empty,
            PathComponent::FullPath(path) => {
                PathComponent::FullPath(expand_uri_component(path, vars)?.into_owned())
            }
            PathComponent::Segments(segments) => PathComponent::Segments(
                segments
                    .iter()
                    .map(|s| expand_uri_component(s, vars).map(|s| s.into_owned()))
                    .collect::<Result<_>>()?,
            ),
            PathComponent::Composite(children) => PathComponent::Composite(
                children
                    .iter()
                    .map(|c| c.expand(vars))
                    .collect::<Result<_>>()?,
            ),
        })
    }

    /// Check that this path only contains legal characters or `%XX` sequences.
    pub fn verify(&self) -> Result<()> {
        match self {
            PathComponent::Empty => Ok(()),
            PathComponent::FullPath(path) => verify(path, ComponentKind::Path),
            PathComponent::Segments(segments) => segments
                .iter()
                .try_for_each(|s| verify(s, ComponentKind::PathSegment)),
            PathComponent::Composite(children) => {
                children.iter().try_for_each(PathComponent::verify)
            }
        }
    }
}

impl fmt::Display for PathComponent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.path())
    }
}

pub(crate) fn verify(value: &str, component: ComponentKind) -> Result<()> {
    if is_valid_encoded(value, component) {
        Ok(())
    } else {
        Err(UriError::InvalidCharacter {
            component,
            value: value.to_string(),
        })
    }
}

//

#[derive(Clone, Debug)]
enum PathBuilder {
    FullPath(String),
    Segments(Vec<String>),
}

impl PathBuilder {
    fn build(&self) -> Option<PathComponent> {
        match self {
            PathBuilder::FullPath(path) if path.is_empty() => None,
            PathBuilder::FullPath(path) => Some(PathComponent::FullPath(collapse_slashes(path))),
            PathBuilder::Segments(segments) if segments.is_empty() => None,
            PathBuilder::Segments(segments) => Some(PathComponent::Segments(segments.clone())),
        }
    }
}

/// Accumulates full paths and path segments, in the order they were appended.
#[derive(Clone, Debug, Default)]
pub(crate) struct CompositePathBuilder {
    builders: Vec<PathBuilder>,
}

impl CompositePathBuilder {
    pub fn add_path(&mut self, path: &str) {
        if path.trim().is_empty() {
            return;
        }
        let after_segments = matches!(self.builders.last(), Some(PathBuilder::Segments(_)));
        let path = if after_segments && !path.starts_with('/') {
            format!("/{path}")
        } else {
            path.to_string()
        };
        match self.builders.last_mut() {
            Some(PathBuilder::FullPath(full)) => full.push_str(&path),
            _ => self.builders.push(PathBuilder::FullPath(path)),
        }
    }

    pub fn add_path_segments<I, T>(&mut self, segments: I)
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut segments = segments
            .into_iter()
            .filter(|s| !s.as_ref().trim().is_empty())
            .map(|s| s.as_ref().to_string())
            .peekable();
        if segments.peek().is_none() {
            return;
        }
        match self.builders.last_mut() {
            Some(PathBuilder::Segments(existing)) => {
                existing.extend(segments);
                return;
            }
            Some(PathBuilder::FullPath(full)) => {
                if full.ends_with('/') {
                    full.pop();
                }
            }
            None => {}
        }
        self.builders.push(PathBuilder::Segments(segments.collect()));
    }

    pub fn build(&self) -> PathComponent {
        let mut components: Vec<PathComponent> =
            self.builders.iter().filter_map(PathBuilder::build).collect();
        match components.len() {
            0 => PathComponent::Empty,
            1 => components.pop().unwrap_or_default(),
            _ => PathComponent::Composite(components),
        }
    }
}

fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;

    fn built(f: impl FnOnce(&mut CompositePathBuilder)) -> PathComponent {
        let mut builder = CompositePathBuilder::default();
        f(&mut builder);
        builder.build()
    }

    #[test]
    fn empty() {
        let path = built(|_| {});
        assert_eq!(path, PathComponent::Empty);
        assert_eq!(path.path(), "");
        assert!(path.is_empty());
    }

    #[test]
    fn full_path_collapses_double_slashes() {
        let path = built(|b| {
            b.add_path("/foo/");
            b.add_path("/bar//baz");
        });
        assert_eq!(path, PathComponent::FullPath("/foo/bar/baz".into()));
    }

    #[test]
    fn segments_after_full_path() {
        let path = built(|b| {
            b.add_path("/a/");
            b.add_path_segments(["b"]);
        });
        assert_eq!(path.path(), "/a/b");
        assert!(matches!(path, PathComponent::Composite(ref c) if c.len() == 2));
    }

    #[test]
    fn full_path_after_segments() {
        let path = built(|b| {
            b.add_path_segments(["a", "b"]);
            b.add_path("c/d");
        });
        assert_eq!(path.path(), "/a/b/c/d");
        assert_eq!(path.path_segments(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn blank_segments_are_ignored() {
        let path = built(|b| b.add_path_segments(["", "a", " "]));
        assert_eq!(path, PathComponent::Segments(vec!["a".into()]));
    }

    #[test]
    fn segments_path_without_segments_is_root() {
        assert_eq!(PathComponent::Segments(vec![]).path(), "/");
    }

    #[test]
    fn encode_segments_and_full_path() {
        let path = PathComponent::Composite(vec![
            PathComponent::FullPath("/a b/c".into()),
            PathComponent::Segments(vec!["d/e".into()]),
        ]);
        assert_eq!(path.encode().path(), "/a%20b/c/d%2Fe");
    }

    #[test]
    fn expand_composite() {
        let vars: HashMap<&str, &str> = [("x", "1"), ("y", "2")].into_iter().collect();
        let path = PathComponent::Composite(vec![
            PathComponent::FullPath("/{x}".into()),
            PathComponent::Segments(vec!["{y}".into()]),
        ]);
        assert_eq!(path.expand(&mut &vars).unwrap().path(), "/1/2");
    }

    #[test]
    fn verify_rejects_raw_slash_in_segment() {
        assert!(PathComponent::Segments(vec!["a/b".into()]).verify().is_err());
        assert!(PathComponent::FullPath("/a/b".into()).verify().is_ok());
    }
}
