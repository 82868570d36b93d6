//! Sources of values for URI template variables.
use crate::error::{Result, UriError};
use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

/// The value bound to a template variable.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum TemplateValue {
    /// A value to substitute; `None` is substituted as the empty string.
    Present(Option<String>),
    /// Leave the placeholder text untouched in the output.
    Skip,
}

impl TemplateValue {
    /// Build a present value.
    pub fn new<T: ToString>(value: T) -> Self {
        TemplateValue::Present(Some(value.to_string()))
    }

    /// The text to substitute, or `None` if the placeholder must be skipped.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TemplateValue::Present(value) => Some(value.as_deref().unwrap_or("")),
            TemplateValue::Skip => None,
        }
    }

    /// Whether this is [`TemplateValue::Skip`].
    pub fn is_skip(&self) -> bool {
        matches!(self, TemplateValue::Skip)
    }
}

impl From<&str> for TemplateValue {
    fn from(other: &str) -> Self {
        TemplateValue::Present(Some(other.to_string()))
    }
}

impl From<String> for TemplateValue {
    fn from(other: String) -> Self {
        TemplateValue::Present(Some(other))
    }
}

impl From<&String> for TemplateValue {
    fn from(other: &String) -> Self {
        TemplateValue::Present(Some(other.clone()))
    }
}

impl<T: Into<TemplateValue>> From<Option<T>> for TemplateValue {
    fn from(other: Option<T>) -> Self {
        other.map(Into::into).unwrap_or(TemplateValue::Present(None))
    }
}

macro_rules! template_value_from_display {
    ($($t:ty),*) => {
        $(
            impl From<$t> for TemplateValue {
                fn from(other: $t) -> Self {
                    TemplateValue::new(other)
                }
            }
        )*
    };
}

template_value_from_display!(bool, char, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// A source of values for the variables of a URI template.
///
/// Expansion calls [`get_value`](UriTemplateVariables::get_value)
/// once per placeholder occurrence, in the order of appearance in the template.
pub trait UriTemplateVariables {
    /// Get the value of the variable `name`.
    ///
    /// # Errors
    /// Fails if no value is available for `name`.
    fn get_value(&mut self, name: &str) -> Result<TemplateValue>;
}

impl<T: UriTemplateVariables + ?Sized> UriTemplateVariables for &mut T {
    fn get_value(&mut self, name: &str) -> Result<TemplateValue> {
        (**self).get_value(name)
    }
}

impl<K, V, S> UriTemplateVariables for &HashMap<K, V, S>
where
    K: Borrow<str> + Hash + Eq,
    V: Clone + Into<TemplateValue>,
    S: BuildHasher,
{
    fn get_value(&mut self, name: &str) -> Result<TemplateValue> {
        self.get(name)
            .map(|v| v.clone().into())
            .ok_or_else(|| UriError::MissingVariable(name.to_string()))
    }
}

impl<K, V> UriTemplateVariables for &BTreeMap<K, V>
where
    K: Borrow<str> + Ord,
    V: Clone + Into<TemplateValue>,
{
    fn get_value(&mut self, name: &str) -> Result<TemplateValue> {
        self.get(name)
            .map(|v| v.clone().into())
            .ok_or_else(|| UriError::MissingVariable(name.to_string()))
    }
}

/// Variable values consumed in order, one per placeholder occurrence.
#[derive(Clone, Debug)]
pub struct PositionalVariables<I>(I);

impl<I: Iterator> PositionalVariables<I> {
    /// Wrap the given values.
    pub fn new<T: IntoIterator<IntoIter = I>>(values: T) -> Self {
        PositionalVariables(values.into_iter())
    }
}

impl<I> UriTemplateVariables for PositionalVariables<I>
where
    I: Iterator,
    I::Item: Into<TemplateValue>,
{
    fn get_value(&mut self, name: &str) -> Result<TemplateValue> {
        self.0
            .next()
            .map(Into::into)
            .ok_or_else(|| UriError::InsufficientVariables(name.to_string()))
    }
}
