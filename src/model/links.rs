use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::model::{Instance, LINK_QUALIFIER};

/// Builds a link from the resolved parameters of a dump request.
pub type LinkFactory = Arc<dyn Fn(&LinkParams) -> String + Send + Sync>;

/// Registry key of a link, optionally scoped to a relationship.
pub fn qualified_link_name(link: &str, relationship: Option<&str>) -> String {
    match relationship {
        Some(relationship) => format!("{}{}{}", relationship, LINK_QUALIFIER, link),
        None => link.to_string(),
    }
}

/// Named arguments handed to a link factory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkParams(IndexMap<String, Value>);

impl LinkParams {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Argument rendered for interpolation: strings without quotes, other
    /// values as JSON, missing arguments as an empty string.
    pub fn display(&self, name: &str) -> String {
        match self.0.get(name) {
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for LinkParams {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One argument of a link request.
#[derive(Clone)]
pub enum LinkArg {
    Value(Value),
    /// Computed from the dumped instance when the link is resolved
    Computed(Arc<dyn Fn(&Instance) -> Value + Send + Sync>),
}

impl LinkArg {
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&Instance) -> Value + Send + Sync + 'static,
    {
        LinkArg::Computed(Arc::new(f))
    }

    pub fn resolve(&self, instance: &Instance) -> Value {
        match self {
            LinkArg::Value(value) => value.clone(),
            LinkArg::Computed(f) => f(instance),
        }
    }
}

impl fmt::Debug for LinkArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkArg::Value(value) => f.debug_tuple("Value").field(value).finish(),
            LinkArg::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<Value> for LinkArg {
    fn from(value: Value) -> Self {
        LinkArg::Value(value)
    }
}

impl From<&str> for LinkArg {
    fn from(value: &str) -> Self {
        LinkArg::Value(Value::from(value))
    }
}

impl From<String> for LinkArg {
    fn from(value: String) -> Self {
        LinkArg::Value(Value::from(value))
    }
}

impl From<i64> for LinkArg {
    fn from(value: i64) -> Self {
        LinkArg::Value(Value::from(value))
    }
}

/// Ordered named arguments of a link request.
#[derive(Debug, Clone, Default)]
pub struct LinkArgs(IndexMap<String, LinkArg>);

impl LinkArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arguments made of the dumped instance's id, under the name `id`.
    pub fn id() -> Self {
        Self::new().computed("id", |instance| instance.id().cloned().unwrap_or(Value::Null))
    }

    pub fn arg(mut self, name: impl Into<String>, arg: impl Into<LinkArg>) -> Self {
        self.0.insert(name.into(), arg.into());
        self
    }

    pub fn computed<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Instance) -> Value + Send + Sync + 'static,
    {
        self.0.insert(name.into(), LinkArg::computed(f));
        self
    }

    pub fn resolve(&self, instance: &Instance) -> LinkParams {
        self.0
            .iter()
            .map(|(name, arg)| (name.clone(), arg.resolve(instance)))
            .collect()
    }
}

/// What the caller supplies for one requested link.
#[derive(Debug, Clone)]
pub enum LinkRequest {
    /// Only the link name, nothing to build it from
    Name,
    /// A ready-made link used verbatim
    Url(String),
    /// Arguments for the registered factory
    Params(LinkArgs),
}

impl From<&str> for LinkRequest {
    fn from(url: &str) -> Self {
        LinkRequest::Url(url.to_string())
    }
}

impl From<String> for LinkRequest {
    fn from(url: String) -> Self {
        LinkRequest::Url(url)
    }
}

impl From<LinkArgs> for LinkRequest {
    fn from(args: LinkArgs) -> Self {
        LinkRequest::Params(args)
    }
}
