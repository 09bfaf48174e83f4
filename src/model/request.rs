use indexmap::IndexMap;

use crate::model::{LinkArgs, LinkRequest};

/// Attributes to export under `attributes`.
#[derive(Debug, Clone, PartialEq)]
pub enum RequiredAttributes {
    /// Every atomic field, plus the `meta` object
    All,
    /// Exactly these names; include `"meta"` to export the `meta` object
    Only(Vec<String>),
}

/// Options for one requested relationship.
#[derive(Debug, Clone, Default)]
pub struct RelationshipRequest {
    /// Include the identifier reference(s) under `data`
    pub data: bool,
    /// Links resolved against `<relationship>__<link>` factories
    pub links: IndexMap<String, LinkRequest>,
}

impl RelationshipRequest {
    pub fn data() -> Self {
        Self {
            data: true,
            links: IndexMap::new(),
        }
    }

    pub fn links_only() -> Self {
        Self::default()
    }

    pub fn link(mut self, name: impl Into<String>, request: impl Into<LinkRequest>) -> Self {
        self.links.insert(name.into(), request.into());
        self
    }

    /// Request a factory-built link from the parent's id.
    pub fn id_link(self, name: impl Into<String>) -> Self {
        self.link(name, LinkArgs::id())
    }

    /// Whether this request asks for anything at all
    pub fn is_empty(&self) -> bool {
        !self.data && self.links.is_empty()
    }
}

/// Per-call parameters of a dump.
#[derive(Debug, Clone)]
pub struct DumpRequest {
    pub attributes: RequiredAttributes,
    pub links: IndexMap<String, LinkRequest>,
    pub relationships: IndexMap<String, RelationshipRequest>,
}

impl DumpRequest {
    pub fn new(attributes: RequiredAttributes) -> Self {
        Self {
            attributes,
            links: IndexMap::new(),
            relationships: IndexMap::new(),
        }
    }

    pub fn all() -> Self {
        Self::new(RequiredAttributes::All)
    }

    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(RequiredAttributes::Only(
            names.into_iter().map(Into::into).collect(),
        ))
    }

    pub fn link(mut self, name: impl Into<String>, request: impl Into<LinkRequest>) -> Self {
        self.links.insert(name.into(), request.into());
        self
    }

    /// Request a factory-built link from the instance id.
    pub fn id_link(self, name: impl Into<String>) -> Self {
        self.link(name, LinkArgs::id())
    }

    pub fn relationship(mut self, name: impl Into<String>, request: RelationshipRequest) -> Self {
        self.relationships.insert(name.into(), request);
        self
    }
}

impl Default for DumpRequest {
    fn default() -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let request = DumpRequest::only(["first_name", "meta"])
            .link("self", "http://example.com/people/1")
            .relationship("author", RelationshipRequest::data().id_link("related"));

        assert_eq!(
            request.attributes,
            RequiredAttributes::Only(vec!["first_name".to_string(), "meta".to_string()])
        );
        assert!(matches!(request.links["self"], LinkRequest::Url(_)));
        let author = &request.relationships["author"];
        assert!(author.data);
        assert!(matches!(author.links["related"], LinkRequest::Params(_)));
    }

    #[test]
    fn test_empty_relationship_request() {
        assert!(RelationshipRequest::links_only().is_empty());
        assert!(!RelationshipRequest::data().is_empty());
        assert!(!RelationshipRequest::links_only()
            .link("related", LinkRequest::Name)
            .is_empty());
    }
}
