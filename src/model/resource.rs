use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

use crate::error::{ResourceError, Result};
use crate::logic::{FieldClassification, FieldClassifier};
use crate::model::{FieldType, FieldValue, Instance, LinkFactory, LinkParams, LINK_QUALIFIER};

/// Metadata computed once when a resource type is declared.
///
/// Everything is fixed after `build()` except the link factory table, which
/// can grow through [`Resource::register_link_factory`].
pub struct ResourceDescriptor {
    /// Declared name of the type, used in error messages
    type_name: String,
    /// The JSON:API `type` member
    resource_name: String,
    is_abstract: bool,
    /// Own type name followed by every ancestor's
    lineage: IndexSet<String>,
    fields: FieldClassification,
    meta_attribute_names: IndexSet<String>,
    identifier_meta_attribute_names: IndexSet<String>,
    link_factories: RwLock<IndexMap<String, LinkFactory>>,
}

impl fmt::Debug for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceDescriptor")
            .field("type_name", &self.type_name)
            .field("resource_name", &self.resource_name)
            .field("is_abstract", &self.is_abstract)
            .field("fields", &self.fields.fields_by_name)
            .field("meta_attribute_names", &self.meta_attribute_names)
            .field(
                "identifier_meta_attribute_names",
                &self.identifier_meta_attribute_names,
            )
            .field(
                "link_factories",
                &self.link_factories.read().keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Shared handle to a resource type.
///
/// Cloning is cheap; every clone and every instance of the type points to the
/// same descriptor.
#[derive(Clone)]
pub struct Resource(Arc<ResourceDescriptor>);

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Resource {}

/// Check that a link name's relationship qualifier, if any, names a
/// relationship field.
fn validate_link_name(
    name: &str,
    relationship_field_names: &IndexSet<String>,
    type_name: &str,
) -> Result<()> {
    if let Some((relationship, _)) = name.split_once(LINK_QUALIFIER) {
        if !relationship_field_names.contains(relationship) {
            return Err(ResourceError::InvalidLinkName {
                relationship: relationship.to_string(),
                resource: type_name.to_string(),
            });
        }
    }
    Ok(())
}

impl Resource {
    pub fn builder(type_name: impl Into<String>) -> ResourceBuilder {
        ResourceBuilder::new(type_name)
    }

    pub fn type_name(&self) -> &str {
        &self.0.type_name
    }

    pub fn resource_name(&self) -> &str {
        &self.0.resource_name
    }

    pub fn is_abstract(&self) -> bool {
        self.0.is_abstract
    }

    /// Whether this type is `type_name` or extends it, directly or not.
    pub fn is_kind_of(&self, type_name: &str) -> bool {
        self.0.lineage.contains(type_name)
    }

    pub fn fields_by_name(&self) -> &IndexMap<String, FieldType> {
        &self.0.fields.fields_by_name
    }

    pub fn field_type(&self, name: &str) -> Option<&FieldType> {
        self.0.fields.fields_by_name.get(name)
    }

    pub fn atomic_field_names(&self) -> &IndexSet<String> {
        &self.0.fields.atomic_field_names
    }

    pub fn relationship_field_names(&self) -> &IndexSet<String> {
        &self.0.fields.relationship_field_names
    }

    pub fn meta_attribute_names(&self) -> &IndexSet<String> {
        &self.0.meta_attribute_names
    }

    pub fn identifier_meta_attribute_names(&self) -> &IndexSet<String> {
        &self.0.identifier_meta_attribute_names
    }

    /// Register a link factory under a plain (`"self"`) or relationship
    /// qualified (`"author__related"`) name, replacing any previous one.
    pub fn register_link_factory<F>(&self, name: &str, factory: F) -> Result<()>
    where
        F: Fn(&LinkParams) -> String + Send + Sync + 'static,
    {
        self.register_shared_link_factory(name, Arc::new(factory))
    }

    pub fn register_shared_link_factory(&self, name: &str, factory: LinkFactory) -> Result<()> {
        validate_link_name(name, self.relationship_field_names(), self.type_name())?;
        self.0.link_factories.write().insert(name.to_string(), factory);
        log::debug!(
            "Registered link factory '{}' on resource '{}'",
            name,
            self.type_name()
        );
        Ok(())
    }

    /// Factory registered under an exact qualified name.
    pub fn link_factory(&self, qualified_name: &str) -> Option<LinkFactory> {
        self.0.link_factories.read().get(qualified_name).cloned()
    }

    pub fn has_link_factory(&self, qualified_name: &str) -> bool {
        self.0.link_factories.read().contains_key(qualified_name)
    }

    /// Registered link names in registration order.
    pub fn link_factory_names(&self) -> Vec<String> {
        self.0.link_factories.read().keys().cloned().collect()
    }

    /// Construct an instance of this type from named values.
    pub fn instance<I, K, V>(&self, values: I) -> Result<Instance>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        Instance::new(self, values)
    }
}

/// Declares a resource type.
///
/// ```
/// use jsonapi_resources::{FieldType, Resource};
///
/// let person = Resource::builder("Person")
///     .field("id", FieldType::atomic())
///     .field("first_name", FieldType::atomic())
///     .resource_name("person")
///     .build()
///     .unwrap();
/// assert_eq!(person.resource_name(), "person");
/// ```
pub struct ResourceBuilder {
    type_name: String,
    ancestors: Vec<Resource>,
    fields: IndexMap<String, FieldType>,
    is_abstract: bool,
    resource_name: Option<String>,
    identifier_meta_attribute_names: IndexSet<String>,
    meta_attribute_names: IndexSet<String>,
    link_factories: IndexMap<String, LinkFactory>,
}

impl ResourceBuilder {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ancestors: Vec::new(),
            fields: IndexMap::new(),
            is_abstract: false,
            resource_name: None,
            identifier_meta_attribute_names: IndexSet::new(),
            meta_attribute_names: IndexSet::new(),
            link_factories: IndexMap::new(),
        }
    }

    /// Inherit the field declarations of `ancestor`. Call in base-to-derived
    /// order; only fields are inherited, never the ancestor's configuration.
    pub fn extends(mut self, ancestor: &Resource) -> Self {
        self.ancestors.push(ancestor.clone());
        self
    }

    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.insert(name.into(), field_type);
        self
    }

    pub fn abstract_resource(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Override the JSON:API `type`, which defaults to the declared type name.
    pub fn resource_name(mut self, name: impl Into<String>) -> Self {
        self.resource_name = Some(name.into());
        self
    }

    pub fn identifier_meta_attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.identifier_meta_attribute_names
            .extend(names.into_iter().map(Into::into));
        self
    }

    pub fn meta_attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meta_attribute_names
            .extend(names.into_iter().map(Into::into));
        self
    }

    pub fn link_factory<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&LinkParams) -> String + Send + Sync + 'static,
    {
        self.link_factories.insert(name.into(), Arc::new(factory));
        self
    }

    pub fn build(self) -> Result<Resource> {
        let fields = FieldClassifier::classify(
            self.ancestors
                .iter()
                .map(|ancestor| ancestor.fields_by_name())
                .chain(std::iter::once(&self.fields)),
        );

        for name in self.link_factories.keys() {
            validate_link_name(name, &fields.relationship_field_names, &self.type_name)?;
        }

        if !self.is_abstract && !fields.fields_by_name.contains_key("id") {
            return Err(ResourceError::MissingId);
        }

        let mut lineage = IndexSet::new();
        lineage.insert(self.type_name.clone());
        for ancestor in &self.ancestors {
            lineage.extend(ancestor.0.lineage.iter().cloned());
        }

        let resource_name = self
            .resource_name
            .unwrap_or_else(|| self.type_name.clone());

        log::debug!(
            "Defined resource '{}' (type '{}', abstract: {}, {} atomic, {} relationships)",
            self.type_name,
            resource_name,
            self.is_abstract,
            fields.atomic_field_names.len(),
            fields.relationship_field_names.len()
        );

        Ok(Resource(Arc::new(ResourceDescriptor {
            type_name: self.type_name,
            resource_name,
            is_abstract: self.is_abstract,
            lineage,
            fields,
            meta_attribute_names: self.meta_attribute_names,
            identifier_meta_attribute_names: self.identifier_meta_attribute_names,
            link_factories: RwLock::new(self.link_factories),
        })))
    }
}
