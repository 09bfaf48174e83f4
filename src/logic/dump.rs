use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value};

use crate::config::DumpConfig;
use crate::error::{ResourceError, Result};
use crate::model::{
    qualified_link_name, FieldValue, Instance, LinkArgs, LinkFactory, LinkRequest,
    RelationshipRequest, RequiredAttributes, Resource, DumpRequest, IDENTIFIER_NAMES, META_MARKER,
};

/// How a validated link gets its final value.
enum LinkSource<'a> {
    Factory(LinkFactory, &'a LinkArgs),
    Url(&'a str),
}

/// Turns instances into JSON:API resource objects.
///
/// Every dump validates the whole request before assembling anything, so a
/// failing request never yields partial output.
#[derive(Debug, Clone, Default)]
pub struct Dumper {
    config: DumpConfig,
}

impl Dumper {
    pub fn new(config: DumpConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DumpConfig {
        &self.config
    }

    /// Build the resource object: `type`, `id`, then `attributes`,
    /// `relationships`, `links` and `meta` when they are not empty.
    pub fn to_jsonapi_dict(&self, instance: &Instance, request: &DumpRequest) -> Result<Value> {
        let resource = instance.resource();
        let id = Self::require_id(instance)?;

        log::debug!(
            "Dumping '{}' instance {} ({} link(s), {} relationship(s))",
            resource.type_name(),
            id,
            request.links.len(),
            request.relationships.len()
        );

        let mut data = Map::new();
        data.insert(
            "type".to_string(),
            Value::String(resource.resource_name().to_string()),
        );
        data.insert("id".to_string(), id.clone());

        let (attributes, meta) = self.filtered_attributes(instance, &request.attributes)?;
        if !attributes.is_empty() {
            data.insert("attributes".to_string(), Value::Object(attributes));
        }

        if !request.relationships.is_empty() {
            Self::validate_relationships(resource, &request.relationships)?;
            let relationships = self.formatted_relationships(instance, &request.relationships)?;
            data.insert("relationships".to_string(), Value::Object(relationships));
        }

        if !request.links.is_empty() {
            let links = Self::resolved_links(instance, &request.links, None)?;
            data.insert("links".to_string(), Value::Object(links));
        }

        if let Some(meta) = meta.filter(|meta| !meta.is_empty()) {
            data.insert("meta".to_string(), Value::Object(meta));
        }

        Ok(Value::Object(data))
    }

    /// Dump to text with `serde_json`, indented when the config asks for it.
    pub fn dump(&self, instance: &Instance, request: &DumpRequest) -> Result<String> {
        let data = self.to_jsonapi_dict(instance, request)?;
        self.to_text(&data)
    }

    /// Dump to text with a caller-supplied serializer. Its error is kept as
    /// the source of [`ResourceError::Serializer`].
    pub fn dump_with<F, E>(
        &self,
        instance: &Instance,
        request: &DumpRequest,
        serializer: F,
    ) -> Result<String>
    where
        F: FnOnce(&Value) -> std::result::Result<String, E>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let data = self.to_jsonapi_dict(instance, request)?;
        serializer(&data).map_err(|err| ResourceError::Serializer(Box::new(err)))
    }

    /// Default serializer
    pub fn to_text(&self, value: &Value) -> Result<String> {
        let text = if self.config.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(text)
    }

    /// The identifier reference of an instance: `type`, `id`, and `meta` built
    /// from the identifier meta attributes (raw names, missing as null).
    pub fn identifier(&self, instance: &Instance) -> Result<Value> {
        let resource = instance.resource();
        let id = Self::require_id(instance)?;

        let mut identifier = Map::new();
        identifier.insert(
            "type".to_string(),
            Value::String(resource.resource_name().to_string()),
        );
        identifier.insert("id".to_string(), id.clone());

        let meta_names = resource.identifier_meta_attribute_names();
        if !meta_names.is_empty() {
            let meta: Map<String, Value> = meta_names
                .iter()
                .map(|name| {
                    let value = instance.value(name).cloned().unwrap_or(Value::Null);
                    (name.clone(), value)
                })
                .collect();
            identifier.insert("meta".to_string(), Value::Object(meta));
        }

        Ok(Value::Object(identifier))
    }

    fn require_id(instance: &Instance) -> Result<&Value> {
        instance
            .id()
            .ok_or_else(|| ResourceError::NoIdentity(instance.resource().type_name().to_string()))
    }

    /// Validate the requested attribute names and build the `attributes`
    /// object, plus the `meta` object when `meta` was requested.
    fn filtered_attributes(
        &self,
        instance: &Instance,
        required: &RequiredAttributes,
    ) -> Result<(Map<String, Value>, Option<Map<String, Value>>)> {
        let resource = instance.resource();
        let requested: IndexSet<&str> = match required {
            RequiredAttributes::All => resource
                .atomic_field_names()
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(META_MARKER))
                .collect(),
            RequiredAttributes::Only(names) => names.iter().map(String::as_str).collect(),
        };

        let mut errors = Vec::new();
        for name in requested.iter().filter(|name| **name != META_MARKER) {
            if !resource.atomic_field_names().contains(*name) {
                errors.push(format!("Unexpected required attribute: '{}'.", name));
                continue;
            }
            let optional = resource
                .field_type(name)
                .map(|field_type| field_type.is_optional())
                .unwrap_or(false);
            if instance.read(name).is_null() && !optional {
                errors.push(format!("Missing required attribute: '{}'.", name));
            }
        }
        if !errors.is_empty() {
            return Err(ResourceError::AttributeFilter(errors));
        }

        // Null optional fields are exported only when named explicitly
        let keep_nulls = matches!(required, RequiredAttributes::Only(_));
        let attributes: Map<String, Value> = requested
            .iter()
            .filter(|name| **name != META_MARKER && !IDENTIFIER_NAMES.contains(*name))
            .filter_map(|name| {
                let value = instance.value(name).cloned().unwrap_or(Value::Null);
                if value.is_null() && !keep_nulls {
                    log::trace!("Skipping null attribute '{}'", name);
                    return None;
                }
                log::trace!("Exporting attribute '{}'", name);
                Some((self.config.export_key(name), value))
            })
            .collect();

        let meta = requested.contains(META_MARKER).then(|| {
            resource
                .meta_attribute_names()
                .iter()
                .filter_map(|name| {
                    let value = instance.value(name).filter(|value| !value.is_null())?;
                    Some((self.config.export_key(name), value.clone()))
                })
                .collect::<Map<String, Value>>()
        });

        Ok((attributes, meta))
    }

    /// Every requested relationship must exist and ask for `data` or `links`.
    fn validate_relationships(
        resource: &Resource,
        relationships: &IndexMap<String, RelationshipRequest>,
    ) -> Result<()> {
        let mut errors = Vec::new();
        for (name, request) in relationships {
            if !resource.relationship_field_names().contains(name) {
                errors.push(format!("'{}' is not a valid relationship.", name));
            }
            if request.is_empty() {
                errors.push(format!(
                    "You must provide at least links or data for the '{}' relationship.",
                    name
                ));
            }
        }
        if !errors.is_empty() {
            return Err(ResourceError::RelationshipValidation(errors));
        }
        Ok(())
    }

    fn formatted_relationships(
        &self,
        instance: &Instance,
        relationships: &IndexMap<String, RelationshipRequest>,
    ) -> Result<Map<String, Value>> {
        let resource = instance.resource();
        let mut formatted = Map::new();

        for (name, request) in relationships {
            let key = self.config.export_key(name);
            let many = resource
                .field_type(name)
                .map(|field_type| field_type.is_many())
                .unwrap_or(false);
            let related = instance.read(name);

            if related.is_empty() {
                log::debug!(
                    "Relationship '{}' of '{}' is empty",
                    name,
                    resource.type_name()
                );
                let empty = if many { Value::Array(Vec::new()) } else { Value::Null };
                formatted.insert(key, empty);
                continue;
            }

            let mut relationship = Map::new();
            if request.data {
                let data = match &*related {
                    FieldValue::One(related) => self.identifier(related)?,
                    FieldValue::Many(related) => Value::Array(
                        related
                            .iter()
                            .map(|related| self.identifier(related))
                            .collect::<Result<Vec<_>>>()?,
                    ),
                    // construction and `set` only bind instances here
                    FieldValue::Value(_) => {
                        return Err(ResourceError::RelationshipValidation(vec![format!(
                            "'{}' does not hold related instances.",
                            name
                        )]))
                    }
                };
                relationship.insert("data".to_string(), data);
            }
            if !request.links.is_empty() {
                let links = Self::resolved_links(instance, &request.links, Some(name.as_str()))?;
                relationship.insert("links".to_string(), Value::Object(links));
            }
            formatted.insert(key, Value::Object(relationship));
        }

        Ok(formatted)
    }

    /// Validate every requested link against the factory table, then build
    /// them. Factories are looked up under `<relationship>__<link>` when
    /// `relationship` is given.
    fn resolved_links(
        instance: &Instance,
        links: &IndexMap<String, LinkRequest>,
        relationship: Option<&str>,
    ) -> Result<Map<String, Value>> {
        let resource = instance.resource();
        let mut errors = Vec::new();
        let mut sources = Vec::with_capacity(links.len());

        for (name, request) in links {
            let qualified = qualified_link_name(name, relationship);
            match (resource.link_factory(&qualified), request) {
                (Some(factory), LinkRequest::Params(args)) => {
                    sources.push((name, LinkSource::Factory(factory, args)))
                }
                (Some(_), _) => errors.push(format!(
                    "The '{}' link factory requires parameters.",
                    qualified
                )),
                (None, LinkRequest::Url(url)) => sources.push((name, LinkSource::Url(url))),
                (None, LinkRequest::Name) => {
                    errors.push(format!("'{}' is not a registered link name.", qualified))
                }
                (None, LinkRequest::Params(_)) => errors.push(format!(
                    "The '{}' link must be a string when no factory is registered.",
                    qualified
                )),
            }
        }
        if !errors.is_empty() {
            return Err(ResourceError::LinkResolution(errors));
        }

        Ok(sources
            .into_iter()
            .map(|(name, source)| {
                let link = match source {
                    LinkSource::Factory(factory, args) => factory(&args.resolve(instance)),
                    LinkSource::Url(url) => url.to_string(),
                };
                (name.clone(), Value::String(link))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldType;
    use serde_json::json;

    fn person() -> Resource {
        Resource::builder("Person")
            .field("id", FieldType::atomic())
            .field("first_name", FieldType::atomic())
            .field("last_name", FieldType::atomic())
            .field("nickname", FieldType::atomic().optional())
            .meta_attributes(["created_at", "revision"])
            .build()
            .unwrap()
    }

    fn guido(person: &Resource) -> Instance {
        person
            .instance([
                ("id", json!(1)),
                ("first_name", json!("Guido")),
                ("last_name", json!("Van Rossum")),
                ("created_at", json!("2021-01-01")),
            ])
            .unwrap()
    }

    #[test]
    fn test_all_attributes_with_meta() {
        let person = person();
        let dumped = guido(&person).to_jsonapi_dict(&DumpRequest::all()).unwrap();

        assert_eq!(
            dumped,
            json!({
                "type": "Person",
                "id": 1,
                "attributes": {
                    "firstName": "Guido",
                    "lastName": "Van Rossum"
                },
                "meta": {"createdAt": "2021-01-01"}
            })
        );
    }

    #[test]
    fn test_null_optional_attributes() {
        let reduced = Resource::builder("Person")
            .field("id", FieldType::atomic())
            .field("nickname", FieldType::atomic().optional())
            .build()
            .unwrap();
        let inst = reduced.instance([("id", json!(1))]).unwrap();

        let dumped = inst.to_jsonapi_dict(&DumpRequest::all()).unwrap();
        assert_eq!(dumped, json!({"type": "Person", "id": 1}));
        assert!(dumped.get("attributes").is_none());

        let dumped = inst
            .to_jsonapi_dict(&DumpRequest::only(["nickname"]))
            .unwrap();
        assert_eq!(dumped["attributes"], json!({"nickname": null}));
    }

    #[test]
    fn test_custom_serializer_error_kept() {
        let person = person();
        let err = Dumper::default()
            .dump_with(&guido(&person), &DumpRequest::all(), |_| {
                Err::<String, _>(std::fmt::Error)
            })
            .unwrap_err();

        assert!(matches!(err, ResourceError::Serializer(_)));
        assert_eq!(
            err.to_string(),
            "Serializer failed: an error occurred when formatting an argument"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_meta_only_when_requested() {
        let person = person();
        let dumped = guido(&person)
            .to_jsonapi_dict(&DumpRequest::only(["first_name"]))
            .unwrap();
        assert!(dumped.get("meta").is_none());

        let dumped = guido(&person)
            .to_jsonapi_dict(&DumpRequest::only(["meta"]))
            .unwrap();
        assert_eq!(
            dumped,
            json!({"type": "Person", "id": 1, "meta": {"createdAt": "2021-01-01"}})
        );
    }

    #[test]
    fn test_key_order() {
        let person = person();
        person
            .register_link_factory("self", |params| {
                format!("http://my.api/persons/{}", params.display("id"))
            })
            .unwrap();
        let dumped = guido(&person)
            .to_jsonapi_dict(&DumpRequest::all().id_link("self"))
            .unwrap();

        let keys: Vec<&str> = dumped
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["type", "id", "attributes", "links", "meta"]);
    }

    #[test]
    fn test_camel_case_can_be_disabled() {
        let person = person();
        let dumper = Dumper::new(DumpConfig {
            camel_case: false,
            ..DumpConfig::default()
        });
        let dumped = dumper
            .to_jsonapi_dict(&guido(&person), &DumpRequest::only(["first_name", "meta"]))
            .unwrap();

        assert_eq!(
            dumped,
            json!({
                "type": "Person",
                "id": 1,
                "attributes": {"first_name": "Guido"},
                "meta": {"created_at": "2021-01-01"}
            })
        );
    }

    #[test]
    fn test_unexpected_and_missing_aggregated() {
        let person = person();
        let mut inst = guido(&person);
        inst.set("last_name", Value::Null).unwrap();

        let err = inst
            .to_jsonapi_dict(&DumpRequest::only(["invalid", "last_name", "nickname"]))
            .unwrap_err();

        assert!(matches!(err, ResourceError::AttributeFilter(_)));
        assert_eq!(
            err.to_string(),
            "\n    Unexpected required attribute: 'invalid'.\n    Missing required attribute: 'last_name'."
        );
    }

    #[test]
    fn test_identity_checked_first() {
        let person = person();
        let mut inst = guido(&person);
        inst.remove("id");

        let err = inst
            .to_jsonapi_dict(&DumpRequest::only(["invalid"]))
            .unwrap_err();
        assert_eq!(err.to_string(), "This 'Person' object has no id.");
    }

    #[test]
    fn test_idempotent() {
        let person = person();
        let inst = guido(&person);
        let request = DumpRequest::all();
        assert_eq!(
            inst.to_jsonapi_dict(&request).unwrap(),
            inst.to_jsonapi_dict(&request).unwrap()
        );
    }

    #[test]
    fn test_pretty_text() {
        let person = person();
        let dumper = Dumper::new(DumpConfig {
            pretty: true,
            ..DumpConfig::default()
        });
        let text = dumper
            .dump(&guido(&person), &DumpRequest::only(["first_name"]))
            .unwrap();
        assert!(text.contains('\n'));
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["attributes"]["firstName"], json!("Guido"));
    }

    #[test]
    fn test_link_errors_aggregated() {
        let person = person();
        person
            .register_link_factory("self", |params| params.display("id"))
            .unwrap();

        let request = DumpRequest::all()
            .link("self", "http://literal")
            .link("bogus", LinkRequest::Name)
            .link("other", LinkArgs::id());
        let err = guido(&person).to_jsonapi_dict(&request).unwrap_err();

        assert_eq!(
            err.lines(),
            &[
                "The 'self' link factory requires parameters.".to_string(),
                "'bogus' is not a registered link name.".to_string(),
                "The 'other' link must be a string when no factory is registered.".to_string(),
            ]
        );
    }

    #[test]
    fn test_computed_link_arguments() {
        let person = person();
        person
            .register_link_factory("search", |params| {
                format!(
                    "http://my.api/search?q={}&page={}",
                    params.display("q"),
                    params.display("page")
                )
            })
            .unwrap();

        let args = LinkArgs::new()
            .computed("q", |instance| {
                instance.value("last_name").cloned().unwrap_or(Value::Null)
            })
            .arg("page", 2i64);
        let dumped = guido(&person)
            .to_jsonapi_dict(&DumpRequest::only(Vec::<String>::new()).link("search", args))
            .unwrap();

        assert_eq!(
            dumped,
            json!({
                "type": "Person",
                "id": 1,
                "links": {"search": "http://my.api/search?q=Van Rossum&page=2"}
            })
        );
    }
}
