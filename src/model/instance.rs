use indexmap::IndexMap;
use serde_json::Value;
use std::borrow::Cow;

use crate::error::{ResourceError, Result};
use crate::logic::{Constructor, Dumper};
use crate::model::{is_reserved, DumpRequest, FieldType, Resource};

/// Value bound to one field of an instance.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Atomic value; `Value::Null` also stands for an empty relationship
    Value(Value),
    /// Single related instance
    One(Instance),
    /// Ordered related instances
    Many(Vec<Instance>),
}

impl FieldValue {
    pub fn null() -> Self {
        FieldValue::Value(Value::Null)
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            FieldValue::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Value(Value::Null))
    }

    /// Null or an empty collection
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Value(Value::Null) => true,
            FieldValue::Many(instances) => instances.is_empty(),
            _ => false,
        }
    }

    /// Whether this value may be bound to a field of the given type.
    /// Null fits every field; nullability is checked at dump time. Related
    /// instances must be of the declared target type or extend it.
    pub fn fits(&self, field_type: &FieldType) -> bool {
        match (self, field_type) {
            (FieldValue::Value(Value::Null), _) => true,
            (FieldValue::Value(_), FieldType::Atomic { .. }) => true,
            (
                FieldValue::One(related),
                FieldType::Relationship {
                    target,
                    many: false,
                    ..
                },
            ) => related.resource().is_kind_of(target),
            (
                FieldValue::Many(related),
                FieldType::Relationship {
                    target,
                    many: true,
                    ..
                },
            ) => related
                .iter()
                .all(|instance| instance.resource().is_kind_of(target)),
            _ => false,
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Value(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Value(Value::from(value))
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Value(Value::from(value))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Value(Value::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Value(Value::from(value))
    }
}

impl From<Instance> for FieldValue {
    fn from(instance: Instance) -> Self {
        FieldValue::One(instance)
    }
}

impl From<Option<Instance>> for FieldValue {
    fn from(instance: Option<Instance>) -> Self {
        instance.map_or_else(FieldValue::null, FieldValue::One)
    }
}

impl From<Vec<Instance>> for FieldValue {
    fn from(instances: Vec<Instance>) -> Self {
        FieldValue::Many(instances)
    }
}

/// A constructed object of a resource type.
///
/// Holds one value per supplied field plus any extra names the caller passed.
/// The field classification comes from the resource and never changes; values
/// can still be replaced through [`Instance::set`].
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    resource: Resource,
    values: IndexMap<String, FieldValue>,
}

impl Instance {
    /// Construct an instance, reporting every reserved name and every missing
    /// required field in one error.
    pub fn new<I, K, V>(resource: &Resource, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let values = values
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();
        let values = Constructor::validate(resource, values)?;
        Ok(Self {
            resource: resource.clone(),
            values,
        })
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Raw bound value, `None` when the name was never supplied.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Bound value, or the documented default for an unbound name: an empty
    /// list for to-many relationships, null otherwise.
    pub fn read(&self, name: &str) -> Cow<'_, FieldValue> {
        match self.values.get(name) {
            Some(value) => Cow::Borrowed(value),
            None if self.resource.field_type(name).is_some_and(FieldType::is_many) => {
                Cow::Owned(FieldValue::Many(Vec::new()))
            }
            None => Cow::Owned(FieldValue::null()),
        }
    }

    /// Atomic value of `name`, `None` when unbound or not atomic.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name).and_then(FieldValue::as_value)
    }

    /// The bound, non-null `id`.
    pub fn id(&self) -> Option<&Value> {
        self.value("id").filter(|id| !id.is_null())
    }

    /// Replace or add a value after construction.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Result<()> {
        let name = name.into();
        let value = value.into();
        if is_reserved(&name) {
            return Err(ResourceError::Construction(vec![format!(
                "This attribute name is reserved: '{}'.",
                name
            )]));
        }
        if let Some(field_type) = self.resource.field_type(&name) {
            if !value.fits(field_type) {
                return Err(ResourceError::Construction(vec![format!(
                    "Invalid value for '{}': expected {}.",
                    name,
                    field_type.kind()
                )]));
            }
        }
        self.values.insert(name, value);
        Ok(())
    }

    /// Unbind a value; reads fall back to the defaults of [`Instance::read`].
    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.values.shift_remove(name)
    }

    /// Names bound on this instance, in binding order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Dump as a JSON:API resource object with the default configuration.
    pub fn to_jsonapi_dict(&self, request: &DumpRequest) -> Result<Value> {
        Dumper::default().to_jsonapi_dict(self, request)
    }

    /// Dump as JSON text with the default configuration.
    pub fn dump(&self, request: &DumpRequest) -> Result<String> {
        Dumper::default().dump(self, request)
    }

    /// Dump and hand the result to a custom serializer.
    pub fn dump_with<F, E>(&self, request: &DumpRequest, serializer: F) -> Result<String>
    where
        F: FnOnce(&Value) -> std::result::Result<String, E>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Dumper::default().dump_with(self, request, serializer)
    }

    /// The `{type, id[, meta]}` identifier reference of this instance.
    pub fn identifier(&self) -> Result<Value> {
        Dumper::default().identifier(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn person() -> Resource {
        Resource::builder("Person")
            .field("id", FieldType::atomic())
            .field("name", FieldType::atomic())
            .field("nickname", FieldType::atomic().optional())
            .build()
            .unwrap()
    }

    fn team(person: &Resource) -> Resource {
        Resource::builder("Team")
            .field("id", FieldType::atomic())
            .field("leader", FieldType::to_one(person).optional())
            .field("members", FieldType::to_many(person).optional())
            .build()
            .unwrap()
    }

    #[test]
    fn test_read_defaults() {
        let person = person();
        let team = team(&person);
        let inst = team.instance([("id", json!(1))]).unwrap();

        assert!(inst.read("leader").is_null());
        assert_eq!(*inst.read("members"), FieldValue::Many(Vec::new()));
        assert!(inst.read("undeclared").is_null());
        assert!(inst.get("leader").is_none());
    }

    #[test]
    fn test_id_accessor() {
        let person = person();
        let mut guido = person
            .instance([("id", json!(1)), ("name", json!("Guido"))])
            .unwrap();
        assert_eq!(guido.id(), Some(&json!(1)));

        guido.set("id", Value::Null).unwrap();
        assert_eq!(guido.id(), None);

        guido.remove("id");
        assert_eq!(guido.id(), None);
    }

    #[test]
    fn test_set_rejects_reserved_and_mismatched_values() {
        let person = person();
        let team = team(&person);
        let mut inst = team.instance([("id", json!(1))]).unwrap();

        let err = inst.set("links", "nope").unwrap_err();
        assert_eq!(err.to_string(), "\n    This attribute name is reserved: 'links'.");

        let err = inst.set("leader", "not an instance").unwrap_err();
        assert_eq!(
            err.to_string(),
            "\n    Invalid value for 'leader': expected a single related instance."
        );

        let guido = person
            .instance([("id", json!(1)), ("name", json!("Guido"))])
            .unwrap();
        inst.set("leader", guido.clone()).unwrap();
        assert_eq!(inst.get("leader"), Some(&FieldValue::One(guido)));
    }

    #[test]
    fn test_related_instances_must_match_target() {
        let person = person();
        let team = team(&person);
        let captain = Resource::builder("Captain")
            .extends(&person)
            .build()
            .unwrap();

        let other_team = team.instance([("id", json!(2))]).unwrap();
        let err = team
            .instance([
                ("id", FieldValue::from(1i64)),
                ("leader", FieldValue::from(other_team.clone())),
            ])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "\n    Invalid value for 'leader': expected a single related instance."
        );

        let mut inst = team.instance([("id", json!(1))]).unwrap();
        let guido = person
            .instance([("id", json!(1)), ("name", json!("Guido"))])
            .unwrap();
        assert!(inst.set("members", vec![guido.clone(), other_team]).is_err());

        // derived types are accepted where the base type is declared
        let hook = captain
            .instance([("id", json!(7)), ("name", json!("Hook"))])
            .unwrap();
        inst.set("leader", hook).unwrap();
        inst.set("members", vec![guido]).unwrap();
    }

    #[test]
    fn test_field_value_conversions() {
        assert!(FieldValue::from(None::<Instance>).is_null());
        assert!(FieldValue::from(Vec::<Instance>::new()).is_empty());
        assert_eq!(FieldValue::from("x").as_value(), Some(&json!("x")));
        assert!(!FieldValue::from(3i64).is_empty());
    }
}
