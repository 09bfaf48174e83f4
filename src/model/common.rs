use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::Resource;

/// Names that structure a JSON:API resource object and can never be fields.
pub const STRUCTURAL_NAMES: &[&str] = &["type", "links", "relationships"];

/// Members of the identifier object; never exported under `attributes`.
pub const IDENTIFIER_NAMES: &[&str] = &["type", "id"];

/// Names already bound by the resource contract itself.
pub const CONTRACT_MEMBERS: &[&str] = &[
    "jsonapi_dict",
    "to_jsonapi_dict",
    "dump",
    "dump_with",
    "register_link_factory",
    "resource",
];

/// Request marker asking for the `meta` object.
pub const META_MARKER: &str = "meta";

/// Separator between a relationship name and a link name.
pub const LINK_QUALIFIER: &str = "__";

pub fn is_structural(name: &str) -> bool {
    STRUCTURAL_NAMES.contains(&name)
}

pub fn is_reserved(name: &str) -> bool {
    is_structural(name) || CONTRACT_MEMBERS.contains(&name)
}

/// Convert a snake_case string into camelCase.
///
/// The first segment is kept as is, every following segment is capitalized
/// (first letter upper, rest lower). The input is not checked to be snake case.
pub fn snake_to_camel_case(text: &str) -> String {
    let mut segments = text.split('_');
    let mut camel = segments.next().unwrap_or_default().to_string();
    for segment in segments {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            camel.extend(first.to_uppercase());
            camel.push_str(&chars.as_str().to_lowercase());
        }
    }
    camel
}

/// Declared type of a resource field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldType {
    /// Plain value exported under `attributes`
    Atomic {
        optional: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        default: Option<Value>,
    },
    /// Reference to one or many instances of another resource type
    Relationship {
        /// Declared name of the target resource type
        target: String,
        many: bool,
        optional: bool,
    },
}

impl FieldType {
    pub fn atomic() -> Self {
        FieldType::Atomic {
            optional: false,
            default: None,
        }
    }

    pub fn to_one(target: &Resource) -> Self {
        FieldType::Relationship {
            target: target.type_name().to_string(),
            many: false,
            optional: false,
        }
    }

    pub fn to_many(target: &Resource) -> Self {
        FieldType::Relationship {
            target: target.type_name().to_string(),
            many: true,
            optional: false,
        }
    }

    /// Mark the field as nullable.
    pub fn optional(self) -> Self {
        match self {
            FieldType::Atomic { default, .. } => FieldType::Atomic {
                optional: true,
                default,
            },
            FieldType::Relationship { target, many, .. } => FieldType::Relationship {
                target,
                many,
                optional: true,
            },
        }
    }

    /// Value bound at construction when the caller omits the field.
    ///
    /// Relationships take no default: on a relationship field this returns
    /// the field unchanged, still required unless marked optional.
    pub fn with_default(self, value: impl Into<Value>) -> Self {
        match self {
            FieldType::Atomic { optional, .. } => FieldType::Atomic {
                optional,
                default: Some(value.into()),
            },
            relationship => relationship,
        }
    }

    pub fn is_relationship(&self) -> bool {
        matches!(self, FieldType::Relationship { .. })
    }

    pub fn is_optional(&self) -> bool {
        match self {
            FieldType::Atomic { optional, .. } | FieldType::Relationship { optional, .. } => {
                *optional
            }
        }
    }

    pub fn is_many(&self) -> bool {
        matches!(self, FieldType::Relationship { many: true, .. })
    }

    pub fn default_value(&self) -> Option<&Value> {
        match self {
            FieldType::Atomic { default, .. } => default.as_ref(),
            FieldType::Relationship { .. } => None,
        }
    }

    /// Whether construction must receive a value for this field
    pub fn is_required(&self) -> bool {
        !self.is_optional() && self.default_value().is_none()
    }

    /// Short description used in construction errors
    pub fn kind(&self) -> &'static str {
        match self {
            FieldType::Atomic { .. } => "a value",
            FieldType::Relationship { many: false, .. } => "a single related instance",
            FieldType::Relationship { many: true, .. } => "a list of related instances",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_to_camel_case() {
        assert_eq!(snake_to_camel_case("already_snake"), "alreadySnake");
        assert_eq!(snake_to_camel_case("birth_date"), "birthDate");
        assert_eq!(snake_to_camel_case("name"), "name");
        assert_eq!(snake_to_camel_case("a_long_field_name"), "aLongFieldName");
        assert_eq!(snake_to_camel_case("camelCase"), "camelCase");
        assert_eq!(snake_to_camel_case(""), "");
    }

    #[test]
    fn test_segments_are_capitalized() {
        assert_eq!(snake_to_camel_case("foo_BAR"), "fooBar");
        assert_eq!(snake_to_camel_case("double__underscore"), "doubleUnderscore");
    }

    #[test]
    fn test_field_type_flags() {
        let required = FieldType::atomic();
        assert!(required.is_required());
        assert!(!required.is_relationship());

        let optional = FieldType::atomic().optional();
        assert!(optional.is_optional());
        assert!(!optional.is_required());

        let defaulted = FieldType::atomic().with_default("Default");
        assert!(!defaulted.is_optional());
        assert!(!defaulted.is_required());
        assert_eq!(defaulted.default_value(), Some(&Value::from("Default")));
    }

    #[test]
    fn test_relationship_ignores_default() {
        let target = Resource::builder("Target")
            .field("id", FieldType::atomic())
            .build()
            .unwrap();

        let related = FieldType::to_one(&target).with_default("ignored");
        assert_eq!(related, FieldType::to_one(&target));
        assert_eq!(related.default_value(), None);
        assert!(related.is_required());
    }

    #[test]
    fn test_reserved_names() {
        assert!(is_reserved("type"));
        assert!(is_reserved("links"));
        assert!(is_reserved("jsonapi_dict"));
        assert!(!is_reserved("id"));
        assert!(!is_reserved("name"));
    }
}
