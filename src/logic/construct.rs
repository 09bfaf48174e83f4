use indexmap::IndexMap;

use crate::error::{ResourceError, Result};
use crate::model::{is_reserved, FieldValue, Resource};

pub struct Constructor;

impl Constructor {
    /// Check the named values supplied for a new instance and bind the
    /// defaults of omitted fields.
    ///
    /// Reserved names come first, then missing required fields, then values
    /// whose shape does not match the declaration; all of them end up in a
    /// single error.
    pub fn validate(
        resource: &Resource,
        mut values: IndexMap<String, FieldValue>,
    ) -> Result<IndexMap<String, FieldValue>> {
        let mut errors: Vec<String> = values
            .keys()
            .filter(|name| is_reserved(name))
            .map(|name| format!("This attribute name is reserved: '{}'.", name))
            .collect();

        errors.extend(
            resource
                .fields_by_name()
                .iter()
                .filter(|(name, field_type)| {
                    field_type.is_required() && !values.contains_key(name.as_str())
                })
                .map(|(name, _)| format!("Missing argument: '{}'.", name)),
        );

        errors.extend(values.iter().filter_map(|(name, value)| {
            let field_type = resource.field_type(name)?;
            (!value.fits(field_type)).then(|| {
                format!(
                    "Invalid value for '{}': expected {}.",
                    name,
                    field_type.kind()
                )
            })
        }));

        if !errors.is_empty() {
            log::debug!(
                "Rejected construction of '{}': {} error(s)",
                resource.type_name(),
                errors.len()
            );
            return Err(ResourceError::Construction(errors));
        }

        for (name, field_type) in resource.fields_by_name() {
            if let Some(default) = field_type.default_value() {
                values
                    .entry(name.clone())
                    .or_insert_with(|| FieldValue::Value(default.clone()));
            }
        }

        log::debug!(
            "Constructed '{}' instance with {} value(s)",
            resource.type_name(),
            values.len()
        );
        Ok(values)
    }
}
