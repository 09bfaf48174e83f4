//! Read-only access to the field metadata of a resource type.
//!
//! Each function accepts either a [`Resource`] or an [`Instance`] and returns
//! [`ResourceError::NotAResource`] for anything else.

use indexmap::{IndexMap, IndexSet};
use std::any::Any;

use crate::error::{ResourceError, Result};
use crate::model::{FieldType, Instance, Resource};

fn as_resource<T: Any>(object: &T) -> Result<&Resource> {
    let object = object as &dyn Any;
    if let Some(resource) = object.downcast_ref::<Resource>() {
        return Ok(resource);
    }
    if let Some(instance) = object.downcast_ref::<Instance>() {
        return Ok(instance.resource());
    }
    Err(ResourceError::NotAResource(
        std::any::type_name::<T>().to_string(),
    ))
}

/// Declared type of every field, inherited ones included.
pub fn fields_types<T: Any>(object: &T) -> Result<IndexMap<String, FieldType>> {
    Ok(as_resource(object)?.fields_by_name().clone())
}

pub fn relationships_names<T: Any>(object: &T) -> Result<IndexSet<String>> {
    Ok(as_resource(object)?.relationship_field_names().clone())
}

/// Atomic field names, `id` excluded.
pub fn attributes_names<T: Any>(object: &T) -> Result<IndexSet<String>> {
    Ok(as_resource(object)?
        .atomic_field_names()
        .iter()
        .filter(|name| name.as_str() != "id")
        .cloned()
        .collect())
}
