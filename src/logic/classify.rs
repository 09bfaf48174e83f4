use indexmap::{IndexMap, IndexSet};

use crate::model::{is_structural, FieldType};

/// Result of merging and partitioning field declarations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldClassification {
    /// Every declared field, base declarations first
    pub fields_by_name: IndexMap<String, FieldType>,
    /// Fields exported as attributes (structural names excluded)
    pub atomic_field_names: IndexSet<String>,
    /// Fields referencing other resources
    pub relationship_field_names: IndexSet<String>,
}

pub struct FieldClassifier;

impl FieldClassifier {
    /// Merge per-type declarations ordered from the most-base ancestor to the
    /// most-derived type, then split the result into atomic and relationship
    /// fields. A later declaration of a name replaces the earlier type but keeps
    /// the position of the first declaration.
    pub fn classify<'a, I>(declarations: I) -> FieldClassification
    where
        I: IntoIterator<Item = &'a IndexMap<String, FieldType>>,
    {
        let mut fields_by_name: IndexMap<String, FieldType> = IndexMap::new();
        for declaration in declarations {
            for (name, field_type) in declaration {
                fields_by_name.insert(name.clone(), field_type.clone());
            }
        }

        let relationship_field_names: IndexSet<String> = fields_by_name
            .iter()
            .filter(|(_, field_type)| field_type.is_relationship())
            .map(|(name, _)| name.clone())
            .collect();

        let atomic_field_names: IndexSet<String> = fields_by_name
            .iter()
            .filter(|(name, field_type)| !field_type.is_relationship() && !is_structural(name))
            .map(|(name, _)| name.clone())
            .collect();

        FieldClassification {
            fields_by_name,
            atomic_field_names,
            relationship_field_names,
        }
    }
}
