//! Dump typed resources as [JSON:API](https://jsonapi.org/) resource objects.
//!
//! Declare a resource type once with [`Resource::builder`], construct
//! [`Instance`]s from named values, then dump them with a [`DumpRequest`]
//! describing the attributes, links and relationships to export:
//!
//! ```
//! use jsonapi_resources::{DumpRequest, FieldType, Resource};
//! use serde_json::json;
//!
//! let person = Resource::builder("Person")
//!     .field("id", FieldType::atomic())
//!     .field("first_name", FieldType::atomic())
//!     .field("last_name", FieldType::atomic())
//!     .resource_name("person")
//!     .build()?;
//! person.register_link_factory("self", |params| {
//!     format!("http://my.api/persons/{}", params.display("id"))
//! })?;
//!
//! let guido = person.instance([
//!     ("id", json!(1)),
//!     ("first_name", json!("Guido")),
//!     ("last_name", json!("Van Rossum")),
//! ])?;
//!
//! let dumped = guido.to_jsonapi_dict(&DumpRequest::only(["first_name"]).id_link("self"))?;
//! assert_eq!(
//!     dumped,
//!     json!({
//!         "type": "person",
//!         "id": 1,
//!         "attributes": {"firstName": "Guido"},
//!         "links": {"self": "http://my.api/persons/1"}
//!     })
//! );
//! # Ok::<(), jsonapi_resources::ResourceError>(())
//! ```
//!
//! Relationship links are registered under `<relationship>__<link>` and
//! requested through [`RelationshipRequest`]. Output keys are camel-cased
//! unless [`DumpConfig::camel_case`] is turned off.

pub mod config;
pub mod error;
pub mod logic;
pub mod model;

// Export configuration and errors
pub use config::DumpConfig;
pub use error::{ResourceError, Result};

// Export logic types
pub use logic::introspect::{attributes_names, fields_types, relationships_names};
pub use logic::{Dumper, FieldClassification, FieldClassifier};

// Export all model types
pub use model::*;
