use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::logic::Dumper;
use crate::model::{DumpRequest, Instance};

/// Primary data of a document.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentData {
    Single(Instance),
    Many(Vec<Instance>),
}

impl From<Instance> for DocumentData {
    fn from(instance: Instance) -> Self {
        DocumentData::Single(instance)
    }
}

impl From<Vec<Instance>> for DocumentData {
    fn from(instances: Vec<Instance>) -> Self {
        DocumentData::Many(instances)
    }
}

/// Top-level JSON:API document wrapping one or many resource objects that
/// are all dumped with the same request.
#[derive(Debug, Clone)]
pub struct Document {
    data: DocumentData,
    request: DumpRequest,
    links: IndexMap<String, String>,
    meta: Map<String, Value>,
}

impl Document {
    pub fn new(data: impl Into<DocumentData>, request: DumpRequest) -> Self {
        Self {
            data: data.into(),
            request,
            links: IndexMap::new(),
            meta: Map::new(),
        }
    }

    /// Add a document-level link.
    pub fn link(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.links.insert(name.into(), url.into());
        self
    }

    pub fn meta(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(name.into(), value.into());
        self
    }

    pub fn data(&self) -> &DocumentData {
        &self.data
    }

    pub fn request(&self) -> &DumpRequest {
        &self.request
    }

    pub fn to_jsonapi_dict(&self) -> Result<Value> {
        self.to_jsonapi_dict_with(&Dumper::default())
    }

    /// `{"data": ..., "links"?: ..., "meta"?: ...}`; the first failing
    /// resource aborts the whole document.
    pub fn to_jsonapi_dict_with(&self, dumper: &Dumper) -> Result<Value> {
        let data = match &self.data {
            DocumentData::Single(instance) => dumper.to_jsonapi_dict(instance, &self.request)?,
            DocumentData::Many(instances) => Value::Array(
                instances
                    .iter()
                    .map(|instance| dumper.to_jsonapi_dict(instance, &self.request))
                    .collect::<Result<Vec<_>>>()?,
            ),
        };

        let mut document = Map::new();
        document.insert("data".to_string(), data);
        if !self.links.is_empty() {
            let links = self
                .links
                .iter()
                .map(|(name, url)| (name.clone(), Value::String(url.clone())))
                .collect();
            document.insert("links".to_string(), Value::Object(links));
        }
        if !self.meta.is_empty() {
            document.insert("meta".to_string(), Value::Object(self.meta.clone()));
        }
        Ok(Value::Object(document))
    }

    pub fn dump(&self) -> Result<String> {
        let dumper = Dumper::default();
        let document = self.to_jsonapi_dict_with(&dumper)?;
        dumper.to_text(&document)
    }
}
