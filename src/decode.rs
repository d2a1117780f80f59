//! Document disassembly: reconstructing domain objects from a parsed
//! document, resolving relationship linkages against included resources.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::config::CodecConfig;
use crate::document::{Document, PrimaryData};
use crate::error::DecodeError;
use crate::relationship::{Linkage, RelationshipData};
use crate::resource::Resource;
use crate::types::ResourceId;

/// Reconstructs a single domain object from a document tree.
///
/// `data` must be a single resource or a one-element array; `null` or any
/// other cardinality is a shape error. Relationship linkages with a
/// matching `included` resource are attached under the relationship's
/// name; the host type picks them up where it has a matching member and
/// serde ignores the rest. Unresolved references are left dangling.
pub fn from_document<T: DeserializeOwned>(
    document: &Value,
    config: &CodecConfig,
) -> Result<T, DecodeError> {
    let document = Document::from_value(document)?;
    let resource = match &document.data {
        PrimaryData::One(resource) => resource,
        PrimaryData::Many(resources) => {
            if resources.len() != 1 {
                return Err(DecodeError::ExpectedSingle {
                    count: resources.len(),
                });
            }
            &resources[0]
        }
        PrimaryData::Null => return Err(DecodeError::ExpectedResource { actual: "null" }),
    };
    let index = index_included(&document.included);
    rebuild(resource, &index, config)
}

/// Reconstructs a collection of domain objects from a document tree.
///
/// `data` must be an array; `null` and single-resource documents are shape
/// errors rather than being wrapped.
pub fn from_document_collection<T: DeserializeOwned>(
    document: &Value,
    config: &CodecConfig,
) -> Result<Vec<T>, DecodeError> {
    let document = Document::from_value(document)?;
    let resources = match &document.data {
        PrimaryData::Many(resources) => resources,
        PrimaryData::One(_) => {
            return Err(DecodeError::ExpectedCollection {
                actual: "a single resource",
            })
        }
        PrimaryData::Null => return Err(DecodeError::ExpectedCollection { actual: "null" }),
    };
    let index = index_included(&document.included);
    resources
        .iter()
        .map(|resource| rebuild(resource, &index, config))
        .collect()
}

fn index_included(included: &[Resource]) -> HashMap<ResourceId, &Resource> {
    let mut index = HashMap::with_capacity(included.len());
    for resource in included {
        // First occurrence wins, matching encode-side dedup.
        index.entry(resource.identity.clone()).or_insert(resource);
    }
    index
}

fn rebuild<T: DeserializeOwned>(
    resource: &Resource,
    index: &HashMap<ResourceId, &Resource>,
    config: &CodecConfig,
) -> Result<T, DecodeError> {
    let map = object_of(resource, index, config, true);
    serde_json::from_value(Value::Object(map)).map_err(|source| DecodeError::Deserialize {
        ty: resource.identity.ty.clone(),
        id: resource.identity.id.clone(),
        source,
    })
}

/// Attribute map of a resource with the identity member re-inserted and,
/// when `resolve` is set, relationship members attached from the included
/// index. Linked resources are rebuilt one level deep.
fn object_of(
    resource: &Resource,
    index: &HashMap<ResourceId, &Resource>,
    config: &CodecConfig,
    resolve: bool,
) -> Map<String, Value> {
    let mut map = resource.attributes.clone();
    if !resource.identity.id.is_empty() && !map.contains_key(config.id_member_name()) {
        map.insert(
            config.id_member_name().to_string(),
            Value::String(resource.identity.id.clone()),
        );
    }
    if !resolve {
        return map;
    }
    for (name, rel) in &resource.relationships {
        match rel.data() {
            RelationshipData::Absent => {}
            RelationshipData::Null => {
                map.insert(name.clone(), Value::Null);
            }
            RelationshipData::One(linkage) => {
                if let Some(resolved) = resolve_linkage(linkage, index, config) {
                    map.insert(name.clone(), resolved);
                }
            }
            RelationshipData::Many(linkages) => {
                let resolved: Vec<Value> = linkages
                    .iter()
                    .filter_map(|l| resolve_linkage(l, index, config))
                    .collect();
                // An empty linkage list means an empty collection; a list
                // whose references all dangle is left unresolved instead.
                if linkages.is_empty() || !resolved.is_empty() {
                    map.insert(name.clone(), Value::Array(resolved));
                }
            }
        }
    }
    map
}

fn resolve_linkage(
    linkage: &Linkage,
    index: &HashMap<ResourceId, &Resource>,
    config: &CodecConfig,
) -> Option<Value> {
    let id = linkage.resource()?;
    let resource = index.get(id)?;
    Some(Value::Object(object_of(resource, index, config, false)))
}
