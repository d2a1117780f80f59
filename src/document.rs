//! Document assembly: wrapping resources, included, links, and meta into
//! the top-level JSON:API document shape.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::config::CodecConfig;
use crate::error::{DecodeError, EncodeError};
use crate::fields::SparseFieldsets;
use crate::resource::{extract_resource, Content, Resource, ResourceModel};
use crate::types::{json_type_name, Links, Meta, ResourceId, PAGE_META_KEY};

/// Top-level `data` of a document.
///
/// `Null` is not the same as an empty collection: a single-entity call with
/// no entity renders `"data": null`, while an empty collection renders
/// `"data": []`.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimaryData {
    Null,
    One(Resource),
    Many(Vec<Resource>),
}

/// A fully assembled document, one step before rendering.
///
/// `included` is deduplicated by `(type, id)` with the first occurrence
/// winning. Decoration methods are immutable-builder style.
#[derive(Debug, Clone)]
pub struct Document {
    pub data: PrimaryData,
    pub included: Vec<Resource>,
    pub links: Links,
    pub meta: Meta,
    pub jsonapi_version: Option<String>,
}

impl Document {
    /// Assembles a document from wrapped content.
    ///
    /// Pagination meta of page-aware content lands under the reserved
    /// `"page"` meta key; [`Document::with_meta`] afterwards lets explicit
    /// keys win over generated ones. For a single primary resource the
    /// model's links render at the document level, not on the resource.
    pub fn assemble(
        content: &Content,
        config: &CodecConfig,
        fieldsets: Option<&SparseFieldsets>,
    ) -> Result<Self, EncodeError> {
        let mut document = Self {
            data: PrimaryData::Null,
            included: Vec::new(),
            links: Links::new(),
            meta: Meta::new(),
            jsonapi_version: config
                .version_rendered()
                .then(|| config.version().to_string()),
        };

        match content {
            Content::Single(None) => {}
            Content::Single(Some(model)) => {
                if let Some(mut resource) = extract_resource(model, true, config, fieldsets)? {
                    document.links = std::mem::take(&mut resource.links);
                    document.data = PrimaryData::One(resource);
                } else {
                    document.links = model.links.clone();
                }
                collect_included(model, config, fieldsets, &mut document.included)?;
            }
            Content::Collection(models) | Content::Page(models, _) => {
                let mut resources = Vec::new();
                for model in models {
                    if let Some(resource) = extract_resource(model, true, config, fieldsets)? {
                        resources.push(resource);
                    }
                    collect_included(model, config, fieldsets, &mut document.included)?;
                }
                document.data = PrimaryData::Many(resources);
                if let Content::Page(_, page) = content {
                    document
                        .meta
                        .insert(PAGE_META_KEY.to_string(), Value::Object(page.to_meta()));
                }
            }
        }

        dedup_by_identity(&mut document.included);
        Ok(document)
    }

    /// Replaces the document's top-level links.
    pub fn with_links(mut self, links: Links) -> Self {
        self.links = links;
        self
    }

    /// Merges explicit top-level meta. Explicit keys override generated
    /// ones (pagination keys in particular); generated keys not named stay.
    pub fn with_meta(mut self, meta: Meta) -> Self {
        for (key, value) in meta {
            self.meta.insert(key, value);
        }
        self
    }

    /// Renders the document tree. `data` is always present; every other
    /// member is omitted when empty.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        let data = match &self.data {
            PrimaryData::Null => Value::Null,
            PrimaryData::One(resource) => resource.to_value(),
            PrimaryData::Many(resources) => {
                Value::Array(resources.iter().map(Resource::to_value).collect())
            }
        };
        map.insert("data".to_string(), data);
        if !self.included.is_empty() {
            map.insert(
                "included".to_string(),
                Value::Array(self.included.iter().map(Resource::to_value).collect()),
            );
        }
        if !self.links.is_empty() {
            map.insert("links".to_string(), Value::Object(self.links.as_map().clone()));
        }
        if !self.meta.is_empty() {
            map.insert("meta".to_string(), Value::Object(self.meta.clone()));
        }
        if let Some(version) = &self.jsonapi_version {
            let mut jsonapi = Map::new();
            jsonapi.insert("version".to_string(), Value::String(version.clone()));
            map.insert("jsonapi".to_string(), Value::Object(jsonapi));
        }
        Value::Object(map)
    }

    /// Parses a document tree.
    pub fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let Some(map) = value.as_object() else {
            return Err(DecodeError::Malformed {
                pointer: String::new(),
                message: format!("expected a document object, got {}", json_type_name(value)),
            });
        };
        let data = match map.get("data") {
            None => return Err(DecodeError::MissingData),
            Some(Value::Null) => PrimaryData::Null,
            Some(Value::Array(items)) => {
                let mut resources = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    resources.push(Resource::from_value(item, &format!("/data/{i}"))?);
                }
                PrimaryData::Many(resources)
            }
            Some(single) => PrimaryData::One(Resource::from_value(single, "/data")?),
        };
        let mut included = Vec::new();
        if let Some(value) = map.get("included") {
            let Some(items) = value.as_array() else {
                return Err(DecodeError::Malformed {
                    pointer: "/included".to_string(),
                    message: format!("expected array, got {}", json_type_name(value)),
                });
            };
            for (i, item) in items.iter().enumerate() {
                included.push(Resource::from_value(item, &format!("/included/{i}"))?);
            }
        }
        let links = map
            .get("links")
            .and_then(Value::as_object)
            .map(|m| Links::from_map(m.clone()))
            .unwrap_or_default();
        let meta = map
            .get("meta")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        let jsonapi_version = map
            .get("jsonapi")
            .and_then(|j| j.get("version"))
            .and_then(Value::as_str)
            .map(String::from);
        Ok(Self {
            data,
            included,
            links,
            meta,
            jsonapi_version,
        })
    }

    /// Applies sparse fieldsets to every resource in the document.
    ///
    /// Primary resources keep their identity even when pruned to nothing;
    /// included resources left with nothing to render are suppressed.
    pub fn apply_fieldsets(&mut self, fieldsets: &SparseFieldsets) {
        match &mut self.data {
            PrimaryData::Null => {}
            PrimaryData::One(resource) => {
                fieldsets.apply(&resource.identity.ty, &mut resource.attributes);
            }
            PrimaryData::Many(resources) => {
                for resource in resources {
                    fieldsets.apply(&resource.identity.ty, &mut resource.attributes);
                }
            }
        }
        for resource in &mut self.included {
            fieldsets.apply(&resource.identity.ty, &mut resource.attributes);
        }
        self.included.retain(|resource| !resource.is_empty_shell());
    }

    /// Parses a document from JSON text.
    pub fn from_json_str(content: &str) -> Result<Self, DecodeError> {
        let value =
            serde_json::from_str(content).map_err(|source| DecodeError::InvalidJson { source })?;
        Self::from_value(&value)
    }
}

/// Encodes wrapped content into a document tree.
pub fn encode(
    content: &Content,
    config: &CodecConfig,
    fieldsets: Option<&SparseFieldsets>,
) -> Result<Value, EncodeError> {
    Ok(Document::assemble(content, config, fieldsets)?.to_value())
}

/// Flattens a model's sideloaded related models, depth first. Empty shells
/// are suppressed.
fn collect_included(
    model: &ResourceModel,
    config: &CodecConfig,
    fieldsets: Option<&SparseFieldsets>,
    out: &mut Vec<Resource>,
) -> Result<(), EncodeError> {
    for related in &model.included {
        if let Some(resource) = extract_resource(related, false, config, fieldsets)? {
            if !resource.is_empty_shell() {
                out.push(resource);
            }
        }
        collect_included(related, config, fieldsets, out)?;
    }
    Ok(())
}

fn dedup_by_identity(resources: &mut Vec<Resource>) {
    let mut seen: HashSet<ResourceId> = HashSet::new();
    resources.retain(|resource| seen.insert(resource.identity.clone()));
}
