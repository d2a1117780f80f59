//! Resource extraction and assembly: deriving identity, attributes, and
//! relationships from domain objects.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::{short_type_name, CodecConfig};
use crate::error::{DecodeError, EncodeError};
use crate::fields::SparseFieldsets;
use crate::relationship::Relationship;
use crate::types::{json_type_name, Links, Meta, PageInfo, ResourceId, LINKS_MEMBER};

/// A domain entity wrapped for encoding, with optional decorations.
///
/// Captures the entity's serialized tree and Rust type name at wrap time;
/// relationships, links, meta, and sideloaded related models are attached
/// through the builder methods. Immutable: every method returns a new value.
#[derive(Debug, Clone)]
pub struct ResourceModel {
    pub(crate) value: Value,
    pub(crate) rust_type: String,
    pub(crate) relationships: IndexMap<String, Relationship>,
    pub(crate) links: Links,
    pub(crate) meta: Meta,
    pub(crate) included: Vec<ResourceModel>,
}

impl ResourceModel {
    /// Wraps a serializable entity.
    pub fn of<T: Serialize>(entity: &T) -> Result<Self, EncodeError> {
        let value = serde_json::to_value(entity).map_err(|source| EncodeError::Serialize {
            type_name: short_type_name::<T>().to_string(),
            source,
        })?;
        Ok(Self {
            value,
            rust_type: short_type_name::<T>().to_string(),
            relationships: IndexMap::new(),
            links: Links::new(),
            meta: Meta::new(),
            included: Vec::new(),
        })
    }

    /// Attaches a named relationship. Re-attaching a name replaces it.
    pub fn relationship(mut self, name: impl Into<String>, rel: Relationship) -> Self {
        self.relationships.insert(name.into(), rel);
        self
    }

    /// Adds one link to the model's links.
    pub fn link(mut self, rel: impl Into<String>, href: impl Into<String>) -> Self {
        self.links = self.links.link(rel, href);
        self
    }

    /// Replaces the model's links.
    pub fn links(mut self, links: Links) -> Self {
        self.links = links;
        self
    }

    /// Adds one meta entry.
    pub fn meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }

    /// Sideloads a related full model for the document's `included` list.
    pub fn include(mut self, model: ResourceModel) -> Self {
        self.included.push(model);
        self
    }
}

/// Content handed to the document assembler, resolved once at the entry
/// point: a single optional entity, a plain collection, or a page-aware
/// collection.
#[derive(Debug, Clone)]
pub enum Content {
    Single(Option<ResourceModel>),
    Collection(Vec<ResourceModel>),
    Page(Vec<ResourceModel>, PageInfo),
}

impl Content {
    /// Single entity without decorations.
    pub fn single<T: Serialize>(entity: &T) -> Result<Self, EncodeError> {
        Ok(Content::Single(Some(ResourceModel::of(entity)?)))
    }

    /// Absent entity; renders `"data": null`.
    pub fn none() -> Self {
        Content::Single(None)
    }

    /// Plain collection of entities without decorations.
    pub fn collection<'a, T, I>(entities: I) -> Result<Self, EncodeError>
    where
        T: Serialize + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let models = entities
            .into_iter()
            .map(ResourceModel::of)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Content::Collection(models))
    }
}

/// An assembled resource: identity plus everything that renders under it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub identity: ResourceId,
    pub attributes: Map<String, Value>,
    pub relationships: IndexMap<String, Relationship>,
    pub links: Links,
    pub meta: Meta,
}

impl Resource {
    /// Renders the resource object. Empty members are omitted; invalid or
    /// empty relationships render nothing.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("id".to_string(), Value::String(self.identity.id.clone()));
        map.insert("type".to_string(), Value::String(self.identity.ty.clone()));
        if !self.attributes.is_empty() {
            map.insert(
                "attributes".to_string(),
                Value::Object(self.attributes.clone()),
            );
        }
        let relationships = self.rendered_relationships();
        if !relationships.is_empty() {
            map.insert("relationships".to_string(), Value::Object(relationships));
        }
        if !self.links.is_empty() {
            map.insert("links".to_string(), Value::Object(self.links.as_map().clone()));
        }
        if !self.meta.is_empty() {
            map.insert("meta".to_string(), Value::Object(self.meta.clone()));
        }
        Value::Object(map)
    }

    /// Parses a resource object from a document tree. `pointer` locates the
    /// resource for error messages.
    pub fn from_value(value: &Value, pointer: &str) -> Result<Self, DecodeError> {
        let Some(map) = value.as_object() else {
            return Err(DecodeError::Malformed {
                pointer: pointer.to_string(),
                message: format!("expected a resource object, got {}", json_type_name(value)),
            });
        };
        let ty = match map.get("type") {
            Some(Value::String(ty)) => ty.clone(),
            Some(other) => {
                return Err(DecodeError::Malformed {
                    pointer: format!("{pointer}/type"),
                    message: format!("expected string, got {}", json_type_name(other)),
                })
            }
            None => {
                return Err(DecodeError::Malformed {
                    pointer: pointer.to_string(),
                    message: "resource has no `type` member".to_string(),
                })
            }
        };
        let id = match map.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(other) => {
                return Err(DecodeError::Malformed {
                    pointer: format!("{pointer}/id"),
                    message: format!("expected string, got {}", json_type_name(other)),
                })
            }
            None => String::new(),
        };
        let attributes = match map.get("attributes") {
            Some(Value::Object(attrs)) => attrs.clone(),
            Some(other) => {
                return Err(DecodeError::Malformed {
                    pointer: format!("{pointer}/attributes"),
                    message: format!("expected object, got {}", json_type_name(other)),
                })
            }
            None => Map::new(),
        };
        let mut relationships = IndexMap::new();
        if let Some(rels) = map.get("relationships") {
            let Some(rels) = rels.as_object() else {
                return Err(DecodeError::Malformed {
                    pointer: format!("{pointer}/relationships"),
                    message: format!("expected object, got {}", json_type_name(rels)),
                });
            };
            for (name, rel) in rels {
                relationships.insert(name.clone(), Relationship::from_value(rel));
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
        Ok(Self {
            identity: ResourceId::new(id, ty),
            attributes,
            relationships,
            links,
            meta,
        })
    }

    /// True when nothing besides the identity would render.
    pub(crate) fn is_empty_shell(&self) -> bool {
        self.attributes.is_empty()
            && self.rendered_relationships().is_empty()
            && self.links.is_empty()
            && self.meta.is_empty()
    }

    fn rendered_relationships(&self) -> Map<String, Value> {
        let mut map = Map::new();
        for (name, rel) in &self.relationships {
            if let Some(rendered) = rel.to_value() {
                map.insert(name.clone(), rendered);
            }
        }
        map
    }
}

/// Derives the resource identifier carried inside a serialized object map,
/// if one is derivable.
pub(crate) fn identity_in_map(
    map: &Map<String, Value>,
    rust_name: &str,
    config: &CodecConfig,
) -> Option<ResourceId> {
    let id = stringify_id(map.get(config.id_member_name())?)?;
    let ty = config
        .type_member_name()
        .and_then(|member| map.get(member))
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| config.resource_type_of(rust_name));
    Some(ResourceId::new(id, ty))
}

/// String form of a raw identity value. Only scalars with a canonical
/// string form qualify.
pub(crate) fn stringify_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Extracts a [`Resource`] from a wrapped model.
///
/// Returns `Ok(None)` when the model carries no content at all (its
/// serialized map is empty once the embedded links member is removed), or
/// when a non-primary model has no derivable identity. A primary model
/// without a derivable identity is a configuration error.
pub(crate) fn extract_resource(
    model: &ResourceModel,
    primary: bool,
    config: &CodecConfig,
    fieldsets: Option<&SparseFieldsets>,
) -> Result<Option<Resource>, EncodeError> {
    let Some(map) = model.value.as_object() else {
        return Err(EncodeError::UnsupportedContent {
            type_name: model.rust_type.clone(),
            actual: json_type_name(&model.value),
        });
    };
    let mut attributes = map.clone();
    attributes.remove(LINKS_MEMBER);
    if attributes.is_empty() {
        return Ok(None);
    }

    let ty = match config
        .type_member_name()
        .and_then(|member| attributes.get(member))
        .and_then(Value::as_str)
        .map(String::from)
    {
        Some(ty) => {
            // The type member is identity, not an attribute.
            if let Some(member) = config.type_member_name() {
                attributes.remove(member);
            }
            ty
        }
        None => config.resource_type_of(&model.rust_type),
    };

    let id = match attributes.remove(config.id_member_name()).as_ref().and_then(stringify_id) {
        Some(id) => id,
        None if primary => {
            return Err(EncodeError::MissingId {
                type_name: model.rust_type.clone(),
                member: config.id_member_name().to_string(),
            })
        }
        None => return Ok(None),
    };

    // Members designated as relationships are linkage, not attributes.
    for name in model.relationships.keys() {
        attributes.remove(name);
    }

    if let Some(fieldsets) = fieldsets {
        fieldsets.apply(&ty, &mut attributes);
    }

    Ok(Some(Resource {
        identity: ResourceId::new(id, ty),
        attributes,
        relationships: model.relationships.clone(),
        links: model.links.clone(),
        meta: model.meta.clone(),
    }))
}
