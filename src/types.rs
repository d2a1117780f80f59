//! Core value types shared by the encode and decode paths.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved top-level meta key for pagination metadata.
pub const PAGE_META_KEY: &str = "page";

/// Member name under which embedded links are carried on a domain object.
pub const LINKS_MEMBER: &str = "links";

/// JSON:API version rendered when version output is enabled.
pub const JSONAPI_VERSION: &str = "1.0";

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Free-form meta object, insertion-ordered.
pub type Meta = Map<String, Value>;

/// A resource identifier: the `(type, id)` pair that addresses a resource.
///
/// Both members are immutable once derived and must be non-empty for the
/// identifier to address anything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId {
    pub id: String,
    #[serde(rename = "type")]
    pub ty: String,
}

impl ResourceId {
    pub fn new(id: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ty: ty.into(),
        }
    }

    /// Renders the identifier as a `{"id": ..., "type": ...}` object.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("id".to_string(), Value::String(self.id.clone()));
        map.insert("type".to_string(), Value::String(self.ty.clone()));
        Value::Object(map)
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.ty, self.id)
    }
}

/// Named links of a resource or document.
///
/// Keys are link relations (`self`, `related`, ...), values are either href
/// strings or link objects. Insertion order is preserved. An empty `Links`
/// renders nothing and does not count toward relationship validity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Links(Map<String, Value>);

impl Links {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single `self` link.
    pub fn self_link(href: impl Into<String>) -> Self {
        Self::new().link("self", href)
    }

    /// Adds a link with an href value.
    pub fn link(mut self, rel: impl Into<String>, href: impl Into<String>) -> Self {
        self.0.insert(rel.into(), Value::String(href.into()));
        self
    }

    /// Adds a link with an arbitrary link-object value.
    pub fn link_object(mut self, rel: impl Into<String>, value: Value) -> Self {
        self.0.insert(rel.into(), value);
        self
    }

    pub fn get(&self, rel: &str) -> Option<&Value> {
        self.0.get(rel)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub(crate) fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub(crate) fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Page position and totals of a page-aware collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub number: u64,
    pub size: u64,
    #[serde(rename = "totalElements")]
    pub total_elements: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

impl PageInfo {
    pub fn new(number: u64, size: u64, total_elements: u64, total_pages: u64) -> Self {
        Self {
            number,
            size,
            total_elements,
            total_pages,
        }
    }

    /// Derives the page count from the element count and page size.
    pub fn of(number: u64, size: u64, total_elements: u64) -> Self {
        let total_pages = if size == 0 {
            0
        } else {
            (total_elements + size - 1) / size
        };
        Self::new(number, size, total_elements, total_pages)
    }

    /// Renders the `{"number", "size", "totalElements", "totalPages"}` object.
    pub fn to_meta(&self) -> Meta {
        let mut map = Map::new();
        map.insert("number".to_string(), Value::from(self.number));
        map.insert("size".to_string(), Value::from(self.size));
        map.insert(
            "totalElements".to_string(),
            Value::from(self.total_elements),
        );
        map.insert("totalPages".to_string(), Value::from(self.total_pages));
        map
    }
}
