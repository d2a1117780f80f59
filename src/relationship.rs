//! Relationship model: resource linkage, links, and meta of one relationship.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::{short_type_name, CodecConfig};
use crate::resource::identity_in_map;
use crate::types::{Links, Meta, ResourceId};

/// One element of relationship data.
#[derive(Debug, Clone, PartialEq)]
pub enum Linkage {
    /// A proper resource identifier.
    Resource(ResourceId),
    /// Data with no derivable id/type. Never rendered; fails validity.
    Opaque(Value),
}

impl Linkage {
    pub fn resource(&self) -> Option<&ResourceId> {
        match self {
            Linkage::Resource(id) => Some(id),
            Linkage::Opaque(_) => None,
        }
    }
}

/// Resource linkage of a relationship.
///
/// `Absent` omits the `data` member entirely; `Null` renders an explicit
/// empty to-one linkage.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RelationshipData {
    #[default]
    Absent,
    Null,
    One(Linkage),
    Many(Vec<Linkage>),
}

/// A single named relationship of a resource.
///
/// Immutable value type: every operation consumes the relationship and
/// returns the transformed one. Construction never fails; a relationship
/// that cannot render anything is reported by [`Relationship::is_valid`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Relationship {
    data: RelationshipData,
    links: Option<Links>,
    meta: Option<Meta>,
    always_array: bool,
}

impl Relationship {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a single domain object as relationship data.
    pub fn of_object<T: Serialize>(obj: &T, config: &CodecConfig) -> Self {
        Self::new().add_object(obj, config)
    }

    /// Wraps a collection as relationship data. The data is stored as a
    /// list even when the collection is empty, so array rendering is
    /// implicit from here on.
    pub fn of_collection<'a, T, I>(objs: I, config: &CodecConfig) -> Self
    where
        T: Serialize + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let linkages = objs
            .into_iter()
            .map(|obj| linkage_from(obj, config))
            .collect();
        Self {
            data: RelationshipData::Many(linkages),
            ..Self::default()
        }
    }

    /// Wraps an already-derived resource identifier.
    pub fn of_id(id: ResourceId) -> Self {
        Self::new().add_id(id)
    }

    /// Links-only relationship with no data.
    pub fn of_links(links: Links) -> Self {
        Self {
            links: Some(links),
            ..Self::default()
        }
    }

    /// Meta-only relationship with no data.
    pub fn of_meta(meta: Meta) -> Self {
        Self {
            meta: Some(meta),
            ..Self::default()
        }
    }

    /// Explicit empty to-one linkage (`"data": null`).
    pub fn null_data() -> Self {
        Self {
            data: RelationshipData::Null,
            ..Self::default()
        }
    }

    /// Appends a single domain object, preserving insertion order.
    pub fn add_object<T: Serialize>(self, obj: &T, config: &CodecConfig) -> Self {
        self.add_linkage(linkage_from(obj, config))
    }

    /// Appends an already-derived resource identifier.
    pub fn add_id(self, id: ResourceId) -> Self {
        self.add_linkage(Linkage::Resource(id))
    }

    /// Merges a collection, preserving existing elements first and the
    /// collection's internal order after them. Merging an empty collection
    /// into absent data leaves an empty list, not absent data.
    pub fn add_collection<'a, T, I>(mut self, objs: I, config: &CodecConfig) -> Self
    where
        T: Serialize + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let incoming: Vec<Linkage> = objs
            .into_iter()
            .map(|obj| linkage_from(obj, config))
            .collect();
        let mut existing = match self.data {
            RelationshipData::Absent | RelationshipData::Null => Vec::new(),
            RelationshipData::One(linkage) => vec![linkage],
            RelationshipData::Many(linkages) => linkages,
        };
        existing.extend(incoming);
        self.data = RelationshipData::Many(existing);
        self
    }

    /// Marks the relationship as always rendering `data` as an array.
    ///
    /// Sticky: a single object added afterwards still renders as a
    /// one-element array, and existing single data converts in place.
    pub fn always_serialized_as_array(mut self) -> Self {
        self.always_array = true;
        self.data = match self.data {
            RelationshipData::Absent | RelationshipData::Null => {
                RelationshipData::Many(Vec::new())
            }
            RelationshipData::One(linkage) => RelationshipData::Many(vec![linkage]),
            many @ RelationshipData::Many(_) => many,
        };
        self
    }

    pub fn with_links(mut self, links: Links) -> Self {
        self.links = Some(links);
        self
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn data(&self) -> &RelationshipData {
        &self.data
    }

    pub fn links(&self) -> Option<&Links> {
        self.links.as_ref()
    }

    pub fn meta(&self) -> Option<&Meta> {
        self.meta.as_ref()
    }

    /// A relationship is valid if it has non-empty links, or meta, or its
    /// data is proper resource linkage. Data holding values with no
    /// derivable id/type is invalid, as is a fully empty relationship.
    pub fn is_valid(&self) -> bool {
        if self.links.as_ref().is_some_and(|l| !l.is_empty()) {
            return true;
        }
        if self.meta.is_some() {
            return true;
        }
        match &self.data {
            RelationshipData::Absent => false,
            RelationshipData::Null => true,
            RelationshipData::One(linkage) => linkage.resource().is_some(),
            RelationshipData::Many(linkages) => {
                linkages.iter().all(|l| l.resource().is_some())
            }
        }
    }

    fn add_linkage(mut self, linkage: Linkage) -> Self {
        self.data = match self.data {
            RelationshipData::Absent | RelationshipData::Null => {
                if self.always_array {
                    RelationshipData::Many(vec![linkage])
                } else {
                    RelationshipData::One(linkage)
                }
            }
            RelationshipData::One(existing) => RelationshipData::Many(vec![existing, linkage]),
            RelationshipData::Many(mut linkages) => {
                linkages.push(linkage);
                RelationshipData::Many(linkages)
            }
        };
        self
    }

    /// Renders the relationship object, or `None` when nothing renders.
    /// Opaque linkages render nothing.
    pub(crate) fn to_value(&self) -> Option<Value> {
        let mut map = Map::new();
        match &self.data {
            RelationshipData::Absent => {}
            RelationshipData::Null => {
                map.insert("data".to_string(), Value::Null);
            }
            RelationshipData::One(linkage) => {
                if let Some(id) = linkage.resource() {
                    map.insert("data".to_string(), id.to_value());
                }
            }
            RelationshipData::Many(linkages) => {
                let rendered: Vec<Value> = linkages
                    .iter()
                    .filter_map(|l| l.resource().map(ResourceId::to_value))
                    .collect();
                map.insert("data".to_string(), Value::Array(rendered));
            }
        }
        if let Some(links) = &self.links {
            if !links.is_empty() {
                map.insert("links".to_string(), Value::Object(links.as_map().clone()));
            }
        }
        if let Some(meta) = &self.meta {
            if !meta.is_empty() {
                map.insert("meta".to_string(), Value::Object(meta.clone()));
            }
        }
        if map.is_empty() {
            None
        } else {
            Some(Value::Object(map))
        }
    }

    /// Parses a relationship object from a document tree.
    pub(crate) fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::new();
        };
        let data = match map.get("data") {
            None => RelationshipData::Absent,
            Some(Value::Null) => RelationshipData::Null,
            Some(Value::Array(items)) => {
                RelationshipData::Many(items.iter().map(parse_linkage).collect())
            }
            Some(single) => RelationshipData::One(parse_linkage(single)),
        };
        let links = map
            .get("links")
            .and_then(Value::as_object)
            .map(|m| Links::from_map(m.clone()));
        let meta = map.get("meta").and_then(Value::as_object).cloned();
        Self {
            data,
            links,
            meta,
            always_array: false,
        }
    }
}

fn parse_linkage(value: &Value) -> Linkage {
    let identifier = value.as_object().and_then(|map| {
        let id = map.get("id").and_then(Value::as_str)?;
        let ty = map.get("type").and_then(Value::as_str)?;
        Some(ResourceId::new(id, ty))
    });
    match identifier {
        Some(id) => Linkage::Resource(id),
        None => Linkage::Opaque(value.clone()),
    }
}

fn linkage_from<T: Serialize>(obj: &T, config: &CodecConfig) -> Linkage {
    match serde_json::to_value(obj) {
        Ok(Value::Object(map)) => match identity_in_map(&map, short_type_name::<T>(), config) {
            Some(id) => Linkage::Resource(id),
            None => Linkage::Opaque(Value::Object(map)),
        },
        Ok(other) => Linkage::Opaque(other),
        Err(_) => Linkage::Opaque(Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(serde::Serialize)]
    struct Movie {
        id: String,
        title: String,
    }

    fn movie(id: &str, title: &str) -> Movie {
        Movie {
            id: id.to_string(),
            title: title.to_string(),
        }
    }

    fn config() -> CodecConfig {
        CodecConfig::new()
    }

    fn data_ids(rel: &Relationship) -> Vec<String> {
        match rel.data() {
            RelationshipData::Many(linkages) => linkages
                .iter()
                .filter_map(|l| l.resource().map(|r| r.id.clone()))
                .collect(),
            RelationshipData::One(linkage) => linkage
                .resource()
                .map(|r| vec![r.id.clone()])
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    #[test]
    fn add_object_to_empty_relationship() {
        let rel = Relationship::new().add_object(&movie("1", "Star Wars"), &config());
        match rel.data() {
            RelationshipData::One(Linkage::Resource(id)) => {
                assert_eq!(id.id, "1");
                assert_eq!(id.ty, "movies");
            }
            other => panic!("expected single linkage, got {other:?}"),
        }
    }

    #[test]
    fn of_object_derives_identity() {
        let rel = Relationship::of_object(&movie("1", "Star Wars"), &config());
        assert!(rel.is_valid());
        assert_eq!(data_ids(&rel), ["1"]);
    }

    #[test]
    fn of_object_as_array() {
        let rel = Relationship::of_object(&movie("1", "Star Wars"), &config())
            .always_serialized_as_array();
        match rel.data() {
            RelationshipData::Many(linkages) => assert_eq!(linkages.len(), 1),
            other => panic!("expected array data, got {other:?}"),
        }
    }

    #[test]
    fn of_collection_stores_list() {
        let movies = vec![movie("1", "Star Wars")];
        let rel = Relationship::of_collection(&movies, &config());
        assert_eq!(data_ids(&rel), ["1"]);
    }

    #[test]
    fn of_empty_collection_stores_empty_list() {
        let movies: Vec<Movie> = Vec::new();
        let rel = Relationship::of_collection(&movies, &config());
        assert_eq!(rel.data(), &RelationshipData::Many(Vec::new()));
    }

    #[test]
    fn array_flag_before_add() {
        let rel = Relationship::new()
            .always_serialized_as_array()
            .add_object(&movie("1", "Star Wars"), &config());
        match rel.data() {
            RelationshipData::Many(linkages) => assert_eq!(linkages.len(), 1),
            other => panic!("expected array data, got {other:?}"),
        }
    }

    #[test]
    fn array_flag_after_add_converts_in_place() {
        let rel = Relationship::new()
            .add_object(&movie("1", "Star Wars"), &config())
            .always_serialized_as_array();
        assert_eq!(data_ids(&rel), ["1"]);
        assert!(matches!(rel.data(), RelationshipData::Many(_)));
    }

    #[test]
    fn array_flag_after_two_adds() {
        let rel = Relationship::new()
            .add_object(&movie("1", "Star Wars"), &config())
            .add_object(&movie("2", "Test"), &config())
            .always_serialized_as_array();
        assert_eq!(data_ids(&rel), ["1", "2"]);
    }

    #[test]
    fn array_flag_on_empty_yields_empty_list() {
        let rel = Relationship::new().always_serialized_as_array();
        assert_eq!(rel.data(), &RelationshipData::Many(Vec::new()));
    }

    #[test]
    fn merge_empty_collection_into_empty() {
        let movies: Vec<Movie> = Vec::new();
        let rel = Relationship::new().add_collection(&movies, &config());
        assert_eq!(rel.data(), &RelationshipData::Many(Vec::new()));
    }

    #[test]
    fn merge_empty_collection_into_single() {
        let movies: Vec<Movie> = Vec::new();
        let rel = Relationship::new()
            .add_object(&movie("1", "Star Wars"), &config())
            .add_collection(&movies, &config());
        assert_eq!(data_ids(&rel), ["1"]);
    }

    #[test]
    fn merge_collection_into_existing_collection() {
        let more = vec![movie("3", "Movie 3"), movie("4", "Movie 4")];
        let rel = Relationship::new()
            .add_object(&movie("1", "Movie 1"), &config())
            .add_object(&movie("2", "Movie 2"), &config())
            .add_collection(&more, &config());
        assert_eq!(data_ids(&rel), ["1", "2", "3", "4"]);
    }

    #[test]
    fn valid_with_data_links_and_meta() {
        let rel = Relationship::of_id(ResourceId::new("1", "movies"))
            .with_links(Links::self_link("http://x"))
            .with_meta(Meta::new());
        assert!(rel.is_valid());
    }

    #[test]
    fn meta_only_is_valid_even_when_empty() {
        let rel = Relationship::of_meta(Meta::new());
        assert!(rel.is_valid());
    }

    #[test]
    fn empty_links_only_is_invalid() {
        let rel = Relationship::of_links(Links::new());
        assert!(!rel.is_valid());
    }

    #[test]
    fn fully_empty_is_invalid() {
        assert!(!Relationship::new().is_valid());
    }

    #[test]
    fn opaque_single_data_is_invalid() {
        // A bare scalar has no derivable identity.
        let rel = Relationship::of_object(&"not a resource", &config());
        assert!(!rel.is_valid());
    }

    #[test]
    fn opaque_collection_data_is_invalid() {
        let values = vec![json!({"name": "no id here"})];
        let rel = Relationship::of_collection(&values, &config());
        assert!(!rel.is_valid());
    }

    #[test]
    fn null_data_is_valid_and_renders_null() {
        let rel = Relationship::null_data();
        assert!(rel.is_valid());
        assert_eq!(rel.to_value(), Some(json!({"data": null})));
    }

    #[test]
    fn renders_single_and_array_data() {
        let rel = Relationship::of_id(ResourceId::new("1", "movies"));
        assert_eq!(
            rel.to_value(),
            Some(json!({"data": {"id": "1", "type": "movies"}}))
        );

        let rel = rel.always_serialized_as_array();
        assert_eq!(
            rel.to_value(),
            Some(json!({"data": [{"id": "1", "type": "movies"}]}))
        );
    }

    #[test]
    fn renders_nothing_for_opaque_only() {
        let rel = Relationship::of_object(&42, &config());
        assert_eq!(rel.to_value(), None);
    }

    #[test]
    fn renders_links_and_meta_but_skips_empty() {
        let mut meta = Meta::new();
        meta.insert("count".to_string(), json!(2));
        let rel = Relationship::of_links(Links::self_link("http://x")).with_meta(meta);
        assert_eq!(
            rel.to_value(),
            Some(json!({"links": {"self": "http://x"}, "meta": {"count": 2}}))
        );

        let rel = Relationship::of_links(Links::new()).with_meta(Meta::new());
        assert_eq!(rel.to_value(), None);
    }

    #[test]
    fn parses_relationship_object() {
        let rel = Relationship::from_value(&json!({
            "data": [{"id": "1", "type": "movies"}, {"id": "2", "type": "movies"}],
            "links": {"self": "http://x"},
            "meta": {"count": 2}
        }));
        assert_eq!(data_ids(&rel), ["1", "2"]);
        assert_eq!(rel.links().unwrap().len(), 1);
        assert_eq!(rel.meta().unwrap().get("count"), Some(&json!(2)));
    }

    #[test]
    fn parses_null_and_absent_data() {
        let rel = Relationship::from_value(&json!({"data": null}));
        assert_eq!(rel.data(), &RelationshipData::Null);

        let rel = Relationship::from_value(&json!({"meta": {"k": "v"}}));
        assert_eq!(rel.data(), &RelationshipData::Absent);
    }

    #[test]
    fn parses_malformed_linkage_as_opaque() {
        let rel = Relationship::from_value(&json!({"data": {"name": "no identity"}}));
        assert!(!rel.is_valid());
    }
}
