//! JSON:API document codec
//!
//! Bidirectional codec between plain serde data models and the JSON:API
//! document format: derives resource identity, attributes, and
//! relationships from domain objects, assembles documents in the shape the
//! JSON:API format defines (primary data, included resources, links, meta,
//! pagination), and
//! reconstructs domain objects from received documents.
//!
//! The codec works on `serde_json::Value` trees; byte-level parsing and
//! writing, content negotiation, and query-parameter handling belong to
//! the hosting layer.
//!
//! # Example
//!
//! ```
//! use jsonapi_codec::{encode, CodecConfig, Content, Relationship, ResourceModel};
//! use serde::Serialize;
//! use serde_json::json;
//!
//! #[derive(Serialize)]
//! struct Movie {
//!     id: String,
//!     title: String,
//! }
//!
//! #[derive(Serialize)]
//! struct Director {
//!     id: String,
//!     name: String,
//! }
//!
//! let config = CodecConfig::new();
//! let lucas = Director { id: "3".into(), name: "George Lucas".into() };
//! let movie = Movie { id: "1".into(), title: "Star Wars".into() };
//!
//! let model = ResourceModel::of(&movie)
//!     .unwrap()
//!     .relationship("directors", Relationship::of_object(&lucas, &config))
//!     .include(ResourceModel::of(&lucas).unwrap());
//!
//! let document = encode(&Content::Single(Some(model)), &config, None).unwrap();
//!
//! assert_eq!(document["data"]["type"], json!("movies"));
//! assert_eq!(document["data"]["attributes"], json!({"title": "Star Wars"}));
//! assert_eq!(
//!     document["data"]["relationships"]["directors"]["data"],
//!     json!({"id": "3", "type": "directors"})
//! );
//! assert_eq!(document["included"][0]["type"], json!("directors"));
//! ```
//!
//! # Document rules
//!
//! | Member | Rendering |
//! |--------|-----------|
//! | `data` | always present: `null`, one resource, or an array |
//! | `attributes`/`relationships`/`links`/`meta` | omitted when empty |
//! | `included` | deduplicated by `(type, id)`, first occurrence wins |
//! | `meta.page` | pagination of page-aware content; explicit keys win |
//!
//! Decoding reverses the process: [`from_document`] and
//! [`from_document_collection`] rebuild domain objects from a document
//! tree, resolving relationship linkages against the `included` set.

mod check;
mod config;
mod decode;
mod document;
mod error;
mod fields;
mod relationship;
mod resource;
mod types;

pub use check::{check, CheckResult, Diagnostic, Severity};
pub use config::CodecConfig;
pub use decode::{from_document, from_document_collection};
pub use document::{encode, Document, PrimaryData};
pub use error::{DecodeError, EncodeError};
pub use fields::SparseFieldsets;
pub use relationship::{Linkage, Relationship, RelationshipData};
pub use resource::{Content, Resource, ResourceModel};
pub use types::{Links, Meta, PageInfo, ResourceId};
