//! Codec configuration: identity lookup and resource-type naming.

use std::collections::HashMap;

/// Immutable configuration shared by encode and decode calls.
///
/// Controls how a resource's identity and type name are derived from a
/// domain object. A single instance may be shared read-only across
/// concurrent calls.
#[derive(Debug, Clone)]
pub struct CodecConfig {
    id_member: String,
    type_member: Option<String>,
    pluralized_types: bool,
    lowercased_types: bool,
    jsonapi_version_rendered: bool,
    jsonapi_version: String,
    type_overrides: HashMap<String, String>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            id_member: "id".to_string(),
            type_member: None,
            pluralized_types: true,
            lowercased_types: true,
            jsonapi_version_rendered: false,
            jsonapi_version: crate::types::JSONAPI_VERSION.to_string(),
            type_overrides: HashMap::new(),
        }
    }
}

impl CodecConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the member holding a resource's identity. Default `"id"`.
    pub fn id_member(mut self, name: impl Into<String>) -> Self {
        self.id_member = name.into();
        self
    }

    /// Name of a member whose value overrides the derived type for that
    /// instance. The member is removed from the attributes. Default: none.
    pub fn type_member(mut self, name: impl Into<String>) -> Self {
        self.type_member = Some(name.into());
        self
    }

    /// Pluralize derived type names (`movie` -> `movies`). Default true.
    pub fn pluralized_types(mut self, pluralized: bool) -> Self {
        self.pluralized_types = pluralized;
        self
    }

    /// Lowercase derived type names. Default true.
    pub fn lowercased_types(mut self, lowercased: bool) -> Self {
        self.lowercased_types = lowercased;
        self
    }

    /// Render a top-level `{"jsonapi": {"version": ...}}` object. Default false.
    pub fn render_jsonapi_version(mut self, rendered: bool) -> Self {
        self.jsonapi_version_rendered = rendered;
        self
    }

    /// Version string rendered when version output is enabled.
    pub fn jsonapi_version(mut self, version: impl Into<String>) -> Self {
        self.jsonapi_version = version.into();
        self
    }

    /// Fixed resource type for a Rust type, bypassing derivation.
    pub fn type_for<T>(mut self, resource_type: impl Into<String>) -> Self {
        self.type_overrides
            .insert(short_type_name::<T>().to_string(), resource_type.into());
        self
    }

    /// Resource type for `T`: explicit override, else the unqualified Rust
    /// type name run through the lowercase/pluralize flags.
    pub fn resource_type<T>(&self) -> String {
        self.resource_type_of(short_type_name::<T>())
    }

    pub(crate) fn resource_type_of(&self, rust_name: &str) -> String {
        if let Some(overridden) = self.type_overrides.get(rust_name) {
            return overridden.clone();
        }
        let mut name = rust_name.to_string();
        if self.lowercased_types {
            name = name.to_lowercase();
        }
        if self.pluralized_types {
            name = pluralize(&name);
        }
        name
    }

    pub(crate) fn id_member_name(&self) -> &str {
        &self.id_member
    }

    pub(crate) fn type_member_name(&self) -> Option<&str> {
        self.type_member.as_deref()
    }

    pub(crate) fn version_rendered(&self) -> bool {
        self.jsonapi_version_rendered
    }

    pub(crate) fn version(&self) -> &str {
        &self.jsonapi_version
    }
}

/// Unqualified name of `T`, without module path or generic arguments.
pub(crate) fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Basic English pluralization.
fn pluralize(word: &str) -> String {
    if word.ends_with('s')
        || word.ends_with('x')
        || word.ends_with('z')
        || word.ends_with("ch")
        || word.ends_with("sh")
    {
        return format!("{word}es");
    }
    if let Some(stem) = word.strip_suffix('y') {
        let penultimate = stem.chars().last();
        if penultimate.is_some_and(|c| !"aeiou".contains(c)) {
            return format!("{stem}ies");
        }
    }
    format!("{word}s")
}
