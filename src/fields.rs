//! Sparse fieldsets: per-type attribute allow-lists.

use std::collections::HashMap;

use serde_json::{Map, Value};

/// Per-type allow-lists restricting which attributes are serialized.
///
/// A type with no entry passes through unfiltered. Filtering runs before
/// the empty-resource suppression check, so a non-primary resource pruned
/// down to nothing is still suppressed.
#[derive(Debug, Clone, Default)]
pub struct SparseFieldsets(HashMap<String, Vec<String>>);

impl SparseFieldsets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the allow-list for a resource type.
    pub fn fields<I, S>(mut self, ty: impl Into<String>, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .insert(ty.into(), allowed.into_iter().map(Into::into).collect());
        self
    }

    /// Parses a `type=field,field` specification, as accepted by the CLI.
    pub fn parse_spec(&mut self, spec: &str) -> Result<(), String> {
        let Some((ty, fields)) = spec.split_once('=') else {
            return Err(format!("invalid fieldset `{spec}`: expected type=a,b"));
        };
        if ty.is_empty() {
            return Err(format!("invalid fieldset `{spec}`: empty type"));
        }
        let allowed: Vec<String> = fields
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(String::from)
            .collect();
        self.0.insert(ty.trim().to_string(), allowed);
        Ok(())
    }

    pub fn allowed(&self, ty: &str) -> Option<&[String]> {
        self.0.get(ty).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Prunes `attributes` in place to the allow-list for `ty`, preserving
    /// the order of surviving keys. No entry for `ty` leaves the map as-is.
    pub(crate) fn apply(&self, ty: &str, attributes: &mut Map<String, Value>) {
        if let Some(allowed) = self.0.get(ty) {
            attributes.retain(|key, _| allowed.iter().any(|a| a == key));
        }
    }
}
