//! Structural document checking - static analysis of a document tree.
//!
//! Reports violations of the document shape invariants without failing
//! fast: missing identity members, ill-typed members, relationships with
//! nothing to render, duplicate or dangling included resources.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use crate::types::json_type_name;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single diagnostic message from checking.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    /// JSON Pointer to the offending member (e.g., "/data/0/type").
    pub pointer: String,
    pub message: String,
}

/// Result of checking one document.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub errors: usize,
    pub warnings: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl CheckResult {
    /// Returns true when no errors were found (warnings may remain).
    pub fn is_ok(&self) -> bool {
        self.errors == 0
    }
}

/// Checks a document tree against the structural invariants.
pub fn check(document: &Value) -> CheckResult {
    let mut diagnostics = Vec::new();

    let Some(map) = document.as_object() else {
        error(
            &mut diagnostics,
            "E001",
            "",
            format!(
                "expected a document object, got {}",
                json_type_name(document)
            ),
        );
        return finish(diagnostics);
    };

    // Identities addressable in this document: primary data plus included.
    // Relationship references are checked against this set.
    let mut local = HashSet::new();
    collect_identities(map.get("data"), &mut local);
    collect_identities(map.get("included"), &mut local);

    match map.get("data") {
        None => error(
            &mut diagnostics,
            "E002",
            "",
            "document has no top-level `data` member".to_string(),
        ),
        Some(Value::Null) => {}
        Some(Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                check_resource(item, &format!("/data/{i}"), false, &local, &mut diagnostics);
            }
        }
        Some(single) => check_resource(single, "/data", false, &local, &mut diagnostics),
    }

    if let Some(included) = map.get("included") {
        check_included(included, &local, &mut diagnostics);
    }

    if let Some(links) = map.get("links") {
        require_object(links, "/links", &mut diagnostics);
    }
    if let Some(meta) = map.get("meta") {
        require_object(meta, "/meta", &mut diagnostics);
    }
    if let Some(jsonapi) = map.get("jsonapi") {
        if require_object(jsonapi, "/jsonapi", &mut diagnostics) {
            if let Some(version) = jsonapi.get("version") {
                if !version.is_string() {
                    error(
                        &mut diagnostics,
                        "E003",
                        "/jsonapi/version",
                        format!("expected string, got {}", json_type_name(version)),
                    );
                }
            }
        }
    }

    finish(diagnostics)
}

fn check_included(included: &Value, local: &HashSet<(String, String)>, out: &mut Vec<Diagnostic>) {
    let Some(items) = included.as_array() else {
        error(
            out,
            "E003",
            "/included",
            format!("expected array, got {}", json_type_name(included)),
        );
        return;
    };
    let mut seen = HashSet::new();
    for (i, item) in items.iter().enumerate() {
        let pointer = format!("/included/{i}");
        check_resource(item, &pointer, true, local, out);
        if let Some(identity) = identity_of(item) {
            if !seen.insert(identity.clone()) {
                warning(
                    out,
                    "W001",
                    &pointer,
                    format!(
                        "duplicate included resource `{}/{}`",
                        identity.0, identity.1
                    ),
                );
            }
        }
    }
}

fn check_resource(
    resource: &Value,
    pointer: &str,
    identity_required: bool,
    local: &HashSet<(String, String)>,
    out: &mut Vec<Diagnostic>,
) {
    let Some(map) = resource.as_object() else {
        error(
            out,
            "E004",
            pointer,
            format!(
                "expected a resource object, got {}",
                json_type_name(resource)
            ),
        );
        return;
    };

    match map.get("type") {
        Some(Value::String(_)) => {}
        Some(other) => error(
            out,
            "E004",
            &format!("{pointer}/type"),
            format!("expected string, got {}", json_type_name(other)),
        ),
        None => error(
            out,
            "E004",
            pointer,
            "resource has no `type` member".to_string(),
        ),
    }
    match map.get("id") {
        Some(Value::String(_)) => {}
        Some(other) => error(
            out,
            "E004",
            &format!("{pointer}/id"),
            format!("expected string, got {}", json_type_name(other)),
        ),
        None if identity_required => error(
            out,
            "E004",
            pointer,
            "included resource has no `id` member".to_string(),
        ),
        None => {}
    }

    if let Some(attributes) = map.get("attributes") {
        require_object(attributes, &format!("{pointer}/attributes"), out);
    }
    if let Some(links) = map.get("links") {
        require_object(links, &format!("{pointer}/links"), out);
    }
    if let Some(meta) = map.get("meta") {
        require_object(meta, &format!("{pointer}/meta"), out);
    }

    if let Some(relationships) = map.get("relationships") {
        let rel_pointer = format!("{pointer}/relationships");
        let Some(rels) = relationships.as_object() else {
            error(
                out,
                "E005",
                &rel_pointer,
                format!("expected object, got {}", json_type_name(relationships)),
            );
            return;
        };
        for (name, rel) in rels {
            check_relationship(rel, &format!("{rel_pointer}/{name}"), local, out);
        }
    }
}

fn check_relationship(
    rel: &Value,
    pointer: &str,
    local: &HashSet<(String, String)>,
    out: &mut Vec<Diagnostic>,
) {
    let Some(map) = rel.as_object() else {
        error(
            out,
            "E005",
            pointer,
            format!("expected object, got {}", json_type_name(rel)),
        );
        return;
    };

    if !map.contains_key("data") && !map.contains_key("links") && !map.contains_key("meta") {
        error(
            out,
            "E005",
            pointer,
            "relationship has none of `data`, `links`, `meta`".to_string(),
        );
    }

    match map.get("data") {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                check_linkage(item, &format!("{pointer}/data/{i}"), local, out);
            }
        }
        Some(single) => check_linkage(single, &format!("{pointer}/data"), local, out),
    }

    if let Some(links) = map.get("links") {
        require_object(links, &format!("{pointer}/links"), out);
    }
    if let Some(meta) = map.get("meta") {
        require_object(meta, &format!("{pointer}/meta"), out);
    }
}

fn check_linkage(
    linkage: &Value,
    pointer: &str,
    local: &HashSet<(String, String)>,
    out: &mut Vec<Diagnostic>,
) {
    match identity_of(linkage) {
        Some(identity) => {
            if !local.contains(&identity) {
                warning(
                    out,
                    "W002",
                    pointer,
                    format!(
                        "reference `{}/{}` has no matching included resource",
                        identity.0, identity.1
                    ),
                );
            }
        }
        None => error(
            out,
            "E006",
            pointer,
            "linkage is not a `{id, type}` identifier object".to_string(),
        ),
    }
}

/// `(type, id)` of a resource-shaped object, if both members are strings.
fn identity_of(value: &Value) -> Option<(String, String)> {
    let map = value.as_object()?;
    let ty = map.get("type").and_then(Value::as_str)?;
    let id = map.get("id").and_then(Value::as_str)?;
    Some((ty.to_string(), id.to_string()))
}

fn collect_identities(value: Option<&Value>, out: &mut HashSet<(String, String)>) {
    match value {
        Some(Value::Array(items)) => {
            for item in items {
                out.extend(identity_of(item));
            }
        }
        Some(single) => {
            out.extend(identity_of(single));
        }
        None => {}
    }
}

fn require_object(value: &Value, pointer: &str, out: &mut Vec<Diagnostic>) -> bool {
    if value.is_object() {
        true
    } else {
        error(
            out,
            "E003",
            pointer,
            format!("expected object, got {}", json_type_name(value)),
        );
        false
    }
}

fn error(out: &mut Vec<Diagnostic>, code: &str, pointer: &str, message: String) {
    out.push(Diagnostic {
        severity: Severity::Error,
        code: code.to_string(),
        pointer: pointer.to_string(),
        message,
    });
}

fn warning(out: &mut Vec<Diagnostic>, code: &str, pointer: &str, message: String) {
    out.push(Diagnostic {
        severity: Severity::Warning,
        code: code.to_string(),
        pointer: pointer.to_string(),
        message,
    });
}

fn finish(diagnostics: Vec<Diagnostic>) -> CheckResult {
    let errors = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let warnings = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();
    CheckResult {
        errors,
        warnings,
        diagnostics,
    }
}
