//! Error types for document encoding and decoding.

use thiserror::Error;

/// Errors while assembling a document from domain content.
///
/// All of these indicate a programming or configuration defect and are
/// always propagated; the engine never recovers from them silently.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("no identity member `{member}` on primary resource type `{type_name}`")]
    MissingId { type_name: String, member: String },

    #[error("cannot encode `{type_name}`: expected an object, got {actual}")]
    UnsupportedContent {
        type_name: String,
        actual: &'static str,
    },

    #[error("failed to serialize `{type_name}`: {source}")]
    Serialize {
        type_name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors while disassembling a document into domain objects.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("document has no top-level `data` member")]
    MissingData,

    #[error("malformed document at {pointer}: {message}")]
    Malformed { pointer: String, message: String },

    #[error("expected a single resource, got a collection of {count}")]
    ExpectedSingle { count: usize },

    #[error("expected a single resource, got {actual}")]
    ExpectedResource { actual: &'static str },

    #[error("expected a resource collection, got {actual}")]
    ExpectedCollection { actual: &'static str },

    #[error("failed to deserialize resource `{ty}/{id}`: {source}")]
    Deserialize {
        ty: String,
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

impl EncodeError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

impl DecodeError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_error_display() {
        let err = EncodeError::MissingId {
            type_name: "Movie".into(),
            member: "id".into(),
        };
        assert_eq!(
            err.to_string(),
            "no identity member `id` on primary resource type `Movie`"
        );
    }

    #[test]
    fn decode_error_display() {
        let err = DecodeError::ExpectedSingle { count: 3 };
        assert_eq!(
            err.to_string(),
            "expected a single resource, got a collection of 3"
        );

        let err = DecodeError::Malformed {
            pointer: "/data/0".into(),
            message: "resource is not an object".into(),
        };
        assert_eq!(
            err.to_string(),
            "malformed document at /data/0: resource is not an object"
        );
    }

    #[test]
    fn exit_codes() {
        let err = DecodeError::MissingData;
        assert_eq!(err.exit_code(), 2);
        let err = EncodeError::UnsupportedContent {
            type_name: "Movie".into(),
            actual: "string",
        };
        assert_eq!(err.exit_code(), 2);
    }
}
