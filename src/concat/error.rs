//! Concat request failures.
//!
//! Every failure maps to a bare HTTP status; the message is only logged.

use std::io;
use thiserror::Error;

/// Why a concat request was rejected.
#[derive(Debug, Error)]
pub enum ConcatError {
    #[error("method `{0}` not allowed")]
    MethodNotAllowed(String),

    #[error("request has no query string")]
    MissingQuery,

    #[error("query is not valid UTF-8 after percent-decoding")]
    InvalidEncoding,

    #[error("query has no `?` before the resource list")]
    MissingMarker,

    #[error("compressed payload rejected: {0}")]
    BadPayload(&'static str),

    #[error("resource list is empty")]
    EmptyList,

    #[error("{count} resources requested, limit is {max}")]
    TooManyResources { count: usize, max: usize },

    #[error("invalid resource path `{0}`")]
    InvalidPath(String),

    #[error("`{0}` not found")]
    NotFound(String),

    #[error("`{0}` has no concatenable type")]
    UnsupportedType(String),

    #[error("`{path}` is `{found}` but the batch is `{expected}`")]
    MixedTypes {
        path: String,
        expected: String,
        found: String,
    },

    #[error("`{0}` escapes the document root")]
    Forbidden(String),

    #[error("failed to stat `{path}`")]
    Stat {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to read `{path}`")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl ConcatError {
    /// HTTP status sent to the client.
    pub const fn status(&self) -> u16 {
        match self {
            Self::MethodNotAllowed(_)
            | Self::MissingQuery
            | Self::InvalidEncoding
            | Self::MissingMarker
            | Self::BadPayload(_)
            | Self::EmptyList
            | Self::TooManyResources { .. }
            | Self::InvalidPath(_)
            | Self::UnsupportedType(_)
            | Self::MixedTypes { .. } => 400,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Stat { .. } | Self::Read { .. } => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ConcatError::MissingMarker.status(), 400);
        assert_eq!(ConcatError::InvalidPath("../x".into()).status(), 400);
        assert_eq!(ConcatError::Forbidden("/x".into()).status(), 403);
        assert_eq!(ConcatError::NotFound("/a.css".into()).status(), 404);
        let err = ConcatError::Read {
            path: "/a.css".into(),
            source: io::Error::other("boom"),
        };
        assert_eq!(err.status(), 500);
    }

    #[test]
    fn test_display_names_resource() {
        let err = ConcatError::MixedTypes {
            path: "/b.js".into(),
            expected: "text/css".into(),
            found: "application/javascript".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/b.js"));
        assert!(msg.contains("text/css"));
    }
}
