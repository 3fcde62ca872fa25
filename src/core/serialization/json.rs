/*!
 * JSON Value Serialization
 * Self-describing encoding for individual call arguments
 *
 * Argument values are encoded with serde_json rather than bincode so that a
 * value whose coarse kind matches a parameter still decodes when the concrete
 * types differ (an `i32` argument into an `i64` parameter, for example).
 */

use super::finite::{ensure_finite, FiniteError};
use serde::{de::DeserializeOwned, Serialize};

/// Result type for JSON operations
pub type JsonResult<T> = Result<T, JsonError>;

/// JSON operation errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum JsonError {
    #[error("Serialization failed ({context}): {source}")]
    Serialization {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Deserialization failed ({context}): {source}")]
    Deserialization {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Value rejected ({context}): {source}")]
    NotRepresentable {
        context: &'static str,
        #[source]
        source: FiniteError,
    },
}

/// Serialize to JSON bytes
///
/// NaN and infinities anywhere in `value` are rejected; serde_json would
/// otherwise write them as `null`.
pub fn to_vec<T: Serialize + ?Sized>(value: &T) -> JsonResult<Vec<u8>> {
    ensure_finite(value).map_err(|source| JsonError::NotRepresentable {
        context: "argument value",
        source,
    })?;
    serde_json::to_vec(value).map_err(|source| JsonError::Serialization {
        context: "argument value",
        source,
    })
}

/// Deserialize from JSON bytes
#[inline]
pub fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> JsonResult<T> {
    serde_json::from_slice(bytes).map_err(|source| JsonError::Deserialization {
        context: "argument value",
        source,
    })
}

/// Serialize to a pretty-printed string (reports, debugging output)
pub fn to_string_pretty<T: Serialize + ?Sized>(value: &T) -> JsonResult<String> {
    serde_json::to_string_pretty(value).map_err(|source| JsonError::Serialization {
        context: "pretty string",
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_integer_widths_interchange() {
        let bytes = to_vec(&3i32).unwrap();
        let wide: i64 = from_slice(&bytes).unwrap();
        let unsigned: u8 = from_slice(&bytes).unwrap();
        assert_eq!(wide, 3);
        assert_eq!(unsigned, 3);
    }

    #[test]
    fn test_non_finite_floats_are_rejected() {
        assert!(matches!(
            to_vec(&f64::NAN),
            Err(JsonError::NotRepresentable { .. })
        ));
        assert!(matches!(
            to_vec(&Some(f64::INFINITY)),
            Err(JsonError::NotRepresentable { .. })
        ));
        assert_eq!(to_vec(&Some(2.5f64)).unwrap(), b"2.5".to_vec());
    }

    #[test]
    fn test_messages_carry_serde_reason() {
        let err = from_slice::<u8>(b"\"text\"").unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Deserialization failed (argument value): "));
        assert!(message.contains("invalid type"));
    }

    #[test]
    fn test_out_of_range_fails() {
        let bytes = to_vec(&300i64).unwrap();
        assert!(matches!(
            from_slice::<u8>(&bytes),
            Err(JsonError::Deserialization { .. })
        ));
    }
}
