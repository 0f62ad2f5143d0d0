//! Binary encoding shared by both backends.
//!
//! Values are written as MessagePack with struct fields keyed by name, so a
//! record round-trips without any schema on the reading side. Every payload
//! carries a one-byte format marker in front of the MessagePack body.

use crate::error::{CacheError, CacheResult};
use serde::{de::DeserializeOwned, Serialize};

/// Marker for an uncompressed MessagePack body.
pub const FORMAT_MSGPACK: u8 = 0x00;

/// Encode a value into a framed byte buffer.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> CacheResult<Vec<u8>> {
    let mut buf = vec![FORMAT_MSGPACK];
    rmp_serde::encode::write_named(&mut buf, value)
        .map_err(|e| CacheError::Encoding(e.to_string()))?;
    Ok(buf)
}

/// Return the MessagePack body of a frame, or `None` if the marker is unknown.
pub fn split_frame(bytes: &[u8]) -> Option<&[u8]> {
    match bytes.split_first() {
        Some((&FORMAT_MSGPACK, body)) => Some(body),
        _ => None,
    }
}

/// Decode an unframed MessagePack body.
pub fn decode_body<T: DeserializeOwned>(body: &[u8]) -> CacheResult<T> {
    rmp_serde::from_slice(body).map_err(|e| CacheError::Decoding(e.to_string()))
}

/// Decode a framed byte buffer.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> CacheResult<T> {
    let body = split_frame(bytes).ok_or_else(|| match bytes.first() {
        Some(marker) => CacheError::Decoding(format!("unknown format marker {marker:#04x}")),
        None => CacheError::Decoding("empty payload".to_string()),
    })?;
    decode_body(body)
}

/// Decode a framed buffer into `out`. `out` is only assigned on success.
pub fn decode_into<T: DeserializeOwned>(bytes: &[u8], out: &mut T) -> CacheResult<()> {
    *out = decode(bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Object {
        key: String,
        value: String,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Nested {
        id: u64,
        ratio: f64,
        active: bool,
        tags: Vec<String>,
        inner: Object,
        extra: Option<BTreeMap<String, i32>>,
    }

    #[test]
    fn test_frame_starts_with_marker() {
        let bytes = encode(&Object::default()).unwrap();
        assert_eq!(bytes[0], FORMAT_MSGPACK);
    }

    #[test]
    fn test_fields_are_encoded_by_name() {
        let bytes = encode(&Object {
            key: "case1".to_string(),
            value: "any string".to_string(),
        })
        .unwrap();

        let needle = b"value";
        assert!(bytes.windows(needle.len()).any(|w| w == needle));
    }

    #[test]
    fn test_nested_record_roundtrip() {
        let mut extra = BTreeMap::new();
        extra.insert("a".to_string(), -1);
        let record = Nested {
            id: 42,
            ratio: 0.25,
            active: true,
            tags: vec!["x".to_string(), "y".to_string()],
            inner: Object {
                key: "case1".to_string(),
                value: "any string".to_string(),
            },
            extra: Some(extra),
        };

        let bytes = encode(&record).unwrap();
        let decoded: Nested = decode(&bytes).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_unknown_marker_is_rejected() {
        let mut bytes = encode(&1u8).unwrap();
        bytes[0] = 0x7f;
        assert!(split_frame(&bytes).is_none());
        assert!(matches!(decode::<u8>(&bytes), Err(CacheError::Decoding(_))));
    }

    #[test]
    fn test_empty_payload_is_rejected() {
        assert!(matches!(decode::<u8>(&[]), Err(CacheError::Decoding(_))));
    }

    #[test]
    fn test_shape_mismatch_is_decoding_error() {
        let bytes = encode("just a string").unwrap();
        assert!(matches!(decode::<Object>(&bytes), Err(CacheError::Decoding(_))));
    }

    #[test]
    fn test_truncated_payload_is_decoding_error() {
        let bytes = encode(&Object {
            key: "case1".to_string(),
            value: "any string".to_string(),
        })
        .unwrap();
        let truncated = &bytes[..bytes.len() - 3];
        assert!(matches!(decode::<Object>(truncated), Err(CacheError::Decoding(_))));
    }

    #[test]
    fn test_decode_into_leaves_output_on_failure() {
        let mut out = Object {
            key: "keep".to_string(),
            value: "me".to_string(),
        };
        let bytes = encode(&7u32).unwrap();
        assert!(decode_into(&bytes, &mut out).is_err());
        assert_eq!(out.key, "keep");
        assert_eq!(out.value, "me");
    }

    #[test]
    fn test_failing_serialize_is_encoding_error() {
        struct Unserializable;

        impl Serialize for Unserializable {
            fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("not supported"))
            }
        }

        assert!(matches!(encode(&Unserializable), Err(CacheError::Encoding(_))));
    }
}
