//! Byte-range translation.
//!
//! Turns an `x-gtr-source-range` value into the `Range` header for the source
//! fetch and the `Content-Length` for the destination write.

use std::str::FromStr;

use axum::http::HeaderValue;
use thiserror::Error;

/// Inclusive, zero-indexed span of a resource's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered by the range.
    ///
    /// Saturates for a hand-built span covering all of `u64`; parsed ranges
    /// never reach that.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start).saturating_add(1)
    }
}

/// Why an `x-gtr-source-range` value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("value is not visible ASCII")]
    Encoding,

    #[error("expected exactly one '=', found {0}")]
    Equals(usize),

    #[error("unsupported range unit '{0}', expected 'bytes'")]
    Unit(String),

    #[error("expected exactly one '-' after '=', found {0}")]
    Dashes(usize),

    #[error("range start '{0}' is not an integer")]
    Start(String),

    #[error("range end '{0}' is not an integer")]
    End(String),

    #[error("range end {end} is before start {start}")]
    Reversed { start: u64, end: u64 },

    #[error("range length exceeds {}", u64::MAX)]
    Length,
}

impl FromStr for ByteRange {
    type Err = RangeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = value.split('=').collect();
        let [unit, bounds] = parts[..] else {
            return Err(RangeError::Equals(parts.len().saturating_sub(1)));
        };

        if unit != "bytes" {
            return Err(RangeError::Unit(unit.to_string()));
        }

        let bounds: Vec<&str> = bounds.split('-').collect();
        let [start, end] = bounds[..] else {
            return Err(RangeError::Dashes(bounds.len().saturating_sub(1)));
        };

        let start: u64 = start
            .parse()
            .map_err(|_| RangeError::Start(start.to_string()))?;
        let end: u64 = end.parse().map_err(|_| RangeError::End(end.to_string()))?;

        if end < start {
            return Err(RangeError::Reversed { start, end });
        }
        if (end - start).checked_add(1).is_none() {
            return Err(RangeError::Length);
        }

        Ok(Self { start, end })
    }
}

/// Header values derived from a requested source range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeTranslation {
    /// Forwarded verbatim as the source fetch's `Range`.
    pub source_range: HeaderValue,
    /// The destination write's `Content-Length`.
    pub content_length: u64,
}

/// Translate an optional `x-gtr-source-range` header.
///
/// An absent header is not an error: the destination length is then taken
/// from the source response.
pub fn translate(value: Option<&HeaderValue>) -> Result<Option<RangeTranslation>, RangeError> {
    let Some(value) = value else {
        return Ok(None);
    };

    let range: ByteRange = value.to_str().map_err(|_| RangeError::Encoding)?.parse()?;

    Ok(Some(RangeTranslation {
        source_range: value.clone(),
        content_length: range.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translate_str(s: &'static str) -> Result<Option<RangeTranslation>, RangeError> {
        translate(Some(&HeaderValue::from_static(s)))
    }

    #[test]
    fn test_absent_is_noop() {
        assert_eq!(translate(None), Ok(None));
    }

    #[test]
    fn test_length_is_inclusive() {
        let t = translate_str("bytes=10-19").unwrap().unwrap();
        assert_eq!(t.content_length, 10);
        assert_eq!(t.source_range, "bytes=10-19");

        let t = translate_str("bytes=0-0").unwrap().unwrap();
        assert_eq!(t.content_length, 1);
    }

    #[test]
    fn test_large_offsets() {
        let range: ByteRange = "bytes=53687091200-53687091299".parse().unwrap();
        assert_eq!(range.len(), 100);
    }

    #[test]
    fn test_equals_count() {
        assert_eq!(translate_str("bytes10-19"), Err(RangeError::Equals(0)));
        assert_eq!(translate_str("bytes==10-19"), Err(RangeError::Equals(2)));
    }

    #[test]
    fn test_unit() {
        assert_eq!(
            translate_str("items=10-19"),
            Err(RangeError::Unit("items".into()))
        );
    }

    #[test]
    fn test_dash_count() {
        assert_eq!(translate_str("bytes=10"), Err(RangeError::Dashes(0)));
        assert_eq!(translate_str("bytes=10-19-29"), Err(RangeError::Dashes(2)));
        assert_eq!(translate_str("bytes=-5-10"), Err(RangeError::Dashes(2)));
    }

    #[test]
    fn test_bounds_must_be_integers() {
        assert_eq!(translate_str("bytes=a-19"), Err(RangeError::Start("a".into())));
        assert_eq!(translate_str("bytes=10-"), Err(RangeError::End(String::new())));
        assert_eq!(translate_str("bytes=10-19x"), Err(RangeError::End("19x".into())));
        assert_eq!(translate_str("bytes= 10-19"), Err(RangeError::Start(" 10".into())));
    }

    #[test]
    fn test_reversed_range_is_rejected() {
        assert_eq!(
            translate_str("bytes=20-10"),
            Err(RangeError::Reversed { start: 20, end: 10 })
        );
    }

    #[test]
    fn test_full_u64_span_is_rejected() {
        assert_eq!(
            translate_str("bytes=0-18446744073709551615"),
            Err(RangeError::Length)
        );

        let t = translate_str("bytes=1-18446744073709551615").unwrap().unwrap();
        assert_eq!(t.content_length, u64::MAX);
    }

    #[test]
    fn test_non_ascii_value() {
        let value = HeaderValue::from_bytes(b"bytes=1-\xff").unwrap();
        assert_eq!(translate(Some(&value)), Err(RangeError::Encoding));
    }
}
