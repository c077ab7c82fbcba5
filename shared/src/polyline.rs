//! Decoder for the encoded-polyline format used by the routing backend.
//!
//! Points are stored as (latitude, longitude) deltas scaled by 1e5. Each
//! delta is zig-zag encoded, split into 5-bit chunks from least significant
//! to most significant, and every chunk except the last carries a
//! continuation bit (0x20) before the whole byte is offset by 63 into
//! printable ASCII.

use thiserror::Error;

use crate::Coordinate;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolylineError {
    #[error("byte {byte:#04x} at offset {offset} is outside the polyline alphabet")]
    InvalidByte { byte: u8, offset: usize },
    #[error("input ends inside the varint group starting at offset {offset}")]
    UnterminatedGroup { offset: usize },
    #[error("latitude delta at offset {offset} has no matching longitude delta")]
    MissingLongitude { offset: usize },
}

/// Decodes an entire polyline string into an ordered path.
///
/// Pure and deterministic. The whole input must be consumed: trailing bytes
/// that do not form a complete (latitude, longitude) delta pair are an
/// error, not a silent truncation.
pub fn decode(encoded: &str) -> Result<Vec<Coordinate>, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lon: i64 = 0;

    while index < bytes.len() {
        let pair_start = index;
        lat += next_delta(bytes, &mut index)?;
        if index >= bytes.len() {
            return Err(PolylineError::MissingLongitude { offset: pair_start });
        }
        lon += next_delta(bytes, &mut index)?;
        points.push(Coordinate {
            lat: lat as f64 * 1e-5,
            lon: lon as f64 * 1e-5,
        });
    }

    Ok(points)
}

/// Reads one zig-zag encoded delta, advancing `index` past its bytes.
fn next_delta(bytes: &[u8], index: &mut usize) -> Result<i64, PolylineError> {
    let start = *index;
    let mut accum: i64 = 0;
    let mut shift = 0u32;

    loop {
        let Some(&raw) = bytes.get(*index) else {
            return Err(PolylineError::UnterminatedGroup { offset: start });
        };
        if !(63..=126).contains(&raw) {
            return Err(PolylineError::InvalidByte {
                byte: raw,
                offset: *index,
            });
        }
        *index += 1;

        let chunk = i64::from(raw - 63);
        accum |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
    }

    Ok(if accum & 1 != 0 {
        !(accum >> 1)
    } else {
        accum >> 1
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANONICAL: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn decodes_canonical_path() {
        let path = decode(CANONICAL).expect("canonical polyline");
        assert_eq!(path.len(), 3);

        assert_close(path[0].lat, 38.5);
        assert_close(path[0].lon, -120.2);
        assert_close(path[1].lat, 40.7);
        assert_close(path[1].lon, -120.95);
        assert_close(path[2].lat, 43.252);
        assert_close(path[2].lon, -126.453);
    }

    #[test]
    fn empty_input_decodes_to_empty_path() {
        assert_eq!(decode(""), Ok(Vec::new()));
    }

    #[test]
    fn single_pair_decodes_to_single_point() {
        let path = decode("_p~iF~ps|U").expect("single pair");
        assert_eq!(path.len(), 1);
        assert_close(path[0].lat, 38.5);
        assert_close(path[0].lon, -120.2);
    }

    #[test]
    fn decode_is_deterministic() {
        let first = decode(CANONICAL).expect("first pass");
        let second = decode(CANONICAL).expect("second pass");
        assert_eq!(first, second);
    }

    #[test]
    fn truncated_group_is_rejected() {
        // Every byte of "_p~i" carries the continuation bit, so the final
        // group never terminates.
        assert_eq!(
            decode("_p~i"),
            Err(PolylineError::UnterminatedGroup { offset: 0 })
        );
    }

    #[test]
    fn latitude_without_longitude_is_rejected() {
        assert_eq!(
            decode("_p~iF"),
            Err(PolylineError::MissingLongitude { offset: 0 })
        );
    }

    #[test]
    fn byte_outside_alphabet_is_rejected() {
        assert_eq!(
            decode("_p iF~ps|U"),
            Err(PolylineError::InvalidByte {
                byte: b' ',
                offset: 2
            })
        );
    }
}
