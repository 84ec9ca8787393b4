//! Decoder for the compressed coordinate strings served by the weighting-area
//! shape endpoint.
//!
//! A record is a whitespace-separated list of tokens, one token per polygon.
//! Inside a token, the letters A–S abbreviate a comma plus a small signed
//! integer; expanding them yields a comma-separated field list. The first
//! field is a normalizer, the rest are (longitude, latitude) delta pairs that
//! accumulate into absolute coordinates after division by the normalizer.

use thiserror::Error;

use crate::models::Polygon;

#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error("malformed numeric field `{field}` in token `{token}`")]
    MalformedField { token: String, field: String },
    #[error("zero normalizer in token `{token}`")]
    ZeroNormalizer { token: String },
}

/// Short-hand codes used by the shape compression: each letter stands for a
/// literal comma followed by a small signed integer.
fn expansion(ch: char) -> Option<&'static str> {
    Some(match ch {
        'A' => ",0",
        'B' => ",1",
        'C' => ",-1",
        'D' => ",2",
        'E' => ",-2",
        'F' => ",3",
        'G' => ",-3",
        'H' => ",4",
        'I' => ",-4",
        'J' => ",5",
        'K' => ",-5",
        'L' => ",6",
        'M' => ",-6",
        'N' => ",7",
        'O' => ",-7",
        'P' => ",8",
        'Q' => ",-8",
        'R' => ",9",
        'S' => ",-9",
        _ => return None,
    })
}

/// Expand the compression codes in a single token. Characters outside the
/// table (digits, `.`, `-`, `e`, `+`, literal commas) pass through unchanged.
fn expand(token: &str) -> String {
    let mut out = String::with_capacity(token.len() * 2);
    for ch in token.chars() {
        match expansion(ch) {
            Some(s) => out.push_str(s),
            None => out.push(ch),
        }
    }
    out
}

fn parse_field(token: &str, field: &str) -> Result<f64, DecodeError> {
    field.parse().map_err(|_| DecodeError::MalformedField {
        token: token.to_string(),
        field: field.to_string(),
    })
}

/// Decode one compressed record into its polygons, one per token, in token
/// order.
///
/// The source data writes the exponent marker of some normalizers in
/// uppercase; the `0E+` occurrences are rewritten before parsing. Within a
/// token, coordinate deltas are cumulative: every vertex is the running sum
/// of all deltas so far, divided by the token's normalizer.
pub fn decode(record: &str) -> Result<Vec<Polygon>, DecodeError> {
    let record = record.replace("0E+", "0e+");
    record.split_whitespace().map(decode_token).collect()
}

fn decode_token(token: &str) -> Result<Polygon, DecodeError> {
    let expanded = expand(token);
    let fields: Vec<&str> = expanded.split(',').collect();

    let norm = parse_field(token, fields[0])?;
    if norm == 0.0 {
        return Err(DecodeError::ZeroNormalizer {
            token: token.to_string(),
        });
    }

    // Fields after the normalizer come in (lng, lat) pairs; an unpaired
    // trailing field is dropped, matching the source format.
    let mut vertices = Vec::with_capacity((fields.len() - 1) / 2);
    let mut lng = 0.0;
    let mut lat = 0.0;
    for pair in fields[1..].chunks_exact(2) {
        lng += parse_field(token, pair[0])? / norm;
        lat += parse_field(token, pair[1])? / norm;
        vertices.push((lat, lng));
    }
    Ok(Polygon::new(vertices))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_codes() {
        assert_eq!(expand("BC"), ",1,-1");
        assert_eq!(expand("10A5"), "10,05");
        assert_eq!(expand("1.5e+3"), "1.5e+3");
    }

    #[test]
    fn test_single_pair() {
        let shapes = decode("10,5,5").unwrap();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].vertices, vec![(0.5, 0.5)]);
    }

    #[test]
    fn test_deltas_accumulate() {
        let shapes = decode("10,5,5,5,5,-10,0").unwrap();
        assert_eq!(
            shapes[0].vertices,
            vec![(0.5, 0.5), (1.0, 1.0), (1.0, 0.0)]
        );
    }

    #[test]
    fn test_trailing_unpaired_field_ignored() {
        let shapes = decode("10,5,5,7").unwrap();
        assert_eq!(shapes[0].vertices, vec![(0.5, 0.5)]);
    }

    #[test]
    fn test_one_polygon_per_token() {
        let shapes = decode("10,5,5 2,1,1").unwrap();
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].vertices, vec![(0.5, 0.5)]);
        assert_eq!(shapes[1].vertices, vec![(0.5, 0.5)]);
    }

    #[test]
    fn test_compressed_deltas() {
        // Expands to "10,5,5,1,-1": second vertex moves by (1, -1) / 10.
        let shapes = decode("10,5,5BC").unwrap();
        assert_eq!(shapes[0].vertices, vec![(0.5, 0.5), (0.4, 0.6)]);
    }

    #[test]
    fn test_uppercase_exponent_rewritten() {
        let shapes = decode("2,50E+1,5").unwrap();
        assert_eq!(shapes[0].vertices, vec![(2.5, 250.0)]);
    }

    #[test]
    fn test_zero_normalizer_rejected() {
        assert_eq!(
            decode("0,5,5"),
            Err(DecodeError::ZeroNormalizer {
                token: "0,5,5".into()
            })
        );
        // "A" expands to ",0": the leading empty field fails numeric parsing
        // before the zero normalizer would be divided by.
        assert!(decode("A,5,5").is_err());
    }

    #[test]
    fn test_malformed_field_names_token() {
        let err = decode("10,x,5").unwrap_err();
        assert_eq!(
            err,
            DecodeError::MalformedField {
                token: "10,x,5".into(),
                field: "x".into()
            }
        );
    }

    #[test]
    fn test_token_without_pairs_is_empty_polygon() {
        let shapes = decode("10").unwrap();
        assert!(shapes[0].is_empty());
    }
}
