//! Merge decoded geometry with attribute values into region records.

use thiserror::Error;

use super::shapes::DecodedShapes;
use super::variables::AttributeTable;
use crate::models::Region;

#[derive(Debug, Error, PartialEq)]
pub enum MergeError {
    #[error("no attribute value for UG {ug} in {name}")]
    MissingValue { ug: String, name: String },
    #[error("attribute entry for UG {ug} has no geometry in {name}")]
    MissingShape { ug: String, name: String },
}

/// Pair every weighting area of one municipality with its attribute value.
///
/// A UG present on only one side fails the merge; there are no default
/// values and regions are never silently dropped. Output order follows the
/// geometry source.
pub fn merge_municipality(
    name_key: &str,
    shapes: DecodedShapes,
    attributes: &AttributeTable,
) -> Result<Vec<Region>, MergeError> {
    for ug in attributes.keys() {
        if !shapes.shapes.contains_key(ug) {
            return Err(MergeError::MissingShape {
                ug: ug.to_string(),
                name: name_key.to_string(),
            });
        }
    }

    let mut regions = Vec::with_capacity(shapes.shapes.len());
    for (ug, polygons) in shapes.shapes {
        let value = attributes.get(&ug).ok_or_else(|| MergeError::MissingValue {
            ug: ug.clone(),
            name: name_key.to_string(),
        })?;
        regions.push(Region {
            ug,
            name: name_key.to_string(),
            value,
            shapes: polygons,
        });
    }
    Ok(regions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Polygon;
    use std::collections::BTreeMap;

    fn shapes(ugs: &[&str]) -> DecodedShapes {
        DecodedShapes {
            shapes: ugs
                .iter()
                .map(|ug| (ug.to_string(), vec![Polygon::new(vec![(0.0, 0.0)])]))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn test_merge_pairs_values() {
        let attrs = AttributeTable::from_pairs(vec![
            ("100".to_string(), 1.5),
            ("200".to_string(), 2.5),
        ]);
        let regions = merge_municipality("testville", shapes(&["100", "200"]), &attrs).unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].ug, "100");
        assert_eq!(regions[0].value, 1.5);
        assert_eq!(regions[0].name, "testville");
        assert_eq!(regions[1].ug, "200");
        assert_eq!(regions[1].value, 2.5);
    }

    #[test]
    fn test_merge_missing_value_fails() {
        let attrs = AttributeTable::from_pairs(vec![("100".to_string(), 1.5)]);
        let err = merge_municipality("testville", shapes(&["100", "200"]), &attrs).unwrap_err();
        assert_eq!(
            err,
            MergeError::MissingValue {
                ug: "200".into(),
                name: "testville".into()
            }
        );
    }

    #[test]
    fn test_merge_missing_shape_fails() {
        let attrs = AttributeTable::from_pairs(vec![
            ("100".to_string(), 1.5),
            ("999".to_string(), 9.9),
        ]);
        let err = merge_municipality("testville", shapes(&["100"]), &attrs).unwrap_err();
        assert_eq!(
            err,
            MergeError::MissingShape {
                ug: "999".into(),
                name: "testville".into()
            }
        );
    }
}
