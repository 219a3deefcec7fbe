//! Cube shape classification.
//!
//! A cube is either in *standard* shape (one observation column, with the
//! measure and unit of each row named by dedicated columns) or in *pivoted*
//! shape (one observation column per measure, each owning its measure).
//! Anything in between is an unsupported hybrid.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CubeShape {
    Standard,
    Pivoted,
}

impl fmt::Display for CubeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CubeShape::Standard => f.write_str("standard"),
            CubeShape::Pivoted => f.write_str("pivoted"),
        }
    }
}

/// One observation-value column as seen by the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationColumnShape {
    pub title: String,
    /// Whether the column carries its own measure.
    pub pivoted: bool,
}

/// Everything the classifier looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapeInput {
    pub observation_columns: Vec<ObservationColumnShape>,
    pub measure_dimension_columns: Vec<String>,
    pub units_columns: Vec<String>,
}

/// Why a cube is neither standard nor pivoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HybridReason {
    /// Some observation columns own a measure and some do not.
    MixedPivotedAndStandard,
    /// Pivoted observation columns alongside a measure-dimension column.
    MeasureDimensionWithPivoted,
    /// Several observation columns, none owning a measure, and no
    /// measure-dimension column to supply one.
    MultipleStandardWithoutMeasureDimension,
    /// Several observation columns sharing one measure-dimension column.
    MultipleStandardWithMeasureDimension,
}

impl fmt::Display for HybridReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            HybridReason::MixedPivotedAndStandard => {
                "some observation value columns define a measure and some do not"
            }
            HybridReason::MeasureDimensionWithPivoted => {
                "a measure dimension column is defined alongside observation value columns which define their own measure"
            }
            HybridReason::MultipleStandardWithoutMeasureDimension => {
                "multiple observation value columns do not define a measure and there is no measure dimension column"
            }
            HybridReason::MultipleStandardWithMeasureDimension => {
                "multiple observation value columns share a measure dimension column"
            }
        };
        f.write_str(text)
    }
}

/// Failure to classify a cube.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeError {
    #[error("the cube has no observation value column")]
    NoObservationColumn,

    #[error("the cube mixes standard and pivoted shapes: {reason} (columns: {columns:?})")]
    Hybrid {
        reason: HybridReason,
        columns: Vec<String>,
    },
}

/// Classify a cube from its observation and measure-dimension columns.
///
/// Standard shape needs exactly one observation column without its own
/// measure and no pivoted columns. How many measure-dimension and units
/// columns a standard cube has is left to validation.
pub fn detect_shape(input: &ShapeInput) -> Result<CubeShape, ShapeError> {
    if input.observation_columns.is_empty() {
        return Err(ShapeError::NoObservationColumn);
    }

    let (pivoted, standard): (Vec<_>, Vec<_>) =
        input.observation_columns.iter().partition(|c| c.pivoted);
    let titles = |cols: &[&ObservationColumnShape]| -> Vec<String> {
        cols.iter().map(|c| c.title.clone()).collect()
    };

    match (pivoted.len(), standard.len()) {
        (0, 1) => Ok(CubeShape::Standard),
        (0, _) => {
            let reason = if input.measure_dimension_columns.is_empty() {
                HybridReason::MultipleStandardWithoutMeasureDimension
            } else {
                HybridReason::MultipleStandardWithMeasureDimension
            };
            let mut columns = titles(&standard);
            columns.extend(input.measure_dimension_columns.iter().cloned());
            Err(ShapeError::Hybrid { reason, columns })
        }
        (_, 0) if input.measure_dimension_columns.is_empty() => Ok(CubeShape::Pivoted),
        (_, 0) => {
            let mut columns = titles(&pivoted);
            columns.extend(input.measure_dimension_columns.iter().cloned());
            Err(ShapeError::Hybrid {
                reason: HybridReason::MeasureDimensionWithPivoted,
                columns,
            })
        }
        _ => Err(ShapeError::Hybrid {
            reason: HybridReason::MixedPivotedAndStandard,
            columns: input
                .observation_columns
                .iter()
                .map(|c| c.title.clone())
                .collect(),
        }),
    }
}

/// Classify a cube read back from a document, one answer per measure.
///
/// Each item pairs a measure identifier with whether that measure is
/// carried directly by an observation column.
pub fn classify_measures<'a>(
    measures: impl IntoIterator<Item = (&'a str, bool)>,
) -> Result<CubeShape, ShapeError> {
    let mut pivoted = Vec::new();
    let mut standard = Vec::new();
    for (measure, is_pivoted) in measures {
        if is_pivoted {
            pivoted.push(measure.to_string());
        } else {
            standard.push(measure.to_string());
        }
    }

    match (pivoted.is_empty(), standard.is_empty()) {
        (true, true) => Err(ShapeError::NoObservationColumn),
        (false, true) => Ok(CubeShape::Pivoted),
        (true, false) => Ok(CubeShape::Standard),
        (false, false) => {
            pivoted.extend(standard);
            Err(ShapeError::Hybrid {
                reason: HybridReason::MixedPivotedAndStandard,
                columns: pivoted,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(title: &str, pivoted: bool) -> ObservationColumnShape {
        ObservationColumnShape {
            title: title.to_string(),
            pivoted,
        }
    }

    fn input(columns: Vec<ObservationColumnShape>, measure_dims: &[&str]) -> ShapeInput {
        ShapeInput {
            observation_columns: columns,
            measure_dimension_columns: measure_dims.iter().map(|s| s.to_string()).collect(),
            units_columns: Vec::new(),
        }
    }

    #[test]
    fn test_no_observation_column() {
        assert_eq!(
            detect_shape(&input(vec![], &["Measure"])),
            Err(ShapeError::NoObservationColumn)
        );
    }

    #[test]
    fn test_standard() {
        assert_eq!(
            detect_shape(&input(vec![obs("Value", false)], &["Measure"])),
            Ok(CubeShape::Standard)
        );
    }

    #[test]
    fn test_single_standard_without_measure_dimension_is_still_standard() {
        assert_eq!(
            detect_shape(&input(vec![obs("Value", false)], &[])),
            Ok(CubeShape::Standard)
        );
    }

    #[test]
    fn test_pivoted() {
        assert_eq!(
            detect_shape(&input(vec![obs("Count", true), obs("Rate", true)], &[])),
            Ok(CubeShape::Pivoted)
        );
    }

    #[test]
    fn test_mixed_is_hybrid() {
        let err = detect_shape(&input(vec![obs("Count", true), obs("Rate", false)], &[])).unwrap_err();
        assert_eq!(
            err,
            ShapeError::Hybrid {
                reason: HybridReason::MixedPivotedAndStandard,
                columns: vec!["Count".to_string(), "Rate".to_string()],
            }
        );
    }

    #[test]
    fn test_measure_dimension_with_pivoted_is_hybrid() {
        let err = detect_shape(&input(vec![obs("Count", true)], &["Measure"])).unwrap_err();
        assert!(matches!(
            err,
            ShapeError::Hybrid {
                reason: HybridReason::MeasureDimensionWithPivoted,
                ..
            }
        ));
    }

    #[test]
    fn test_multiple_standard_without_measure_dimension() {
        let err = detect_shape(&input(vec![obs("A", false), obs("B", false)], &[])).unwrap_err();
        assert_eq!(
            err,
            ShapeError::Hybrid {
                reason: HybridReason::MultipleStandardWithoutMeasureDimension,
                columns: vec!["A".to_string(), "B".to_string()],
            }
        );
    }

    #[test]
    fn test_classify_measures() {
        assert_eq!(classify_measures([("m1", true), ("m2", true)]), Ok(CubeShape::Pivoted));
        assert_eq!(classify_measures([("m1", false)]), Ok(CubeShape::Standard));
        assert_eq!(classify_measures(Vec::<(&str, bool)>::new()), Err(ShapeError::NoObservationColumn));
        assert!(matches!(
            classify_measures([("m1", true), ("m2", false)]),
            Err(ShapeError::Hybrid { .. })
        ));
    }
}
