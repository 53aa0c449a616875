//! Raw plate-reader readings to a cleaned, time-zeroed series.
//!
//! Parsing never fails the well: a reading with an unreadable timestamp or
//! density is dropped. Only the final point count can make a well unusable.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::config::NormalizerCfg;
use crate::error::{AnalysisError, Stage};
use crate::types::{NormalizedSeries, Observation, RawReading, SamplePoint};
use crate::util::MILLIS_PER_HOUR;

/// Offset-carrying layouts tried after RFC 3339.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%z"];

/// Naive layouts, interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.fZ",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 style timestamp. A missing offset means UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(t) = DateTime::parse_from_str(s, fmt) {
            return Some(t.with_timezone(&Utc));
        }
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|n| n.and_utc())
}

/// Parse an absorbance value; non-numeric and non-finite values are rejected.
pub fn parse_density(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_reading(raw: &RawReading) -> Option<Observation> {
    Some(Observation {
        timestamp: parse_timestamp(&raw.timestamp)?,
        optical_density: parse_density(&raw.absorbance)?,
    })
}

/// Filter, sort and time-zero parsed observations.
///
/// Readings at or below the noise floor are dropped. The sort is stable, so
/// duplicate timestamps keep their input order.
pub fn normalize(
    observations: &[Observation],
    cfg: &NormalizerCfg,
) -> Result<NormalizedSeries, AnalysisError> {
    let mut kept: Vec<Observation> = observations
        .iter()
        .copied()
        .filter(|o| o.optical_density.is_finite() && o.optical_density > cfg.noise_floor_od)
        .collect();

    if kept.len() < cfg.min_points {
        return Err(AnalysisError::InsufficientData {
            stage: Stage::Normalize,
            needed: cfg.min_points,
            got: kept.len(),
        });
    }

    kept.sort_by_key(|o| o.timestamp);
    let Some(t0) = kept.first().map(|o| o.timestamp) else {
        return Err(AnalysisError::InsufficientData {
            stage: Stage::Normalize,
            needed: cfg.min_points.max(1),
            got: 0,
        });
    };

    let points = kept
        .iter()
        .map(|o| SamplePoint {
            elapsed_hours: (o.timestamp - t0).num_milliseconds() as f64 / MILLIS_PER_HOUR,
            optical_density: o.optical_density,
        })
        .collect();
    Ok(NormalizedSeries::from_sorted(points))
}

/// Parse then normalize. Unparseable readings are counted in the debug log.
pub fn normalize_readings(
    readings: &[RawReading],
    cfg: &NormalizerCfg,
) -> Result<NormalizedSeries, AnalysisError> {
    let observations: Vec<Observation> = readings.iter().filter_map(parse_reading).collect();
    let dropped = readings.len() - observations.len();
    if dropped > 0 {
        tracing::debug!(dropped, total = readings.len(), "unparseable readings dropped");
    }
    normalize(&observations, cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("2024-03-01T10:00:00Z")]
    #[case("2024-03-01T10:00:00")]
    #[case("2024-03-01 10:00:00")]
    #[case("2024-03-01T10:00:00.000")]
    #[case("2024-03-01T12:00:00+02:00")]
    #[case("2024-03-01 12:00:00+02:00")]
    #[case(" 2024-03-01T10:00 ")]
    fn timestamps_parse_to_same_instant(#[case] raw: &str) {
        let want = parse_timestamp("2024-03-01T10:00:00Z").unwrap();
        assert_eq!(parse_timestamp(raw), Some(want), "{raw}");
    }

    #[rstest]
    #[case("")]
    #[case("yesterday")]
    #[case("2024-13-01T10:00:00")]
    fn bad_timestamps_rejected(#[case] raw: &str) {
        assert!(parse_timestamp(raw).is_none());
    }

    #[rstest]
    #[case("0.25", Some(0.25))]
    #[case(" 1e-1 ", Some(0.1))]
    #[case("NaN", None)]
    #[case("inf", None)]
    #[case("abc", None)]
    #[case("", None)]
    fn densities(#[case] raw: &str, #[case] want: Option<f64>) {
        assert_eq!(parse_density(raw), want);
    }
}
