//! Well id → mixing parameters, assembled from batched parameter tables.
//!
//! Batches are applied in ascending id order and a later record for the same
//! well replaces the earlier one entirely.

use std::collections::BTreeMap;

use crate::error::AnalysisError;
use crate::types::WellParameters;

/// One row of a passaging parameter sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterRecord {
    pub destination_well: String,
    pub mix_cycles: u32,
    pub mix_volume: f64,
    /// `None` when the sheet had no height column.
    pub mix_height: Option<f64>,
}

impl ParameterRecord {
    pub fn new(well: impl Into<String>, mix_cycles: u32, mix_volume: f64, mix_height: Option<f64>) -> Self {
        Self {
            destination_well: well.into(),
            mix_cycles,
            mix_volume,
            mix_height,
        }
    }
}

/// Batch id → records of that batch.
pub type ParameterTable = BTreeMap<u32, Vec<ParameterRecord>>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterMap {
    wells: BTreeMap<String, WellParameters>,
}

impl ParameterMap {
    /// Resolve every batch into one map, substituting `default_height_mm`
    /// for records without a height.
    ///
    /// Records with an empty well id or a non-positive value are dropped with
    /// a warning; an earlier valid record for that well stays in effect.
    pub fn build(table: &ParameterTable, default_height_mm: f64) -> Result<Self, AnalysisError> {
        if !(default_height_mm.is_finite() && default_height_mm > 0.0) {
            return Err(AnalysisError::Config(format!(
                "default mix height must be > 0, got {default_height_mm}"
            )));
        }
        let mut wells = BTreeMap::new();
        for (&batch, records) in table {
            for rec in records {
                let params = WellParameters {
                    mix_cycles: rec.mix_cycles,
                    mix_volume: rec.mix_volume,
                    mix_height: rec.mix_height.unwrap_or(default_height_mm),
                    experiment_batch: batch,
                };
                if let Err(reason) = check_record(&rec.destination_well, &params) {
                    tracing::warn!(
                        well = %rec.destination_well,
                        batch,
                        reason,
                        "parameter record dropped"
                    );
                    continue;
                }
                if let Some(prev) = wells.insert(rec.destination_well.clone(), params) {
                    tracing::debug!(
                        well = %rec.destination_well,
                        from_batch = prev.experiment_batch,
                        to_batch = batch,
                        "parameters overwritten by later batch"
                    );
                }
            }
        }
        Ok(Self { wells })
    }

    pub fn resolve(&self, well_id: &str) -> Result<&WellParameters, AnalysisError> {
        self.wells
            .get(well_id)
            .ok_or_else(|| AnalysisError::UnresolvedWell(well_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.wells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wells.is_empty()
    }
}

fn check_record(well: &str, p: &WellParameters) -> Result<(), &'static str> {
    if well.trim().is_empty() {
        return Err("destination_well is empty");
    }
    if p.mix_cycles == 0 {
        return Err("mix_cycles must be > 0");
    }
    if !(p.mix_volume.is_finite() && p.mix_volume > 0.0) {
        return Err("mix_volume must be > 0");
    }
    if !(p.mix_height.is_finite() && p.mix_height > 0.0) {
        return Err("mix_height must be > 0");
    }
    Ok(())
}
