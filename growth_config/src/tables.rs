//! CSV schemas for plate-reader exports and passaging parameter sheets.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One absorbance reading as exported by the plate reader.
///
/// Fields stay textual; parsing and validation happen in the normalizer so a
/// single malformed timestamp or density never rejects the whole file.
///
/// Required headers (extra columns are ignored):
/// timestamp,absorbance_od600
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ObservationRow {
    pub timestamp: String,
    pub absorbance_od600: String,
}

/// Passaging parameter sheet row.
///
/// Expected headers:
/// destination_well,mix_reps,mix_volume_uL[,mix_height_mm]
///
/// Example:
/// destination_well,mix_reps,mix_volume_uL,mix_height_mm
/// B2,5,100,2.5
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ParameterRow {
    pub destination_well: String,
    pub mix_reps: u32,
    #[serde(rename = "mix_volume_uL")]
    pub mix_volume_ul: f64,
    #[serde(default)]
    pub mix_height_mm: Option<f64>,
}

/// Parsed well CSV plus a count of rows the reader could not decode.
#[derive(Debug, Default, Clone)]
pub struct WellCsv {
    pub rows: Vec<ObservationRow>,
    pub skipped: usize,
}

/// A parameter-sheet row that was left out, with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub line: usize,
    pub reason: String,
}

/// Parsed parameter sheet plus the rows that failed to decode or validate.
#[derive(Debug, Default, Clone)]
pub struct ParameterCsv {
    pub rows: Vec<ParameterRow>,
    pub skipped: Vec<SkippedRow>,
}

/// A discovered `well_<ID>_absorbance.csv` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WellFile {
    pub well_id: String,
    pub path: PathBuf,
}

const WELL_PREFIX: &str = "well_";
const WELL_SUFFIX: &str = "_absorbance.csv";

fn read_headers(rdr: &mut csv::Reader<std::fs::File>, path: &Path) -> eyre::Result<Vec<String>> {
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?;
    Ok(headers.iter().map(|s| s.trim().to_string()).collect())
}

fn require_headers(actual: &[String], required: &[&str], what: &str) -> eyre::Result<()> {
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|h| !actual.iter().any(|a| a == h))
        .collect();
    if !missing.is_empty() {
        eyre::bail!(
            "{what} CSV must have headers '{}', missing: {}",
            required.join(","),
            missing.join(",")
        );
    }
    Ok(())
}

/// Load one well's absorbance export. Rows that do not decode are skipped.
pub fn load_well_csv(path: &Path) -> eyre::Result<WellCsv> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open well CSV {:?}: {}", path, e))?;

    let headers = read_headers(&mut rdr, path)?;
    require_headers(&headers, &["timestamp", "absorbance_od600"], "well")?;

    let mut out = WellCsv::default();
    for rec in rdr.deserialize::<ObservationRow>() {
        match rec {
            Ok(row) => out.rows.push(row),
            Err(_) => out.skipped += 1,
        }
    }
    Ok(out)
}

/// Load a passaging parameter sheet. Missing headers are an error; rows that
/// do not decode or carry non-positive values are skipped and reported.
pub fn load_parameter_csv(path: &Path) -> eyre::Result<ParameterCsv> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open parameter CSV {:?}: {}", path, e))?;

    let headers = read_headers(&mut rdr, path)?;
    require_headers(
        &headers,
        &["destination_well", "mix_reps", "mix_volume_uL"],
        "parameter",
    )?;

    let mut out = ParameterCsv::default();
    for (idx, rec) in rdr.deserialize::<ParameterRow>().enumerate() {
        // header is line 1
        let line = idx + 2;
        match rec.map_err(|e| e.to_string()).and_then(check_parameter_row) {
            Ok(row) => out.rows.push(row),
            Err(reason) => out.skipped.push(SkippedRow { line, reason }),
        }
    }
    Ok(out)
}

fn check_parameter_row(row: ParameterRow) -> Result<ParameterRow, String> {
    if row.destination_well.is_empty() {
        return Err("destination_well is empty".into());
    }
    if row.mix_reps == 0 {
        return Err("mix_reps must be > 0".into());
    }
    if !(row.mix_volume_ul.is_finite() && row.mix_volume_ul > 0.0) {
        return Err("mix_volume_uL must be > 0".into());
    }
    if let Some(h) = row.mix_height_mm
        && !(h.is_finite() && h > 0.0)
    {
        return Err("mix_height_mm must be > 0".into());
    }
    Ok(row)
}

/// Extract the well id from a `well_<ID>_absorbance.csv` file name.
pub fn well_id_from_file_name(name: &str) -> Option<&str> {
    let id = name.strip_prefix(WELL_PREFIX)?.strip_suffix(WELL_SUFFIX)?;
    if id.is_empty() { None } else { Some(id) }
}

/// List the well exports in `dir`, sorted by well id. Other files are ignored.
pub fn discover_well_files(dir: &Path) -> eyre::Result<Vec<WellFile>> {
    let entries =
        std::fs::read_dir(dir).map_err(|e| eyre::eyre!("read wells dir {:?}: {}", dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| eyre::eyre!("read wells dir {:?}: {}", dir, e))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if let Some(id) = well_id_from_file_name(name) {
            files.push(WellFile {
                well_id: id.to_string(),
                path: entry.path(),
            });
        }
    }
    files.sort_by(|a, b| a.well_id.cmp(&b.well_id));
    Ok(files)
}
