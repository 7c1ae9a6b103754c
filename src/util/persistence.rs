//! Append-only evaluation log.
//!
//! Every verdict can be recorded as one JSON line under the platform data
//! directory. The log is written by the surrounding system after evaluation;
//! the evaluator itself never reads or writes it.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;
use uuid::Uuid;

use crate::domain::shipment::ShipmentRecord;
use crate::domain::verdict::Verdict;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "CargoPrecheckAdvisor";
const APP_NAME: &str = "CargoPrecheckAdvisor";
const LOG_FILENAME: &str = "evaluations.jsonl";

/// One logged evaluation: the request, its verdict, and when it happened.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvaluationLogEntry {
    pub id: Uuid,
    /// Unix timestamp (seconds) when the evaluation was recorded.
    pub recorded_at: u64,
    pub record: ShipmentRecord,
    pub verdict: Verdict,
}

impl EvaluationLogEntry {
    pub fn new(record: ShipmentRecord, verdict: Verdict) -> Self {
        let recorded_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            id: Uuid::new_v4(),
            recorded_at,
            record,
            verdict,
        }
    }
}

fn log_file() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.data_dir().join(LOG_FILENAME))
}

/// Appends one entry as a single JSON line.
pub fn append_evaluation(entry: &EvaluationLogEntry) -> Result<(), LogSaveError> {
    let path = log_file().ok_or(LogSaveError::StorageUnavailable)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut line = serde_json::to_string(entry)?;
    line.push('\n');

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())?;
    Ok(())
}

/// Loads the whole log. Malformed lines are skipped so one bad write never
/// poisons the history; a missing file is an empty log.
pub fn load_evaluation_log() -> Vec<EvaluationLogEntry> {
    let Some(path) = log_file() else {
        return Vec::new();
    };
    match fs::read_to_string(path) {
        Ok(content) => parse_log(&content),
        Err(_) => Vec::new(),
    }
}

fn parse_log(content: &str) -> Vec<EvaluationLogEntry> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum LogSaveError {
    #[error("storage directory unavailable")]
    StorageUnavailable,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::evaluation::evaluate;
    use crate::domain::reference::ReferenceTables;
    use crate::domain::shipment::{ContentCategory, OverhangReport, ShipmentMode};

    fn sample_record() -> ShipmentRecord {
        ShipmentRecord {
            shipper_id: "SCAC-4471".to_string(),
            mode: ShipmentMode::SingleDestination,
            high_value: false,
            export_control_number: None,
            piece_height_in: 50.0,
            piece_weight_kg: 80.0,
            total_weight_kg: 320.0,
            piece_count: 4,
            footprint_length_in: 48.0,
            footprint_width_in: 40.0,
            pallet_code: Some("PMC".to_string()),
            wood_pallet: true,
            ispm15_marked: true,
            load_spreading_support: false,
            content: ContentCategory::None,
            dg_declaration: false,
            sanitary_certificate: false,
            pressure_vessels: false,
            pressure_vessel_certified: false,
            awb_copies_complete: true,
            strapping: true,
            shrink_wrap_intact: true,
            pre_existing_damage: false,
            obsolete_labels_removed: true,
            overhang: OverhangReport::None,
            awb_marked_each_piece: true,
            chemical_residue: false,
            no_stack_label: false,
            manifest_piece_count: Some(4),
            postal_code: "33126".to_string(),
            counter_arrival: None,
            flight_departure: None,
        }
    }

    #[test]
    fn log_entries_round_trip_as_json_lines() {
        let tables = ReferenceTables::load().expect("reference tables");
        let record = sample_record();
        let verdict = evaluate(&record, &tables);
        let entry = EvaluationLogEntry::new(record, verdict);

        let line = serde_json::to_string(&entry).expect("serialize entry");
        let parsed: EvaluationLogEntry = serde_json::from_str(&line).expect("parse entry");
        assert_eq!(parsed, entry);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let tables = ReferenceTables::load().expect("reference tables");
        let record = sample_record();
        let verdict = evaluate(&record, &tables);
        let entry = EvaluationLogEntry::new(record, verdict);

        let good = serde_json::to_string(&entry).expect("serialize entry");
        let content = format!("{good}\nnot json\n\n{good}\n");
        let parsed = parse_log(&content);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0], entry);
    }
}
