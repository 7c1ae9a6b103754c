//! Static domain knowledge: operational limits, the ULD catalog, and the
//! advisory message catalog.
//!
//! Loaded once at process start and passed by reference into the evaluator;
//! never mutated and never re-read afterwards. A load failure is a
//! configuration error the surrounding system must treat as fatal.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::Duration;

use crate::domain::metrics;
use crate::domain::verdict::FindingCode;
use crate::util::assets;

/// Hard ceiling for pieces on passenger aircraft, inches.
pub const PASSENGER_HEIGHT_CEILING_IN: f64 = 63.0;
/// Hard ceiling on freighter aircraft; above this no aircraft in the fleet
/// accepts the piece.
pub const FREIGHTER_HEIGHT_CEILING_IN: f64 = 96.0;
/// Per-piece weight above which load-spreading support is mandatory, kg.
pub const PIECE_WEIGHT_THRESHOLD_KG: f64 = 150.0;
/// Multiple of the rated ULD deck pressure tolerated before rejection.
pub const ULD_PRESSURE_SAFETY_FACTOR: f64 = 1.0;
/// Required prefix of an AES ITN export control number.
pub const EXPORT_CONTROL_PREFIX: char = 'X';
/// Counter cut-off ahead of flight departure.
pub const COUNTER_CUTOFF: Duration = Duration::hours(4);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AircraftKind {
    Passenger,
    Freighter,
}

/// Specification of one unit load device type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UldSpec {
    pub length_in: f64,
    pub width_in: f64,
    pub max_height_in: f64,
    pub rating_kg: f64,
}

impl UldSpec {
    /// Deck pressure at the rated load spread over the full base.
    pub fn rated_pressure_psi(&self) -> Option<f64> {
        metrics::concentrated_load_psi(self.rating_kg, self.length_in, self.width_in)
    }
}

#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("embedded asset {0} is missing")]
    MissingAsset(&'static str),
    #[error("failed to parse embedded asset {asset}: {source}")]
    Parse {
        asset: &'static str,
        source: serde_json::Error,
    },
    #[error("message catalog has no entry for finding code {0}")]
    MissingMessage(&'static str),
}

/// Immutable lookup tables consumed by the evaluator.
#[derive(Clone, Debug)]
pub struct ReferenceTables {
    uld_catalog: HashMap<String, UldSpec>,
    messages: HashMap<FindingCode, String>,
}

impl ReferenceTables {
    /// Parses the embedded catalogs and verifies the message catalog covers
    /// every finding code.
    pub fn load() -> Result<Self, ReferenceError> {
        let uld_catalog: HashMap<String, UldSpec> = assets::parse_json(assets::ULD_CATALOG)?;
        let messages: HashMap<FindingCode, String> = assets::parse_json(assets::MESSAGES)?;

        for code in FindingCode::ALL {
            if !messages.contains_key(&code) {
                return Err(ReferenceError::MissingMessage(code.as_str()));
            }
        }

        Ok(Self {
            uld_catalog,
            messages,
        })
    }

    /// Looks up a ULD spec by type code, case-insensitively. A miss is
    /// expected input from upstream forms and surfaces as a finding, never
    /// as an error.
    pub fn pallet_spec(&self, code: &str) -> Option<&UldSpec> {
        self.uld_catalog.get(&code.trim().to_ascii_uppercase())
    }

    pub fn pallet_codes(&self) -> impl Iterator<Item = &str> {
        self.uld_catalog.keys().map(String::as_str)
    }

    pub fn height_ceiling(&self, kind: AircraftKind) -> f64 {
        match kind {
            AircraftKind::Passenger => PASSENGER_HEIGHT_CEILING_IN,
            AircraftKind::Freighter => FREIGHTER_HEIGHT_CEILING_IN,
        }
    }

    pub fn weight_threshold(&self) -> f64 {
        PIECE_WEIGHT_THRESHOLD_KG
    }

    /// Canonical advisory text for a finding code. Wording lives in the
    /// embedded catalog so copy changes never touch rule logic.
    pub fn message(&self, code: FindingCode) -> &str {
        self.messages
            .get(&code)
            .map(String::as_str)
            .unwrap_or(code.as_str())
    }
}
