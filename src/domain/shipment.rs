//! Normalized input for one admissibility evaluation.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Routing mode declared on the pre-check form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShipmentMode {
    #[default]
    SingleDestination,
    Consolidated,
}

/// Regulated content category of the shipment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentCategory {
    #[default]
    None,
    DangerousGoods,
    Perishable,
    Biological,
}

impl ContentCategory {
    pub fn needs_dg_declaration(&self) -> bool {
        matches!(self, ContentCategory::DangerousGoods)
    }

    pub fn needs_sanitary_certificate(&self) -> bool {
        matches!(self, ContentCategory::Perishable | ContentCategory::Biological)
    }
}

/// Overhang reported on the form: a plain yes/no, or a measured excess
/// beyond the pallet edge in inches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverhangReport {
    #[default]
    None,
    Present,
    Excess(f64),
}

impl OverhangReport {
    /// Whether the reported overhang exceeds the tolerated excess. An
    /// unmeasured `Present` always counts as beyond tolerance.
    pub fn beyond(&self, tolerance_in: f64) -> bool {
        match self {
            OverhangReport::None => false,
            OverhangReport::Present => true,
            OverhangReport::Excess(excess) => *excess > tolerance_in,
        }
    }
}

/// One evaluation request, built by the form/JSON layer after basic type
/// checks. Created fresh per request and never mutated by the evaluator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShipmentRecord {
    /// Client ID or SCAC code; empty means the Known Shipper check fails.
    pub shipper_id: String,
    #[serde(default)]
    pub mode: ShipmentMode,

    /// Declared value above the customs tier ($2,500 per tariff code).
    #[serde(default)]
    pub high_value: bool,
    /// AES ITN; required when `high_value`, must start with 'X'.
    #[serde(default)]
    pub export_control_number: Option<String>,

    /// Height of the tallest piece including the wooden base, inches.
    pub piece_height_in: f64,
    /// Weight of the heaviest single piece, kg.
    pub piece_weight_kg: f64,
    /// Declared gross weight of the whole shipment, kg.
    pub total_weight_kg: f64,
    pub piece_count: u32,
    /// Base footprint of a piece, inches.
    pub footprint_length_in: f64,
    pub footprint_width_in: f64,

    /// Raw ULD type code; resolved against the catalog at evaluation time.
    #[serde(default)]
    pub pallet_code: Option<String>,
    #[serde(default)]
    pub wood_pallet: bool,
    /// ISPM-15 (NIMF-15) phytosanitary seal visible on the wood pallet.
    #[serde(default)]
    pub ispm15_marked: bool,
    /// Skids/shoring declared to spread heavy pieces.
    #[serde(default)]
    pub load_spreading_support: bool,

    #[serde(default)]
    pub content: ContentCategory,
    /// Shipper's Declaration for dangerous goods present (two originals).
    #[serde(default)]
    pub dg_declaration: bool,
    /// Phytosanitary certificate or FDA Prior Notice present.
    #[serde(default)]
    pub sanitary_certificate: bool,
    #[serde(default)]
    pub pressure_vessels: bool,
    /// Tanks/cylinders certified empty with protected valves.
    #[serde(default)]
    pub pressure_vessel_certified: bool,
    /// 3 originals + 6 copies of the air waybill ready.
    #[serde(default)]
    pub awb_copies_complete: bool,

    #[serde(default)]
    pub strapping: bool,
    #[serde(default)]
    pub shrink_wrap_intact: bool,
    #[serde(default)]
    pub pre_existing_damage: bool,
    /// Labels from previous flights removed.
    #[serde(default)]
    pub obsolete_labels_removed: bool,
    #[serde(default)]
    pub overhang: OverhangReport,
    /// AWB number written on every piece.
    #[serde(default)]
    pub awb_marked_each_piece: bool,
    /// Odors, oil, or grease on the cargo.
    #[serde(default)]
    pub chemical_residue: bool,
    /// "Do Not Stack" handling label present.
    #[serde(default)]
    pub no_stack_label: bool,
    /// Piece count on the air waybill, when known.
    #[serde(default)]
    pub manifest_piece_count: Option<u32>,

    pub postal_code: String,
    /// Estimated arrival of the driver at the counter.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub counter_arrival: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub flight_departure: Option<OffsetDateTime>,
}
