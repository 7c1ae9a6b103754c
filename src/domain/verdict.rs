//! Severity lattice, finding codes, and the verdict assembled from them.

use serde::{Deserialize, Serialize};

/// Weight of a single finding. Ordered `Info < Warning < Critical` so the
/// overall status falls out of a plain `max` over all findings.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// Overall admissibility of a shipment.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Clear,
    RequiresReview,
    Rejected,
}

impl Status {
    /// Maps the highest observed severity onto a status. `Info` findings are
    /// advisory notes and leave the shipment `Clear`.
    pub fn from_max_severity(max: Option<Severity>) -> Self {
        match max {
            Some(Severity::Critical) => Status::Rejected,
            Some(Severity::Warning) => Status::RequiresReview,
            Some(Severity::Info) | None => Status::Clear,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::Clear => "CLEAR",
            Status::RequiresReview => "REQUIRES-REVIEW",
            Status::Rejected => "REJECTED",
        }
    }
}

/// Evaluation phases, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    IdentityCustoms,
    PhysicalDimensions,
    UnitLoadDevice,
    ContentsDocuments,
    PackagingIntegrity,
    ArrivalLogistics,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::IdentityCustoms => "Identity & Customs",
            Phase::PhysicalDimensions => "Physical Dimensions",
            Phase::UnitLoadDevice => "Unit Load Device",
            Phase::ContentsDocuments => "Contents & Documents",
            Phase::PackagingIntegrity => "Packaging & Integrity",
            Phase::ArrivalLogistics => "Arrival Logistics",
        }
    }
}

/// Stable wire code for every rule the evaluator can raise. The message
/// catalog must carry text for each of these; `ReferenceTables::load`
/// verifies that at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingCode {
    // Identity & customs
    MissingShipperId,
    MissingExportControlNumber,
    InvalidExportControlNumber,
    ConsolidatedShipment,
    // Physical dimensions
    InvalidPieceHeight,
    HeightExceedsFleetCeiling,
    FreighterOnlyHeight,
    InvalidPieceWeight,
    WeightExceedsThresholdNoSupport,
    ZeroChargeableWeight,
    // Unit load device
    UnrecognizedUld,
    HeightExceedsUldCeiling,
    MissingIspm15Mark,
    LoadPressureUnavailable,
    UldPressureExceeded,
    // Contents & documents
    MissingDgDeclaration,
    MissingSanitaryCertificate,
    UncertifiedPressureVessel,
    IncompleteAwbSet,
    // Packaging & integrity
    PreExistingDamage,
    MissingStrapping,
    LooseShrinkWrap,
    CargoOverhang,
    ObsoleteLabelsPresent,
    UnmarkedPieces,
    ChemicalResidue,
    StackingRestriction,
    PieceCountMismatch,
    // Arrival logistics
    MissingPostalCode,
    AfterCutoffArrival,
}

impl FindingCode {
    /// Every code the evaluator can emit.
    pub const ALL: [FindingCode; 30] = [
        FindingCode::MissingShipperId,
        FindingCode::MissingExportControlNumber,
        FindingCode::InvalidExportControlNumber,
        FindingCode::ConsolidatedShipment,
        FindingCode::InvalidPieceHeight,
        FindingCode::HeightExceedsFleetCeiling,
        FindingCode::FreighterOnlyHeight,
        FindingCode::InvalidPieceWeight,
        FindingCode::WeightExceedsThresholdNoSupport,
        FindingCode::ZeroChargeableWeight,
        FindingCode::UnrecognizedUld,
        FindingCode::HeightExceedsUldCeiling,
        FindingCode::MissingIspm15Mark,
        FindingCode::LoadPressureUnavailable,
        FindingCode::UldPressureExceeded,
        FindingCode::MissingDgDeclaration,
        FindingCode::MissingSanitaryCertificate,
        FindingCode::UncertifiedPressureVessel,
        FindingCode::IncompleteAwbSet,
        FindingCode::PreExistingDamage,
        FindingCode::MissingStrapping,
        FindingCode::LooseShrinkWrap,
        FindingCode::CargoOverhang,
        FindingCode::ObsoleteLabelsPresent,
        FindingCode::UnmarkedPieces,
        FindingCode::ChemicalResidue,
        FindingCode::StackingRestriction,
        FindingCode::PieceCountMismatch,
        FindingCode::MissingPostalCode,
        FindingCode::AfterCutoffArrival,
    ];

    /// The kebab-case wire code, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingCode::MissingShipperId => "missing-shipper-id",
            FindingCode::MissingExportControlNumber => "missing-export-control-number",
            FindingCode::InvalidExportControlNumber => "invalid-export-control-number",
            FindingCode::ConsolidatedShipment => "consolidated-shipment",
            FindingCode::InvalidPieceHeight => "invalid-piece-height",
            FindingCode::HeightExceedsFleetCeiling => "height-exceeds-fleet-ceiling",
            FindingCode::FreighterOnlyHeight => "freighter-only-height",
            FindingCode::InvalidPieceWeight => "invalid-piece-weight",
            FindingCode::WeightExceedsThresholdNoSupport => {
                "weight-exceeds-threshold-no-support"
            }
            FindingCode::ZeroChargeableWeight => "zero-chargeable-weight",
            FindingCode::UnrecognizedUld => "unrecognized-uld",
            FindingCode::HeightExceedsUldCeiling => "height-exceeds-uld-ceiling",
            FindingCode::MissingIspm15Mark => "missing-ispm15-mark",
            FindingCode::LoadPressureUnavailable => "load-pressure-unavailable",
            FindingCode::UldPressureExceeded => "uld-pressure-exceeded",
            FindingCode::MissingDgDeclaration => "missing-dg-declaration",
            FindingCode::MissingSanitaryCertificate => "missing-sanitary-certificate",
            FindingCode::UncertifiedPressureVessel => "uncertified-pressure-vessel",
            FindingCode::IncompleteAwbSet => "incomplete-awb-set",
            FindingCode::PreExistingDamage => "pre-existing-damage",
            FindingCode::MissingStrapping => "missing-strapping",
            FindingCode::LooseShrinkWrap => "loose-shrink-wrap",
            FindingCode::CargoOverhang => "cargo-overhang",
            FindingCode::ObsoleteLabelsPresent => "obsolete-labels-present",
            FindingCode::UnmarkedPieces => "unmarked-pieces",
            FindingCode::ChemicalResidue => "chemical-residue",
            FindingCode::StackingRestriction => "stacking-restriction",
            FindingCode::PieceCountMismatch => "piece-count-mismatch",
            FindingCode::MissingPostalCode => "missing-postal-code",
            FindingCode::AfterCutoffArrival => "after-cutoff-arrival",
        }
    }
}

/// One advisory raised by a rule check.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub code: FindingCode,
    pub severity: Severity,
    pub phase: Phase,
    pub message: String,
}

/// Evaluator output: overall status plus the findings in phase order.
/// Immutable once returned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub status: Status,
    pub findings: Vec<Finding>,
}

impl Verdict {
    /// Computes the status as the maximum severity across `findings`.
    pub fn from_findings(findings: Vec<Finding>) -> Self {
        let status = Status::from_max_severity(findings.iter().map(|f| f.severity).max());
        Self { status, findings }
    }

    pub fn has_code(&self, code: FindingCode) -> bool {
        self.findings.iter().any(|f| f.code == code)
    }

    pub fn is_clear(&self) -> bool {
        self.status == Status::Clear
    }
}
