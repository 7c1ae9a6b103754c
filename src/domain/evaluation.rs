//! Admissibility rule evaluation: a fixed sequence of phase checks feeding
//! one severity accumulator.
//!
//! Every phase runs unconditionally so the finding list is always complete;
//! malformed fields become CRITICAL findings local to their phase and never
//! abort the pass. `evaluate` is total and deterministic over any
//! syntactically valid record.

use super::metrics;
use super::reference::{
    AircraftKind, ReferenceTables, COUNTER_CUTOFF, EXPORT_CONTROL_PREFIX,
    ULD_PRESSURE_SAFETY_FACTOR,
};
use super::shipment::{ShipmentMode, ShipmentRecord};
use super::verdict::{Finding, FindingCode, Phase, Severity, Verdict};

/// Outcomes the operating carriers configure rather than the rules fixing:
/// how hard to grade an overhang, and whether a consolidated shipment is
/// worth a note at all.
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluationPolicy {
    /// Severity raised for cargo overhanging the pallet edge.
    pub overhang_severity: Severity,
    /// Measured excess up to this many inches is tolerated.
    pub overhang_tolerance_in: f64,
    /// Finding raised for consolidated shipments; `None` disables the note.
    pub consolidated_severity: Option<Severity>,
}

impl Default for EvaluationPolicy {
    fn default() -> Self {
        Self {
            overhang_severity: Severity::Critical,
            overhang_tolerance_in: 0.0,
            consolidated_severity: Some(Severity::Info),
        }
    }
}

/// Evaluates one shipment against the reference tables under the default
/// policy.
pub fn evaluate(record: &ShipmentRecord, tables: &ReferenceTables) -> Verdict {
    evaluate_with_policy(record, tables, &EvaluationPolicy::default())
}

/// Runs all phases in order and folds their findings into one verdict via
/// the severity lattice.
pub fn evaluate_with_policy(
    record: &ShipmentRecord,
    tables: &ReferenceTables,
    policy: &EvaluationPolicy,
) -> Verdict {
    let mut findings = Vec::new();

    check_identity_customs(record, tables, policy, &mut findings);
    check_physical_dimensions(record, tables, &mut findings);
    check_unit_load_device(record, tables, &mut findings);
    check_contents_documents(record, tables, &mut findings);
    check_packaging_integrity(record, tables, policy, &mut findings);
    check_arrival_logistics(record, tables, &mut findings);

    Verdict::from_findings(findings)
}

fn push(
    findings: &mut Vec<Finding>,
    tables: &ReferenceTables,
    phase: Phase,
    severity: Severity,
    code: FindingCode,
) {
    findings.push(Finding {
        code,
        severity,
        phase,
        message: tables.message(code).to_string(),
    });
}

fn check_identity_customs(
    record: &ShipmentRecord,
    tables: &ReferenceTables,
    policy: &EvaluationPolicy,
    findings: &mut Vec<Finding>,
) {
    let phase = Phase::IdentityCustoms;

    if record.shipper_id.trim().is_empty() {
        push(
            findings,
            tables,
            phase,
            Severity::Warning,
            FindingCode::MissingShipperId,
        );
    }

    if record.high_value {
        match record.export_control_number.as_deref().map(str::trim) {
            None | Some("") => push(
                findings,
                tables,
                phase,
                Severity::Critical,
                FindingCode::MissingExportControlNumber,
            ),
            Some(number) if !number.starts_with(EXPORT_CONTROL_PREFIX) => push(
                findings,
                tables,
                phase,
                Severity::Critical,
                FindingCode::InvalidExportControlNumber,
            ),
            Some(_) => {}
        }
    }

    if record.mode == ShipmentMode::Consolidated {
        if let Some(severity) = policy.consolidated_severity {
            push(
                findings,
                tables,
                phase,
                severity,
                FindingCode::ConsolidatedShipment,
            );
        }
    }
}

fn check_physical_dimensions(
    record: &ShipmentRecord,
    tables: &ReferenceTables,
    findings: &mut Vec<Finding>,
) {
    let phase = Phase::PhysicalDimensions;

    let height = record.piece_height_in;
    if !height.is_finite() || height <= 0.0 {
        push(
            findings,
            tables,
            phase,
            Severity::Critical,
            FindingCode::InvalidPieceHeight,
        );
    } else if height > tables.height_ceiling(AircraftKind::Freighter) {
        push(
            findings,
            tables,
            phase,
            Severity::Critical,
            FindingCode::HeightExceedsFleetCeiling,
        );
    } else if height > tables.height_ceiling(AircraftKind::Passenger) {
        push(
            findings,
            tables,
            phase,
            Severity::Warning,
            FindingCode::FreighterOnlyHeight,
        );
    }

    let weight = record.piece_weight_kg;
    if !weight.is_finite() || weight <= 0.0 {
        push(
            findings,
            tables,
            phase,
            Severity::Critical,
            FindingCode::InvalidPieceWeight,
        );
    } else if weight > tables.weight_threshold() && !record.load_spreading_support {
        push(
            findings,
            tables,
            phase,
            Severity::Critical,
            FindingCode::WeightExceedsThresholdNoSupport,
        );
    }

    // A shipment that rates to zero chargeable weight cannot be quoted; that
    // is its own finding rather than a silent zero.
    let volumetric = metrics::volumetric_weight_kg(
        record.footprint_length_in,
        record.footprint_width_in,
        height,
        record.piece_count,
    )
    .unwrap_or(0.0);
    let declared = if record.total_weight_kg.is_finite() {
        record.total_weight_kg
    } else {
        0.0
    };
    if metrics::chargeable_weight_kg(declared, volumetric) <= 0.0 {
        push(
            findings,
            tables,
            phase,
            Severity::Critical,
            FindingCode::ZeroChargeableWeight,
        );
    }
}

fn check_unit_load_device(
    record: &ShipmentRecord,
    tables: &ReferenceTables,
    findings: &mut Vec<Finding>,
) {
    let phase = Phase::UnitLoadDevice;

    let spec = match record.pallet_code.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(code) => match tables.pallet_spec(code) {
            Some(spec) => Some(spec),
            None => {
                push(
                    findings,
                    tables,
                    phase,
                    Severity::Critical,
                    FindingCode::UnrecognizedUld,
                );
                None
            }
        },
    };

    if let Some(spec) = spec {
        // A pallet contour stricter than the generic ceiling overrides it.
        if spec.max_height_in < tables.height_ceiling(AircraftKind::Freighter)
            && record.piece_height_in.is_finite()
            && record.piece_height_in > spec.max_height_in
        {
            push(
                findings,
                tables,
                phase,
                Severity::Critical,
                FindingCode::HeightExceedsUldCeiling,
            );
        }
    }

    match metrics::concentrated_load_psi(
        record.piece_weight_kg,
        record.footprint_length_in,
        record.footprint_width_in,
    ) {
        None => {
            if record.piece_weight_kg > 0.0 {
                push(
                    findings,
                    tables,
                    phase,
                    Severity::Critical,
                    FindingCode::LoadPressureUnavailable,
                );
            }
        }
        Some(pressure) => {
            if let Some(rated) = spec.and_then(|s| s.rated_pressure_psi()) {
                if pressure > rated * ULD_PRESSURE_SAFETY_FACTOR {
                    push(
                        findings,
                        tables,
                        phase,
                        Severity::Critical,
                        FindingCode::UldPressureExceeded,
                    );
                }
            }
        }
    }

    if record.wood_pallet && !record.ispm15_marked {
        push(
            findings,
            tables,
            phase,
            Severity::Critical,
            FindingCode::MissingIspm15Mark,
        );
    }
}

fn check_contents_documents(
    record: &ShipmentRecord,
    tables: &ReferenceTables,
    findings: &mut Vec<Finding>,
) {
    let phase = Phase::ContentsDocuments;

    if record.content.needs_dg_declaration() && !record.dg_declaration {
        push(
            findings,
            tables,
            phase,
            Severity::Critical,
            FindingCode::MissingDgDeclaration,
        );
    }
    if record.content.needs_sanitary_certificate() && !record.sanitary_certificate {
        push(
            findings,
            tables,
            phase,
            Severity::Critical,
            FindingCode::MissingSanitaryCertificate,
        );
    }
    if record.pressure_vessels && !record.pressure_vessel_certified {
        push(
            findings,
            tables,
            phase,
            Severity::Critical,
            FindingCode::UncertifiedPressureVessel,
        );
    }
    if !record.awb_copies_complete {
        push(
            findings,
            tables,
            phase,
            Severity::Warning,
            FindingCode::IncompleteAwbSet,
        );
    }
}

fn check_packaging_integrity(
    record: &ShipmentRecord,
    tables: &ReferenceTables,
    policy: &EvaluationPolicy,
    findings: &mut Vec<Finding>,
) {
    let phase = Phase::PackagingIntegrity;

    if record.pre_existing_damage {
        push(
            findings,
            tables,
            phase,
            Severity::Critical,
            FindingCode::PreExistingDamage,
        );
    }
    if !record.strapping && record.piece_weight_kg > tables.weight_threshold() {
        push(
            findings,
            tables,
            phase,
            Severity::Warning,
            FindingCode::MissingStrapping,
        );
    }
    if !record.shrink_wrap_intact {
        push(
            findings,
            tables,
            phase,
            Severity::Warning,
            FindingCode::LooseShrinkWrap,
        );
    }
    if record.overhang.beyond(policy.overhang_tolerance_in) {
        push(
            findings,
            tables,
            phase,
            policy.overhang_severity,
            FindingCode::CargoOverhang,
        );
    }
    if !record.obsolete_labels_removed {
        push(
            findings,
            tables,
            phase,
            Severity::Warning,
            FindingCode::ObsoleteLabelsPresent,
        );
    }
    if !record.awb_marked_each_piece {
        push(
            findings,
            tables,
            phase,
            Severity::Warning,
            FindingCode::UnmarkedPieces,
        );
    }
    if record.chemical_residue {
        push(
            findings,
            tables,
            phase,
            Severity::Critical,
            FindingCode::ChemicalResidue,
        );
    }
    if record.no_stack_label {
        push(
            findings,
            tables,
            phase,
            Severity::Info,
            FindingCode::StackingRestriction,
        );
    }
    if let Some(manifest) = record.manifest_piece_count {
        if manifest != record.piece_count {
            push(
                findings,
                tables,
                phase,
                Severity::Critical,
                FindingCode::PieceCountMismatch,
            );
        }
    }
}

fn check_arrival_logistics(
    record: &ShipmentRecord,
    tables: &ReferenceTables,
    findings: &mut Vec<Finding>,
) {
    let phase = Phase::ArrivalLogistics;

    if record.postal_code.trim().is_empty() {
        push(
            findings,
            tables,
            phase,
            Severity::Critical,
            FindingCode::MissingPostalCode,
        );
    }

    if let (Some(arrival), Some(departure)) = (record.counter_arrival, record.flight_departure) {
        if arrival > departure - COUNTER_CUTOFF {
            push(
                findings,
                tables,
                phase,
                Severity::Warning,
                FindingCode::AfterCutoffArrival,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use time::{Duration, OffsetDateTime};

    use super::*;
    use crate::domain::shipment::{ContentCategory, OverhangReport};
    use crate::domain::verdict::Status;

    fn tables() -> ReferenceTables {
        ReferenceTables::load().expect("reference tables")
    }

    /// A record that passes every check.
    fn clean_record() -> ShipmentRecord {
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
    fn clean_record_is_clear_with_no_findings() {
        let verdict = evaluate(&clean_record(), &tables());
        assert_eq!(verdict.status, Status::Clear);
        assert!(verdict.findings.is_empty(), "{:?}", verdict.findings);
    }

    #[test]
    fn evaluation_is_idempotent() {
        let record = clean_record();
        let tables = tables();
        assert_eq!(evaluate(&record, &tables), evaluate(&record, &tables));

        let mut dirty = clean_record();
        dirty.pre_existing_damage = true;
        dirty.high_value = true;
        assert_eq!(evaluate(&dirty, &tables), evaluate(&dirty, &tables));
    }

    #[test]
    fn height_over_fleet_ceiling_rejects() {
        let mut record = clean_record();
        record.piece_height_in = 100.0;
        let verdict = evaluate(&record, &tables());
        assert_eq!(verdict.status, Status::Rejected);
        assert!(verdict.has_code(FindingCode::HeightExceedsFleetCeiling));
        assert!(!verdict.has_code(FindingCode::FreighterOnlyHeight));
    }

    #[test]
    fn freighter_band_height_requires_review() {
        let mut record = clean_record();
        record.piece_height_in = 70.0;
        let verdict = evaluate(&record, &tables());
        assert_eq!(verdict.status, Status::RequiresReview);
        assert!(verdict.has_code(FindingCode::FreighterOnlyHeight));
    }

    #[test]
    fn missing_export_control_number_rejects() {
        let mut record = clean_record();
        record.high_value = true;
        record.export_control_number = Some(String::new());
        let verdict = evaluate(&record, &tables());
        assert_eq!(verdict.status, Status::Rejected);
        assert!(verdict.has_code(FindingCode::MissingExportControlNumber));
    }

    #[test]
    fn export_control_number_must_carry_itn_prefix() {
        let mut record = clean_record();
        record.high_value = true;
        record.export_control_number = Some("20260801123456".to_string());
        let verdict = evaluate(&record, &tables());
        assert!(verdict.has_code(FindingCode::InvalidExportControlNumber));

        record.export_control_number = Some("X20260801123456".to_string());
        let verdict = evaluate(&record, &tables());
        assert_eq!(verdict.status, Status::Clear);
    }

    #[test]
    fn heavy_piece_without_support_rejects() {
        let mut record = clean_record();
        record.piece_weight_kg = 200.0;
        record.load_spreading_support = false;
        let verdict = evaluate(&record, &tables());
        assert_eq!(verdict.status, Status::Rejected);
        assert!(verdict.has_code(FindingCode::WeightExceedsThresholdNoSupport));

        record.load_spreading_support = true;
        let verdict = evaluate(&record, &tables());
        assert!(!verdict.has_code(FindingCode::WeightExceedsThresholdNoSupport));
    }

    #[test]
    fn unresolved_pallet_code_rejects_without_panicking() {
        let mut record = clean_record();
        record.pallet_code = Some("ZZZ".to_string());
        let verdict = evaluate(&record, &tables());
        assert_eq!(verdict.status, Status::Rejected);
        assert!(verdict.has_code(FindingCode::UnrecognizedUld));
    }

    #[test]
    fn stricter_pallet_contour_overrides_generic_ceiling() {
        // 70 in clears the PMC contour but not the PAJ contour (63 in).
        let mut record = clean_record();
        record.piece_height_in = 70.0;
        record.pallet_code = Some("PAJ".to_string());
        let verdict = evaluate(&record, &tables());
        assert_eq!(verdict.status, Status::Rejected);
        assert!(verdict.has_code(FindingCode::HeightExceedsUldCeiling));

        record.pallet_code = Some("PMC".to_string());
        let verdict = evaluate(&record, &tables());
        assert!(!verdict.has_code(FindingCode::HeightExceedsUldCeiling));
    }

    #[test]
    fn wood_pallet_needs_ispm15_seal() {
        let mut record = clean_record();
        record.ispm15_marked = false;
        let verdict = evaluate(&record, &tables());
        assert_eq!(verdict.status, Status::Rejected);
        assert!(verdict.has_code(FindingCode::MissingIspm15Mark));

        record.wood_pallet = false;
        let verdict = evaluate(&record, &tables());
        assert!(!verdict.has_code(FindingCode::MissingIspm15Mark));
    }

    #[test]
    fn unusable_footprint_with_positive_weight_is_a_finding() {
        let mut record = clean_record();
        record.footprint_length_in = 0.0;
        let verdict = evaluate(&record, &tables());
        assert_eq!(verdict.status, Status::Rejected);
        assert!(verdict.has_code(FindingCode::LoadPressureUnavailable));
    }

    #[test]
    fn overloaded_pallet_deck_rejects() {
        // PAG rated pressure is 4626 kg over 125x88 in; concentrate far more
        // than that on a tiny footprint.
        let mut record = clean_record();
        record.pallet_code = Some("PAG".to_string());
        record.piece_weight_kg = 140.0;
        record.footprint_length_in = 10.0;
        record.footprint_width_in = 10.0;
        let verdict = evaluate(&record, &tables());
        assert!(verdict.has_code(FindingCode::UldPressureExceeded));
    }

    #[test]
    fn dangerous_goods_need_declaration() {
        let mut record = clean_record();
        record.content = ContentCategory::DangerousGoods;
        let verdict = evaluate(&record, &tables());
        assert_eq!(verdict.status, Status::Rejected);
        assert!(verdict.has_code(FindingCode::MissingDgDeclaration));

        record.dg_declaration = true;
        let verdict = evaluate(&record, &tables());
        assert_eq!(verdict.status, Status::Clear);
    }

    #[test]
    fn perishables_need_sanitary_certificate() {
        let mut record = clean_record();
        record.content = ContentCategory::Perishable;
        let verdict = evaluate(&record, &tables());
        assert!(verdict.has_code(FindingCode::MissingSanitaryCertificate));

        record.sanitary_certificate = true;
        let verdict = evaluate(&record, &tables());
        assert_eq!(verdict.status, Status::Clear);
    }

    #[test]
    fn empty_postal_code_rejects() {
        let mut record = clean_record();
        record.postal_code = "  ".to_string();
        let verdict = evaluate(&record, &tables());
        assert_eq!(verdict.status, Status::Rejected);
        assert!(verdict.has_code(FindingCode::MissingPostalCode));
    }

    #[test]
    fn arrival_inside_cutoff_window_requires_review() {
        let departure = OffsetDateTime::from_unix_timestamp(1_800_000_000).expect("departure");
        let mut record = clean_record();
        record.flight_departure = Some(departure);

        record.counter_arrival = Some(departure - Duration::hours(3));
        let verdict = evaluate(&record, &tables());
        assert_eq!(verdict.status, Status::RequiresReview);
        assert!(verdict.has_code(FindingCode::AfterCutoffArrival));

        record.counter_arrival = Some(departure - Duration::hours(5));
        let verdict = evaluate(&record, &tables());
        assert_eq!(verdict.status, Status::Clear);
    }

    #[test]
    fn all_phases_run_even_after_a_critical_finding() {
        let mut record = clean_record();
        record.shipper_id = String::new();
        record.piece_height_in = 100.0;
        record.pre_existing_damage = true;
        record.postal_code = String::new();
        let verdict = evaluate(&record, &tables());

        let codes: Vec<_> = verdict.findings.iter().map(|f| f.code).collect();
        assert_eq!(
            codes,
            vec![
                FindingCode::MissingShipperId,
                FindingCode::HeightExceedsFleetCeiling,
                FindingCode::PreExistingDamage,
                FindingCode::MissingPostalCode,
            ]
        );
        assert_eq!(verdict.status, Status::Rejected);
    }

    #[test]
    fn status_is_monotonic_under_critical_mutations() {
        let tables = tables();
        let base = clean_record();
        assert_eq!(evaluate(&base, &tables).status, Status::Clear);

        let mutations: Vec<Box<dyn Fn(&mut ShipmentRecord)>> = vec![
            Box::new(|r| r.piece_height_in = 120.0),
            Box::new(|r| r.piece_weight_kg = 300.0),
            Box::new(|r| r.pallet_code = Some("???".to_string())),
            Box::new(|r| r.ispm15_marked = false),
            Box::new(|r| r.pre_existing_damage = true),
            Box::new(|r| r.chemical_residue = true),
            Box::new(|r| r.postal_code = String::new()),
            Box::new(|r| r.manifest_piece_count = Some(7)),
        ];
        for mutate in mutations {
            let mut record = base.clone();
            mutate(&mut record);
            assert_eq!(evaluate(&record, &tables).status, Status::Rejected);
        }
    }

    #[test]
    fn malformed_numeric_fields_become_findings() {
        let mut record = clean_record();
        record.piece_height_in = f64::NAN;
        record.piece_weight_kg = -4.0;
        let verdict = evaluate(&record, &tables());
        assert_eq!(verdict.status, Status::Rejected);
        assert!(verdict.has_code(FindingCode::InvalidPieceHeight));
        assert!(verdict.has_code(FindingCode::InvalidPieceWeight));
    }

    #[test]
    fn zero_weights_are_reported_not_silently_rated() {
        let mut record = clean_record();
        record.total_weight_kg = 0.0;
        record.footprint_length_in = 0.0;
        record.footprint_width_in = 0.0;
        let verdict = evaluate(&record, &tables());
        assert!(verdict.has_code(FindingCode::ZeroChargeableWeight));
    }

    #[test]
    fn overhang_policy_controls_severity_and_tolerance() {
        let tables = tables();
        let mut record = clean_record();
        record.overhang = OverhangReport::Present;
        let verdict = evaluate(&record, &tables);
        assert_eq!(verdict.status, Status::Rejected);
        assert!(verdict.has_code(FindingCode::CargoOverhang));

        let lenient = EvaluationPolicy {
            overhang_severity: Severity::Warning,
            ..EvaluationPolicy::default()
        };
        let verdict = evaluate_with_policy(&record, &tables, &lenient);
        assert_eq!(verdict.status, Status::RequiresReview);

        record.overhang = OverhangReport::Excess(1.5);
        let tolerant = EvaluationPolicy {
            overhang_tolerance_in: 2.0,
            ..EvaluationPolicy::default()
        };
        let verdict = evaluate_with_policy(&record, &tables, &tolerant);
        assert!(!verdict.has_code(FindingCode::CargoOverhang));
    }

    #[test]
    fn consolidated_note_follows_policy() {
        let tables = tables();
        let mut record = clean_record();
        record.mode = ShipmentMode::Consolidated;

        let verdict = evaluate(&record, &tables);
        assert_eq!(verdict.status, Status::Clear);
        assert!(verdict.has_code(FindingCode::ConsolidatedShipment));

        let silent = EvaluationPolicy {
            consolidated_severity: None,
            ..EvaluationPolicy::default()
        };
        let verdict = evaluate_with_policy(&record, &tables, &silent);
        assert!(verdict.findings.is_empty());

        let strict = EvaluationPolicy {
            consolidated_severity: Some(Severity::Warning),
            ..EvaluationPolicy::default()
        };
        let verdict = evaluate_with_policy(&record, &tables, &strict);
        assert_eq!(verdict.status, Status::RequiresReview);
    }

    #[test]
    fn supplemental_document_checks_warn() {
        let mut record = clean_record();
        record.awb_copies_complete = false;
        record.awb_marked_each_piece = false;
        record.no_stack_label = true;
        let verdict = evaluate(&record, &tables());
        assert_eq!(verdict.status, Status::RequiresReview);
        assert!(verdict.has_code(FindingCode::IncompleteAwbSet));
        assert!(verdict.has_code(FindingCode::UnmarkedPieces));
        assert!(verdict.has_code(FindingCode::StackingRestriction));
    }

    #[test]
    fn findings_carry_catalog_text() {
        let mut record = clean_record();
        record.piece_height_in = 100.0;
        let verdict = evaluate(&record, &tables());
        let finding = verdict
            .findings
            .iter()
            .find(|f| f.code == FindingCode::HeightExceedsFleetCeiling)
            .expect("ceiling finding");
        assert!(finding.message.contains("96 in"));
        assert_eq!(finding.phase, Phase::PhysicalDimensions);
    }
}
